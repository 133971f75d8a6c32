//! Loan management service

use chrono::Duration;

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::loan::{AdminLoanDetails, Loan, LoanDetails},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    config: LoansConfig,
}

impl LoansService {
    pub fn new(repository: Repository, config: LoansConfig) -> Self {
        Self { repository, config }
    }

    /// Borrow one copy of a book for a user.
    ///
    /// The availability check, the copy decrement and the loan insert are
    /// one atomic unit in the repository; two borrowers racing for the
    /// last copy cannot both succeed.
    pub async fn borrow(&self, book_id: i32, user_id: i32) -> AppResult<Loan> {
        // Verify the borrower exists before touching the book
        self.repository.users.get_by_id(user_id).await?;

        self.repository
            .loans
            .create(book_id, user_id, Duration::days(self.config.period_days))
            .await
    }

    /// Return a loan by id. Only the borrower, or an admin, may close it.
    pub async fn return_by_id(
        &self,
        loan_id: i32,
        requester_id: i32,
        is_admin: bool,
    ) -> AppResult<Loan> {
        let loan = self.repository.loans.get_by_id(loan_id).await?;
        if loan.user_id != requester_id && !is_admin {
            return Err(AppError::Forbidden(
                "Cannot return another user's loan".to_string(),
            ));
        }
        self.repository.loans.return_by_id(loan_id).await
    }

    /// Return the caller's active loan for a book
    pub async fn return_for_book(&self, book_id: i32, user_id: i32) -> AppResult<Loan> {
        self.repository.loans.return_for_book(book_id, user_id).await
    }

    /// All loans ever created for a user, with derived status
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list_for_user(user_id).await
    }

    /// Every loan across all users (admin)
    pub async fn list_all(&self) -> AppResult<Vec<AdminLoanDetails>> {
        self.repository.loans.list_all().await
    }
}
