//! Loans repository for database operations

use chrono::{DateTime, Duration, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::loan::{AdminLoanDetails, Loan, LoanDetails, LoanStatus},
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Create a new loan, claiming one copy of the book.
    ///
    /// The conditional decrement and the loan insert run in one
    /// transaction: two concurrent borrows of a book with a single
    /// remaining copy cannot both pass the `available_copies > 0` guard,
    /// so at most one wins and the count never goes negative.
    pub async fn create(&self, book_id: i32, user_id: i32, period: Duration) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let already_borrowed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE book_id = $1 AND user_id = $2 AND return_date IS NULL)",
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_borrowed {
            return Err(AppError::Conflict(
                "User already has an outstanding loan for this book".to_string(),
            ));
        }

        let claimed = sqlx::query(
            "UPDATE books SET available_copies = available_copies - 1 \
             WHERE id = $1 AND available_copies > 0",
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                .bind(book_id)
                .fetch_one(&mut *tx)
                .await?;
            return Err(if exists {
                AppError::Unavailable("No copies of this book are available".to_string())
            } else {
                AppError::NotFound(format!("Book with id {} not found", book_id))
            });
        }

        let now = Utc::now();
        let due_date = now + period;

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (book_id, user_id, loan_date, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(now)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Close the active loan with the given id, releasing its copy.
    /// Closing the loan and incrementing the count are one transaction.
    pub async fn return_by_id(&self, loan_id: i32) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET return_date = NOW() \
             WHERE id = $1 AND return_date IS NULL RETURNING *",
        )
        .bind(loan_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("No active loan with this id".to_string()))?;

        sqlx::query("UPDATE books SET available_copies = available_copies + 1 WHERE id = $1")
            .bind(loan.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Close the caller's active loan for a book, releasing its copy
    pub async fn return_for_book(&self, book_id: i32, user_id: i32) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET return_date = NOW() \
             WHERE book_id = $1 AND user_id = $2 AND return_date IS NULL RETURNING *",
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("No active loan for this user and book".to_string())
        })?;

        sqlx::query("UPDATE books SET available_copies = available_copies + 1 WHERE id = $1")
            .bind(loan.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// All loans ever created for a user, joined with book display fields
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT l.id, l.book_id, b.title, b.author,
                   l.loan_date, l.due_date, l.return_date
            FROM loans l
            JOIN books b ON l.book_id = b.id
            WHERE l.user_id = $1
            ORDER BY l.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let now = Utc::now();
        let loans = rows
            .into_iter()
            .map(|row| {
                let due_date: DateTime<Utc> = row.get("due_date");
                let return_date: Option<DateTime<Utc>> = row.get("return_date");
                LoanDetails {
                    id: row.get("id"),
                    book_id: row.get("book_id"),
                    title: row.get("title"),
                    author: row.get("author"),
                    loan_date: row.get("loan_date"),
                    due_date,
                    return_date,
                    status: LoanStatus::derive(due_date, return_date, now),
                }
            })
            .collect();

        Ok(loans)
    }

    /// Every loan across all users, joined with book and user display fields
    pub async fn list_all(&self) -> AppResult<Vec<AdminLoanDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT l.id, l.book_id, b.title, b.author,
                   l.user_id, u.firstname, u.lastname, u.email,
                   l.loan_date, l.due_date, l.return_date
            FROM loans l
            JOIN books b ON l.book_id = b.id
            JOIN users u ON l.user_id = u.id
            ORDER BY l.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let now = Utc::now();
        let loans = rows
            .into_iter()
            .map(|row| {
                let due_date: DateTime<Utc> = row.get("due_date");
                let return_date: Option<DateTime<Utc>> = row.get("return_date");
                AdminLoanDetails {
                    id: row.get("id"),
                    book_id: row.get("book_id"),
                    title: row.get("title"),
                    author: row.get("author"),
                    user_id: row.get("user_id"),
                    firstname: row.get("firstname"),
                    lastname: row.get("lastname"),
                    email: row.get("email"),
                    loan_date: row.get("loan_date"),
                    due_date,
                    return_date,
                    status: LoanStatus::derive(due_date, return_date, now),
                    returned: return_date.is_some(),
                }
            })
            .collect();

        Ok(loans)
    }

    /// Whether the user has an active loan for any book
    pub async fn user_has_active_loans(&self, user_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE user_id = $1 AND return_date IS NULL)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Whether the user has returned at least one loan of the book
    pub async fn has_returned_loan(&self, book_id: i32, user_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans \
             WHERE book_id = $1 AND user_id = $2 AND return_date IS NOT NULL)",
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Count all loans
    pub async fn count_total(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count active loans
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE return_date IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count overdue loans
    pub async fn count_overdue(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE return_date IS NULL AND due_date < NOW()",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
