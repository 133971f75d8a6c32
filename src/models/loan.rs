//! Loan (borrow) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

impl Loan {
    /// Status at the given instant
    pub fn status_at(&self, now: DateTime<Utc>) -> LoanStatus {
        LoanStatus::derive(self.due_date, self.return_date, now)
    }
}

/// Derived loan status. Not stored: a pure function of the loan dates
/// and the current instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Overdue,
    Returned,
}

impl LoanStatus {
    /// `returned ? Returned : (now > due_date ? Overdue : Active)`
    pub fn derive(
        due_date: DateTime<Utc>,
        return_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        if return_date.is_some() {
            LoanStatus::Returned
        } else if now > due_date {
            LoanStatus::Overdue
        } else {
            LoanStatus::Active
        }
    }
}

/// Loan joined with book display fields, for a user's own loan list
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub book_id: i32,
    pub title: String,
    pub author: String,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
}

/// Loan joined with book and borrower display fields, for the back-office
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminLoanDetails {
    pub id: i32,
    pub book_id: i32,
    pub title: String,
    pub author: String,
    pub user_id: i32,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub returned: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn loan_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn active_within_the_borrowing_period() {
        let due = loan_date() + Duration::days(14);
        assert_eq!(
            LoanStatus::derive(due, None, loan_date()),
            LoanStatus::Active
        );
        assert_eq!(
            LoanStatus::derive(due, None, loan_date() + Duration::days(7)),
            LoanStatus::Active
        );
        // The due instant itself is still active
        assert_eq!(LoanStatus::derive(due, None, due), LoanStatus::Active);
    }

    #[test]
    fn overdue_after_the_due_date() {
        let due = loan_date() + Duration::days(14);
        assert_eq!(
            LoanStatus::derive(due, None, due + Duration::seconds(1)),
            LoanStatus::Overdue
        );
        assert_eq!(
            LoanStatus::derive(due, None, due + Duration::days(365)),
            LoanStatus::Overdue
        );
    }

    #[test]
    fn returned_wins_regardless_of_time_passage() {
        let due = loan_date() + Duration::days(14);
        let returned = Some(loan_date() + Duration::days(3));
        assert_eq!(
            LoanStatus::derive(due, returned, due + Duration::days(100)),
            LoanStatus::Returned
        );
        assert_eq!(
            LoanStatus::derive(due, returned, loan_date()),
            LoanStatus::Returned
        );
    }
}
