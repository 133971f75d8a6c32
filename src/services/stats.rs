//! Statistics service for the admin overview

use crate::{api::stats::StatsResponse, error::AppResult, repository::Repository};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Back-office overview counters
    pub async fn overview(&self) -> AppResult<StatsResponse> {
        let (books, copies_available) = self.repository.books.counts().await?;
        let users = self.repository.users.count().await?;
        let loans_total = self.repository.loans.count_total().await?;
        let loans_active = self.repository.loans.count_active().await?;
        let loans_overdue = self.repository.loans.count_overdue().await?;

        Ok(StatsResponse {
            books,
            copies_available,
            users,
            loans_total,
            loans_active,
            loans_overdue,
        })
    }
}
