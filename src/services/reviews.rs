//! Review service: submission policy and rating aggregation

use crate::{
    config::ReviewsConfig,
    error::{AppError, AppResult},
    models::review::{self, CreateReview, Review, ReviewDetails},
    repository::Repository,
};

#[derive(Clone)]
pub struct ReviewsService {
    repository: Repository,
    config: ReviewsConfig,
}

impl ReviewsService {
    pub fn new(repository: Repository, config: ReviewsConfig) -> Self {
        Self { repository, config }
    }

    /// Submit a review for a book.
    ///
    /// Rating bounds are validated at the boundary; the policy knobs
    /// (one review per user, borrow-before-review) are configuration.
    pub async fn submit(
        &self,
        book_id: i32,
        user_id: i32,
        request: &CreateReview,
    ) -> AppResult<Review> {
        self.repository.books.get_by_id(book_id).await?;

        if !self.config.allow_duplicates
            && self.repository.reviews.exists_for(book_id, user_id).await?
        {
            return Err(AppError::Conflict(
                "User has already reviewed this book".to_string(),
            ));
        }

        if self.config.require_returned_loan
            && !self
                .repository
                .loans
                .has_returned_loan(book_id, user_id)
                .await?
        {
            return Err(AppError::Forbidden(
                "Only readers who returned this book may review it".to_string(),
            ));
        }

        self.repository
            .reviews
            .create(book_id, user_id, request.rating, &request.comment)
            .await
    }

    /// All reviews for a book with the aggregate rating
    pub async fn list_for_book(
        &self,
        book_id: i32,
    ) -> AppResult<(Vec<ReviewDetails>, Option<f64>)> {
        self.repository.books.get_by_id(book_id).await?;

        let reviews = self.repository.reviews.list_for_book(book_id).await?;
        let ratings: Vec<i16> = reviews.iter().map(|r| r.rating).collect();

        Ok((reviews, review::average_rating(&ratings)))
    }

    /// Mean rating for a book, `None` with no reviews
    pub async fn average_rating(&self, book_id: i32) -> AppResult<Option<f64>> {
        let ratings = self.repository.reviews.ratings_for_book(book_id).await?;
        Ok(review::average_rating(&ratings))
    }
}
