//! Reviews repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::review::{Review, ReviewDetails},
};

#[derive(Clone)]
pub struct ReviewsRepository {
    pool: Pool<Postgres>,
}

impl ReviewsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create a new review
    pub async fn create(
        &self,
        book_id: i32,
        user_id: i32,
        rating: i16,
        comment: &str,
    ) -> AppResult<Review> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (book_id, user_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await?;

        Ok(review)
    }

    /// All reviews for a book with reviewer display names, insertion order
    pub async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<ReviewDetails>> {
        let reviews = sqlx::query_as::<_, ReviewDetails>(
            r#"
            SELECT r.id, r.book_id, r.user_id, u.firstname, u.lastname,
                   r.rating, r.comment, r.created_at
            FROM reviews r
            JOIN users u ON r.user_id = u.id
            WHERE r.book_id = $1
            ORDER BY r.id
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    /// All ratings for a book, for aggregation
    pub async fn ratings_for_book(&self, book_id: i32) -> AppResult<Vec<i16>> {
        let ratings: Vec<i16> =
            sqlx::query_scalar("SELECT rating FROM reviews WHERE book_id = $1 ORDER BY id")
                .bind(book_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(ratings)
    }

    /// Whether the user has already reviewed the book
    pub async fn exists_for(&self, book_id: i32, user_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE book_id = $1 AND user_id = $2)",
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
