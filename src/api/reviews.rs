//! Book review endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::review::{CreateReview, Review, ReviewDetails},
};

use super::AuthenticatedUser;

/// Reviews of a book with the aggregate rating
#[derive(Serialize, ToSchema)]
pub struct ReviewsResponse {
    pub reviews: Vec<ReviewDetails>,
    /// Mean rating rounded to 2 decimals, absent with no reviews
    pub average_rating: Option<f64>,
}

/// Submit a review for a book
#[utoipa::path(
    post,
    path = "/books/{id}/reviews",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = CreateReview,
    responses(
        (status = 201, description = "Review recorded", body = Review),
        (status = 400, description = "Rating out of bounds"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn submit_review(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
    Json(request): Json<CreateReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    request.validate()?;

    let review = state
        .services
        .reviews
        .submit(book_id, claims.user_id, &request)
        .await?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// List all reviews for a book
#[utoipa::path(
    get,
    path = "/books/{id}/reviews",
    tag = "reviews",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Reviews with aggregate rating", body = ReviewsResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn list_reviews(
    State(state): State<crate::AppState>,
    Path(book_id): Path<i32>,
) -> AppResult<Json<ReviewsResponse>> {
    let (reviews, average_rating) = state.services.reviews.list_for_book(book_id).await?;

    Ok(Json(ReviewsResponse {
        reviews,
        average_rating,
    }))
}
