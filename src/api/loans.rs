//! Loan management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::loan::{AdminLoanDetails, Loan, LoanDetails},
};

use super::AuthenticatedUser;

/// Borrow request
#[derive(Deserialize, ToSchema)]
pub struct CreateLoanRequest {
    /// Book to borrow
    pub book_id: i32,
    /// Borrower. Defaults to the authenticated user; borrowing on
    /// behalf of someone else requires admin.
    pub user_id: Option<i32>,
}

/// Return-by-book request
#[derive(Deserialize, ToSchema)]
pub struct ReturnLoanRequest {
    /// Book being returned
    pub book_id: i32,
    /// Borrower. Defaults to the authenticated user (admin only otherwise).
    pub user_id: Option<i32>,
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Loan created", body = Loan),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "No copies available")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateLoanRequest>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    // The identity comes from the verified token, never from the body
    let user_id = match request.user_id {
        Some(id) if id != claims.user_id => {
            claims.require_admin()?;
            id
        }
        _ => claims.user_id,
    };

    let loan = state.services.loans.borrow(request.book_id, user_id).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a borrowed book by book id
#[utoipa::path(
    post,
    path = "/loans/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = ReturnLoanRequest,
    responses(
        (status = 200, description = "Loan closed", body = Loan),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "No active loan for this book")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<ReturnLoanRequest>,
) -> AppResult<Json<Loan>> {
    let user_id = match request.user_id {
        Some(id) if id != claims.user_id => {
            claims.require_admin()?;
            id
        }
        _ => claims.user_id,
    };

    let loan = state
        .services
        .loans
        .return_for_book(request.book_id, user_id)
        .await?;
    Ok(Json(loan))
}

/// Return a borrowed book by loan id
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan closed", body = Loan),
        (status = 403, description = "Not the borrower"),
        (status = 404, description = "No active loan with this id")
    )
)]
pub async fn return_loan_by_id(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<Loan>> {
    let loan = state
        .services
        .loans
        .return_by_id(loan_id, claims.user_id, claims.is_admin())
        .await?;
    Ok(Json(loan))
}

/// List the caller's loans, past and present
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's loans with derived status", body = Vec<LoanDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_my_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.list_for_user(claims.user_id).await?;
    Ok(Json(loans))
}

/// List every loan across all users (admin)
#[utoipa::path(
    get,
    path = "/admin/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All loans", body = Vec<AdminLoanDetails>),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_all_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<AdminLoanDetails>>> {
    claims.require_admin()?;

    let loans = state.services.loans.list_all().await?;
    Ok(Json(loans))
}
