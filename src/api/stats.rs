//! Statistics endpoints for the admin overview

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedUser;

/// Back-office overview counters
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    /// Books in the catalog
    pub books: i64,
    /// Copies currently available across all books
    pub copies_available: i64,
    /// Registered users
    pub users: i64,
    /// Loans ever created
    pub loans_total: i64,
    /// Loans currently outstanding
    pub loans_active: i64,
    /// Outstanding loans past their due date
    pub loans_overdue: i64,
}

/// Library statistics (admin)
#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Library statistics", body = StatsResponse),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<StatsResponse>> {
    claims.require_admin()?;

    let stats = state.services.stats.overview().await?;
    Ok(Json(stats))
}
