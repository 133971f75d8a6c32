//! Book (catalog entry) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book model from database.
///
/// `available` is derived in SQL as `available_copies > 0`; every book
/// query selects it alongside the stored columns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: Option<String>,
    /// Total copies owned by the library
    pub quantity: i32,
    /// Copies not currently out on loan
    pub available_copies: i32,
    pub available: bool,
    /// Opaque cover image reference produced by an external upload service
    pub image_url: Option<String>,
    pub published_year: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book with its review aggregate, for the detail view
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    /// Mean of all review ratings, rounded to 2 decimals; absent with no reviews
    pub average_rating: Option<f64>,
}

/// Catalog search filters. All optional, combined with logical AND.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Case-insensitive substring match on the title
    pub title: Option<String>,
    /// Exact genre match
    pub genre: Option<String>,
    /// Exact author match
    pub author: Option<String>,
    /// Keep only books with at least one available copy
    pub available: Option<bool>,
}

/// Catalog-wide aggregates, computed from the full snapshot
/// rather than from any filtered result.
#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogFacets {
    /// Distinct genres, sorted lexicographically
    pub genres: Vec<String>,
    /// Distinct authors, sorted lexicographically
    pub authors: Vec<String>,
    /// Total number of books in the catalog
    pub total: i64,
    /// Number of books with at least one available copy
    pub available: i64,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[validate(length(min = 1, message = "Genre is required"))]
    pub genre: String,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    pub image_url: Option<String>,
    pub published_year: Option<i32>,
}

/// Update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: Option<i32>,
    pub image_url: Option<String>,
    pub published_year: Option<i32>,
}
