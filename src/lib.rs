//! Biblios University Library Server
//!
//! A Rust REST JSON API for a university library: catalog browsing,
//! borrowing and returning, student reviews, and an admin back-office
//! for books, users and loans.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
