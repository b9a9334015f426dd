//! Bookstore administration backend
//!
//! A REST JSON API for managing a bookstore catalog (books, authors,
//! genres), accounts, sessions, and cover images.

use std::sync::Arc;

pub mod api;
pub mod auth;
pub mod config;
pub mod cover;
pub mod error;
pub mod models;
pub mod repository;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn repository::Store>,
    pub auth: Arc<auth::SessionManager>,
    pub covers: Arc<cover::CoverStore>,
}
