//! Error types for the bookstore server
//!
//! Storage failures are classified exactly once, in the repository layer,
//! into one of these kinds; the HTTP boundary then maps each kind to a
//! stable status code and message via [`AppError::to_envelope`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::OnceCell;
use serde::Serialize;
use thiserror::Error;

/// Whether error responses carry the full error chain in the `error` field.
/// Off by default so internals never leak outside development setups.
static EXPOSE_DETAIL: OnceCell<bool> = OnceCell::new();

/// Enables or disables the verbose `error` field on error responses.
/// Called once at startup from configuration.
pub fn set_expose_detail(expose: bool) {
    let _ = EXPOSE_DETAIL.set(expose);
}

fn expose_detail() -> bool {
    EXPOSE_DETAIL.get().copied().unwrap_or(false)
}

/// Main application error type.
///
/// A single tagged enum carrying the kind discriminant plus the resource or
/// field context captured at the point of origin.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{resource} does not exist")]
    NotFound { resource: String },

    #[error("{resource} already exist")]
    Duplicate { resource: String },

    #[error("{resource} is being depended on by other records")]
    Depended { resource: String },

    #[error("invalid value on {parent}.{field}")]
    InvalidDependency { parent: String, field: String },

    /// An `after` pagination cursor referencing a nonexistent row.
    #[error("{resource} referenced by after does not exist")]
    NonExistentCursor { resource: String },

    #[error("missing id")]
    MissingId,

    #[error("missing session")]
    MissingSession,

    #[error("malformed session")]
    MalformedSession,

    #[error("invalid session")]
    InvalidSession,

    #[error("forbidden")]
    Forbidden,

    #[error("{0}")]
    Validation(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound { resource: resource.into() }
    }

    pub fn duplicate(resource: impl Into<String>) -> Self {
        AppError::Duplicate { resource: resource.into() }
    }

    pub fn depended(resource: impl Into<String>) -> Self {
        AppError::Depended { resource: resource.into() }
    }

    pub fn invalid_dependency(parent: impl Into<String>, field: impl Into<String>) -> Self {
        AppError::InvalidDependency { parent: parent.into(), field: field.into() }
    }

    pub fn nonexistent_cursor(resource: impl Into<String>) -> Self {
        AppError::NonExistentCursor { resource: resource.into() }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// Maps the error to its wire-level status code and short message.
    ///
    /// Arm order is the classification priority: session kinds first, then
    /// forbidden, the not-found kinds, the client kinds, the depended-on
    /// conflict, and finally the internal catch-alls. Exactly one envelope
    /// per error.
    pub fn to_envelope(&self, expose_detail: bool) -> (StatusCode, ErrorResponse) {
        let (status, message) = match self {
            AppError::MissingSession | AppError::MalformedSession | AppError::InvalidSession => {
                (StatusCode::UNAUTHORIZED, "Unauthorized.".to_string())
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden.".to_string()),
            AppError::NotFound { .. } | AppError::NonExistentCursor { .. } => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::Duplicate { .. }
            | AppError::InvalidDependency { .. }
            | AppError::MissingId
            | AppError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Depended { .. } => (StatusCode::CONFLICT, self.to_string()),
            AppError::Hashing(_) | AppError::Database(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Unhandled error.".to_string())
            }
        };

        let detail = if expose_detail { Some(self.to_string()) } else { None };
        (status, ErrorResponse { message, error: detail })
    }
}

/// Error response body.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Short error that gets sent to the client.
    pub message: String,
    /// Full error chain for debugging, omitted in production-safe mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Hashing(_) | AppError::Internal(_) => {
                tracing::error!("internal error: {}", self);
            }
            AppError::Database(e) => {
                tracing::error!("database error: {:?}", e);
            }
            AppError::MissingSession | AppError::MalformedSession | AppError::InvalidSession => {
                tracing::debug!("rejected session: {}", self);
            }
            _ => {}
        }

        let (status, body) = self.to_envelope(expose_detail());
        (status, Json(body)).into_response()
    }
}

/// Result type alias for application operations.
pub type AppResult<T> = Result<T, AppError>;
