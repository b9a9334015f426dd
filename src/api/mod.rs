//! API handlers for the bookstore REST endpoints
//!
//! Also home of the session middleware: route gates resolve the bearer token
//! once per request and stash the principal in request extensions, where
//! chained gates and handlers pick it up without a second lookup.

pub mod accounts;
pub mod authors;
pub mod books;
pub mod covers;
pub mod genres;
pub mod health;
pub mod openapi;

#[cfg(test)]
pub(crate) mod testutil;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    config::PaginationConfig,
    error::{AppError, AppResult},
    models::Session,
    AppState,
};

/// The principal resolved for the current request: the session snapshot and
/// the raw token it was resolved from.
#[derive(Clone)]
pub struct CurrentSession {
    pub session: Session,
    pub token: String,
}

/// Middleware gate: the request must carry a valid session.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    resolve_session(&state, &mut request)?;
    Ok(next.run(request).await)
}

/// Middleware gate: the request must carry a valid session whose account is
/// an admin. A resolved non-admin principal is rejected as forbidden, never
/// as unauthorized.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let current = resolve_session(&state, &mut request)?;
    if !current.session.account.admin {
        return Err(AppError::Forbidden);
    }
    Ok(next.run(request).await)
}

/// Resolves the session for a request, populating request extensions.
///
/// Idempotent: when gates are chained the second one reuses the principal
/// already in extensions instead of hitting the session table again.
fn resolve_session(state: &AppState, request: &mut Request) -> AppResult<CurrentSession> {
    if let Some(current) = request.extensions().get::<CurrentSession>() {
        return Ok(current.clone());
    }
    let current = session_from_headers(state, request.headers())?;
    request.extensions_mut().insert(current.clone());
    Ok(current)
}

fn session_from_headers(state: &AppState, headers: &HeaderMap) -> AppResult<CurrentSession> {
    let header = headers.get(AUTHORIZATION).ok_or(AppError::MissingSession)?;
    let value = header.to_str().map_err(|_| AppError::MalformedSession)?;
    let token = value.strip_prefix("Bearer ").ok_or(AppError::MalformedSession)?;
    let session = state.auth.get_session(token).ok_or(AppError::InvalidSession)?;
    Ok(CurrentSession {
        session,
        token: token.to_string(),
    })
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(current) = parts.extensions.get::<CurrentSession>() {
            return Ok(current.clone());
        }
        let current = session_from_headers(state, &parts.headers)?;
        parts.extensions.insert(current.clone());
        Ok(current)
    }
}

/// Shared pagination query parameters for UUID-keyed listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListQuery {
    pub limit: Option<i64>,
    /// Id of the last element of the previous page.
    pub after: Option<Uuid>,
}

/// Resolves the requested page size against configured bounds.
pub fn page_limit(config: &PaginationConfig, requested: Option<i64>) -> AppResult<i64> {
    match requested {
        None => Ok(config.default_limit),
        Some(limit) if limit > 0 && limit <= config.max_limit => Ok(limit),
        Some(limit) => Err(AppError::validation(format!(
            "invalid value {limit} for parameter limit"
        ))),
    }
}
