//! Author endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{author::AuthorPayload, Author},
    AppState,
};

use super::{page_limit, ListQuery};

/// List authors.
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    params(ListQuery),
    responses(
        (status = 200, description = "List of authors", body = [Author]),
        (status = 404, description = "Pagination cursor no longer exists")
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Author>>> {
    let limit = page_limit(&state.config.pagination, query.limit)?;
    let authors = state.store.list_authors(limit, query.after).await?;
    Ok(Json(authors))
}

/// Get an author by id.
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = Uuid, Path, description = "Author id")),
    responses(
        (status = 200, description = "Author", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Author>> {
    let author = state.store.get_author(id).await?;
    Ok(Json(author))
}

/// Create an author (admin).
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = AuthorPayload,
    responses(
        (status = 200, description = "Author created", body = Author),
        (status = 400, description = "Duplicate name")
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    Json(payload): Json<AuthorPayload>,
) -> AppResult<Json<Author>> {
    payload.validate().map_err(|e| AppError::validation(e.to_string()))?;
    let author = state.store.create_author(&payload).await?;
    Ok(Json(author))
}

/// Update an author (admin).
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Author id")),
    request_body = AuthorPayload,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AuthorPayload>,
) -> AppResult<Json<Author>> {
    payload.validate().map_err(|e| AppError::validation(e.to_string()))?;
    let author = state.store.update_author(id, &payload).await?;
    Ok(Json(author))
}

/// Delete an author (admin). Refused while books still reference them.
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Author id")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Author is referenced by books")
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.store.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
