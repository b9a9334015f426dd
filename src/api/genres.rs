//! Genre endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{genre::GenrePayload, Genre},
    AppState,
};

use super::{page_limit, ListQuery};

/// List genres.
#[utoipa::path(
    get,
    path = "/genres",
    tag = "genres",
    params(ListQuery),
    responses(
        (status = 200, description = "List of genres", body = [Genre]),
        (status = 404, description = "Pagination cursor no longer exists")
    )
)]
pub async fn list_genres(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Genre>>> {
    let limit = page_limit(&state.config.pagination, query.limit)?;
    let genres = state.store.list_genres(limit, query.after).await?;
    Ok(Json(genres))
}

/// Get a genre by id.
#[utoipa::path(
    get,
    path = "/genres/{id}",
    tag = "genres",
    params(("id" = Uuid, Path, description = "Genre id")),
    responses(
        (status = 200, description = "Genre", body = Genre),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn get_genre(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Genre>> {
    let genre = state.store.get_genre(id).await?;
    Ok(Json(genre))
}

/// Create a genre (admin).
#[utoipa::path(
    post,
    path = "/genres",
    tag = "genres",
    security(("bearer_auth" = [])),
    request_body = GenrePayload,
    responses(
        (status = 200, description = "Genre created", body = Genre),
        (status = 400, description = "Duplicate name")
    )
)]
pub async fn create_genre(
    State(state): State<AppState>,
    Json(payload): Json<GenrePayload>,
) -> AppResult<Json<Genre>> {
    payload.validate().map_err(|e| AppError::validation(e.to_string()))?;
    let genre = state.store.create_genre(&payload).await?;
    Ok(Json(genre))
}

/// Update a genre (admin).
#[utoipa::path(
    put,
    path = "/genres/{id}",
    tag = "genres",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Genre id")),
    request_body = GenrePayload,
    responses(
        (status = 200, description = "Genre updated", body = Genre),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn update_genre(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<GenrePayload>,
) -> AppResult<Json<Genre>> {
    payload.validate().map_err(|e| AppError::validation(e.to_string()))?;
    let genre = state.store.update_genre(id, &payload).await?;
    Ok(Json(genre))
}

/// Delete a genre (admin). Refused while books still reference it.
#[utoipa::path(
    delete,
    path = "/genres/{id}",
    tag = "genres",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Genre id")),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 404, description = "Genre not found"),
        (status = 409, description = "Genre is referenced by books")
    )
)]
pub async fn delete_genre(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.store.delete_genre(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
