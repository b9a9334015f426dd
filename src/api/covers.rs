//! Cover image endpoints

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::{error::AppResult, AppState};

use super::books::require_isbn13;

/// Upload or replace a book's cover (admin). The raw request body is the
/// image; JPEG and PNG are accepted.
#[utoipa::path(
    put,
    path = "/books/{isbn}/cover",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("isbn" = String, Path, description = "ISBN-13")),
    request_body(content = [u8], content_type = "application/octet-stream"),
    responses(
        (status = 204, description = "Cover stored"),
        (status = 400, description = "Unsupported image type"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn upload_cover(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
    body: Bytes,
) -> AppResult<StatusCode> {
    let isbn = require_isbn13(&isbn)?;
    let book = state.store.get_book(&isbn).await?;

    let file_name = state.covers.store(&isbn, &body).await?;
    state.store.set_book_cover(&isbn, Some(&file_name)).await?;

    // drop the replaced file only after the row points at the new one
    if let Some(old) = book.cover_file.as_deref() {
        state.covers.remove(old).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a book's cover (admin). Removing an absent cover is fine.
#[utoipa::path(
    delete,
    path = "/books/{isbn}/cover",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("isbn" = String, Path, description = "ISBN-13")),
    responses(
        (status = 204, description = "Cover removed"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_cover(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> AppResult<StatusCode> {
    let isbn = require_isbn13(&isbn)?;
    let book = state.store.get_book(&isbn).await?;

    if let Some(cover_file) = book.cover_file.as_deref() {
        state.store.set_book_cover(&isbn, None).await?;
        state.covers.remove(cover_file).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Serve a stored cover file. Mounted at the server root, not under
/// `/api/v1`, matching the URLs the cover store resolves.
pub async fn serve_cover(
    State(state): State<AppState>,
    Path(image): Path<String>,
) -> AppResult<impl IntoResponse> {
    let (bytes, content_type) = state.covers.read(&image).await?;
    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}
