//! Book endpoints
//!
//! Books are keyed by ISBN-13. Creation accepts ISBN-10 or ISBN-13 and
//! normalizes to 13 digits; the checksum is verified unless
//! `catalog.ignore_invalid_isbn` is set.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::Query;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookListQuery, BookPayload, BookResponse},
        Book,
    },
    repository::BookFilter,
    AppState,
};

use super::page_limit;

fn book_response(state: &AppState, book: Book) -> BookResponse {
    let cover_url = state.covers.resolve(book.cover_file.as_deref());
    BookResponse { book, cover_url }
}

/// List books, with optional genre/author/title filters.
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookListQuery),
    responses(
        (status = 200, description = "List of books", body = [BookResponse]),
        (status = 404, description = "after cursor references a nonexistent ISBN")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookListQuery>,
) -> AppResult<Json<Vec<BookResponse>>> {
    let filter = BookFilter {
        limit: page_limit(&state.config.pagination, query.limit)?,
        after: query.after,
        genres: query.genre,
        authors: query.author,
        title: query.name,
    };
    let books = state.store.list_books(&filter).await?;
    let books = books.into_iter().map(|b| book_response(&state, b)).collect();
    Ok(Json(books))
}

/// Get a book by ISBN.
#[utoipa::path(
    get,
    path = "/books/{isbn}",
    tag = "books",
    params(("isbn" = String, Path, description = "ISBN-13")),
    responses(
        (status = 200, description = "Book", body = BookResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<BookResponse>> {
    let isbn = require_isbn13(&isbn)?;
    let book = state.store.get_book(&isbn).await?;
    Ok(Json(book_response(&state, book)))
}

/// Create a book under the given ISBN (admin).
#[utoipa::path(
    post,
    path = "/books/{isbn}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("isbn" = String, Path, description = "ISBN-10 or ISBN-13")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book created", body = BookResponse),
        (status = 400, description = "Invalid ISBN, duplicate, or unknown author/genre")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
    Json(payload): Json<BookPayload>,
) -> AppResult<Json<BookResponse>> {
    payload.validate().map_err(|e| AppError::validation(e.to_string()))?;
    let isbn = normalize_isbn(&isbn, state.config.catalog.ignore_invalid_isbn)?;
    let book = state.store.create_book(&isbn, &payload).await?;
    Ok(Json(book_response(&state, book)))
}

/// Update a book (admin).
#[utoipa::path(
    put,
    path = "/books/{isbn}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("isbn" = String, Path, description = "ISBN-13")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
    Json(payload): Json<BookPayload>,
) -> AppResult<Json<BookResponse>> {
    payload.validate().map_err(|e| AppError::validation(e.to_string()))?;
    let isbn = require_isbn13(&isbn)?;
    let book = state.store.update_book(&isbn, &payload).await?;
    Ok(Json(book_response(&state, book)))
}

/// Delete a book and its stored cover (admin).
#[utoipa::path(
    delete,
    path = "/books/{isbn}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("isbn" = String, Path, description = "ISBN-13")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> AppResult<StatusCode> {
    let isbn = require_isbn13(&isbn)?;
    let book = state.store.get_book(&isbn).await?;
    state.store.delete_book(&isbn).await?;
    if let Some(cover_file) = book.cover_file.as_deref() {
        state.covers.remove(cover_file).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Requires a 13-digit ISBN for lookups; anything 13 digits long passes.
pub(crate) fn require_isbn13(isbn: &str) -> AppResult<String> {
    if isbn.len() == 13 && isbn.bytes().all(|b| b.is_ascii_digit()) {
        Ok(isbn.to_string())
    } else {
        Err(AppError::validation("invalid ISBN provided"))
    }
}

/// Normalizes an ISBN-10 or ISBN-13 to ISBN-13, verifying the checksum
/// unless told to ignore it.
pub(crate) fn normalize_isbn(isbn: &str, ignore_checksum: bool) -> AppResult<String> {
    match isbn.len() {
        10 => {
            if !ignore_checksum && !valid_isbn10(isbn) {
                return Err(AppError::validation("invalid ISBN provided"));
            }
            isbn10_to_13(isbn)
        }
        13 => {
            if !isbn.bytes().all(|b| b.is_ascii_digit()) {
                return Err(AppError::validation("invalid ISBN provided"));
            }
            if !ignore_checksum && !valid_isbn13(isbn) {
                return Err(AppError::validation("invalid ISBN provided"));
            }
            Ok(isbn.to_string())
        }
        len => Err(AppError::validation(format!(
            "invalid ISBN provided(length={len}), should be 10 or 13"
        ))),
    }
}

fn isbn10_digit(b: u8, last: bool) -> Option<u32> {
    match b {
        b'0'..=b'9' => Some((b - b'0') as u32),
        b'X' | b'x' if last => Some(10),
        _ => None,
    }
}

fn valid_isbn10(isbn: &str) -> bool {
    let bytes = isbn.as_bytes();
    if bytes.len() != 10 {
        return false;
    }
    let mut sum = 0u32;
    for (i, &b) in bytes.iter().enumerate() {
        let Some(digit) = isbn10_digit(b, i == 9) else { return false };
        sum += (i as u32 + 1) * digit;
    }
    sum % 11 == 0
}

fn valid_isbn13(isbn: &str) -> bool {
    let bytes = isbn.as_bytes();
    if bytes.len() != 13 || !bytes.iter().all(|b| b.is_ascii_digit()) {
        return false;
    }
    isbn13_check_digit(&isbn[..12]) == (bytes[12] - b'0') as u32
}

fn isbn13_check_digit(first12: &str) -> u32 {
    let sum: u32 = first12
        .bytes()
        .enumerate()
        .map(|(i, b)| (b - b'0') as u32 * if i % 2 == 0 { 1 } else { 3 })
        .sum();
    (10 - sum % 10) % 10
}

fn isbn10_to_13(isbn10: &str) -> AppResult<String> {
    if !isbn10.as_bytes()[..9].iter().all(|b| b.is_ascii_digit()) {
        return Err(AppError::validation("invalid ISBN provided"));
    }
    let first12 = format!("978{}", &isbn10[..9]);
    let check = isbn13_check_digit(&first12);
    Ok(format!("{first12}{check}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_isbn13() {
        assert_eq!(
            normalize_isbn("9780306406157", false).unwrap(),
            "9780306406157"
        );
    }

    #[test]
    fn rejects_bad_isbn13_checksum_unless_ignored() {
        assert!(normalize_isbn("9780306406158", false).is_err());
        assert_eq!(
            normalize_isbn("9780306406158", true).unwrap(),
            "9780306406158"
        );
    }

    #[test]
    fn converts_isbn10_to_13() {
        assert_eq!(
            normalize_isbn("0306406152", false).unwrap(),
            "9780306406157"
        );
        // X check digit
        assert_eq!(
            normalize_isbn("043942089X", false).unwrap(),
            "9780439420891"
        );
    }

    #[test]
    fn rejects_bad_isbn10_checksum() {
        assert!(normalize_isbn("0306406153", false).is_err());
    }

    #[test]
    fn rejects_wrong_lengths_and_non_digits() {
        assert!(normalize_isbn("12345", false).is_err());
        assert!(normalize_isbn("978030640615X", false).is_err());
        assert!(normalize_isbn("", false).is_err());
    }

    #[test]
    fn lookup_key_must_be_13_digits() {
        assert!(require_isbn13("9780306406157").is_ok());
        assert!(require_isbn13("0306406152").is_err());
        assert!(require_isbn13("978030640615x").is_err());
    }

    #[tokio::test]
    async fn repeated_genre_and_author_params_deserialize() {
        use axum::extract::FromRequestParts;
        use uuid::Uuid;

        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let request = axum::http::Request::builder()
            .uri(format!("/books?genre={a}&genre={b}&author={a}&name=dune"))
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let Query(query) = Query::<BookListQuery>::from_request_parts(&mut parts, &())
            .await
            .unwrap();

        assert_eq!(query.genre, vec![a, b]);
        assert_eq!(query.author, vec![a]);
        assert_eq!(query.name.as_deref(), Some("dune"));
    }

    #[tokio::test]
    async fn absent_filters_deserialize_to_empty_lists() {
        use axum::extract::FromRequestParts;

        let request = axum::http::Request::builder()
            .uri("/books?limit=5")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let Query(query) = Query::<BookListQuery>::from_request_parts(&mut parts, &())
            .await
            .unwrap();

        assert!(query.genre.is_empty());
        assert!(query.author.is_empty());
        assert_eq!(query.limit, Some(5));
    }
}
