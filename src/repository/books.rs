//! Book storage

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::QueryBuilder;

use super::{
    check_rows_affected, classify_delete_error, classify_write_error, BookFilter, BookStore,
    PgStore,
};
use crate::{
    error::{AppError, AppResult},
    models::{book::BookPayload, Book},
};

#[async_trait]
impl BookStore for PgStore {
    async fn create_book(&self, isbn: &str, payload: &BookPayload) -> AppResult<Book> {
        if isbn.is_empty() {
            return Err(AppError::MissingId);
        }
        sqlx::query_as::<_, Book>(
            "INSERT INTO book (isbn, title, author_id, genre_id, publish_year, fiction)
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(isbn)
        .bind(&payload.title)
        .bind(payload.author_id)
        .bind(payload.genre_id)
        .bind(payload.publish_year)
        .bind(payload.fiction)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_write_error(e, "book.isbn"))
    }

    async fn get_book(&self, isbn: &str) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM book WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("book.isbn"))
    }

    async fn list_books(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let after_time = self.book_cursor(filter.after.as_deref()).await?;

        let mut query = QueryBuilder::new("SELECT * FROM book WHERE TRUE");
        if let Some(after_time) = after_time {
            query.push(" AND created_at > ").push_bind(after_time);
        }
        if !filter.genres.is_empty() {
            query.push(" AND genre_id = ANY(").push_bind(filter.genres.clone()).push(")");
        }
        if !filter.authors.is_empty() {
            query.push(" AND author_id = ANY(").push_bind(filter.authors.clone()).push(")");
        }
        if let Some(title) = &filter.title {
            query.push(" AND title ILIKE ").push_bind(format!("%{}%", title));
        }
        query.push(" ORDER BY created_at LIMIT ").push_bind(filter.limit);

        let books = query.build_query_as::<Book>().fetch_all(&self.pool).await?;
        Ok(books)
    }

    async fn update_book(&self, isbn: &str, payload: &BookPayload) -> AppResult<Book> {
        if isbn.is_empty() {
            return Err(AppError::MissingId);
        }
        sqlx::query_as::<_, Book>(
            "UPDATE book
             SET title = $2, author_id = $3, genre_id = $4, publish_year = $5,
                 fiction = $6, updated_at = now()
             WHERE isbn = $1 RETURNING *",
        )
        .bind(isbn)
        .bind(&payload.title)
        .bind(payload.author_id)
        .bind(payload.genre_id)
        .bind(payload.publish_year)
        .bind(payload.fiction)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify_write_error(e, "book.isbn"))?
        .ok_or_else(|| AppError::not_found("book.isbn"))
    }

    async fn delete_book(&self, isbn: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book WHERE isbn = $1")
            .bind(isbn)
            .execute(&self.pool)
            .await
            .map_err(|e| classify_delete_error(e, "book"))?;
        check_rows_affected(result.rows_affected(), "book.isbn")
    }

    async fn set_book_cover(&self, isbn: &str, cover_file: Option<&str>) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE book SET cover_file = $2, updated_at = now() WHERE isbn = $1",
        )
        .bind(isbn)
        .bind(cover_file)
        .execute(&self.pool)
        .await?;
        check_rows_affected(result.rows_affected(), "book.isbn")
    }
}

impl PgStore {
    /// Resolves the ISBN cursor to the creation time of the referenced book.
    /// A cursor pointing at a since-deleted ISBN is reported as
    /// `NonExistentCursor` rather than producing an empty or garbled page.
    async fn book_cursor(&self, after: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
        let Some(isbn) = after else { return Ok(None) };
        sqlx::query_scalar::<_, DateTime<Utc>>("SELECT created_at FROM book WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::nonexistent_cursor("book.isbn"))
            .map(Some)
    }
}
