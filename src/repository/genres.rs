//! Genre storage

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{check_rows_affected, classify_delete_error, classify_write_error, GenreStore, PgStore};
use crate::{
    error::{AppError, AppResult},
    models::{genre::GenrePayload, Genre},
};

#[async_trait]
impl GenreStore for PgStore {
    async fn create_genre(&self, payload: &GenrePayload) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>(
            "INSERT INTO genre (name) VALUES ($1) RETURNING *",
        )
        .bind(&payload.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_write_error(e, "genre.name"))
    }

    async fn get_genre(&self, id: Uuid) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>("SELECT * FROM genre WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("genre.id"))
    }

    async fn list_genres(&self, limit: i64, after: Option<Uuid>) -> AppResult<Vec<Genre>> {
        let rows = match self.genre_cursor(after).await? {
            Some(after_time) => {
                sqlx::query_as::<_, Genre>(
                    "SELECT * FROM genre WHERE created_at > $2 ORDER BY created_at LIMIT $1",
                )
                .bind(limit)
                .bind(after_time)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Genre>("SELECT * FROM genre ORDER BY created_at LIMIT $1")
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    async fn update_genre(&self, id: Uuid, payload: &GenrePayload) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>(
            "UPDATE genre SET name = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&payload.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify_write_error(e, "genre.name"))?
        .ok_or_else(|| AppError::not_found("genre.id"))
    }

    async fn delete_genre(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM genre WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify_delete_error(e, "genre"))?;
        check_rows_affected(result.rows_affected(), "genre.id")
    }
}

impl PgStore {
    /// Resolves the pagination cursor to the creation time of the referenced
    /// genre, or `NonExistentCursor` if that row is gone.
    async fn genre_cursor(&self, after: Option<Uuid>) -> AppResult<Option<DateTime<Utc>>> {
        let Some(id) = after else { return Ok(None) };
        sqlx::query_scalar::<_, DateTime<Utc>>("SELECT created_at FROM genre WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::nonexistent_cursor("genre.id"))
            .map(Some)
    }
}
