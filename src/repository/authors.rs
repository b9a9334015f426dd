//! Author storage

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    check_rows_affected, classify_delete_error, classify_write_error, AuthorStore, PgStore,
};
use crate::{
    error::{AppError, AppResult},
    models::{author::AuthorPayload, Author},
};

#[async_trait]
impl AuthorStore for PgStore {
    async fn create_author(&self, payload: &AuthorPayload) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            "INSERT INTO author (name) VALUES ($1) RETURNING *",
        )
        .bind(&payload.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_write_error(e, "author.name"))
    }

    async fn get_author(&self, id: Uuid) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT * FROM author WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("author.id"))
    }

    async fn list_authors(&self, limit: i64, after: Option<Uuid>) -> AppResult<Vec<Author>> {
        let rows = match self.author_cursor(after).await? {
            Some(after_time) => {
                sqlx::query_as::<_, Author>(
                    "SELECT * FROM author WHERE created_at > $2 ORDER BY created_at LIMIT $1",
                )
                .bind(limit)
                .bind(after_time)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Author>("SELECT * FROM author ORDER BY created_at LIMIT $1")
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    async fn update_author(&self, id: Uuid, payload: &AuthorPayload) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            "UPDATE author SET name = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&payload.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify_write_error(e, "author.name"))?
        .ok_or_else(|| AppError::not_found("author.id"))
    }

    async fn delete_author(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM author WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify_delete_error(e, "author"))?;
        check_rows_affected(result.rows_affected(), "author.id")
    }
}

impl PgStore {
    async fn author_cursor(&self, after: Option<Uuid>) -> AppResult<Option<DateTime<Utc>>> {
        let Some(id) = after else { return Ok(None) };
        sqlx::query_scalar::<_, DateTime<Utc>>("SELECT created_at FROM author WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::nonexistent_cursor("author.id"))
            .map(Some)
    }
}
