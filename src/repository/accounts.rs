//! Account storage

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    check_rows_affected, classify_delete_error, classify_write_error, AccountStore, PgStore,
};
use crate::{
    error::{AppError, AppResult},
    models::account::{Account, CreateAccount, UpdateAccount},
};

#[async_trait]
impl AccountStore for PgStore {
    async fn create_account(
        &self,
        account: &CreateAccount,
        password_hash: &str,
    ) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "INSERT INTO account (name, email, password_hash, admin)
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&account.name)
        .bind(&account.email)
        .bind(password_hash)
        .bind(account.admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify_write_error(e, "account.email"))
    }

    async fn get_account(&self, id: Uuid) -> AppResult<Account> {
        sqlx::query_as::<_, Account>("SELECT * FROM account WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("account.id"))
    }

    async fn get_account_by_email(&self, email: &str) -> AppResult<Account> {
        sqlx::query_as::<_, Account>("SELECT * FROM account WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("account.email"))
    }

    async fn list_accounts(&self, limit: i64, after: Option<Uuid>) -> AppResult<Vec<Account>> {
        let rows = match self.account_cursor(after).await? {
            Some(after_time) => {
                sqlx::query_as::<_, Account>(
                    "SELECT * FROM account WHERE created_at > $2 ORDER BY created_at LIMIT $1",
                )
                .bind(limit)
                .bind(after_time)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Account>("SELECT * FROM account ORDER BY created_at LIMIT $1")
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    async fn update_account(&self, id: Uuid, update: &UpdateAccount) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "UPDATE account
             SET name = $2, email = $3, admin = COALESCE($4, admin), updated_at = now()
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(update.admin)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify_write_error(e, "account.email"))?
        .ok_or_else(|| AppError::not_found("account.id"))
    }

    async fn update_account_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE account SET password_hash = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        check_rows_affected(result.rows_affected(), "account.id")
    }

    async fn delete_account(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM account WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify_delete_error(e, "account"))?;
        check_rows_affected(result.rows_affected(), "account.id")
    }
}

impl PgStore {
    async fn account_cursor(&self, after: Option<Uuid>) -> AppResult<Option<DateTime<Utc>>> {
        let Some(id) = after else { return Ok(None) };
        sqlx::query_scalar::<_, DateTime<Utc>>("SELECT created_at FROM account WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::nonexistent_cursor("account.id"))
            .map(Some)
    }
}
