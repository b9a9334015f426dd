//! Storage layer: capability traits consumed by the handlers and their
//! Postgres implementation.
//!
//! Raw sqlx failures are classified here, once, into the domain error kinds
//! (`Duplicate`, `InvalidDependency`, `Depended`, `NotFound`,
//! `NonExistentCursor`); handlers never inspect database errors themselves.

pub mod accounts;
pub mod authors;
pub mod books;
pub mod genres;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        account::{Account, CreateAccount, UpdateAccount},
        author::AuthorPayload,
        book::BookPayload,
        genre::GenrePayload,
        Author, Book, Genre,
    },
};

/// SQLSTATE for unique constraint violations.
const SQLSTATE_UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE for foreign key violations.
const SQLSTATE_FOREIGN_KEY_VIOLATION: &str = "23503";

#[async_trait]
pub trait HealthStore: Send + Sync {
    /// Cheap connectivity check, used at startup and by the readiness probe.
    async fn ping(&self) -> AppResult<()>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create_account(
        &self,
        account: &CreateAccount,
        password_hash: &str,
    ) -> AppResult<Account>;
    async fn get_account(&self, id: Uuid) -> AppResult<Account>;
    async fn get_account_by_email(&self, email: &str) -> AppResult<Account>;
    async fn list_accounts(&self, limit: i64, after: Option<Uuid>) -> AppResult<Vec<Account>>;
    async fn update_account(&self, id: Uuid, update: &UpdateAccount) -> AppResult<Account>;
    async fn update_account_password(&self, id: Uuid, password_hash: &str) -> AppResult<()>;
    async fn delete_account(&self, id: Uuid) -> AppResult<()>;
}

#[async_trait]
pub trait GenreStore: Send + Sync {
    async fn create_genre(&self, payload: &GenrePayload) -> AppResult<Genre>;
    async fn get_genre(&self, id: Uuid) -> AppResult<Genre>;
    async fn list_genres(&self, limit: i64, after: Option<Uuid>) -> AppResult<Vec<Genre>>;
    async fn update_genre(&self, id: Uuid, payload: &GenrePayload) -> AppResult<Genre>;
    async fn delete_genre(&self, id: Uuid) -> AppResult<()>;
}

#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn create_author(&self, payload: &AuthorPayload) -> AppResult<Author>;
    async fn get_author(&self, id: Uuid) -> AppResult<Author>;
    async fn list_authors(&self, limit: i64, after: Option<Uuid>) -> AppResult<Vec<Author>>;
    async fn update_author(&self, id: Uuid, payload: &AuthorPayload) -> AppResult<Author>;
    async fn delete_author(&self, id: Uuid) -> AppResult<()>;
}

/// Filters for listing books, already normalized by the handler.
#[derive(Debug, Default, Clone)]
pub struct BookFilter {
    pub limit: i64,
    /// ISBN of the last book of the previous page.
    pub after: Option<String>,
    pub genres: Vec<Uuid>,
    pub authors: Vec<Uuid>,
    /// Title substring search.
    pub title: Option<String>,
}

#[async_trait]
pub trait BookStore: Send + Sync {
    async fn create_book(&self, isbn: &str, payload: &BookPayload) -> AppResult<Book>;
    async fn get_book(&self, isbn: &str) -> AppResult<Book>;
    async fn list_books(&self, filter: &BookFilter) -> AppResult<Vec<Book>>;
    async fn update_book(&self, isbn: &str, payload: &BookPayload) -> AppResult<Book>;
    async fn delete_book(&self, isbn: &str) -> AppResult<()>;
    async fn set_book_cover(&self, isbn: &str, cover_file: Option<&str>) -> AppResult<()>;
}

/// Everything the HTTP surface needs from storage.
pub trait Store: HealthStore + AccountStore + GenreStore + AuthorStore + BookStore {}

impl<T: HealthStore + AccountStore + GenreStore + AuthorStore + BookStore> Store for T {}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl HealthStore for PgStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Classifies an insert/update failure: unique violations become `Duplicate`
/// on the given resource, foreign key violations become `InvalidDependency`
/// named after the violated constraint. Anything else passes through.
pub(crate) fn classify_write_error(err: sqlx::Error, resource: &str) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(SQLSTATE_UNIQUE_VIOLATION) {
            return AppError::duplicate(resource);
        }
        if db.code().as_deref() == Some(SQLSTATE_FOREIGN_KEY_VIOLATION) {
            match db.constraint() {
                Some("fk_author") => return AppError::invalid_dependency("book", "author_id"),
                Some("fk_genre") => return AppError::invalid_dependency("book", "genre_id"),
                _ => {}
            }
        }
    }
    AppError::Database(err)
}

/// Classifies a delete failure: a foreign key violation while deleting means
/// the row is still referenced, which is a `Depended` conflict.
pub(crate) fn classify_delete_error(err: sqlx::Error, resource: &str) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(SQLSTATE_FOREIGN_KEY_VIOLATION) {
            return AppError::depended(resource);
        }
    }
    AppError::Database(err)
}

/// Turns a zero-rows-affected result into `NotFound` for the resource.
pub(crate) fn check_rows_affected(rows: u64, resource: &str) -> AppResult<()> {
    if rows == 0 {
        return Err(AppError::not_found(resource));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rows_is_not_found() {
        let err = check_rows_affected(0, "genre.id").unwrap_err();
        assert!(matches!(err, AppError::NotFound { resource } if resource == "genre.id"));
        assert!(check_rows_affected(1, "genre.id").is_ok());
    }

    #[test]
    fn non_database_errors_pass_through_classification() {
        let err = classify_write_error(sqlx::Error::PoolTimedOut, "genre.name");
        assert!(matches!(err, AppError::Database(_)));
        let err = classify_delete_error(sqlx::Error::PoolTimedOut, "genre");
        assert!(matches!(err, AppError::Database(_)));
    }
}
