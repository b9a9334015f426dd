//! Shared fixtures for handler and middleware tests: an in-memory store
//! standing in for Postgres, and an `AppState` wired to it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    auth::SessionManager,
    config::{
        AppConfig, AuthConfig, CatalogConfig, CoversConfig, DatabaseConfig, LoggingConfig,
        PaginationConfig, ServerConfig,
    },
    cover::CoverStore,
    error::{AppError, AppResult},
    models::{
        account::{Account, CreateAccount, UpdateAccount},
        author::AuthorPayload,
        book::BookPayload,
        genre::GenrePayload,
        Author, Book, Genre,
    },
    repository::{AccountStore, AuthorStore, BookFilter, BookStore, GenreStore, HealthStore},
    AppState,
};

/// In-memory account store. Catalog traits are stubbed out; tests that hit
/// them are in the wrong place.
#[derive(Default)]
pub(crate) struct FakeStore {
    pub accounts: RwLock<Vec<Account>>,
    /// Makes `ping` fail, to exercise the readiness path.
    pub down: AtomicBool,
}

#[async_trait]
impl HealthStore for FakeStore {
    async fn ping(&self) -> AppResult<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(AppError::Internal("store unreachable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for FakeStore {
    async fn create_account(
        &self,
        account: &CreateAccount,
        password_hash: &str,
    ) -> AppResult<Account> {
        let mut accounts = self.accounts.write().unwrap();
        if accounts.iter().any(|a| a.email == account.email) {
            return Err(AppError::duplicate("account.email"));
        }
        let now = Utc::now();
        let created = Account {
            id: Uuid::new_v4(),
            name: account.name.clone(),
            email: account.email.clone(),
            admin: account.admin,
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        accounts.push(created.clone());
        Ok(created)
    }

    async fn get_account(&self, id: Uuid) -> AppResult<Account> {
        self.accounts
            .read()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("account.id"))
    }

    async fn get_account_by_email(&self, email: &str) -> AppResult<Account> {
        self.accounts
            .read()
            .unwrap()
            .iter()
            .find(|a| a.email == email)
            .cloned()
            .ok_or_else(|| AppError::not_found("account.email"))
    }

    async fn list_accounts(&self, limit: i64, _after: Option<Uuid>) -> AppResult<Vec<Account>> {
        Ok(self
            .accounts
            .read()
            .unwrap()
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn update_account(&self, id: Uuid, update: &UpdateAccount) -> AppResult<Account> {
        let mut accounts = self.accounts.write().unwrap();
        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::not_found("account.id"))?;
        account.name = update.name.clone();
        account.email = update.email.clone();
        if let Some(admin) = update.admin {
            account.admin = admin;
        }
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn update_account_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        let mut accounts = self.accounts.write().unwrap();
        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::not_found("account.id"))?;
        account.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn delete_account(&self, id: Uuid) -> AppResult<()> {
        let mut accounts = self.accounts.write().unwrap();
        let before = accounts.len();
        accounts.retain(|a| a.id != id);
        if accounts.len() == before {
            return Err(AppError::not_found("account.id"));
        }
        Ok(())
    }
}

#[async_trait]
impl GenreStore for FakeStore {
    async fn create_genre(&self, _payload: &GenrePayload) -> AppResult<Genre> {
        unimplemented!()
    }
    async fn get_genre(&self, _id: Uuid) -> AppResult<Genre> {
        unimplemented!()
    }
    async fn list_genres(&self, _limit: i64, _after: Option<Uuid>) -> AppResult<Vec<Genre>> {
        unimplemented!()
    }
    async fn update_genre(&self, _id: Uuid, _payload: &GenrePayload) -> AppResult<Genre> {
        unimplemented!()
    }
    async fn delete_genre(&self, _id: Uuid) -> AppResult<()> {
        unimplemented!()
    }
}

#[async_trait]
impl AuthorStore for FakeStore {
    async fn create_author(&self, _payload: &AuthorPayload) -> AppResult<Author> {
        unimplemented!()
    }
    async fn get_author(&self, _id: Uuid) -> AppResult<Author> {
        unimplemented!()
    }
    async fn list_authors(&self, _limit: i64, _after: Option<Uuid>) -> AppResult<Vec<Author>> {
        unimplemented!()
    }
    async fn update_author(&self, _id: Uuid, _payload: &AuthorPayload) -> AppResult<Author> {
        unimplemented!()
    }
    async fn delete_author(&self, _id: Uuid) -> AppResult<()> {
        unimplemented!()
    }
}

#[async_trait]
impl BookStore for FakeStore {
    async fn create_book(&self, _isbn: &str, _payload: &BookPayload) -> AppResult<Book> {
        unimplemented!()
    }
    async fn get_book(&self, _isbn: &str) -> AppResult<Book> {
        unimplemented!()
    }
    async fn list_books(&self, _filter: &BookFilter) -> AppResult<Vec<Book>> {
        unimplemented!()
    }
    async fn update_book(&self, _isbn: &str, _payload: &BookPayload) -> AppResult<Book> {
        unimplemented!()
    }
    async fn delete_book(&self, _isbn: &str) -> AppResult<()> {
        unimplemented!()
    }
    async fn set_book_cover(&self, _isbn: &str, _cover_file: Option<&str>) -> AppResult<()> {
        unimplemented!()
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig::default(),
        database: DatabaseConfig::default(),
        auth: AuthConfig {
            session_ttl_hours: 0,
            hash_memory_kib: 8,
            hash_iterations: 1,
            hash_parallelism: 1,
        },
        logging: LoggingConfig::default(),
        covers: CoversConfig {
            dir: std::env::temp_dir()
                .join(format!("covers-test-{}", Uuid::new_v4()))
                .to_string_lossy()
                .into_owned(),
            public_url: "http://localhost:8080/covers/".to_string(),
        },
        pagination: PaginationConfig::default(),
        catalog: CatalogConfig::default(),
    }
}

pub(crate) async fn test_state_with(store: Arc<FakeStore>) -> AppState {
    let config = test_config();
    let auth = SessionManager::new(&config.auth).unwrap();
    let covers = CoverStore::new(&config.covers).await.unwrap();
    AppState {
        config: Arc::new(config),
        store,
        auth: Arc::new(auth),
        covers: Arc::new(covers),
    }
}

pub(crate) async fn test_state() -> AppState {
    test_state_with(Arc::new(FakeStore::default())).await
}

pub(crate) fn test_account(admin: bool) -> Account {
    let id = Uuid::new_v4();
    let now = Utc::now();
    Account {
        id,
        name: "Test Account".to_string(),
        email: format!("{id}@example.com"),
        admin,
        password_hash: String::new(),
        created_at: now,
        updated_at: now,
    }
}
