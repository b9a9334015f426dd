//! Credential and session management
//!
//! Owns the in-memory token table mapping opaque bearer tokens to the
//! account snapshot captured at login. All synchronization is internal;
//! password hashing is CPU-bound and never runs while the table lock is
//! held.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{Account, Session},
};

/// Token length in characters. Alphanumeric at this length carries ~190 bits
/// of entropy, well past the 128-bit floor for collision resistance.
const TOKEN_LEN: usize = 32;

pub struct SessionManager {
    sessions: RwLock<HashMap<String, Session>>,
    argon2: Argon2<'static>,
    /// None disables expiry.
    ttl: Option<Duration>,
}

impl SessionManager {
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        let params = Params::new(
            config.hash_memory_kib,
            config.hash_iterations,
            config.hash_parallelism,
            None,
        )
        .map_err(|e| AppError::Hashing(e.to_string()))?;

        let ttl = match config.session_ttl_hours {
            0 => None,
            hours => Some(Duration::hours(hours as i64)),
        };

        Ok(Self {
            sessions: RwLock::new(HashMap::new()),
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            ttl,
        })
    }

    /// Hashes a plaintext password with a fresh salt.
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored hash.
    ///
    /// A mismatch is `Ok(false)`; only a malformed hash is an error.
    pub fn verify_password(&self, hash: &str, password: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| AppError::Hashing(e.to_string()))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::Hashing(e.to_string())),
        }
    }

    /// Issues a new token mapped to a snapshot of the given account.
    pub fn create_session(&self, account: Account) -> String {
        let mut sessions = write_lock(&self.sessions);
        // vacant in all but astronomically unlikely collisions
        let token = loop {
            let candidate = generate_token();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        sessions.insert(
            token.clone(),
            Session { account, created_at: Utc::now() },
        );
        token
    }

    /// Resolves a token to its session, treating expired entries as absent.
    pub fn get_session(&self, token: &str) -> Option<Session> {
        {
            let sessions = read_lock(&self.sessions);
            match sessions.get(token) {
                None => return None,
                Some(session) if !self.is_expired(session) => return Some(session.clone()),
                Some(_) => {}
            }
        }
        // expired: prune it so the table does not grow unbounded
        write_lock(&self.sessions).remove(token);
        None
    }

    /// Removes a single token. Removing an absent token is not an error.
    pub fn delete_session(&self, token: &str) {
        write_lock(&self.sessions).remove(token);
    }

    /// Removes every session belonging to the given account. Runs under one
    /// write-lock acquisition, so no session for the account is observable
    /// as valid once this returns.
    pub fn delete_sessions_for(&self, account_id: Uuid) {
        write_lock(&self.sessions).retain(|_, session| session.account.id != account_id);
    }

    fn is_expired(&self, session: &Session) -> bool {
        match self.ttl {
            Some(ttl) => session.created_at + ttl < Utc::now(),
            None => false,
        }
    }
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

// Lock poisoning only happens if a holder panicked mid-operation; the map is
// still structurally sound, so recover the guard instead of propagating the
// panic to every request.
fn read_lock<'a>(
    lock: &'a RwLock<HashMap<String, Session>>,
) -> RwLockReadGuard<'a, HashMap<String, Session>> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<'a>(
    lock: &'a RwLock<HashMap<String, Session>>,
) -> RwLockWriteGuard<'a, HashMap<String, Session>> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
