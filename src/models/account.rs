//! Account model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A staff or customer account.
///
/// The password hash never leaves the server: it is skipped during
/// serialization so no response can ever carry it.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub admin: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An authenticated browsing context: the account snapshot captured at login
/// plus the creation instant used for expiry checks.
#[derive(Debug, Clone)]
pub struct Session {
    pub account: Account,
    pub created_at: DateTime<Utc>,
}

/// Payload for account creation (signup and admin user creation).
///
/// The `admin` flag is only honored on the admin endpoint; signup forces it
/// to false.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAccount {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 512))]
    pub password: String,
    #[serde(default)]
    pub admin: bool,
}

/// Payload for account updates. Password changes go through the dedicated
/// password endpoints.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAccount {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    /// Honored only on the admin endpoint.
    pub admin: Option<bool>,
}

/// Self-service password change, requires the current password.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePassword {
    pub old_password: String,
    #[validate(length(min = 8, max = 512))]
    pub new_password: String,
}

/// Admin-set password, no old-password check.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetPassword {
    #[validate(length(min = 8, max = 512))]
    pub password: String,
}

/// Login credentials.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSession {
    pub email: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionCreated {
    pub token: String,
    pub account: Account,
}
