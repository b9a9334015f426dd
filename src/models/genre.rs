//! Genre model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for genre creation and updates.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenrePayload {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}
