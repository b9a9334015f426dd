//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// A catalog entry, keyed by normalized ISBN-13.
///
/// `cover_file` is the on-disk filename managed by the cover store; responses
/// expose a resolved `cover_url` instead (see [`BookResponse`]).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Book {
    pub isbn: String,
    pub title: String,
    pub author_id: Uuid,
    pub genre_id: Uuid,
    pub publish_year: i32,
    pub fiction: bool,
    #[serde(skip_serializing)]
    pub cover_file: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A book as rendered to clients, with the cover filename resolved to a
/// public URL.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookResponse {
    #[serde(flatten)]
    pub book: Book,
    pub cover_url: Option<String>,
}

/// Payload for book creation and updates. The ISBN comes from the URL.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BookPayload {
    #[validate(length(min = 1, max = 512))]
    pub title: String,
    pub author_id: Uuid,
    pub genre_id: Uuid,
    #[validate(range(min = 0, max = 3000))]
    pub publish_year: i32,
    #[serde(default)]
    pub fiction: bool,
}

/// Query parameters for listing books.
///
/// `genre` and `author` may be repeated to filter on several ids.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BookListQuery {
    pub limit: Option<i64>,
    /// ISBN of the last book of the previous page.
    pub after: Option<String>,
    #[serde(default)]
    pub genre: Vec<Uuid>,
    #[serde(default)]
    pub author: Vec<Uuid>,
    /// Title substring search.
    pub name: Option<String>,
}
