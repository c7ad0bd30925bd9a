use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,                      // server-generated, immutable
    pub email: String,                // unique login identifier, stored as given
    #[serde(skip_serializing)]
    pub password_hash: String,        // Argon2 hash, not exposed in JSON
    pub name: Option<String>,         // display label
    pub avatar: Option<String>,       // profile picture URL
    pub created_at: OffsetDateTime,   // creation timestamp
}

/// Fields the caller supplies when creating a user; id and created_at come from the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
}
