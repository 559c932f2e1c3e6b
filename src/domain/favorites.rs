//! Favorite marks and the users that own them.

use serde::Serialize;
use time::OffsetDateTime;

/// A persisted user-to-character association.
///
/// At most one mark exists per `(user_id, character_id)` pair; the database
/// unique constraint is the final arbiter under concurrent inserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteRecord {
    pub id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "characterId")]
    pub character_id: i64,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Account row referenced by favorite marks. Account lifecycle management is
/// out of scope here; the record only exists so favorite operations can
/// reject unknown users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: OffsetDateTime,
}
