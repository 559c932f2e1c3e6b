//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::favorites::{FavoriteRecord, UserRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Persistence surface for favorite marks.
///
/// The `(user_id, character_id)` pair is unique at the storage level; insert
/// surfaces a violation as [`RepoError::Duplicate`] so callers can translate
/// races into a conflict rather than locking.
#[async_trait]
pub trait FavoritesRepo: Send + Sync {
    /// Favorite character ids for a user, oldest mark first.
    async fn list_ids_for_user(&self, user_id: i64) -> Result<Vec<i64>, RepoError>;

    /// Full favorite marks for a user, newest first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<FavoriteRecord>, RepoError>;

    async fn find(
        &self,
        user_id: i64,
        character_id: i64,
    ) -> Result<Option<FavoriteRecord>, RepoError>;

    async fn exists(&self, user_id: i64, character_id: i64) -> Result<bool, RepoError>;

    async fn insert(&self, user_id: i64, character_id: i64) -> Result<FavoriteRecord, RepoError>;

    /// Returns whether a mark was actually removed.
    async fn delete(&self, user_id: i64, character_id: i64) -> Result<bool, RepoError>;

    async fn count_for_user(&self, user_id: i64) -> Result<u64, RepoError>;

    async fn delete_all_for_user(&self, user_id: i64) -> Result<(), RepoError>;

    /// Marks a user holds among the given character ids.
    async fn find_for_character_ids(
        &self,
        user_id: i64,
        character_ids: &[i64],
    ) -> Result<Vec<FavoriteRecord>, RepoError>;
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepoError>;
}
