use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::application::repos::{FavoritesRepo, RepoError};
use crate::domain::favorites::FavoriteRecord;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(FromRow)]
struct FavoriteRow {
    id: i64,
    user_id: i64,
    character_id: i64,
    created_at: OffsetDateTime,
}

impl From<FavoriteRow> for FavoriteRecord {
    fn from(row: FavoriteRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            character_id: row.character_id,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl FavoritesRepo for PostgresRepositories {
    async fn list_ids_for_user(&self, user_id: i64) -> Result<Vec<i64>, RepoError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT character_id FROM favorites WHERE user_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<FavoriteRecord>, RepoError> {
        let rows = sqlx::query_as::<_, FavoriteRow>(
            "SELECT id, user_id, character_id, created_at \
             FROM favorites WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find(
        &self,
        user_id: i64,
        character_id: i64,
    ) -> Result<Option<FavoriteRecord>, RepoError> {
        let row = sqlx::query_as::<_, FavoriteRow>(
            "SELECT id, user_id, character_id, created_at \
             FROM favorites WHERE user_id = $1 AND character_id = $2",
        )
        .bind(user_id)
        .bind(character_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn exists(&self, user_id: i64, character_id: i64) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE user_id = $1 AND character_id = $2)",
        )
        .bind(user_id)
        .bind(character_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn insert(&self, user_id: i64, character_id: i64) -> Result<FavoriteRecord, RepoError> {
        let row = sqlx::query_as::<_, FavoriteRow>(
            "INSERT INTO favorites (user_id, character_id) VALUES ($1, $2) \
             RETURNING id, user_id, character_id, created_at",
        )
        .bind(user_id)
        .bind(character_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete(&self, user_id: i64, character_id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND character_id = $2")
            .bind(user_id)
            .bind(character_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_for_user(&self, user_id: i64) -> Result<u64, RepoError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM favorites WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        count
            .try_into()
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
    }

    async fn delete_all_for_user(&self, user_id: i64) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM favorites WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_for_character_ids(
        &self,
        user_id: i64,
        character_ids: &[i64],
    ) -> Result<Vec<FavoriteRecord>, RepoError> {
        if character_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, FavoriteRow>(
            "SELECT id, user_id, character_id, created_at \
             FROM favorites WHERE user_id = $1 AND character_id = ANY($2)",
        )
        .bind(user_id)
        .bind(character_ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
