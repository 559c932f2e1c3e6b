//! Character aggregation: favorite merging, page-local sort and search, and
//! favorite mutations.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::gateway::{CharacterGateway, GatewayError};
use crate::application::repos::{FavoritesRepo, RepoError, UsersRepo};
use crate::domain::characters::{
    CharacterFilter, CharacterRecord, EnrichedCharacter, EnrichedPage, SortField, SortOrder,
};
use crate::domain::favorites::FavoriteRecord;

#[derive(Debug, Error)]
pub enum CharacterServiceError {
    #[error("user {0} not found")]
    UserNotFound(i64),
    #[error("favorite mark not found")]
    FavoriteNotFound,
    #[error("character is already a favorite")]
    AlreadyFavorite,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Presentation-side refinements applied to an already-fetched page.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    pub search: Option<String>,
}

/// Outcome of a favorite toggle.
#[derive(Debug, Clone)]
pub enum FavoriteToggle {
    Added(FavoriteRecord),
    Removed,
}

/// Merges gateway results with the favorites store.
#[derive(Clone)]
pub struct CharacterService {
    gateway: Arc<CharacterGateway>,
    favorites: Arc<dyn FavoritesRepo>,
    users: Arc<dyn UsersRepo>,
}

impl CharacterService {
    pub fn new(
        gateway: Arc<CharacterGateway>,
        favorites: Arc<dyn FavoritesRepo>,
        users: Arc<dyn UsersRepo>,
    ) -> Self {
        Self {
            gateway,
            favorites,
            users,
        }
    }

    /// One page of characters, each annotated with the user's favorite
    /// status, optionally sorted and narrowed by a search term.
    ///
    /// Sort and search operate on the fetched page only; `info` keeps the
    /// upstream pagination metadata either way.
    pub async fn list(
        &self,
        user_id: i64,
        filter: &CharacterFilter,
        options: &ListOptions,
    ) -> Result<EnrichedPage, CharacterServiceError> {
        let page = self.gateway.fetch_page(filter).await?;

        self.ensure_user(user_id).await?;
        let favorite_ids: HashSet<i64> = self
            .favorites
            .list_ids_for_user(user_id)
            .await?
            .into_iter()
            .collect();

        let mut results: Vec<EnrichedCharacter> = page
            .results
            .into_iter()
            .map(|character| EnrichedCharacter {
                is_favorite: favorite_ids.contains(&character.id),
                character,
            })
            .collect();

        if let Some(field) = options.sort_by {
            let order = options.sort_order.unwrap_or_default();
            sort_characters(&mut results, field, order);
        }

        if let Some(term) = options.search.as_deref() {
            let needle = term.to_lowercase();
            results.retain(|entry| matches_search(&entry.character, &needle));
        }

        Ok(EnrichedPage {
            info: page.info,
            results,
        })
    }

    /// A single character with the user's favorite status attached via a
    /// direct existence check.
    pub async fn one(
        &self,
        user_id: i64,
        character_id: i64,
    ) -> Result<EnrichedCharacter, CharacterServiceError> {
        let character = self.gateway.fetch_one(character_id).await?;
        let is_favorite = self.favorites.exists(user_id, character_id).await?;

        Ok(EnrichedCharacter {
            character,
            is_favorite,
        })
    }

    /// Delegates to [`Self::list`] with the term as an upstream name filter.
    pub async fn search(
        &self,
        user_id: i64,
        term: &str,
        page: Option<u32>,
    ) -> Result<EnrichedPage, CharacterServiceError> {
        let filter = CharacterFilter {
            page,
            name: Some(term.to_string()),
            ..Default::default()
        };
        self.list(user_id, &filter, &ListOptions::default()).await
    }

    /// Every character the user has favorited, each marked favorite by
    /// construction. Zero favorites short-circuits without an upstream call.
    pub async fn favorites_view(
        &self,
        user_id: i64,
    ) -> Result<Vec<EnrichedCharacter>, CharacterServiceError> {
        self.ensure_user(user_id).await?;
        let ids = self.favorites.list_ids_for_user(user_id).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.gateway.fetch_many(&ids).await;
        Ok(records
            .into_iter()
            .map(|character| EnrichedCharacter {
                character,
                is_favorite: true,
            })
            .collect())
    }

    /// Mark a character as a favorite after confirming it exists upstream.
    pub async fn add_favorite(
        &self,
        user_id: i64,
        character_id: i64,
    ) -> Result<FavoriteRecord, CharacterServiceError> {
        self.ensure_user(user_id).await?;
        // Surfaces GatewayError::NotFound for ids the upstream has never heard of.
        self.gateway.fetch_one(character_id).await?;

        if self.favorites.exists(user_id, character_id).await? {
            return Err(CharacterServiceError::AlreadyFavorite);
        }

        let record = match self.favorites.insert(user_id, character_id).await {
            Ok(record) => record,
            // Lost a pre-check race; the unique constraint is the arbiter.
            Err(RepoError::Duplicate { .. }) => {
                return Err(CharacterServiceError::AlreadyFavorite);
            }
            Err(err) => return Err(err.into()),
        };

        info!(
            target: "mortydex::favorites",
            user_id,
            character_id,
            "favorite added"
        );
        Ok(record)
    }

    /// Remove a favorite mark; absent marks are a `FavoriteNotFound`.
    pub async fn remove_favorite(
        &self,
        user_id: i64,
        character_id: i64,
    ) -> Result<(), CharacterServiceError> {
        self.ensure_user(user_id).await?;

        let deleted = self.favorites.delete(user_id, character_id).await?;
        if !deleted {
            return Err(CharacterServiceError::FavoriteNotFound);
        }

        info!(
            target: "mortydex::favorites",
            user_id,
            character_id,
            "favorite removed"
        );
        Ok(())
    }

    /// Flip the favorite state of a character for the user.
    pub async fn toggle_favorite(
        &self,
        user_id: i64,
        character_id: i64,
    ) -> Result<FavoriteToggle, CharacterServiceError> {
        if self.favorites.exists(user_id, character_id).await? {
            self.remove_favorite(user_id, character_id).await?;
            Ok(FavoriteToggle::Removed)
        } else {
            let record = self.add_favorite(user_id, character_id).await?;
            Ok(FavoriteToggle::Added(record))
        }
    }

    pub async fn favorite_count(&self, user_id: i64) -> Result<u64, CharacterServiceError> {
        self.ensure_user(user_id).await?;
        Ok(self.favorites.count_for_user(user_id).await?)
    }

    /// Drop every favorite mark the user holds.
    pub async fn clear_favorites(&self, user_id: i64) -> Result<(), CharacterServiceError> {
        self.ensure_user(user_id).await?;
        self.favorites.delete_all_for_user(user_id).await?;
        info!(target: "mortydex::favorites", user_id, "favorites cleared");
        Ok(())
    }

    async fn ensure_user(&self, user_id: i64) -> Result<(), CharacterServiceError> {
        match self.users.find_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(CharacterServiceError::UserNotFound(user_id)),
        }
    }
}

fn sort_characters(results: &mut [EnrichedCharacter], field: SortField, order: SortOrder) {
    // sort_by is stable, so equal keys keep their upstream order.
    results.sort_by(|a, b| {
        let ordering = compare_field(&a.character, &b.character, field);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn compare_field(a: &CharacterRecord, b: &CharacterRecord, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.name.cmp(&b.name),
        SortField::Status => a.status.as_str().cmp(b.status.as_str()),
        SortField::Species => a.species.cmp(&b.species),
        SortField::Gender => a.gender.as_str().cmp(b.gender.as_str()),
        SortField::Created => a.created.cmp(&b.created),
    }
}

fn matches_search(character: &CharacterRecord, needle: &str) -> bool {
    character.name.to_lowercase().contains(needle)
        || character.species.to_lowercase().contains(needle)
        || character.status.as_str().to_lowercase().contains(needle)
        || character.origin.name.to_lowercase().contains(needle)
        || character.location.name.to_lowercase().contains(needle)
}
