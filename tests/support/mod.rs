//! Scripted upstream and in-memory repositories shared across test binaries.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use time::OffsetDateTime;

use mortydex::application::gateway::{CharacterApi, UpstreamError};
use mortydex::application::repos::{FavoritesRepo, RepoError, UsersRepo};
use mortydex::domain::characters::{
    CharacterFilter, CharacterGender, CharacterPage, CharacterRecord, CharacterStatus,
    LocationRef, PageInfo,
};
use mortydex::domain::favorites::{FavoriteRecord, UserRecord};

pub fn character(id: i64, name: &str) -> CharacterRecord {
    CharacterRecord {
        id,
        name: name.to_string(),
        status: CharacterStatus::Alive,
        species: "Human".to_string(),
        kind: String::new(),
        gender: CharacterGender::Male,
        origin: LocationRef {
            name: "Earth (C-137)".to_string(),
            url: String::new(),
        },
        location: LocationRef {
            name: "Citadel of Ricks".to_string(),
            url: String::new(),
        },
        image: String::new(),
        episode: Vec::new(),
        url: String::new(),
        created: OffsetDateTime::from_unix_timestamp(1_509_821_326 + id)
            .expect("valid timestamp"),
    }
}

pub fn page(results: Vec<CharacterRecord>) -> CharacterPage {
    CharacterPage {
        info: PageInfo {
            count: results.len() as u64,
            pages: 1,
            next: None,
            prev: None,
        },
        results,
    }
}

/// A `CharacterApi` whose responses are queued per method, with call
/// counters so tests can assert how often the upstream was consulted.
#[derive(Default)]
pub struct ScriptedApi {
    pages: Mutex<VecDeque<Result<CharacterPage, UpstreamError>>>,
    singles: Mutex<VecDeque<Result<CharacterRecord, UpstreamError>>>,
    batches: Mutex<VecDeque<Result<Vec<CharacterRecord>, UpstreamError>>>,
    pub page_calls: AtomicUsize,
    pub single_calls: AtomicUsize,
    pub batch_calls: AtomicUsize,
    pub healthy: AtomicBool,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self {
            healthy: AtomicBool::new(true),
            ..Default::default()
        }
    }

    pub fn push_page(&self, response: Result<CharacterPage, UpstreamError>) {
        self.pages.lock().expect("pages lock").push_back(response);
    }

    pub fn push_single(&self, response: Result<CharacterRecord, UpstreamError>) {
        self.singles
            .lock()
            .expect("singles lock")
            .push_back(response);
    }

    pub fn push_batch(&self, response: Result<Vec<CharacterRecord>, UpstreamError>) {
        self.batches
            .lock()
            .expect("batches lock")
            .push_back(response);
    }
}

fn unscripted<T>() -> Result<T, UpstreamError> {
    Err(UpstreamError::Transport("no scripted response".to_string()))
}

#[async_trait]
impl CharacterApi for ScriptedApi {
    async fn characters(&self, _filter: &CharacterFilter) -> Result<CharacterPage, UpstreamError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .expect("pages lock")
            .pop_front()
            .unwrap_or_else(unscripted)
    }

    async fn character(&self, _id: i64) -> Result<CharacterRecord, UpstreamError> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        self.singles
            .lock()
            .expect("singles lock")
            .pop_front()
            .unwrap_or_else(unscripted)
    }

    async fn characters_by_ids(&self, _ids: &[i64]) -> Result<Vec<CharacterRecord>, UpstreamError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.batches
            .lock()
            .expect("batches lock")
            .pop_front()
            .unwrap_or_else(unscripted)
    }

    async fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}

/// Favorites store backed by a plain vector, honoring the same uniqueness
/// rule the database enforces.
#[derive(Default)]
pub struct InMemoryFavorites {
    records: Mutex<Vec<FavoriteRecord>>,
    next_id: AtomicI64,
}

impl InMemoryFavorites {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl FavoritesRepo for InMemoryFavorites {
    async fn list_ids_for_user(&self, user_id: i64) -> Result<Vec<i64>, RepoError> {
        let records = self.records.lock().expect("records lock");
        Ok(records
            .iter()
            .filter(|record| record.user_id == user_id)
            .map(|record| record.character_id)
            .collect())
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<FavoriteRecord>, RepoError> {
        let records = self.records.lock().expect("records lock");
        let mut found: Vec<FavoriteRecord> = records
            .iter()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();
        found.reverse();
        Ok(found)
    }

    async fn find(
        &self,
        user_id: i64,
        character_id: i64,
    ) -> Result<Option<FavoriteRecord>, RepoError> {
        let records = self.records.lock().expect("records lock");
        Ok(records
            .iter()
            .find(|record| record.user_id == user_id && record.character_id == character_id)
            .cloned())
    }

    async fn exists(&self, user_id: i64, character_id: i64) -> Result<bool, RepoError> {
        Ok(self.find(user_id, character_id).await?.is_some())
    }

    async fn insert(&self, user_id: i64, character_id: i64) -> Result<FavoriteRecord, RepoError> {
        let mut records = self.records.lock().expect("records lock");
        if records
            .iter()
            .any(|record| record.user_id == user_id && record.character_id == character_id)
        {
            return Err(RepoError::Duplicate {
                constraint: "favorites_user_character_key".to_string(),
            });
        }

        let record = FavoriteRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id,
            character_id,
            created_at: OffsetDateTime::now_utc(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn delete(&self, user_id: i64, character_id: i64) -> Result<bool, RepoError> {
        let mut records = self.records.lock().expect("records lock");
        let before = records.len();
        records
            .retain(|record| !(record.user_id == user_id && record.character_id == character_id));
        Ok(records.len() < before)
    }

    async fn count_for_user(&self, user_id: i64) -> Result<u64, RepoError> {
        let records = self.records.lock().expect("records lock");
        Ok(records
            .iter()
            .filter(|record| record.user_id == user_id)
            .count() as u64)
    }

    async fn delete_all_for_user(&self, user_id: i64) -> Result<(), RepoError> {
        let mut records = self.records.lock().expect("records lock");
        records.retain(|record| record.user_id != user_id);
        Ok(())
    }

    async fn find_for_character_ids(
        &self,
        user_id: i64,
        character_ids: &[i64],
    ) -> Result<Vec<FavoriteRecord>, RepoError> {
        let records = self.records.lock().expect("records lock");
        Ok(records
            .iter()
            .filter(|record| {
                record.user_id == user_id && character_ids.contains(&record.character_id)
            })
            .cloned()
            .collect())
    }
}

/// Users store holding a fixed set of known ids.
pub struct InMemoryUsers {
    ids: Vec<i64>,
}

impl InMemoryUsers {
    pub fn with_ids(ids: &[i64]) -> Self {
        Self { ids: ids.to_vec() }
    }
}

#[async_trait]
impl UsersRepo for InMemoryUsers {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepoError> {
        if !self.ids.contains(&id) {
            return Ok(None);
        }
        Ok(Some(UserRecord {
            id,
            username: format!("user-{id}"),
            email: format!("user-{id}@example.com"),
            created_at: OffsetDateTime::now_utc(),
        }))
    }
}
