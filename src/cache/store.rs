//! Cache storage.
//!
//! A capacity-bounded LRU map whose entries carry a logical expiry. `get`
//! only returns fresh entries; `get_stale` ignores expiry and exists solely
//! for the gateway's degraded path. Expiry never evicts anything by itself,
//! only LRU capacity does, which is what keeps stale entries retrievable.

use std::hash::Hash;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use lru::LruCache;
use metrics::counter;

use crate::domain::characters::{CharacterPage, CharacterRecord};

use super::config::CacheConfig;
use super::lock::{rw_read, rw_write};

struct TtlEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> TtlEntry<V> {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// One LRU map with per-entry expiry. Set is atomic per key; concurrent
/// writers to the same key resolve last-writer-wins.
struct TtlStore<K: Hash + Eq, V: Clone> {
    name: &'static str,
    entries: RwLock<LruCache<K, TtlEntry<V>>>,
}

impl<K: Hash + Eq, V: Clone> TtlStore<K, V> {
    fn new(name: &'static str, capacity: std::num::NonZeroUsize) -> Self {
        Self {
            name,
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        // LruCache::get updates recency and therefore needs the write lock.
        let mut entries = rw_write(&self.entries, self.name, "get");
        match entries.get(key) {
            Some(entry) if entry.is_fresh() => {
                counter!("mortydex_cache_hit_total", "store" => self.name).increment(1);
                Some(entry.value.clone())
            }
            _ => {
                counter!("mortydex_cache_miss_total", "store" => self.name).increment(1);
                None
            }
        }
    }

    fn get_stale(&self, key: &K) -> Option<V> {
        let mut entries = rw_write(&self.entries, self.name, "get_stale");
        let value = entries.get(key).map(|entry| entry.value.clone());
        if value.is_some() {
            counter!("mortydex_cache_stale_hit_total", "store" => self.name).increment(1);
        }
        value
    }

    fn set(&self, key: K, value: V, ttl: Duration) {
        let entry = TtlEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        let mut entries = rw_write(&self.entries, self.name, "set");
        // An insert of a new key into a full map displaces the LRU victim;
        // an overwrite of an existing key does not.
        let evicts = entries.len() == entries.cap().get() && entries.peek(&key).is_none();
        entries.push(key, entry);
        if evicts {
            counter!("mortydex_cache_evict_total", "store" => self.name).increment(1);
        }
    }

    fn len(&self) -> usize {
        rw_read(&self.entries, self.name, "len").len()
    }

    fn clear(&self) {
        rw_write(&self.entries, self.name, "clear").clear();
    }
}

/// Response cache for upstream character data, one store per lookup shape.
///
/// Injected into the gateway at construction so tests can substitute a fresh
/// instance; nothing here is process-global.
pub struct CharacterCache {
    pages: TtlStore<String, CharacterPage>,
    characters: TtlStore<i64, CharacterRecord>,
    batches: TtlStore<String, Vec<CharacterRecord>>,
}

impl CharacterCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            pages: TtlStore::new("pages", config.page_limit_non_zero()),
            characters: TtlStore::new("characters", config.character_limit_non_zero()),
            batches: TtlStore::new("batches", config.batch_limit_non_zero()),
        }
    }

    pub fn get_page(&self, key: &str) -> Option<CharacterPage> {
        self.pages.get(&key.to_string())
    }

    pub fn get_page_stale(&self, key: &str) -> Option<CharacterPage> {
        self.pages.get_stale(&key.to_string())
    }

    pub fn set_page(&self, key: String, page: CharacterPage, ttl: Duration) {
        self.pages.set(key, page, ttl);
    }

    pub fn get_character(&self, id: i64) -> Option<CharacterRecord> {
        self.characters.get(&id)
    }

    pub fn get_character_stale(&self, id: i64) -> Option<CharacterRecord> {
        self.characters.get_stale(&id)
    }

    pub fn set_character(&self, id: i64, record: CharacterRecord, ttl: Duration) {
        self.characters.set(id, record, ttl);
    }

    pub fn get_batch(&self, key: &str) -> Option<Vec<CharacterRecord>> {
        self.batches.get(&key.to_string())
    }

    pub fn get_batch_stale(&self, key: &str) -> Option<Vec<CharacterRecord>> {
        self.batches.get_stale(&key.to_string())
    }

    pub fn set_batch(&self, key: String, records: Vec<CharacterRecord>, ttl: Duration) {
        self.batches.set(key, records, ttl);
    }

    pub fn len(&self) -> usize {
        self.pages.len() + self.characters.len() + self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached entry, fresh and stale alike.
    pub fn clear(&self) {
        self.pages.clear();
        self.characters.clear();
        self.batches.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use time::macros::datetime;

    use super::*;
    use crate::domain::characters::{CharacterGender, CharacterStatus, LocationRef};

    fn sample_character(id: i64, name: &str) -> CharacterRecord {
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
            created: datetime!(2017-11-04 18:48:46 UTC),
        }
    }

    const LONG_TTL: Duration = Duration::from_secs(60);

    #[test]
    fn fresh_entry_roundtrip() {
        let cache = CharacterCache::new(&CacheConfig::default());

        assert!(cache.get_character(1).is_none());
        cache.set_character(1, sample_character(1, "Rick Sanchez"), LONG_TTL);

        let cached = cache.get_character(1).expect("fresh entry");
        assert_eq!(cached.name, "Rick Sanchez");
    }

    #[test]
    fn expired_entry_is_invisible_to_get_but_readable_stale() {
        let cache = CharacterCache::new(&CacheConfig::default());
        cache.set_character(1, sample_character(1, "Rick Sanchez"), Duration::ZERO);

        assert!(cache.get_character(1).is_none());
        let stale = cache.get_character_stale(1).expect("stale entry");
        assert_eq!(stale.id, 1);
    }

    #[test]
    fn capacity_eviction_removes_stale_retrievability() {
        let config = CacheConfig {
            character_limit: 2,
            ..Default::default()
        };
        let cache = CharacterCache::new(&config);

        cache.set_character(1, sample_character(1, "Rick Sanchez"), Duration::ZERO);
        cache.set_character(2, sample_character(2, "Morty Smith"), LONG_TTL);
        cache.set_character(3, sample_character(3, "Summer Smith"), LONG_TTL);

        // Entry 1 was the LRU victim; not even the stale path can see it now.
        assert!(cache.get_character_stale(1).is_none());
        assert!(cache.get_character(2).is_some());
        assert!(cache.get_character(3).is_some());
    }

    #[test]
    fn set_overwrites_same_key() {
        let cache = CharacterCache::new(&CacheConfig::default());
        cache.set_character(1, sample_character(1, "Rick Sanchez"), LONG_TTL);
        cache.set_character(1, sample_character(1, "Evil Rick"), LONG_TTL);

        assert_eq!(cache.get_character(1).expect("entry").name, "Evil Rick");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_drops_everything() {
        let cache = CharacterCache::new(&CacheConfig::default());
        cache.set_character(1, sample_character(1, "Rick Sanchez"), Duration::ZERO);
        cache.set_batch(
            "1,2".to_string(),
            vec![sample_character(1, "Rick Sanchez")],
            LONG_TTL,
        );

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get_character_stale(1).is_none());
        assert!(cache.get_batch_stale("1,2").is_none());
    }

    #[test]
    fn recovers_from_poisoned_lock() {
        let cache = CharacterCache::new(&CacheConfig::default());

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = cache
                .characters
                .entries
                .write()
                .expect("characters lock should be acquired");
            panic!("poison characters lock");
        }));

        cache.set_character(1, sample_character(1, "Rick Sanchez"), LONG_TTL);
        assert!(cache.get_character(1).is_some());
    }
}
