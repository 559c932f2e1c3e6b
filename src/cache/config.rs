//! Cache sizing and TTL configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_TTL_SECONDS: u64 = 3600;
const DEFAULT_PAGE_LIMIT: usize = 200;
const DEFAULT_CHARACTER_LIMIT: usize = 500;
const DEFAULT_BATCH_LIMIT: usize = 100;

/// Capacity limits and the logical TTL applied to fresh entries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds before a cached entry is considered stale.
    pub ttl_seconds: u64,
    /// Maximum cached filter pages.
    pub page_limit: usize,
    /// Maximum cached single characters.
    pub character_limit: usize,
    /// Maximum cached id-batch lookups.
    pub batch_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TTL_SECONDS,
            page_limit: DEFAULT_PAGE_LIMIT,
            character_limit: DEFAULT_CHARACTER_LIMIT,
            batch_limit: DEFAULT_BATCH_LIMIT,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Returns the page limit as NonZeroUsize, clamping to 1 if zero.
    pub fn page_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.page_limit).unwrap_or(NonZeroUsize::MIN)
    }

    /// Returns the character limit as NonZeroUsize, clamping to 1 if zero.
    pub fn character_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.character_limit).unwrap_or(NonZeroUsize::MIN)
    }

    /// Returns the batch limit as NonZeroUsize, clamping to 1 if zero.
    pub fn batch_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.batch_limit).unwrap_or(NonZeroUsize::MIN)
    }
}
