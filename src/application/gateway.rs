//! Cache-first orchestration of upstream character lookups.
//!
//! Every lookup shape follows the same ladder: fresh cache hit, otherwise an
//! upstream fetch that repopulates the cache, otherwise the stale entry as a
//! logged degraded success. Only when all three rungs fail does the caller
//! see `UpstreamUnavailable` — except the id-batch path, which degrades to
//! an empty collection instead (it hydrates the favorites view, where a
//! missing page is better than a failing one).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::cache::{CharacterCache, batch_key, page_key};
use crate::domain::characters::{CharacterFilter, CharacterPage, CharacterRecord};

/// Failure modes of a single upstream call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream returned 404")]
    NotFound,
    #[error("upstream transport failure: {0}")]
    Transport(String),
    #[error("upstream returned error status {0}")]
    Status(u16),
    #[error("unexpected upstream payload: {0}")]
    InvalidPayload(String),
}

impl UpstreamError {
    /// Transient failures are eligible for the stale-cache fallback; a 404
    /// or a malformed payload is not.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status(_))
    }
}

/// The upstream character API as consumed by the gateway.
///
/// Injected as a trait object so tests can script responses without a
/// network.
#[async_trait]
pub trait CharacterApi: Send + Sync {
    async fn characters(&self, filter: &CharacterFilter) -> Result<CharacterPage, UpstreamError>;

    async fn character(&self, id: i64) -> Result<CharacterRecord, UpstreamError>;

    /// Batch lookup; the upstream collapses a single-id batch to one object,
    /// implementations must normalize that back to a vector.
    async fn characters_by_ids(&self, ids: &[i64]) -> Result<Vec<CharacterRecord>, UpstreamError>;

    /// Cheap reachability probe.
    async fn is_healthy(&self) -> bool;
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("character not found")]
    NotFound,
    #[error("upstream unavailable and no cached fallback")]
    UpstreamUnavailable,
    #[error("unexpected upstream payload: {0}")]
    InvalidPayload(String),
}

/// Cache-first proxy over the upstream character API.
pub struct CharacterGateway {
    api: Arc<dyn CharacterApi>,
    cache: Arc<CharacterCache>,
    ttl: Duration,
}

impl CharacterGateway {
    pub fn new(api: Arc<dyn CharacterApi>, cache: Arc<CharacterCache>, ttl: Duration) -> Self {
        Self { api, cache, ttl }
    }

    /// Fetch one page of characters for the given filters.
    pub async fn fetch_page(&self, filter: &CharacterFilter) -> Result<CharacterPage, GatewayError> {
        let key = page_key(filter);

        if let Some(page) = self.cache.get_page(&key) {
            debug!(target: "mortydex::gateway", key, "page served from cache");
            return Ok(page);
        }

        match self.api.characters(filter).await {
            Ok(page) => {
                counter!("mortydex_upstream_fetch_total", "outcome" => "ok").increment(1);
                self.cache.set_page(key, page.clone(), self.ttl);
                Ok(page)
            }
            Err(err) if err.is_transient() => {
                counter!("mortydex_upstream_fetch_total", "outcome" => "error").increment(1);
                if let Some(page) = self.cache.get_page_stale(&key) {
                    warn!(
                        target: "mortydex::gateway",
                        key,
                        error = %err,
                        "upstream failed, serving stale page"
                    );
                    return Ok(page);
                }
                error!(target: "mortydex::gateway", key, error = %err, "upstream unavailable");
                Err(GatewayError::UpstreamUnavailable)
            }
            Err(err) => Err(map_terminal(err)),
        }
    }

    /// Fetch a single character by id.
    ///
    /// An upstream 404 is definitive: it is not cached and never answered
    /// from stale data.
    pub async fn fetch_one(&self, id: i64) -> Result<CharacterRecord, GatewayError> {
        if let Some(record) = self.cache.get_character(id) {
            debug!(target: "mortydex::gateway", id, "character served from cache");
            return Ok(record);
        }

        match self.api.character(id).await {
            Ok(record) => {
                counter!("mortydex_upstream_fetch_total", "outcome" => "ok").increment(1);
                self.cache.set_character(id, record.clone(), self.ttl);
                Ok(record)
            }
            Err(err) if err.is_transient() => {
                counter!("mortydex_upstream_fetch_total", "outcome" => "error").increment(1);
                if let Some(record) = self.cache.get_character_stale(id) {
                    warn!(
                        target: "mortydex::gateway",
                        id,
                        error = %err,
                        "upstream failed, serving stale character"
                    );
                    return Ok(record);
                }
                error!(target: "mortydex::gateway", id, error = %err, "upstream unavailable");
                Err(GatewayError::UpstreamUnavailable)
            }
            Err(err) => Err(map_terminal(err)),
        }
    }

    /// Fetch a batch of characters by id, in the order given.
    ///
    /// Infallible by policy: any failure that the stale cache cannot absorb
    /// degrades to an empty collection instead of an error.
    pub async fn fetch_many(&self, ids: &[i64]) -> Vec<CharacterRecord> {
        if ids.is_empty() {
            return Vec::new();
        }

        let key = batch_key(ids);
        if let Some(records) = self.cache.get_batch(&key) {
            debug!(target: "mortydex::gateway", key, "batch served from cache");
            return records;
        }

        match self.api.characters_by_ids(ids).await {
            Ok(records) => {
                counter!("mortydex_upstream_fetch_total", "outcome" => "ok").increment(1);
                self.cache.set_batch(key, records.clone(), self.ttl);
                records
            }
            Err(err) => {
                counter!("mortydex_upstream_fetch_total", "outcome" => "error").increment(1);
                if let Some(records) = self.cache.get_batch_stale(&key) {
                    warn!(
                        target: "mortydex::gateway",
                        key,
                        error = %err,
                        "upstream failed, serving stale batch"
                    );
                    return records;
                }
                warn!(
                    target: "mortydex::gateway",
                    key,
                    error = %err,
                    "batch fetch failed with no fallback, degrading to empty"
                );
                Vec::new()
            }
        }
    }

    /// Probe upstream reachability, bypassing the cache.
    pub async fn is_healthy(&self) -> bool {
        self.api.is_healthy().await
    }
}

fn map_terminal(err: UpstreamError) -> GatewayError {
    match err {
        UpstreamError::NotFound => GatewayError::NotFound,
        UpstreamError::InvalidPayload(message) => GatewayError::InvalidPayload(message),
        // Transient kinds take the stale-fallback arm before reaching here.
        UpstreamError::Transport(_) | UpstreamError::Status(_) => {
            GatewayError::UpstreamUnavailable
        }
    }
}
