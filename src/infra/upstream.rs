//! reqwest-backed client for the upstream character API.
//!
//! Parsing is strict: payloads that do not match the expected schema become
//! a typed `InvalidPayload` error at this boundary instead of leaking
//! untyped data inward.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::application::gateway::{CharacterApi, UpstreamError};
use crate::config::UpstreamSettings;
use crate::domain::characters::{CharacterFilter, CharacterPage, CharacterRecord};

use super::error::InfraError;

// The upstream collapses a one-id batch to a bare object.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<CharacterRecord>),
    One(Box<CharacterRecord>),
}

impl From<OneOrMany> for Vec<CharacterRecord> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::Many(records) => records,
            OneOrMany::One(record) => vec![*record],
        }
    }
}

pub struct UpstreamClient {
    http: Client,
    base: Url,
    timeout: Duration,
    batch_timeout: Duration,
    probe_timeout: Duration,
}

impl UpstreamClient {
    pub fn new(settings: &UpstreamSettings) -> Result<Self, InfraError> {
        // A trailing slash keeps Url::join appending instead of replacing.
        let normalized = if settings.base_url.ends_with('/') {
            settings.base_url.clone()
        } else {
            format!("{}/", settings.base_url)
        };
        let base = Url::parse(&normalized)
            .map_err(|err| InfraError::upstream(format!("invalid base url: {err}")))?;

        let http = Client::builder()
            .user_agent(Self::user_agent())
            .build()
            .map_err(|err| InfraError::upstream(format!("failed to build client: {err}")))?;

        Ok(Self {
            http,
            base,
            timeout: settings.timeout,
            batch_timeout: settings.batch_timeout,
            probe_timeout: settings.probe_timeout,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("mortydex/", env!("CARGO_PKG_VERSION"))
    }

    fn character_url(&self, suffix: &str) -> Result<Url, UpstreamError> {
        self.base
            .join(suffix)
            .map_err(|err| UpstreamError::Transport(format!("url construction failed: {err}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        timeout: Duration,
    ) -> Result<T, UpstreamError> {
        debug!(target: "mortydex::upstream", url = %url, "fetching");

        let response = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(UpstreamError::NotFound);
        }
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(classify_transport)?;
        serde_json::from_slice(&bytes)
            .map_err(|err| UpstreamError::InvalidPayload(err.to_string()))
    }
}

#[async_trait]
impl CharacterApi for UpstreamClient {
    async fn characters(&self, filter: &CharacterFilter) -> Result<CharacterPage, UpstreamError> {
        let mut url = self.character_url("character")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &filter.page_number().to_string());
            if let Some(name) = filter.name.as_deref().filter(|v| !v.is_empty()) {
                pairs.append_pair("name", name);
            }
            if let Some(status) = filter.status {
                pairs.append_pair("status", status.as_str());
            }
            if let Some(species) = filter.species.as_deref().filter(|v| !v.is_empty()) {
                pairs.append_pair("species", species);
            }
            if let Some(kind) = filter.kind.as_deref().filter(|v| !v.is_empty()) {
                pairs.append_pair("type", kind);
            }
            if let Some(gender) = filter.gender {
                pairs.append_pair("gender", gender.as_str());
            }
        }

        self.get_json(url, self.timeout).await
    }

    async fn character(&self, id: i64) -> Result<CharacterRecord, UpstreamError> {
        let url = self.character_url(&format!("character/{id}"))?;
        self.get_json(url, self.timeout).await
    }

    async fn characters_by_ids(&self, ids: &[i64]) -> Result<Vec<CharacterRecord>, UpstreamError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let url = self.character_url(&format!("character/{joined}"))?;

        let payload: OneOrMany = self.get_json(url, self.batch_timeout).await?;
        Ok(payload.into())
    }

    async fn is_healthy(&self) -> bool {
        let Ok(url) = self.character_url("character/1") else {
            return false;
        };
        self.get_json::<CharacterRecord>(url, self.probe_timeout)
            .await
            .is_ok()
    }
}

fn classify_transport(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Transport("request timed out".to_string())
    } else {
        UpstreamError::Transport(err.to_string())
    }
}
