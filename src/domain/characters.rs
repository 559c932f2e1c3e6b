//! Upstream character records and the query vocabulary around them.
//!
//! `CharacterRecord` mirrors the upstream payload exactly and is never
//! mutated once fetched; per-user state is layered on via
//! [`EnrichedCharacter`] at request time so cached records stay shareable
//! across users.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Life status as reported by the upstream API.
///
/// Upstream casing is inconsistent on purpose (`Alive`, `Dead`, `unknown`);
/// the serde renames preserve it byte-for-byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterStatus {
    Alive,
    Dead,
    #[serde(rename = "unknown")]
    Unknown,
}

impl CharacterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alive => "Alive",
            Self::Dead => "Dead",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CharacterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterGender {
    Female,
    Male,
    Genderless,
    #[serde(rename = "unknown")]
    Unknown,
}

impl CharacterGender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Female => "Female",
            Self::Male => "Male",
            Self::Genderless => "Genderless",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CharacterGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named reference to an origin or last-known location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRef {
    pub name: String,
    pub url: String,
}

/// A single character as served by the upstream API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub id: i64,
    pub name: String,
    pub status: CharacterStatus,
    pub species: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub gender: CharacterGender,
    pub origin: LocationRef,
    pub location: LocationRef,
    pub image: String,
    pub episode: Vec<String>,
    pub url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
}

/// Pagination metadata attached to a page of upstream results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub count: u64,
    pub pages: u64,
    pub next: Option<String>,
    pub prev: Option<String>,
}

/// One page of upstream results, exactly as fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterPage {
    pub info: PageInfo,
    pub results: Vec<CharacterRecord>,
}

/// Status filter values accepted by the upstream query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    Alive,
    Dead,
    Unknown,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alive => "alive",
            Self::Dead => "dead",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderFilter {
    Female,
    Male,
    Genderless,
    Unknown,
}

impl GenderFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Female => "female",
            Self::Male => "male",
            Self::Genderless => "genderless",
            Self::Unknown => "unknown",
        }
    }
}

/// Upstream-facing filter set for paged character queries.
///
/// All fields are optional; a missing `page` means page 1. Empty strings are
/// treated the same as absent fields when cache keys and query strings are
/// built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterFilter {
    pub page: Option<u32>,
    pub name: Option<String>,
    pub status: Option<StatusFilter>,
    pub species: Option<String>,
    pub kind: Option<String>,
    pub gender: Option<GenderFilter>,
}

impl CharacterFilter {
    pub fn page_number(&self) -> u32 {
        self.page.unwrap_or(1)
    }
}

/// Client-side sort field for an already-fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Name,
    Status,
    Species,
    Gender,
    Created,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// A character annotated with the requesting user's favorite status.
///
/// Constructed fresh per request; `is_favorite` is never cached alongside the
/// record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedCharacter {
    #[serde(flatten)]
    pub character: CharacterRecord,
    #[serde(rename = "isFavorite")]
    pub is_favorite: bool,
}

/// A page of enriched characters. `info` always reflects the upstream page,
/// even when a client-side search narrowed `results`.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedPage {
    pub info: PageInfo,
    pub results: Vec<EnrichedCharacter>,
}
