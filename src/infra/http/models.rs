//! Query and response shapes for the JSON API.

use serde::{Deserialize, Serialize};

use crate::application::characters::ListOptions;
use crate::domain::characters::{
    CharacterFilter, GenderFilter, SortField, SortOrder, StatusFilter,
};
use crate::domain::favorites::FavoriteRecord;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterListQuery {
    pub page: Option<u32>,
    pub name: Option<String>,
    pub status: Option<StatusFilter>,
    pub species: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub gender: Option<GenderFilter>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
    pub search: Option<String>,
    pub filter: Option<String>,
}

impl CharacterListQuery {
    /// `?filter=favorites` switches the endpoint to the marked-only view.
    pub fn favorites_only(&self) -> bool {
        matches!(self.filter.as_deref(), Some("favorites"))
    }

    pub fn into_parts(self) -> (CharacterFilter, ListOptions) {
        let filter = CharacterFilter {
            page: self.page,
            name: self.name,
            status: self.status,
            species: self.species,
            kind: self.kind,
            gender: self.gender,
        };
        let options = ListOptions {
            sort_by: self.sort_by,
            sort_order: self.sort_order,
            search: self.search,
        };
        (filter, options)
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite: Option<FavoriteRecord>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub upstream: &'static str,
}
