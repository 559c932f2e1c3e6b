//! Canonical cache key construction.
//!
//! Two requests describing the same upstream query must map to the same key,
//! so filter fields are emitted in a fixed sorted order and empty values are
//! skipped entirely. Values are form-encoded so a value containing `&` or
//! `=` cannot masquerade as extra fields and collide with a different
//! filter set.

use url::form_urlencoded::Serializer;

use crate::domain::characters::CharacterFilter;

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Key for a paged character query.
///
/// Non-empty filter fields in sorted field order (`gender`, `name`,
/// `species`, `status`, `type`), then the page number, each pair
/// form-encoded. A missing page is page 1.
pub fn page_key(filter: &CharacterFilter) -> String {
    let mut pairs = Serializer::new(String::new());

    if let Some(gender) = filter.gender {
        pairs.append_pair("gender", gender.as_str());
    }
    if let Some(name) = non_empty(filter.name.as_deref()) {
        pairs.append_pair("name", name);
    }
    if let Some(species) = non_empty(filter.species.as_deref()) {
        pairs.append_pair("species", species);
    }
    if let Some(status) = filter.status {
        pairs.append_pair("status", status.as_str());
    }
    if let Some(kind) = non_empty(filter.kind.as_deref()) {
        pairs.append_pair("type", kind);
    }
    pairs.append_pair("page", &filter.page_number().to_string());

    pairs.finish()
}

/// Key for an id-batch lookup. Order-sensitive by design: callers that want
/// cache reuse must pass ids in a canonical order.
pub fn batch_key(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
