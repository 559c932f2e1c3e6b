//! Character listing and lookup handlers.

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::response::{IntoResponse, Response};

use crate::infra::http::auth::AuthUser;
use crate::infra::http::error::ApiError;
use crate::infra::http::models::{CharacterListQuery, SearchQuery};
use crate::infra::http::state::ApiState;

pub async fn list_characters(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<CharacterListQuery>,
) -> Result<Response, ApiError> {
    if query.favorites_only() {
        let favorites = state.characters.favorites_view(user.id).await?;
        return Ok(Json(favorites).into_response());
    }

    let (filter, options) = query.into_parts();
    let page = state.characters.list(user.id, &filter, &options).await?;

    Ok(Json(page).into_response())
}

pub async fn search_characters(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let term = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .ok_or_else(|| ApiError::bad_request("Query parameter `q` is required"))?;

    let page = state.characters.search(user.id, term, query.page).await?;

    Ok(Json(page))
}

pub async fn get_character(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let character = state.characters.one(user.id, id).await?;
    Ok(Json(character))
}
