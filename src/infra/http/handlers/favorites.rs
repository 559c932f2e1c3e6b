//! Favorite mark handlers.

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::characters::FavoriteToggle;
use crate::infra::http::auth::AuthUser;
use crate::infra::http::error::ApiError;
use crate::infra::http::models::{CountResponse, FavoriteResponse};
use crate::infra::http::state::ApiState;

pub async fn list_favorites(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let favorites = state.characters.favorites_view(user.id).await?;
    Ok(Json(favorites))
}

pub async fn add_favorite(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let favorite = state.characters.add_favorite(user.id, id).await?;

    Ok((
        StatusCode::CREATED,
        Json(FavoriteResponse {
            message: "Character added to favorites",
            favorite: Some(favorite),
        }),
    ))
}

pub async fn remove_favorite(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.characters.remove_favorite(user.id, id).await?;

    Ok(Json(FavoriteResponse {
        message: "Character removed from favorites",
        favorite: None,
    }))
}

pub async fn toggle_favorite(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.characters.toggle_favorite(user.id, id).await?;

    let response = match outcome {
        FavoriteToggle::Added(favorite) => (
            StatusCode::CREATED,
            Json(FavoriteResponse {
                message: "Character added to favorites",
                favorite: Some(favorite),
            }),
        ),
        FavoriteToggle::Removed => (
            StatusCode::OK,
            Json(FavoriteResponse {
                message: "Character removed from favorites",
                favorite: None,
            }),
        ),
    };

    Ok(response)
}

pub async fn favorite_count(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let count = state.characters.favorite_count(user.id).await?;
    Ok(Json(CountResponse { count }))
}

pub async fn clear_favorites(
    State(state): State<ApiState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    state.characters.clear_favorites(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
