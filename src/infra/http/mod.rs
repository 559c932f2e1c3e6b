pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use auth::{AuthUser, AuthVerifier};
pub use state::ApiState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};

/// Assemble the full route table. Everything under `/api` requires a bearer
/// token; `/health` stays open for probes.
pub fn build_router(state: ApiState) -> Router {
    let auth_state = state.clone();

    let api = Router::new()
        .route("/api/characters", get(handlers::characters::list_characters))
        .route(
            "/api/characters/search",
            get(handlers::characters::search_characters),
        )
        .route(
            "/api/characters/favorites",
            get(handlers::favorites::list_favorites),
        )
        .route(
            "/api/characters/{id}",
            get(handlers::characters::get_character),
        )
        .route(
            "/api/characters/{id}/favorite",
            post(handlers::favorites::add_favorite).delete(handlers::favorites::remove_favorite),
        )
        .route(
            "/api/characters/{id}/favorite/toggle",
            post(handlers::favorites::toggle_favorite),
        )
        .route("/api/favorites", delete(handlers::favorites::clear_favorites))
        .route("/api/favorites/count", get(handlers::favorites::favorite_count))
        .layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth::require_auth,
        ));

    Router::new()
        .merge(api)
        .route("/health", get(handlers::health::health))
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .with_state(state)
}
