//! Route-level tests: bearer auth enforcement, response shapes, and status
//! codes, driven through the router with no network or database.

mod support;

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Serialize;
use tower::ServiceExt;

use mortydex::application::characters::CharacterService;
use mortydex::application::gateway::CharacterGateway;
use mortydex::cache::{CacheConfig, CharacterCache};
use mortydex::infra::http::{self, ApiState, AuthVerifier};

use support::{InMemoryFavorites, InMemoryUsers, ScriptedApi, character, page};

const SECRET: &str = "router-test-secret";
const USER: i64 = 7;

#[derive(Serialize)]
struct Claims {
    sub: i64,
    exp: usize,
}

fn token_for(user_id: i64) -> String {
    let exp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch")
        .as_secs() as usize
        + 3600;
    encode(
        &Header::default(),
        &Claims { sub: user_id, exp },
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("sign token")
}

fn router_with(api: Arc<ScriptedApi>) -> Router {
    let cache = Arc::new(CharacterCache::new(&CacheConfig::default()));
    let gateway = Arc::new(CharacterGateway::new(
        api,
        cache,
        Duration::from_secs(3600),
    ));
    let favorites = Arc::new(InMemoryFavorites::new());
    let users = Arc::new(InMemoryUsers::with_ids(&[USER]));
    let characters = Arc::new(CharacterService::new(gateway.clone(), favorites, users));

    http::build_router(ApiState {
        characters,
        gateway,
        auth: Arc::new(AuthVerifier::new(SECRET)),
    })
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("build request")
}

fn post(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("build request")
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn api_routes_require_a_bearer_token() {
    let router = router_with(Arc::new(ScriptedApi::new()));

    let response = router
        .oneshot(get("/api/characters", None))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn garbage_tokens_are_rejected() {
    let router = router_with(Arc::new(ScriptedApi::new()));

    let response = router
        .oneshot(get("/api/characters", Some("not-a-jwt")))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn list_returns_enriched_page_for_valid_token() {
    let api = Arc::new(ScriptedApi::new());
    api.push_page(Ok(page(vec![character(1, "Rick Sanchez")])));
    let router = router_with(api);

    let response = router
        .oneshot(get("/api/characters", Some(&token_for(USER))))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["results"][0]["name"], "Rick Sanchez");
    assert_eq!(body["results"][0]["isFavorite"], false);
}

#[tokio::test]
async fn unknown_user_in_token_is_not_found() {
    let api = Arc::new(ScriptedApi::new());
    api.push_page(Ok(page(vec![character(1, "Rick Sanchez")])));
    let router = router_with(api);

    let response = router
        .oneshot(get("/api/characters", Some(&token_for(999))))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn adding_a_favorite_twice_returns_conflict() {
    let api = Arc::new(ScriptedApi::new());
    api.push_single(Ok(character(1, "Rick Sanchez")));
    api.push_single(Ok(character(1, "Rick Sanchez")));
    let router = router_with(api);
    let token = token_for(USER);

    let created = router
        .clone()
        .oneshot(post("/api/characters/1/favorite", &token))
        .await
        .expect("response");
    assert_eq!(created.status(), StatusCode::CREATED);
    let body = body_json(created).await;
    assert_eq!(body["favorite"]["characterId"], 1);

    let conflict = router
        .oneshot(post("/api/characters/1/favorite", &token))
        .await
        .expect("response");
    assert_eq!(conflict.status(), StatusCode::CONFLICT);
    let body = body_json(conflict).await;
    assert_eq!(body["error"]["code"], "conflict");
}

#[tokio::test]
async fn search_without_a_term_is_a_bad_request() {
    let router = router_with(Arc::new(ScriptedApi::new()));

    let response = router
        .oneshot(get("/api/characters/search", Some(&token_for(USER))))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unavailable_upstream_maps_to_service_unavailable() {
    let api = Arc::new(ScriptedApi::new());
    // No scripted responses: every upstream call fails as a transport error.
    let router = router_with(api);

    let response = router
        .oneshot(get("/api/characters", Some(&token_for(USER))))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "upstream_unavailable");
}

#[tokio::test]
async fn health_is_open_and_reports_the_upstream_probe() {
    let api = Arc::new(ScriptedApi::new());
    let router = router_with(api);

    let response = router.oneshot(get("/health", None)).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["upstream"], "up");
}
