//! Bearer-token verification for the `/api` surface.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use tracing::warn;

use super::error::ApiError;
use super::state::ApiState;

#[derive(Debug, Deserialize)]
struct Claims {
    sub: i64,
    #[allow(dead_code)]
    exp: usize,
}

/// The authenticated caller, inserted as a request extension once the token
/// checks out.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: i64,
}

pub struct AuthVerifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl AuthVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<AuthUser, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(AuthUser {
            id: data.claims.sub,
        })
    }
}

pub async fn require_auth(
    State(state): State<ApiState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = extract_bearer(request.headers().get(axum::http::header::AUTHORIZATION));

    let token = match token {
        Some(value) => value,
        None => return ApiError::unauthorized().into_response(),
    };

    match state.auth.verify(&token) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(err) => {
            warn!(
                target: "mortydex::http::auth",
                error = %err,
                "rejected bearer token"
            );
            ApiError::unauthorized().into_response()
        }
    }
}

fn extract_bearer(header: Option<&axum::http::HeaderValue>) -> Option<String> {
    let raw = header?.to_str().ok()?;
    let bearer = raw.strip_prefix("Bearer ")?;
    Some(bearer.to_string())
}
