use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::characters::CharacterServiceError;
use crate::application::gateway::GatewayError;
use crate::application::repos::RepoError;

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const NOT_FOUND: &str = "not_found";
    pub const CONFLICT: &str = "conflict";
    pub const UPSTREAM_UNAVAILABLE: &str = "upstream_unavailable";
    pub const INVALID_PAYLOAD: &str = "invalid_payload";
    pub const DB_TIMEOUT: &str = "db_timeout";
    pub const REPO: &str = "repo_error";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
}

/// Diagnostic attached to error responses so the shared logging middleware
/// can emit detail the client body does not carry.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub code: &'static str,
    pub detail: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    detail: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            codes::UNAUTHORIZED,
            "Valid bearer token required",
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, codes::CONFLICT, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let context = ErrorContext {
            code: self.code,
            detail: self.detail.unwrap_or_else(|| self.message.clone()),
        };
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        response.extensions_mut().insert(context);
        response
    }
}

impl From<CharacterServiceError> for ApiError {
    fn from(err: CharacterServiceError) -> Self {
        match err {
            CharacterServiceError::UserNotFound(id) => {
                Self::not_found("User not found").with_detail(format!("user {id} not found"))
            }
            CharacterServiceError::FavoriteNotFound => Self::not_found("Favorite not found"),
            CharacterServiceError::AlreadyFavorite => {
                Self::conflict("Character is already a favorite")
            }
            CharacterServiceError::Gateway(gateway) => gateway.into(),
            CharacterServiceError::Repo(repo) => repo.into(),
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound => Self::not_found("Character not found"),
            GatewayError::UpstreamUnavailable => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                codes::UPSTREAM_UNAVAILABLE,
                "Character API is unavailable",
            ),
            GatewayError::InvalidPayload(detail) => Self::new(
                StatusCode::BAD_GATEWAY,
                codes::INVALID_PAYLOAD,
                "Character API returned an unreadable response",
            )
            .with_detail(detail),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Duplicate { constraint } => {
                Self::conflict("Duplicate record").with_detail(constraint)
            }
            RepoError::InvalidInput { message } => {
                Self::bad_request("Invalid input").with_detail(message)
            }
            RepoError::Timeout => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                codes::DB_TIMEOUT,
                "Database timeout",
            ),
            RepoError::Persistence(message) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::REPO,
                "Persistence error",
            )
            .with_detail(message),
        }
    }
}
