use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    esi::{Denial, TransportError},
    infrastructure::TokenError,
    result::ApiResult,
    utils::{error_codes, error_to_api_response},
};

/// 网关请求的错误分类
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("ESI path cannot be empty")]
    EmptyPath,

    #[error("Public ESI routes are not allowed: {0}")]
    PublicPath(String),

    #[error("Invalid ESI path: {0}")]
    InvalidTarget(#[from] url::ParseError),

    #[error("ESI path is not in canonical form: {0}")]
    NonCanonicalPath(String),

    #[error("Missing actor parameter")]
    MissingActor,

    #[error("Invalid actor id '{0}'")]
    InvalidActor(String),

    #[error("Character {0} not found")]
    UnknownActor(i64),

    #[error("Character {0} has no valid token")]
    NoToken(i64),

    #[error(transparent)]
    AdmissionDenied(#[from] Denial),

    #[error("ESI request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Character lookup failed: {0}")]
    ActorLookup(#[from] sqlx::Error),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::EmptyPath
            | Self::PublicPath(_)
            | Self::InvalidTarget(_)
            | Self::NonCanonicalPath(_)
            | Self::MissingActor
            | Self::InvalidActor(_)
            | Self::NoToken(_) => StatusCode::BAD_REQUEST,
            Self::UnknownActor(_) => StatusCode::NOT_FOUND,
            Self::AdmissionDenied(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Transport(_) | Self::ActorLookup(_) | Self::Token(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> i32 {
        match self {
            Self::PublicPath(_) => error_codes::PUBLIC_ROUTE,
            Self::NoToken(_) => error_codes::AUTH_FAILED,
            Self::UnknownActor(_) => error_codes::NOT_FOUND,
            Self::AdmissionDenied(Denial::Throttled { .. }) => error_codes::THROTTLED,
            Self::AdmissionDenied(Denial::BudgetExhausted { .. }) => error_codes::RATE_LIMIT,
            Self::Transport(_) => error_codes::UPSTREAM_UNAVAILABLE,
            Self::ActorLookup(_) | Self::Token(_) => error_codes::INTERNAL_ERROR,
            _ => error_codes::VALIDATION_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match &self {
            Self::ActorLookup(e) => {
                tracing::error!("Character lookup failed: {}", e);
                "内部服务器错误".to_string()
            }
            Self::Token(e) => {
                tracing::error!("Token provider failed: {}", e);
                "内部服务器错误".to_string()
            }
            other => other.to_string(),
        };

        let Self::AdmissionDenied(denial) = &self else {
            return (status, error_to_api_response::<()>(code, message)).into_response();
        };

        let retry_at = denial.retry_at();
        let body = ApiResult::<()>::error(code, &message).retry_at(retry_at);
        let mut response = (status, Json(body)).into_response();

        let wait = (retry_at - chrono::Utc::now().timestamp()).max(1);
        if let Ok(value) = HeaderValue::from_str(&wait.to_string()) {
            response.headers_mut().insert(RETRY_AFTER, value);
        }

        response
    }
}
