use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::services::RateLimited;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Max {} requests per {}s", .0.limit, .0.window_secs)]
    RateLimited(RateLimited),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::RateLimited(_) => "rate_limit_exceeded",
            Self::Internal(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<notekeeper_core::Error> for ApiError {
    fn from(err: notekeeper_core::Error) -> Self {
        use notekeeper_core::Error;

        match err {
            Error::Validation(msg) => Self::Validation(msg),
            Error::NotFound(_) => Self::NotFound(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<RateLimited> for ApiError {
    fn from(rate: RateLimited) -> Self {
        Self::RateLimited(rate)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            Self::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                serde_json::json!({
                    "error": self.code(),
                    "message": "internal server error",
                })
            }
            Self::RateLimited(rate) => serde_json::json!({
                "error": self.code(),
                "message": self.to_string(),
                "retry_after_seconds": rate.retry_after_secs,
                "limit": rate.limit,
                "window_seconds": rate.window_secs,
            }),
            _ => serde_json::json!({
                "error": self.code(),
                "message": self.to_string(),
            }),
        };

        let mut response = (status, Json(body)).into_response();
        if let Self::RateLimited(rate) = &self {
            if let Ok(value) = HeaderValue::from_str(&rate.retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}
