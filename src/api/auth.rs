use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::{error::ApiError, AppState};

pub const API_KEY_HEADER: &str = "x-api-key";

/// The authenticated caller's key, inserted as a request extension.
#[derive(Debug, Clone)]
pub struct ApiKey(pub Arc<str>);

/// Byte comparison whose running time depends only on the lengths.
fn keys_match(provided: &[u8], expected: &[u8]) -> bool {
    if provided.len() != expected.len() {
        return false;
    }
    provided
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

pub async fn require_api_key(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let matched = request
        .headers()
        .get(API_KEY_HEADER)
        .map(|value| keys_match(value.as_bytes(), state.api_key.as_bytes()));

    match matched {
        Some(true) => {
            request.extensions_mut().insert(ApiKey(state.api_key.clone()));
            Ok(next.run(request).await)
        }
        Some(false) => {
            tracing::warn!(path = %request.uri().path(), "Rejected request with invalid API key");
            Err(ApiError::Unauthorized("Invalid API key".into()))
        }
        None => {
            tracing::warn!(path = %request.uri().path(), "Rejected request without API key");
            Err(ApiError::Unauthorized("Missing API key".into()))
        }
    }
}
