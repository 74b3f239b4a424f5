//! HTTP surface, versioned under `/api/v1`.

pub mod auth;
pub mod error;
pub mod notes;

use std::sync::Arc;

use axum::{
    http::{header::CONTENT_TYPE, HeaderName, Method},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use notekeeper_core::{Clock, Database};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::services::{NoteSearch, RateLimiter, SearchCache};

pub use auth::{ApiKey, API_KEY_HEADER};
pub use error::ApiError;

/// Services shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub limiter: Arc<RateLimiter>,
    pub cache: Arc<SearchCache>,
    pub search: Arc<NoteSearch>,
    pub api_key: Arc<str>,
}

impl AppState {
    pub fn new(db: Database, config: &ServiceConfig, clock: Arc<dyn Clock>) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.rate_limit, clock.clone()));
        let cache = Arc::new(SearchCache::new(config.cache_ttl, clock));
        let search = Arc::new(NoteSearch::new(db.clone(), cache.clone(), config.weights));

        Self {
            db,
            limiter,
            cache,
            search,
            api_key: config.api_key.as_str().into(),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let notes = Router::new()
        .route("/notes", post(notes::create_note).get(notes::list_notes))
        .route("/notes/search", get(notes::search_notes))
        .route("/notes/stats", get(notes::note_stats))
        .route(
            "/notes/{id}",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(API_KEY_HEADER)]);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", notes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
