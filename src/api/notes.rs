use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use notekeeper_core::models::*;
use serde::Deserialize;
use uuid::Uuid;

use super::{auth::ApiKey, error::ApiError, AppState};
use crate::services::{with_store, RateStatus};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Unparseable ids cannot name a note, so they are reported as not found.
fn parse_note_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("note {raw} not found")))
}

fn rate_limit_headers(status: &RateStatus) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in [
        ("x-ratelimit-limit", status.limit as u64),
        ("x-ratelimit-remaining", status.remaining as u64),
        ("x-ratelimit-reset", status.reset_secs),
    ] {
        if let Ok(v) = HeaderValue::from_str(&value.to_string()) {
            headers.insert(name, v);
        }
    }
    headers
}

pub async fn create_note(
    State(state): State<AppState>,
    Extension(ApiKey(key)): Extension<ApiKey>,
    payload: Result<Json<CreateNoteInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let rate = state.limiter.check_and_increment(&key).await?;
    let Json(input) = payload?;

    let created = with_store(&state.db, move |db| db.create_note(input)).await?;
    let status = if created.deduplicated {
        StatusCode::OK
    } else {
        state.cache.invalidate_all().await;
        tracing::info!(id = %created.note.id, "Created note");
        StatusCode::CREATED
    };

    Ok((status, rate_limit_headers(&rate), Json(created.note)).into_response())
}

pub async fn list_notes(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<NotePage>, ApiError> {
    let Query(params) = params?;
    let query = ListNotesQuery::parse(
        params.page,
        params.limit,
        params.sort_by.as_deref(),
        params.order.as_deref(),
    )?;

    Ok(Json(with_store(&state.db, move |db| db.list_notes(&query)).await?))
}

pub async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(&id)?;
    Ok(Json(with_store(&state.db, move |db| db.get_note(id)).await?))
}

pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateNoteInput>, JsonRejection>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(&id)?;
    let Json(input) = payload?;

    let note = with_store(&state.db, move |db| db.update_note(id, input)).await?;
    state.cache.invalidate_all().await;
    tracing::info!(id = %note.id, "Updated note");

    Ok(Json(note))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_note_id(&id)?;

    let note = with_store(&state.db, move |db| db.soft_delete_note(id)).await?;
    state.cache.invalidate_all().await;
    tracing::info!(id = %note.id, "Soft-deleted note");

    Ok(Json(serde_json::json!({
        "message": "Note soft deleted",
        "id": note.id,
    })))
}

pub async fn search_notes(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let q = params
        .q
        .ok_or_else(|| ApiError::Validation("query parameter 'q' is required".into()))?;

    let results = state.search.search(&q).await?;
    Ok(Json(&results[..]).into_response())
}

pub async fn note_stats(State(state): State<AppState>) -> Result<Json<NoteStats>, ApiError> {
    Ok(Json(with_store(&state.db, |db| db.note_stats()).await?))
}
