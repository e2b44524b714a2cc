use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{ItemKind, RecommendationResponse, SwipeDirection},
    services::{SessionStats, SwipeBrain},
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct SwipeQuery {
    #[serde(default)]
    item_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SwipeResponse {
    pub ok: bool,
}

/// Returns the next category or food for the session
pub async fn next(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(sid): Path<String>,
) -> AppResult<Json<RecommendationResponse>> {
    // One call per session at a time
    let _guard = state.sessions.acquire(&sid).await?;

    let mut brain = SwipeBrain::new(&sid, state.store.as_ref(), state.picker.as_ref());
    let item = brain
        .next()
        .await?
        .ok_or_else(|| AppError::NotFound("No more recommendations".to_string()))?;

    tracing::info!(
        request_id = %request_id,
        session_id = %sid,
        item_id = item.id(),
        kind = %item.kind(),
        "Recommendation served"
    );

    Ok(Json(item.into()))
}

/// Records a swipe on a presented item
///
/// `item_type` defaults to `food`.
pub async fn swipe(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path((sid, item_id, action)): Path<(String, i64, String)>,
    Query(params): Query<SwipeQuery>,
) -> AppResult<Json<SwipeResponse>> {
    // Validate before touching the session
    let direction: SwipeDirection = action.parse()?;
    let kind = match params.item_type.as_deref() {
        Some(raw) => raw.parse()?,
        None => ItemKind::Food,
    };

    let _guard = state.sessions.acquire(&sid).await?;

    tracing::debug!(
        request_id = %request_id,
        session_id = %sid,
        item_id,
        direction = %direction,
        kind = %kind,
        "Swipe received"
    );

    SwipeBrain::new(&sid, state.store.as_ref(), state.picker.as_ref())
        .update(item_id, direction, kind)
        .await?;

    Ok(Json(SwipeResponse { ok: true }))
}

/// Summarises the session once the user has made a super swipe
pub async fn stats(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(sid): Path<String>,
) -> AppResult<Json<SessionStats>> {
    let _guard = state.sessions.acquire(&sid).await?;

    let stats = SwipeBrain::new(&sid, state.store.as_ref(), state.picker.as_ref())
        .get_stats(state.narrator.as_ref())
        .await?;

    tracing::info!(
        request_id = %request_id,
        session_id = %sid,
        total_swipes = stats.total_swipes,
        has_insights = stats.insights.is_some(),
        "Session stats served"
    );

    Ok(Json(stats))
}
