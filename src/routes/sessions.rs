use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;

use crate::{error::AppResult, middleware::request_id::RequestId};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct EndResponse {
    pub ended: bool,
}

/// Opens a session under a client-chosen id
pub async fn start(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(sid): Path<String>,
) -> AppResult<Json<StartResponse>> {
    tracing::info!(request_id = %request_id, session_id = %sid, "Starting session");
    state.sessions.open(&sid).await?;
    Ok(Json(StartResponse { session_id: sid }))
}

/// Ends a session and deletes its swipes and memory
pub async fn end(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(sid): Path<String>,
) -> AppResult<Json<EndResponse>> {
    tracing::info!(request_id = %request_id, session_id = %sid, "Ending session");
    state.sessions.end(&sid).await?;

    // Stored data is already gone; a stale insight is only logged
    if let Err(e) = state.narrator.forget(&sid).await {
        tracing::warn!(
            request_id = %request_id,
            session_id = %sid,
            error = %e,
            "Failed to drop cached insights"
        );
    }

    Ok(Json(EndResponse { ended: true }))
}
