use std::sync::Arc;

use axum::{
    http::{HeaderValue, StatusCode},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    db::SwipeStore,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::{NarrativeGenerator, Picker, SessionRegistry},
};

pub mod sessions;
pub mod swipes;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SwipeStore>,
    pub picker: Arc<dyn Picker>,
    pub narrator: Arc<dyn NarrativeGenerator>,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SwipeStore>,
        picker: Arc<dyn Picker>,
        narrator: Arc<dyn NarrativeGenerator>,
        sessions: SessionRegistry,
    ) -> Self {
        Self {
            store,
            picker,
            narrator,
            sessions,
        }
    }
}

/// Creates the application router with all routes
///
/// An empty `cors_origins` list allows any origin.
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/start/:sid", get(sessions::start))
        .route("/end_session/:sid", post(sessions::end))
        .route("/next/:sid", get(swipes::next))
        .route("/swipe/:sid/:item_id/:action", post(swipes::swipe))
        .route("/super/:sid", post(swipes::stats))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(cors_layer(cors_origins)),
        )
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(allowed)
    }
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Backend is running" }))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
