use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;

use swipe_api::{
    db::InMemoryStore,
    error::AppResult,
    routes::{create_router, AppState},
    services::{
        insights::TasteProfile, FirstPicker, NarrativeGenerator, SessionRegistry,
        TemplateNarrator,
    },
};

/// Template narrator that records which sessions it was told to forget
#[derive(Default)]
struct RecordingNarrator {
    forgotten: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl NarrativeGenerator for RecordingNarrator {
    async fn summarize(&self, profile: &TasteProfile) -> AppResult<String> {
        TemplateNarrator.summarize(profile).await
    }

    fn name(&self) -> &'static str {
        "recording"
    }

    async fn forget(&self, session_id: &str) -> AppResult<()> {
        self.forgotten.lock().unwrap().push(session_id.to_string());
        Ok(())
    }
}

struct Catalog {
    thai: i64,
    curries: i64,
    green_curry: i64,
}

fn seeded_store() -> (Arc<InMemoryStore>, Catalog) {
    let store = InMemoryStore::new();
    let thai = store.add_category("Thai", None);
    let curries = store.add_category("Curries", Some(thai));
    let green_curry = store.add_food(
        "Green Curry",
        &["basil", "coconut milk"],
        Some(curries),
        Some(vec![1.0, 0.0]),
    );
    store.add_food("Red Curry", &["chili"], Some(curries), Some(vec![0.8, 0.3]));
    (
        Arc::new(store),
        Catalog {
            thai,
            curries,
            green_curry,
        },
    )
}

fn create_test_server(store: Arc<InMemoryStore>) -> TestServer {
    create_test_server_with(store, Arc::new(TemplateNarrator))
}

fn create_test_server_with(
    store: Arc<InMemoryStore>,
    narrator: Arc<dyn NarrativeGenerator>,
) -> TestServer {
    let sessions = SessionRegistry::new(store.clone(), Duration::from_secs(60));
    let state = AppState::new(store, Arc::new(FirstPicker), narrator, sessions);
    let app = create_router(state, &[]);
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (store, _) = seeded_store();
    let server = create_test_server(store);
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (store, _) = seeded_store();
    let server = create_test_server(store);
    let response = server.get("/health").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_start_returns_session_id() {
    let (store, _) = seeded_store();
    let server = create_test_server(store);

    let response = server.get("/start/abc").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["session_id"], "abc");
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let (store, _) = seeded_store();
    let server = create_test_server(store);

    let response = server.get("/next/ghost").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_full_swipe_flow() {
    let (store, catalog) = seeded_store();
    let server = create_test_server(store.clone());
    server.get("/start/s1").await.assert_status_ok();

    // Root selection
    let response = server.get("/next/s1").await;
    response.assert_status_ok();
    let item: Value = response.json();
    assert_eq!(item["type"], "category");
    assert_eq!(item["id"], catalog.thai);
    assert_eq!(item["ingredients"].as_array().unwrap().len(), 0);

    server
        .post(&format!("/swipe/s1/{}/right?item_type=category", catalog.thai))
        .await
        .assert_status_ok();
    server
        .post(&format!("/swipe/s1/{}/right?item_type=category", catalog.curries))
        .await
        .assert_status_ok();

    // Curries is a leaf, so foods come next
    let item: Value = server.get("/next/s1").await.json();
    assert_eq!(item["type"], "food");
    assert_eq!(item["id"], catalog.green_curry);
    assert_eq!(item["name"], "Green Curry");

    // item_type defaults to food
    let response = server
        .post(&format!("/swipe/s1/{}/super", catalog.green_curry))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["ok"], true);

    let response = server.post("/super/s1").await;
    response.assert_status_ok();
    let stats: Value = response.json();
    assert_eq!(stats["right_swipes"], 2);
    assert_eq!(stats["left_swipes"], 0);
    assert_eq!(stats["total_swipes"], 3);
    assert_eq!(stats["superlike"]["name"], "Green Curry");
    assert!(stats["insights"].as_str().unwrap().contains("Green Curry"));
}

#[tokio::test]
async fn test_invalid_action_is_bad_request() {
    let (store, catalog) = seeded_store();
    let server = create_test_server(store);
    server.get("/start/s1").await;

    let response = server
        .post(&format!("/swipe/s1/{}/up", catalog.green_curry))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Invalid swipe action"));
}

#[tokio::test]
async fn test_invalid_item_type_is_bad_request() {
    let (store, catalog) = seeded_store();
    let server = create_test_server(store);
    server.get("/start/s1").await;

    let response = server
        .post(&format!("/swipe/s1/{}/left?item_type=drink", catalog.green_curry))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_exhausted_session_is_not_found() {
    let store = Arc::new(InMemoryStore::new());
    let server = create_test_server(store);
    server.get("/start/empty").await.assert_status_ok();

    let response = server.get("/next/empty").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("No more recommendations"));
}

#[tokio::test]
async fn test_end_session_deletes_state() {
    let (store, catalog) = seeded_store();
    let server = create_test_server(store.clone());
    server.get("/start/s1").await;
    server
        .post(&format!("/swipe/s1/{}/left?item_type=category", catalog.thai))
        .await
        .assert_status_ok();

    server.post("/end_session/s1").await.assert_status_ok();

    assert!(store.ledger("s1").is_empty());
    server
        .get("/next/s1")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_end_session_drops_cached_insights() {
    let (store, _) = seeded_store();
    let narrator = Arc::new(RecordingNarrator::default());
    let server = create_test_server_with(store, narrator.clone());

    server.get("/start/reused").await.assert_status_ok();
    server.post("/end_session/reused").await.assert_status_ok();

    assert_eq!(*narrator.forgotten.lock().unwrap(), vec!["reused".to_string()]);
}

#[tokio::test]
async fn test_session_id_can_be_reused_after_end() {
    let (store, catalog) = seeded_store();
    let server = create_test_server(store);

    server.get("/start/again").await.assert_status_ok();
    server
        .post(&format!("/swipe/again/{}/left?item_type=category", catalog.thai))
        .await
        .assert_status_ok();
    server.post("/end_session/again").await.assert_status_ok();

    // A fresh session under the same id starts from an empty ledger
    server.get("/start/again").await.assert_status_ok();
    let stats: Value = server.post("/super/again").await.json();
    assert_eq!(stats["left_swipes"], 0);
    assert_eq!(stats["total_swipes"], 1);
}
