//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use lathi_core::content::ChapterContent;
use lathi_story::application::assets::AssetUrlResolver;
use lathi_test_support::{
    FixedClock, InMemoryContentStore, InMemoryProgressRepository, InMemorySessionRepository,
    InMemoryVocabularyRepository, RecordingLeaderboard,
};
use tower::ServiceExt;
use uuid::Uuid;

use lathi_api::extract::USER_ID_HEADER;
use lathi_api::routes;
use lathi_api::state::AppState;

/// The in-memory ports behind a test app, kept for assertions.
pub struct TestBackend {
    pub content: Arc<InMemoryContentStore>,
    pub sessions: Arc<InMemorySessionRepository>,
    pub vocabulary: Arc<InMemoryVocabularyRepository>,
    pub progress: Arc<InMemoryProgressRepository>,
    pub leaderboard: Arc<RecordingLeaderboard>,
}

impl TestBackend {
    /// A backend serving `chapters` with no sessions or progress.
    pub fn new(chapters: Vec<ChapterContent>) -> Self {
        Self {
            content: Arc::new(InMemoryContentStore::new(chapters)),
            sessions: Arc::new(InMemorySessionRepository::new()),
            vocabulary: Arc::new(InMemoryVocabularyRepository::new()),
            progress: Arc::new(InMemoryProgressRepository::new()),
            leaderboard: Arc::new(RecordingLeaderboard::new()),
        }
    }

    /// Build the full app router over these ports with a fixed clock. Uses the
    /// same route structure as `main.rs`.
    pub fn app(&self) -> Router {
        let state = AppState {
            clock: Arc::new(FixedClock(
                chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
            )),
            content: self.content.clone(),
            sessions: self.sessions.clone(),
            vocabulary: self.vocabulary.clone(),
            progress: self.progress.clone(),
            leaderboard: self.leaderboard.clone(),
            assets: Arc::new(AssetUrlResolver::new("https://cdn.lathi.test", "lathi")),
        };
        routes::app_router().with_state(state)
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request as `user_id` with an optional JSON body and return
/// the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    user_id: Uuid,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(USER_ID_HEADER, user_id.to_string());
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    send(app, request).await
}

/// Send a GET request as `user_id` and return the response.
pub async fn get_json(app: Router, uri: &str, user_id: Uuid) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header(USER_ID_HEADER, user_id.to_string())
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}
