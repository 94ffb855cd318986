//! Routes for the Story Session bounded context.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use lathi_core::repository::HistoryEntry;
use lathi_story::application::query_handlers::{ChapterContentView, ChapterSummary, SessionView};
use lathi_story::application::{command_handlers, query_handlers};
use lathi_story::domain::commands;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, CurrentUser};
use crate::state::AppState;

/// Request body for POST /action.
#[derive(Debug, Deserialize)]
pub struct SubmitActionRequest {
    /// The chapter being played.
    pub chapter_id: Uuid,
    /// The slide the client is showing.
    pub slide_id: Uuid,
    /// Zero-based choice; omit on slides without choices.
    #[serde(default)]
    pub choice_index: Option<i32>,
}

/// Response body for POST /chapters/{chapter_id}/start.
#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: Uuid,
    pub current_slide_id: Uuid,
    pub current_hearts: i32,
}

/// Response body for POST /action.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub is_game_over: bool,
    pub is_completed: bool,
    pub message: String,
    pub remaining_hearts: i32,
    pub next_slide_id: Option<Uuid>,
    pub history_log: Vec<HistoryEntry>,
}

/// GET /chapters
#[instrument(skip_all, fields(user_id = %user_id))]
async fn list_chapters(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<ChapterSummary>>, ApiError> {
    let chapters = query_handlers::list_chapters(
        user_id,
        state.content.as_ref(),
        state.progress.as_ref(),
        &state.assets,
    )
    .await?;
    Ok(Json(chapters))
}

/// GET /chapters/{chapter_id}/content
#[instrument(skip_all, fields(user_id = %user_id, chapter_id = %chapter_id))]
async fn get_chapter_content(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(chapter_id): ApiPath<Uuid>,
) -> Result<Json<ChapterContentView>, ApiError> {
    let content =
        query_handlers::get_chapter_content(chapter_id, state.content.as_ref(), &state.assets)
            .await?;
    Ok(Json(content))
}

/// GET /chapters/{chapter_id}/session
///
/// Responds with JSON `null` if the chapter was never started.
#[instrument(skip_all, fields(user_id = %user_id, chapter_id = %chapter_id))]
async fn get_session(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(chapter_id): ApiPath<Uuid>,
) -> Result<Json<Option<SessionView>>, ApiError> {
    let session =
        query_handlers::get_user_session(user_id, chapter_id, state.sessions.as_ref()).await?;
    Ok(Json(session))
}

/// POST /chapters/{chapter_id}/start
#[instrument(skip_all, fields(user_id = %user_id, chapter_id = %chapter_id))]
async fn start_session(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    ApiPath(chapter_id): ApiPath<Uuid>,
) -> Result<Json<StartSessionResponse>, ApiError> {
    let command = commands::StartSession {
        correlation_id: Uuid::new_v4(),
        user_id,
        chapter_id,
    };

    info!(correlation_id = %command.correlation_id, "handling start_session command");

    let started = command_handlers::handle_start_session(
        &command,
        state.clock.as_ref(),
        state.content.as_ref(),
        state.sessions.as_ref(),
    )
    .await?;

    Ok(Json(StartSessionResponse {
        session_id: started.session_id,
        current_slide_id: started.current_slide_id,
        current_hearts: started.current_hearts,
    }))
}

/// POST /action
#[instrument(skip_all, fields(
    user_id = %user_id,
    chapter_id = %request.chapter_id,
    slide_id = %request.slide_id,
))]
async fn submit_action(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    ApiJson(request): ApiJson<SubmitActionRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let command = commands::SubmitAction {
        correlation_id: Uuid::new_v4(),
        user_id,
        chapter_id: request.chapter_id,
        slide_id: request.slide_id,
        choice_index: request.choice_index,
    };

    info!(correlation_id = %command.correlation_id, "handling submit_action command");

    let outcome = command_handlers::handle_submit_action(&command, state.story_ports()).await?;

    Ok(Json(ActionResponse {
        is_game_over: outcome.is_game_over,
        is_completed: outcome.is_completed,
        message: outcome.message,
        remaining_hearts: outcome.remaining_hearts,
        next_slide_id: outcome.next_slide_id,
        history_log: outcome.history_log,
    }))
}

/// Returns the router for the story context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chapters", get(list_chapters))
        .route("/chapters/{chapter_id}/content", get(get_chapter_content))
        .route("/chapters/{chapter_id}/session", get(get_session))
        .route("/chapters/{chapter_id}/start", post(start_session))
        .route("/action", post(submit_action))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use lathi_core::content::ChapterContent;
    use lathi_story::application::assets::AssetUrlResolver;
    use lathi_test_support::fixtures::{branching_chapter, linear_chapter};
    use lathi_test_support::{
        FailingSessionRepository, FixedClock, InMemoryContentStore, InMemoryProgressRepository,
        InMemorySessionRepository, InMemoryVocabularyRepository, RecordingLeaderboard,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::extract::USER_ID_HEADER;

    fn app_state_with(chapters: Vec<ChapterContent>) -> AppState {
        AppState {
            clock: Arc::new(FixedClock(Utc::now())),
            content: Arc::new(InMemoryContentStore::new(chapters)),
            sessions: Arc::new(InMemorySessionRepository::new()),
            vocabulary: Arc::new(InMemoryVocabularyRepository::new()),
            progress: Arc::new(InMemoryProgressRepository::new()),
            leaderboard: Arc::new(RecordingLeaderboard::new()),
            assets: Arc::new(AssetUrlResolver::new("http://assets.test", "lathi")),
        }
    }

    fn request(method: &str, uri: &str, user_id: Uuid, body: Option<&Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(USER_ID_HEADER, user_id.to_string());
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_of(response: axum::response::Response) -> Value {
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    #[tokio::test]
    async fn test_start_session_returns_first_slide_and_full_hearts() {
        // Arrange
        let content = linear_chapter(1, 3);
        let chapter_id = content.chapter.id;
        let first_slide = content.slides[0].id;
        let app = router().with_state(app_state_with(vec![content]));

        // Act
        let response = app
            .oneshot(request(
                "POST",
                &format!("/chapters/{chapter_id}/start"),
                Uuid::new_v4(),
                None,
            ))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_of(response).await;
        assert_eq!(json["current_slide_id"], first_slide.to_string());
        assert_eq!(json["current_hearts"], 3);
        Uuid::parse_str(json["session_id"].as_str().unwrap()).unwrap();
    }

    #[tokio::test]
    async fn test_start_unknown_chapter_returns_404() {
        let app = router().with_state(app_state_with(Vec::new()));

        let response = app
            .oneshot(request(
                "POST",
                &format!("/chapters/{}/start", Uuid::new_v4()),
                Uuid::new_v4(),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_of(response).await["error"], "chapter_not_found");
    }

    #[tokio::test]
    async fn test_session_is_null_before_start() {
        let content = linear_chapter(1, 2);
        let chapter_id = content.chapter.id;
        let app = router().with_state(app_state_with(vec![content]));

        let response = app
            .oneshot(request(
                "GET",
                &format!("/chapters/{chapter_id}/session"),
                Uuid::new_v4(),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(json_of(response).await.is_null());
    }

    #[tokio::test]
    async fn test_submit_action_without_session_returns_404() {
        // Arrange
        let content = branching_chapter(1, &[-1, 1]);
        let body = serde_json::json!({
            "chapter_id": content.chapter.id,
            "slide_id": content.slides[0].id,
            "choice_index": 0,
        });
        let app = router().with_state(app_state_with(vec![content]));

        // Act
        let response = app
            .oneshot(request("POST", "/action", Uuid::new_v4(), Some(&body)))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_of(response).await["error"], "session_not_started");
    }

    #[tokio::test]
    async fn test_submit_action_rejects_missing_fields_as_validation_error() {
        let app = router().with_state(app_state_with(Vec::new()));

        let response = app
            .oneshot(request(
                "POST",
                "/action",
                Uuid::new_v4(),
                Some(&serde_json::json!({ "choice_index": 0 })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_of(response).await;
        assert_eq!(json["error"], "validation_error");
        assert!(json["message"].as_str().unwrap().contains("chapter_id"));
    }

    #[tokio::test]
    async fn test_submit_action_rejects_non_json_body_as_validation_error() {
        let app = router().with_state(app_state_with(Vec::new()));
        let request = Request::builder()
            .method("POST")
            .uri("/action")
            .header(USER_ID_HEADER, Uuid::new_v4().to_string())
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_of(response).await["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_malformed_chapter_id_returns_validation_error() {
        let app = router().with_state(app_state_with(Vec::new()));

        let response = app
            .oneshot(request(
                "GET",
                "/chapters/not-a-uuid/content",
                Uuid::new_v4(),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_of(response).await;
        assert_eq!(json["error"], "validation_error");
        assert!(json["message"].is_string());
    }

    #[tokio::test]
    async fn test_routes_require_user_header() {
        let app = router().with_state(app_state_with(Vec::new()));
        let request = Request::builder()
            .method("GET")
            .uri("/chapters")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_of(response).await["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_storage_failure_returns_500() {
        // Arrange
        let content = linear_chapter(1, 2);
        let chapter_id = content.chapter.id;
        let state = AppState {
            sessions: Arc::new(FailingSessionRepository),
            ..app_state_with(vec![content])
        };
        let app = router().with_state(state);

        // Act
        let response = app
            .oneshot(request(
                "GET",
                &format!("/chapters/{chapter_id}/session"),
                Uuid::new_v4(),
                None,
            ))
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_of(response).await["error"], "infrastructure_error");
    }
}
