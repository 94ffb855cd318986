//! Route modules organized by bounded context.

use axum::Router;

use crate::state::AppState;

pub mod health;
pub mod story;

/// Returns every route the server exposes, before state and middleware are
/// attached.
pub fn app_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/stories", story::router())
}
