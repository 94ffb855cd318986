//! Shared application state.

use std::sync::Arc;

use lathi_core::clock::{Clock, SystemClock};
use lathi_core::repository::{
    ContentStore, LeaderboardRepository, ProgressRepository, SessionRepository,
    VocabularyRepository,
};
use lathi_store::{
    PgContentStore, PgLeaderboardRepository, PgProgressRepository, PgSessionRepository,
    PgVocabularyRepository,
};
use lathi_story::application::assets::AssetUrlResolver;
use lathi_story::application::command_handlers::StoryPorts;
use sqlx::PgPool;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Source of timestamps.
    pub clock: Arc<dyn Clock>,
    /// Chapters and slides.
    pub content: Arc<dyn ContentStore>,
    /// Session rows.
    pub sessions: Arc<dyn SessionRepository>,
    /// Vocabulary grants.
    pub vocabulary: Arc<dyn VocabularyRepository>,
    /// Progress counters and title.
    pub progress: Arc<dyn ProgressRepository>,
    /// Leaderboard scores.
    pub leaderboard: Arc<dyn LeaderboardRepository>,
    /// Object-storage URL resolution for content assets.
    pub assets: Arc<AssetUrlResolver>,
}

impl AppState {
    /// Wires every port to its `PostgreSQL` adapter over one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool, assets: AssetUrlResolver) -> Self {
        Self {
            clock: Arc::new(SystemClock),
            content: Arc::new(PgContentStore::new(pool.clone())),
            sessions: Arc::new(PgSessionRepository::new(pool.clone())),
            vocabulary: Arc::new(PgVocabularyRepository::new(pool.clone())),
            progress: Arc::new(PgProgressRepository::new(pool.clone())),
            leaderboard: Arc::new(PgLeaderboardRepository::new(pool.clone())),
            assets: Arc::new(assets),
        }
    }

    /// Borrows the collaborators `SubmitAction` needs.
    #[must_use]
    pub fn story_ports(&self) -> StoryPorts<'_> {
        StoryPorts {
            clock: self.clock.as_ref(),
            content: self.content.as_ref(),
            sessions: self.sessions.as_ref(),
            vocabulary: self.vocabulary.as_ref(),
            progress: self.progress.as_ref(),
            leaderboard: self.leaderboard.as_ref(),
        }
    }
}
