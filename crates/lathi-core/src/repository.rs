//! Storage ports.
//!
//! The story engine is written against these traits; `lathi-store` provides
//! the PostgreSQL implementations and `lathi-test-support` the in-memory ones.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::{Chapter, ChapterContent, Slide, Vocabulary};
use crate::error::DomainError;
use crate::progress::{Title, UserProgress};

/// One line of a session's dialogue history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Who spoke the line.
    pub speaker: String,
    /// What was said.
    pub text: String,
    /// `true` if the player authored the line by picking a choice.
    pub is_user: bool,
    /// When the line was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Stored representation of a user's play state for one chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    /// Session identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Chapter being played.
    pub chapter_id: Uuid,
    /// Slide the session is positioned on.
    pub current_slide_id: Uuid,
    /// Remaining hearts, within `[0, 3]`.
    pub current_hearts: i32,
    /// Terminal-fail flag.
    pub is_game_over: bool,
    /// Terminal-success flag.
    pub is_completed: bool,
    /// Append-only dialogue history.
    pub history_log: Vec<HistoryEntry>,
    /// Optimistic concurrency token, bumped on every write.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last write timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Read-only access to chapters, slides and their vocabulary.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All chapters ordered by `order_index`.
    async fn list_chapters(&self) -> Result<Vec<Chapter>, DomainError>;

    /// One chapter with its slides (ordered by identifier) and each slide's
    /// vocabulary. `None` if the chapter does not exist.
    async fn get_chapter(&self, chapter_id: Uuid) -> Result<Option<ChapterContent>, DomainError>;

    /// One slide with its vocabulary. `None` if the slide does not exist.
    async fn get_slide(&self, slide_id: Uuid) -> Result<Option<Slide>, DomainError>;

    /// Total number of chapters.
    async fn count_chapters(&self) -> Result<i64, DomainError>;
}

/// Write access used by the content import.
#[async_trait]
pub trait ContentWriter: Send + Sync {
    /// Inserts vocabulary entries, updating the words of existing ids.
    async fn upsert_vocabulary(&self, entries: &[Vocabulary]) -> Result<(), DomainError>;

    /// The content hash stored for the chapter at `order_index`, if any.
    async fn chapter_hash(&self, order_index: i32) -> Result<Option<String>, DomainError>;

    /// Replaces the chapter at the same `order_index` (and everything that
    /// references it) with `content`.
    async fn replace_chapter(
        &self,
        content: &ChapterContent,
        content_hash: &str,
    ) -> Result<(), DomainError>;
}

/// Persistence for one session row per (user, chapter).
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Finds the session for the pair. `None` if the chapter was never
    /// started.
    async fn find(&self, user_id: Uuid, chapter_id: Uuid)
    -> Result<Option<StoredSession>, DomainError>;

    /// Inserts `session`, or overwrites the play state of the existing row
    /// for the same (user, chapter) while keeping its identifier and
    /// creation time. Returns the row as stored.
    async fn create_or_replace(&self, session: &StoredSession)
    -> Result<StoredSession, DomainError>;

    /// Overwrites the mutable fields of an existing row, provided its stored
    /// version still equals `session.version`. Returns the new version.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ConcurrencyConflict` if the row was written by
    /// someone else since it was loaded.
    async fn save(&self, session: &StoredSession) -> Result<i64, DomainError>;
}

/// Idempotent grants of vocabulary entries to users.
#[async_trait]
pub trait VocabularyRepository: Send + Sync {
    /// Grants `vocabulary_ids` to the user and returns how many were not
    /// granted before. An empty slice is a no-op returning 0.
    async fn unlock(
        &self,
        user_id: Uuid,
        vocabulary_ids: &[Uuid],
        unlocked_at: DateTime<Utc>,
    ) -> Result<u64, DomainError>;
}

/// Per-user progress counters.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Reads the user's progress; a user with no record has zero progress.
    async fn get_progress(&self, user_id: Uuid) -> Result<UserProgress, DomainError>;

    /// Raises `last_chapter_completed` to `order_index` if that is an
    /// increase. Returns `true` if the value changed.
    async fn raise_last_chapter_completed(
        &self,
        user_id: Uuid,
        order_index: i32,
    ) -> Result<bool, DomainError>;

    /// Atomically adds `delta` to the collected-word counter.
    async fn increment_words_collected(&self, user_id: Uuid, delta: i64)
    -> Result<(), DomainError>;

    /// Sets the user's title tier.
    async fn set_title(&self, user_id: Uuid, title: Title) -> Result<(), DomainError>;
}

/// Sink for leaderboard scores.
#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    /// Records the user's current score, replacing any previous one.
    async fn record_score(&self, user_id: Uuid, score: i64) -> Result<(), DomainError>;
}
