//! In-memory vocabulary, progress and leaderboard ports.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lathi_core::error::DomainError;
use lathi_core::progress::{Title, UserProgress};
use lathi_core::repository::{LeaderboardRepository, ProgressRepository, VocabularyRepository};
use uuid::Uuid;

/// Vocabulary grants held in memory.
#[derive(Debug, Default)]
pub struct InMemoryVocabularyRepository {
    grants: Mutex<HashMap<Uuid, HashSet<Uuid>>>,
}

impl InMemoryVocabularyRepository {
    /// Creates a repository with no grants.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Vocabulary ids granted to the user.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn granted(&self, user_id: Uuid) -> HashSet<Uuid> {
        self.grants
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl VocabularyRepository for InMemoryVocabularyRepository {
    async fn unlock(
        &self,
        user_id: Uuid,
        vocabulary_ids: &[Uuid],
        _unlocked_at: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let mut grants = self.grants.lock().unwrap();
        let granted = grants.entry(user_id).or_default();
        let newly = vocabulary_ids
            .iter()
            .filter(|id| granted.insert(**id))
            .count();
        Ok(newly as u64)
    }
}

/// Progress counters held in memory.
#[derive(Debug, Default)]
pub struct InMemoryProgressRepository {
    rows: Mutex<HashMap<Uuid, UserProgress>>,
    fail_title_writes: AtomicBool,
}

impl InMemoryProgressRepository {
    /// Creates a repository where every user has zero progress.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the user's progress.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn set(&self, user_id: Uuid, progress: UserProgress) {
        self.rows.lock().unwrap().insert(user_id, progress);
    }

    /// The user's current progress.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn progress(&self, user_id: Uuid) -> UserProgress {
        self.rows
            .lock()
            .unwrap()
            .get(&user_id)
            .copied()
            .unwrap_or_default()
    }

    /// Makes every later `set_title` call fail with an infrastructure error
    /// while the counters keep working.
    pub fn fail_title_writes(&self) {
        self.fail_title_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressRepository {
    async fn get_progress(&self, user_id: Uuid) -> Result<UserProgress, DomainError> {
        Ok(self.progress(user_id))
    }

    async fn raise_last_chapter_completed(
        &self,
        user_id: Uuid,
        order_index: i32,
    ) -> Result<bool, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let progress = rows.entry(user_id).or_default();
        if order_index > progress.last_chapter_completed {
            progress.last_chapter_completed = order_index;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn increment_words_collected(
        &self,
        user_id: Uuid,
        delta: i64,
    ) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let progress = rows.entry(user_id).or_default();
        progress.total_words_collected += delta;
        Ok(())
    }

    async fn set_title(&self, user_id: Uuid, title: Title) -> Result<(), DomainError> {
        if self.fail_title_writes.load(Ordering::SeqCst) {
            return Err(DomainError::Infrastructure("title column locked".into()));
        }
        self.rows.lock().unwrap().entry(user_id).or_default().current_title = title;
        Ok(())
    }
}

/// A leaderboard that records every score it is given.
#[derive(Debug, Default)]
pub struct RecordingLeaderboard {
    scores: Mutex<Vec<(Uuid, i64)>>,
}

impl RecordingLeaderboard {
    /// Creates an empty leaderboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded `(user, score)` pairs in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn scores(&self) -> Vec<(Uuid, i64)> {
        self.scores.lock().unwrap().clone()
    }
}

#[async_trait]
impl LeaderboardRepository for RecordingLeaderboard {
    async fn record_score(&self, user_id: Uuid, score: i64) -> Result<(), DomainError> {
        self.scores.lock().unwrap().push((user_id, score));
        Ok(())
    }
}

/// A vocabulary repository whose every call fails.
#[derive(Debug)]
pub struct FailingVocabularyRepository;

#[async_trait]
impl VocabularyRepository for FailingVocabularyRepository {
    async fn unlock(
        &self,
        _user_id: Uuid,
        _vocabulary_ids: &[Uuid],
        _unlocked_at: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

/// A progress repository whose every call fails.
#[derive(Debug)]
pub struct FailingProgressRepository;

#[async_trait]
impl ProgressRepository for FailingProgressRepository {
    async fn get_progress(&self, _user_id: Uuid) -> Result<UserProgress, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn raise_last_chapter_completed(
        &self,
        _user_id: Uuid,
        _order_index: i32,
    ) -> Result<bool, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn increment_words_collected(
        &self,
        _user_id: Uuid,
        _delta: i64,
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn set_title(&self, _user_id: Uuid, _title: Title) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
