//! Command handlers for the Story Session context.
//!
//! This module contains application-level command handler functions that
//! orchestrate domain logic: load the session, apply the command, persist the
//! row, then run the best-effort progress side effects.

use lathi_core::clock::Clock;
use lathi_core::content::Slide;
use lathi_core::error::DomainError;
use lathi_core::repository::{
    ContentStore, LeaderboardRepository, ProgressRepository, SessionRepository,
    VocabularyRepository,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::aggregates::{ActionOutcome, StorySession};
use crate::domain::commands::{StartSession, SubmitAction};
use crate::domain::rules::{leaderboard_score, title_for_completion};

/// The collaborators `SubmitAction` reads from and writes to.
#[derive(Clone, Copy)]
pub struct StoryPorts<'a> {
    /// Source of timestamps.
    pub clock: &'a dyn Clock,
    /// Chapters and slides.
    pub content: &'a dyn ContentStore,
    /// Session rows.
    pub sessions: &'a dyn SessionRepository,
    /// Vocabulary grants.
    pub vocabulary: &'a dyn VocabularyRepository,
    /// Progress counters and title.
    pub progress: &'a dyn ProgressRepository,
    /// Leaderboard scores.
    pub leaderboard: &'a dyn LeaderboardRepository,
}

/// Result of a successfully started session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStarted {
    /// The session row identifier.
    pub session_id: Uuid,
    /// The chapter's first slide.
    pub current_slide_id: Uuid,
    /// Hearts at the start.
    pub current_hearts: i32,
}

/// Handles the `StartSession` command: positions a fresh session on the
/// chapter's first slide, overwriting any earlier session for the same
/// chapter.
///
/// # Errors
///
/// Returns `DomainError::ChapterNotFound` if the chapter does not exist,
/// `DomainError::Validation` if it has no slides, and
/// `DomainError::Infrastructure` if storage fails.
#[instrument(skip_all, fields(
    correlation_id = %command.correlation_id,
    user_id = %command.user_id,
    chapter_id = %command.chapter_id,
))]
pub async fn handle_start_session(
    command: &StartSession,
    clock: &dyn Clock,
    content: &dyn ContentStore,
    sessions: &dyn SessionRepository,
) -> Result<SessionStarted, DomainError> {
    let chapter = content
        .get_chapter(command.chapter_id)
        .await?
        .ok_or(DomainError::ChapterNotFound(command.chapter_id))?;
    let first_slide = chapter.first_slide().ok_or_else(|| {
        DomainError::Validation(format!("chapter {} has no slides", command.chapter_id))
    })?;

    let session = StorySession::start(
        Uuid::now_v7(),
        command.user_id,
        command.chapter_id,
        first_slide.id,
        clock,
    );
    let stored = sessions.create_or_replace(&session.to_stored()).await?;

    info!(session_id = %stored.id, "story session started");

    Ok(SessionStarted {
        session_id: stored.id,
        current_slide_id: stored.current_slide_id,
        current_hearts: stored.current_hearts,
    })
}

/// Handles the `SubmitAction` command: validates the action against the
/// session and slide, persists the new session state, then unlocks the
/// slide's vocabulary and, on completion, raises the player's progress.
///
/// The side effects run only after the session write succeeded. Their
/// failures are logged and do not fail the action.
///
/// # Errors
///
/// Returns `DomainError::SessionNotStarted`, `DomainError::SessionEnded`,
/// `DomainError::SlideMismatch`, `DomainError::SlideNotFound` or
/// `DomainError::InvalidAction` for rejected actions (nothing is written),
/// `DomainError::ConcurrencyConflict` if the session changed underneath, and
/// `DomainError::Infrastructure` if storage fails.
#[instrument(skip_all, fields(
    correlation_id = %command.correlation_id,
    user_id = %command.user_id,
    chapter_id = %command.chapter_id,
    slide_id = %command.slide_id,
))]
pub async fn handle_submit_action(
    command: &SubmitAction,
    ports: StoryPorts<'_>,
) -> Result<ActionOutcome, DomainError> {
    let stored = ports
        .sessions
        .find(command.user_id, command.chapter_id)
        .await?
        .ok_or(DomainError::SessionNotStarted(command.chapter_id))?;
    let mut session = StorySession::from_stored(stored);
    session.ensure_actionable(command.slide_id)?;

    let slide = ports
        .content
        .get_slide(command.slide_id)
        .await?
        .ok_or(DomainError::SlideNotFound(command.slide_id))?;

    let outcome = session.apply_action(&slide, command.choice_index, ports.clock)?;
    ports.sessions.save(&session.to_stored()).await?;

    let mut score_changed = false;
    if outcome.is_game_over {
        info!(session_id = %session.id, "story session over, hearts ran out");
    }
    if outcome.is_completed {
        info!(session_id = %session.id, "chapter completed");
        score_changed |= record_completion(command.user_id, command.chapter_id, ports).await;
    }
    score_changed |= unlock_vocabulary(command.user_id, &slide, ports).await;
    if score_changed {
        refresh_score(command.user_id, ports).await;
    }

    Ok(outcome)
}

/// Raises the player's last completed chapter, then recomputes the title on
/// every completion. Returns `true` if the completed-chapter counter changed,
/// whether or not the title write succeeded.
async fn record_completion(user_id: Uuid, chapter_id: Uuid, ports: StoryPorts<'_>) -> bool {
    let raised = match raise_progress(user_id, chapter_id, ports).await {
        Ok(raised) => raised,
        Err(err) => {
            warn!(error = %err, "failed to record chapter completion");
            return false;
        }
    };
    if let Err(err) = assign_title(user_id, ports).await {
        warn!(error = %err, "failed to assign title");
    }
    raised
}

async fn raise_progress(
    user_id: Uuid,
    chapter_id: Uuid,
    ports: StoryPorts<'_>,
) -> Result<bool, DomainError> {
    let chapter = ports
        .content
        .get_chapter(chapter_id)
        .await?
        .ok_or(DomainError::ChapterNotFound(chapter_id))?;
    ports
        .progress
        .raise_last_chapter_completed(user_id, chapter.chapter.order_index)
        .await
}

async fn assign_title(user_id: Uuid, ports: StoryPorts<'_>) -> Result<(), DomainError> {
    let total_chapters = ports.content.count_chapters().await?;
    let progress = ports.progress.get_progress(user_id).await?;
    if let Some(title) = title_for_completion(progress.last_chapter_completed, total_chapters) {
        ports.progress.set_title(user_id, title).await?;
        info!(%title, "title assigned");
    }
    Ok(())
}

/// Grants the slide's vocabulary and counts the new words. Returns `true`
/// if any word was new.
async fn unlock_vocabulary(user_id: Uuid, slide: &Slide, ports: StoryPorts<'_>) -> bool {
    let vocabulary_ids = slide.vocabulary_ids();
    if vocabulary_ids.is_empty() {
        return false;
    }

    let newly_granted = match ports
        .vocabulary
        .unlock(user_id, &vocabulary_ids, ports.clock.now())
        .await
    {
        Ok(count) => count,
        Err(err) => {
            warn!(error = %err, "failed to unlock vocabulary");
            return false;
        }
    };
    if newly_granted == 0 {
        return false;
    }

    let delta = i64::try_from(newly_granted).unwrap_or(i64::MAX);
    if let Err(err) = ports.progress.increment_words_collected(user_id, delta).await {
        warn!(error = %err, newly_granted, "failed to count unlocked words");
        return false;
    }
    info!(newly_granted, "vocabulary unlocked");
    true
}

async fn refresh_score(user_id: Uuid, ports: StoryPorts<'_>) {
    let result = async {
        let progress = ports.progress.get_progress(user_id).await?;
        ports
            .leaderboard
            .record_score(user_id, leaderboard_score(&progress))
            .await
    }
    .await;

    if let Err(err) = result {
        warn!(error = %err, "failed to refresh leaderboard score");
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use lathi_core::content::{ChapterContent, Vocabulary};
    use lathi_core::error::DomainError;
    use lathi_core::progress::{Title, UserProgress};
    use lathi_core::repository::SessionRepository;
    use uuid::Uuid;

    use super::{StoryPorts, handle_start_session, handle_submit_action};
    use crate::domain::commands::{StartSession, SubmitAction};
    use crate::domain::rules::{COMPLETION_MESSAGE, MAX_HEARTS};
    use lathi_test_support::{
        FailingProgressRepository, FailingVocabularyRepository, FixedClock,
        InMemoryContentStore, InMemoryProgressRepository, InMemorySessionRepository,
        InMemoryVocabularyRepository, RecordingLeaderboard, fixtures,
    };

    struct Harness {
        clock: FixedClock,
        content: InMemoryContentStore,
        sessions: InMemorySessionRepository,
        vocabulary: InMemoryVocabularyRepository,
        progress: InMemoryProgressRepository,
        leaderboard: RecordingLeaderboard,
        user_id: Uuid,
    }

    impl Harness {
        fn new(chapters: Vec<ChapterContent>) -> Self {
            Self {
                clock: FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()),
                content: InMemoryContentStore::new(chapters),
                sessions: InMemorySessionRepository::new(),
                vocabulary: InMemoryVocabularyRepository::new(),
                progress: InMemoryProgressRepository::new(),
                leaderboard: RecordingLeaderboard::new(),
                user_id: Uuid::new_v4(),
            }
        }

        fn ports(&self) -> StoryPorts<'_> {
            StoryPorts {
                clock: &self.clock,
                content: &self.content,
                sessions: &self.sessions,
                vocabulary: &self.vocabulary,
                progress: &self.progress,
                leaderboard: &self.leaderboard,
            }
        }

        async fn start(&self, chapter_id: Uuid) -> Result<super::SessionStarted, DomainError> {
            let command = StartSession {
                correlation_id: Uuid::new_v4(),
                user_id: self.user_id,
                chapter_id,
            };
            handle_start_session(&command, &self.clock, &self.content, &self.sessions).await
        }

        async fn act(
            &self,
            chapter_id: Uuid,
            slide_id: Uuid,
            choice_index: Option<i32>,
        ) -> Result<crate::domain::aggregates::ActionOutcome, DomainError> {
            let command = SubmitAction {
                correlation_id: Uuid::new_v4(),
                user_id: self.user_id,
                chapter_id,
                slide_id,
                choice_index,
            };
            handle_submit_action(&command, self.ports()).await
        }
    }

    #[tokio::test]
    async fn test_handle_start_session_positions_on_first_slide() {
        // Arrange
        let chapter = fixtures::linear_chapter(1, 3);
        let chapter_id = chapter.chapter.id;
        let first_slide_id = chapter.slides[0].id;
        let harness = Harness::new(vec![chapter]);

        // Act
        let started = harness.start(chapter_id).await.unwrap();

        // Assert
        assert_eq!(started.current_slide_id, first_slide_id);
        assert_eq!(started.current_hearts, MAX_HEARTS);
        let stored = harness
            .sessions
            .find(harness.user_id, chapter_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, started.session_id);
        assert!(stored.history_log.is_empty());
        assert!(!stored.is_game_over);
        assert!(!stored.is_completed);
        assert_eq!(stored.created_at, harness.clock.0);
    }

    #[tokio::test]
    async fn test_handle_start_session_returns_not_found_for_unknown_chapter() {
        let harness = Harness::new(Vec::new());
        let chapter_id = Uuid::new_v4();

        let result = harness.start(chapter_id).await;

        match result {
            Err(DomainError::ChapterNotFound(id)) => assert_eq!(id, chapter_id),
            other => panic!("expected ChapterNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_start_session_rejects_chapter_without_slides() {
        let chapter = fixtures::linear_chapter(1, 0);
        let chapter_id = chapter.chapter.id;
        let harness = Harness::new(vec![chapter]);

        let result = harness.start(chapter_id).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_restarting_a_chapter_resets_the_session_row() {
        // Arrange
        let chapter = fixtures::branching_chapter(1, &[-1, 1]);
        let chapter_id = chapter.chapter.id;
        let first_slide_id = chapter.slides[0].id;
        let harness = Harness::new(vec![chapter]);
        let first = harness.start(chapter_id).await.unwrap();
        harness.act(chapter_id, first_slide_id, Some(0)).await.unwrap();

        // Act
        let second = harness.start(chapter_id).await.unwrap();

        // Assert
        assert_eq!(second.session_id, first.session_id);
        let stored = harness
            .sessions
            .find(harness.user_id, chapter_id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.history_log.is_empty());
        assert_eq!(stored.current_hearts, MAX_HEARTS);
        assert_eq!(stored.current_slide_id, first_slide_id);
        assert_eq!(harness.sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_linear_chapter_completes_and_raises_progress() {
        // Arrange
        let chapter = fixtures::linear_chapter(2, 3);
        let chapter_id = chapter.chapter.id;
        let slide_ids: Vec<Uuid> = chapter.slides.iter().map(|s| s.id).collect();
        let other_chapters = (1..=3)
            .filter(|i| *i != 2)
            .map(|i| fixtures::linear_chapter(i, 1));
        let mut chapters = vec![chapter];
        chapters.extend(other_chapters);
        let harness = Harness::new(chapters);
        harness.start(chapter_id).await.unwrap();

        // Act
        let first = harness.act(chapter_id, slide_ids[0], None).await.unwrap();
        let second = harness.act(chapter_id, slide_ids[1], None).await.unwrap();
        let third = harness.act(chapter_id, slide_ids[2], None).await.unwrap();

        // Assert
        assert_eq!(first.next_slide_id, Some(slide_ids[1]));
        assert!(!first.is_completed);
        assert_eq!(second.next_slide_id, Some(slide_ids[2]));
        assert!(third.is_completed);
        assert_eq!(third.message, COMPLETION_MESSAGE);
        assert_eq!(third.next_slide_id, None);
        assert_eq!(third.history_log.len(), 3);

        let progress = harness.progress.progress(harness.user_id);
        assert_eq!(progress.last_chapter_completed, 2);
        assert_eq!(progress.current_title, Title::Abdi);
        assert_eq!(harness.leaderboard.scores(), vec![(harness.user_id, 200)]);
    }

    #[tokio::test]
    async fn test_replaying_an_earlier_chapter_never_regresses_progress() {
        // Arrange
        let chapter = fixtures::linear_chapter(1, 1);
        let chapter_id = chapter.chapter.id;
        let slide_id = chapter.slides[0].id;
        let harness = Harness::new(vec![chapter, fixtures::linear_chapter(2, 1)]);
        harness.progress.set(
            harness.user_id,
            UserProgress {
                last_chapter_completed: 2,
                total_words_collected: 0,
                current_title: Title::Priyayi,
            },
        );
        harness.start(chapter_id).await.unwrap();

        // Act
        let outcome = harness.act(chapter_id, slide_id, None).await.unwrap();

        // Assert
        assert!(outcome.is_completed);
        let progress = harness.progress.progress(harness.user_id);
        assert_eq!(progress.last_chapter_completed, 2);
        assert_eq!(progress.current_title, Title::Priyayi);
        assert!(harness.leaderboard.scores().is_empty());
    }

    #[tokio::test]
    async fn test_replay_reassigns_title_without_raising_progress() {
        // Arrange
        let chapter = fixtures::linear_chapter(1, 1);
        let chapter_id = chapter.chapter.id;
        let slide_id = chapter.slides[0].id;
        let harness = Harness::new(vec![chapter, fixtures::linear_chapter(2, 1)]);
        harness.progress.set(
            harness.user_id,
            UserProgress {
                last_chapter_completed: 1,
                total_words_collected: 0,
                current_title: Title::Cantrik,
            },
        );
        harness.start(chapter_id).await.unwrap();

        // Act
        let outcome = harness.act(chapter_id, slide_id, None).await.unwrap();

        // Assert
        assert!(outcome.is_completed);
        let progress = harness.progress.progress(harness.user_id);
        assert_eq!(progress.last_chapter_completed, 1);
        assert_eq!(progress.current_title, Title::Abdi);
        assert!(harness.leaderboard.scores().is_empty());
    }

    #[tokio::test]
    async fn test_title_failure_still_refreshes_score_after_raise() {
        // Arrange
        let chapter = fixtures::linear_chapter(1, 1);
        let chapter_id = chapter.chapter.id;
        let slide_id = chapter.slides[0].id;
        let harness = Harness::new(vec![chapter]);
        harness.progress.fail_title_writes();
        harness.start(chapter_id).await.unwrap();

        // Act
        let outcome = harness.act(chapter_id, slide_id, None).await.unwrap();

        // Assert
        assert!(outcome.is_completed);
        let progress = harness.progress.progress(harness.user_id);
        assert_eq!(progress.last_chapter_completed, 1);
        assert_eq!(progress.current_title, Title::default());
        assert_eq!(harness.leaderboard.scores(), vec![(harness.user_id, 100)]);
    }

    #[tokio::test]
    async fn test_losing_all_hearts_ends_the_game() {
        // Arrange
        let chapter = fixtures::branching_chapter(1, &[-3, 1]);
        let chapter_id = chapter.chapter.id;
        let decision_id = chapter.slides[0].id;
        let harness = Harness::new(vec![chapter]);
        harness.start(chapter_id).await.unwrap();

        // Act
        let outcome = harness.act(chapter_id, decision_id, Some(0)).await.unwrap();

        // Assert
        assert!(outcome.is_game_over);
        assert_eq!(outcome.remaining_hearts, 0);
        assert!(outcome.message.contains(fixtures::DECISION_SPEAKER));
        let stored = harness
            .sessions
            .find(harness.user_id, chapter_id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_game_over);
        assert_eq!(stored.current_slide_id, decision_id);
        assert_eq!(harness.progress.progress(harness.user_id), UserProgress::default());
    }

    #[tokio::test]
    async fn test_ended_session_rejects_actions_without_writing() {
        // Arrange
        let chapter = fixtures::branching_chapter(1, &[-3]);
        let chapter_id = chapter.chapter.id;
        let decision_id = chapter.slides[0].id;
        let harness = Harness::new(vec![chapter]);
        harness.start(chapter_id).await.unwrap();
        harness.act(chapter_id, decision_id, Some(0)).await.unwrap();
        let writes = harness.sessions.writes();

        // Act
        let result = harness.act(chapter_id, decision_id, Some(0)).await;

        // Assert
        assert!(matches!(result, Err(DomainError::SessionEnded(_))));
        assert_eq!(harness.sessions.writes(), writes);
    }

    #[tokio::test]
    async fn test_invalid_choice_leaves_session_untouched() {
        // Arrange
        let chapter = fixtures::branching_chapter(1, &[-3, 1]);
        let chapter_id = chapter.chapter.id;
        let decision_id = chapter.slides[0].id;
        let harness = Harness::new(vec![chapter]);
        harness.start(chapter_id).await.unwrap();
        let before = harness
            .sessions
            .find(harness.user_id, chapter_id)
            .await
            .unwrap();

        // Act
        let out_of_range = harness.act(chapter_id, decision_id, Some(5)).await;
        let missing = harness.act(chapter_id, decision_id, None).await;

        // Assert
        assert!(matches!(out_of_range, Err(DomainError::InvalidAction(_))));
        assert!(matches!(missing, Err(DomainError::InvalidAction(_))));
        let after = harness
            .sessions
            .find(harness.user_id, chapter_id)
            .await
            .unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_choice_index_on_linear_slide_is_rejected() {
        let chapter = fixtures::linear_chapter(1, 2);
        let chapter_id = chapter.chapter.id;
        let slide_id = chapter.slides[0].id;
        let harness = Harness::new(vec![chapter]);
        harness.start(chapter_id).await.unwrap();

        let result = harness.act(chapter_id, slide_id, Some(0)).await;

        assert!(matches!(result, Err(DomainError::InvalidAction(_))));
    }

    #[tokio::test]
    async fn test_action_before_start_is_rejected() {
        let chapter = fixtures::linear_chapter(1, 2);
        let chapter_id = chapter.chapter.id;
        let slide_id = chapter.slides[0].id;
        let harness = Harness::new(vec![chapter]);

        let result = harness.act(chapter_id, slide_id, None).await;

        match result {
            Err(DomainError::SessionNotStarted(id)) => assert_eq!(id, chapter_id),
            other => panic!("expected SessionNotStarted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_action_on_a_slide_other_than_current_is_rejected() {
        let chapter = fixtures::linear_chapter(1, 3);
        let chapter_id = chapter.chapter.id;
        let later_slide = chapter.slides[2].id;
        let harness = Harness::new(vec![chapter]);
        harness.start(chapter_id).await.unwrap();

        let result = harness.act(chapter_id, later_slide, None).await;

        assert!(matches!(result, Err(DomainError::SlideMismatch { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_write_is_reported_as_conflict() {
        // Arrange
        let chapter = fixtures::linear_chapter(1, 2);
        let chapter_id = chapter.chapter.id;
        let slide_id = chapter.slides[0].id;
        let harness = Harness::new(vec![chapter]);
        harness.start(chapter_id).await.unwrap();
        harness.sessions.fail_next_save_with_conflict();

        // Act
        let result = harness.act(chapter_id, slide_id, None).await;

        // Assert
        assert!(matches!(result, Err(DomainError::ConcurrencyConflict { .. })));
        assert!(harness.vocabulary.granted(harness.user_id).is_empty());
    }

    #[tokio::test]
    async fn test_vocabulary_is_counted_only_on_first_grant() {
        // Arrange
        let words = vec![
            fixtures::vocabulary("sonten", "sore", "sore"),
            fixtures::vocabulary("alit", "cilik", "kecil"),
        ];
        let mut chapter = fixtures::linear_chapter(1, 2);
        chapter.slides[0].vocabularies.clone_from(&words);
        let chapter_id = chapter.chapter.id;
        let slide_id = chapter.slides[0].id;
        let harness = Harness::new(vec![chapter]);

        // Act
        harness.start(chapter_id).await.unwrap();
        harness.act(chapter_id, slide_id, None).await.unwrap();
        harness.start(chapter_id).await.unwrap();
        harness.act(chapter_id, slide_id, None).await.unwrap();

        // Assert
        let progress = harness.progress.progress(harness.user_id);
        assert_eq!(progress.total_words_collected, 2);
        let granted = harness.vocabulary.granted(harness.user_id);
        assert!(words.iter().all(|w: &Vocabulary| granted.contains(&w.id)));
        assert_eq!(harness.leaderboard.scores(), vec![(harness.user_id, 20)]);
    }

    #[tokio::test]
    async fn test_history_grows_by_one_or_two_per_action() {
        // Arrange
        let chapter = fixtures::branching_chapter(1, &[0, 0]);
        let chapter_id = chapter.chapter.id;
        let decision_id = chapter.slides[0].id;
        let ending_id = chapter.slides[1].id;
        let harness = Harness::new(vec![chapter]);
        harness.start(chapter_id).await.unwrap();

        // Act
        let choice = harness.act(chapter_id, decision_id, Some(1)).await.unwrap();
        let linear = harness.act(chapter_id, ending_id, None).await.unwrap();

        // Assert
        assert_eq!(choice.history_log.len(), 2);
        assert_eq!(linear.history_log.len(), 3);
        assert_eq!(&linear.history_log[..2], &choice.history_log[..]);
    }

    #[tokio::test]
    async fn test_side_effect_failures_do_not_fail_the_action() {
        // Arrange
        let mut chapter = fixtures::linear_chapter(1, 1);
        chapter.slides[0].vocabularies = vec![fixtures::vocabulary("boten", "ora", "tidak")];
        let chapter_id = chapter.chapter.id;
        let slide_id = chapter.slides[0].id;
        let harness = Harness::new(vec![chapter]);
        harness.start(chapter_id).await.unwrap();
        let ports = StoryPorts {
            vocabulary: &FailingVocabularyRepository,
            progress: &FailingProgressRepository,
            ..harness.ports()
        };
        let command = SubmitAction {
            correlation_id: Uuid::new_v4(),
            user_id: harness.user_id,
            chapter_id,
            slide_id,
            choice_index: None,
        };

        // Act
        let outcome = handle_submit_action(&command, ports).await.unwrap();

        // Assert
        assert!(outcome.is_completed);
        let stored = harness
            .sessions
            .find(harness.user_id, chapter_id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_completed);
        assert!(harness.leaderboard.scores().is_empty());
    }
}
