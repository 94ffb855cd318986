//! Aggregate roots for the Story Session context.

use chrono::{DateTime, Utc};
use lathi_core::clock::Clock;
use lathi_core::content::Slide;
use lathi_core::error::DomainError;
use lathi_core::repository::{HistoryEntry, StoredSession};
use uuid::Uuid;

use super::rules::{self, MAX_HEARTS, PROTAGONIST};

/// Lifecycle of a session. `GameOver` and `Completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Accepting actions.
    Active,
    /// Hearts ran out.
    GameOver,
    /// The chapter was finished.
    Completed,
}

/// Result of applying one action to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// The action ran the hearts out.
    pub is_game_over: bool,
    /// The action finished the chapter.
    pub is_completed: bool,
    /// Game-over or completion message; empty otherwise.
    pub message: String,
    /// Hearts after the action.
    pub remaining_hearts: i32,
    /// Successor of the processed slide, if it has one.
    pub next_slide_id: Option<Uuid>,
    /// The full history after the action.
    pub history_log: Vec<HistoryEntry>,
}

/// The aggregate root for a user's playthrough of one chapter.
#[derive(Debug, Clone)]
pub struct StorySession {
    /// Session identifier.
    pub id: Uuid,
    pub(crate) user_id: Uuid,
    pub(crate) chapter_id: Uuid,
    pub(crate) current_slide_id: Uuid,
    pub(crate) current_hearts: i32,
    pub(crate) is_game_over: bool,
    pub(crate) is_completed: bool,
    pub(crate) history_log: Vec<HistoryEntry>,
    /// Version the session was loaded at.
    pub(crate) version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StorySession {
    /// Creates a fresh session positioned on the chapter's first slide with
    /// full hearts and an empty history.
    #[must_use]
    pub fn start(
        id: Uuid,
        user_id: Uuid,
        chapter_id: Uuid,
        first_slide_id: Uuid,
        clock: &dyn Clock,
    ) -> Self {
        let now = clock.now();
        Self {
            id,
            user_id,
            chapter_id,
            current_slide_id: first_slide_id,
            current_hearts: MAX_HEARTS,
            is_game_over: false,
            is_completed: false,
            history_log: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitutes a session from its stored row.
    #[must_use]
    pub fn from_stored(stored: StoredSession) -> Self {
        Self {
            id: stored.id,
            user_id: stored.user_id,
            chapter_id: stored.chapter_id,
            current_slide_id: stored.current_slide_id,
            current_hearts: stored.current_hearts,
            is_game_over: stored.is_game_over,
            is_completed: stored.is_completed,
            history_log: stored.history_log,
            version: stored.version,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }

    /// The row to persist for this session.
    #[must_use]
    pub fn to_stored(&self) -> StoredSession {
        StoredSession {
            id: self.id,
            user_id: self.user_id,
            chapter_id: self.chapter_id,
            current_slide_id: self.current_slide_id,
            current_hearts: self.current_hearts,
            is_game_over: self.is_game_over,
            is_completed: self.is_completed,
            history_log: self.history_log.clone(),
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        if self.is_game_over {
            SessionStatus::GameOver
        } else if self.is_completed {
            SessionStatus::Completed
        } else {
            SessionStatus::Active
        }
    }

    /// Slide the session is positioned on.
    #[must_use]
    pub fn current_slide_id(&self) -> Uuid {
        self.current_slide_id
    }

    /// Remaining hearts.
    #[must_use]
    pub fn current_hearts(&self) -> i32 {
        self.current_hearts
    }

    /// Dialogue history so far.
    #[must_use]
    pub fn history_log(&self) -> &[HistoryEntry] {
        &self.history_log
    }

    /// Checks that the session can take an action on `slide_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionEnded` if the session is terminal, or
    /// `DomainError::SlideMismatch` if `slide_id` is not the current slide.
    pub fn ensure_actionable(&self, slide_id: Uuid) -> Result<(), DomainError> {
        if self.status() != SessionStatus::Active {
            return Err(DomainError::SessionEnded(self.id));
        }
        if slide_id != self.current_slide_id {
            return Err(DomainError::SlideMismatch {
                submitted: slide_id,
                current: self.current_slide_id,
            });
        }
        Ok(())
    }

    /// Processes `slide` with an optional zero-based `choice_index`.
    ///
    /// Validation happens before any mutation: a rejected action leaves the
    /// session untouched.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::ensure_actionable`], and
    /// `DomainError::InvalidAction` when a choice index is supplied for a
    /// slide without choices, missing for a slide with choices, or out of
    /// range.
    pub fn apply_action(
        &mut self,
        slide: &Slide,
        choice_index: Option<i32>,
        clock: &dyn Clock,
    ) -> Result<ActionOutcome, DomainError> {
        self.ensure_actionable(slide.id)?;

        let (successor, mood_impact, picked) = match (slide.has_choices(), choice_index) {
            (false, None) => (slide.next_slide_id, 0, None),
            (false, Some(_)) => {
                return Err(DomainError::InvalidAction(
                    "slide has no choices to pick from".to_owned(),
                ));
            }
            (true, None) => {
                return Err(DomainError::InvalidAction(
                    "slide requires picking one of its choices".to_owned(),
                ));
            }
            (true, Some(index)) => {
                let choice = usize::try_from(index)
                    .ok()
                    .and_then(|i| slide.choices.get(i))
                    .ok_or_else(|| {
                        DomainError::InvalidAction(format!(
                            "choice index {index} is outside 0..{}",
                            slide.choices.len()
                        ))
                    })?;
                (choice.next_slide_id, choice.mood_impact, Some(choice))
            }
        };

        let now = clock.now();
        self.history_log.push(HistoryEntry {
            speaker: rules::history_speaker(&slide.speaker_name).to_owned(),
            text: slide.content.clone(),
            is_user: false,
            timestamp: now,
        });
        if let Some(choice) = picked {
            self.history_log.push(HistoryEntry {
                speaker: PROTAGONIST.to_owned(),
                text: choice.text.clone(),
                is_user: true,
                timestamp: now,
            });
        }

        self.current_hearts = rules::apply_mood(self.current_hearts, mood_impact);

        let mut message = String::new();
        if self.current_hearts == 0 {
            self.is_game_over = true;
            message = rules::game_over_message(&slide.speaker_name);
        } else if let Some(next) = successor {
            self.current_slide_id = next;
        } else {
            self.is_completed = true;
            message = rules::COMPLETION_MESSAGE.to_owned();
        }
        self.updated_at = now;

        Ok(ActionOutcome {
            is_game_over: self.is_game_over,
            is_completed: self.is_completed,
            message,
            remaining_hearts: self.current_hearts,
            next_slide_id: successor,
            history_log: self.history_log.clone(),
        })
    }
}
