//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No chapter exists with the given identifier.
    #[error("chapter not found: {0}")]
    ChapterNotFound(Uuid),

    /// No slide exists with the given identifier.
    #[error("slide not found: {0}")]
    SlideNotFound(Uuid),

    /// The player has no session for the chapter (identifier is the chapter).
    #[error("no session for chapter {0}, start the chapter first")]
    SessionNotStarted(Uuid),

    /// The session is game-over or completed and accepts no more actions.
    #[error("session {0} has already ended")]
    SessionEnded(Uuid),

    /// The submitted slide is not the slide the session is positioned on.
    #[error("slide {submitted} is not the current slide {current}")]
    SlideMismatch {
        /// The slide the client submitted.
        submitted: Uuid,
        /// The slide the session is positioned on.
        current: Uuid,
    },

    /// The action does not fit the shape of the slide (missing, unexpected,
    /// or out-of-range choice index).
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// Optimistic concurrency conflict.
    #[error("concurrency conflict on {aggregate_id}: expected version {expected}")]
    ConcurrencyConflict {
        /// The row that had the conflict.
        aggregate_id: Uuid,
        /// The version the writer expected to replace.
        expected: i64,
    },

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Returns `true` for errors caused by the caller's request rather than
    /// by the system.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, Self::Infrastructure(_))
    }
}
