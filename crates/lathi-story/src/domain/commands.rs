//! Commands for the Story Session context.

use lathi_core::command::Command;
use uuid::Uuid;

/// Command to start, or restart, a chapter.
#[derive(Debug, Clone)]
pub struct StartSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player.
    pub user_id: Uuid,
    /// The chapter to play.
    pub chapter_id: Uuid,
}

impl Command for StartSession {
    fn command_type(&self) -> &'static str {
        "story.start_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn user_id(&self) -> Option<Uuid> {
        Some(self.user_id)
    }
}

/// Command to act on the current slide of a session.
#[derive(Debug, Clone)]
pub struct SubmitAction {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player.
    pub user_id: Uuid,
    /// The chapter being played.
    pub chapter_id: Uuid,
    /// The slide the client is showing.
    pub slide_id: Uuid,
    /// Zero-based choice, required exactly when the slide has choices.
    pub choice_index: Option<i32>,
}

impl Command for SubmitAction {
    fn command_type(&self) -> &'static str {
        "story.submit_action"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn user_id(&self) -> Option<Uuid> {
        Some(self.user_id)
    }
}
