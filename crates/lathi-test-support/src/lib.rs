//! Shared test doubles and fixtures for the Lathi story backend.

mod clock;
mod content;
pub mod fixtures;
mod progress;
mod session;

pub use clock::FixedClock;
pub use content::{FailingContentStore, InMemoryContentStore};
pub use progress::{
    FailingProgressRepository, FailingVocabularyRepository, InMemoryProgressRepository,
    InMemoryVocabularyRepository, RecordingLeaderboard,
};
pub use session::{FailingSessionRepository, InMemorySessionRepository};
