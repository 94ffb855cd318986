//! `PostgreSQL` adapters for the story backend ports.
//!
//! Every adapter maps `sqlx::Error` to `DomainError::Infrastructure`; no sqlx
//! type crosses the port boundary.

pub mod pg_content_store;
pub mod pg_progress_repository;
pub mod pg_session_repository;

use lathi_core::error::DomainError;
use tracing::error;

pub use pg_content_store::PgContentStore;
pub use pg_progress_repository::{
    PgLeaderboardRepository, PgProgressRepository, PgVocabularyRepository,
};
pub use pg_session_repository::PgSessionRepository;

pub(crate) fn infrastructure(err: sqlx::Error) -> DomainError {
    error!(error = %err, "database call failed");
    DomainError::Infrastructure(err.to_string())
}
