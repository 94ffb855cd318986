//! `PostgreSQL` implementation of the `SessionRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lathi_core::error::DomainError;
use lathi_core::repository::{HistoryEntry, SessionRepository, StoredSession};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::infrastructure;
use crate::pg_progress_repository::ensure_user;

/// PostgreSQL-backed session rows, one per (user, chapter).
#[derive(Debug, Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Creates a new `PgSessionRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct SessionRecord {
    id: Uuid,
    user_id: Uuid,
    chapter_id: Uuid,
    current_slide_id: Uuid,
    current_hearts: i32,
    is_game_over: bool,
    is_completed: bool,
    history_log: Json<Vec<HistoryEntry>>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SessionRecord {
    fn into_domain(self) -> StoredSession {
        StoredSession {
            id: self.id,
            user_id: self.user_id,
            chapter_id: self.chapter_id,
            current_slide_id: self.current_slide_id,
            current_hearts: self.current_hearts,
            is_game_over: self.is_game_over,
            is_completed: self.is_completed,
            history_log: self.history_log.0,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const SESSION_COLUMNS: &str = "id, user_id, chapter_id, current_slide_id, current_hearts, \
                               is_game_over, is_completed, history_log, version, created_at, \
                               updated_at";

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn find(
        &self,
        user_id: Uuid,
        chapter_id: Uuid,
    ) -> Result<Option<StoredSession>, DomainError> {
        let record = sqlx::query_as::<_, SessionRecord>(&format!(
            "SELECT {SESSION_COLUMNS} FROM user_story_sessions \
             WHERE user_id = $1 AND chapter_id = $2"
        ))
        .bind(user_id)
        .bind(chapter_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(record.map(SessionRecord::into_domain))
    }

    async fn create_or_replace(
        &self,
        session: &StoredSession,
    ) -> Result<StoredSession, DomainError> {
        let mut tx = self.pool.begin().await.map_err(infrastructure)?;
        ensure_user(&mut *tx, session.user_id).await?;

        // A restart bumps the version so an action still in flight against
        // the old row fails its version check.
        let record = sqlx::query_as::<_, SessionRecord>(&format!(
            r"
            INSERT INTO user_story_sessions ({SESSION_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (user_id, chapter_id) DO UPDATE SET
                current_slide_id = EXCLUDED.current_slide_id,
                current_hearts = EXCLUDED.current_hearts,
                is_game_over = EXCLUDED.is_game_over,
                is_completed = EXCLUDED.is_completed,
                history_log = EXCLUDED.history_log,
                updated_at = EXCLUDED.updated_at,
                version = user_story_sessions.version + 1
            RETURNING {SESSION_COLUMNS}
            "
        ))
        .bind(session.id)
        .bind(session.user_id)
        .bind(session.chapter_id)
        .bind(session.current_slide_id)
        .bind(session.current_hearts)
        .bind(session.is_game_over)
        .bind(session.is_completed)
        .bind(Json(&session.history_log))
        .bind(session.version)
        .bind(session.created_at)
        .bind(session.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(infrastructure)?;

        tx.commit().await.map_err(infrastructure)?;
        Ok(record.into_domain())
    }

    async fn save(&self, session: &StoredSession) -> Result<i64, DomainError> {
        let version = sqlx::query_scalar::<_, i64>(
            r"
            UPDATE user_story_sessions SET
                current_slide_id = $3,
                current_hearts = $4,
                is_game_over = $5,
                is_completed = $6,
                history_log = $7,
                updated_at = $8,
                version = version + 1
            WHERE id = $1 AND version = $2
            RETURNING version
            ",
        )
        .bind(session.id)
        .bind(session.version)
        .bind(session.current_slide_id)
        .bind(session.current_hearts)
        .bind(session.is_game_over)
        .bind(session.is_completed)
        .bind(Json(&session.history_log))
        .bind(session.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;

        version.ok_or(DomainError::ConcurrencyConflict {
            aggregate_id: session.id,
            expected: session.version,
        })
    }
}
