//! `PostgreSQL` implementations of the vocabulary, progress and leaderboard
//! ports. Counter updates are single statements so concurrent completions
//! never lose an increment.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lathi_core::error::DomainError;
use lathi_core::progress::{Title, UserProgress};
use lathi_core::repository::{LeaderboardRepository, ProgressRepository, VocabularyRepository};
use sqlx::{FromRow, PgExecutor, PgPool};
use uuid::Uuid;

use crate::infrastructure;

/// Creates the user's row if this is the first time the story engine sees
/// them.
pub(crate) async fn ensure_user<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
) -> Result<(), DomainError> {
    sqlx::query("INSERT INTO users (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
        .bind(user_id)
        .execute(executor)
        .await
        .map_err(infrastructure)?;
    Ok(())
}

/// PostgreSQL-backed vocabulary grants.
#[derive(Debug, Clone)]
pub struct PgVocabularyRepository {
    pool: PgPool,
}

impl PgVocabularyRepository {
    /// Creates a new `PgVocabularyRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VocabularyRepository for PgVocabularyRepository {
    async fn unlock(
        &self,
        user_id: Uuid,
        vocabulary_ids: &[Uuid],
        unlocked_at: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        if vocabulary_ids.is_empty() {
            return Ok(0);
        }
        ensure_user(&self.pool, user_id).await?;

        let result = sqlx::query(
            r"
            INSERT INTO user_vocabularies (user_id, dictionary_id, unlocked_at)
            SELECT DISTINCT $1::uuid, dictionary_id, $3::timestamptz
            FROM unnest($2::uuid[]) AS dictionary_id
            ON CONFLICT (user_id, dictionary_id) DO NOTHING
            ",
        )
        .bind(user_id)
        .bind(vocabulary_ids)
        .bind(unlocked_at)
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(result.rows_affected())
    }
}

/// PostgreSQL-backed progress counters on the `users` table.
#[derive(Debug, Clone)]
pub struct PgProgressRepository {
    pool: PgPool,
}

impl PgProgressRepository {
    /// Creates a new `PgProgressRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ProgressRecord {
    current_title: String,
    last_chapter_completed: i32,
    total_words_collected: i64,
}

impl ProgressRecord {
    fn into_domain(self) -> Result<UserProgress, DomainError> {
        Ok(UserProgress {
            last_chapter_completed: self.last_chapter_completed,
            total_words_collected: self.total_words_collected,
            current_title: self.current_title.parse()?,
        })
    }
}

#[async_trait]
impl ProgressRepository for PgProgressRepository {
    async fn get_progress(&self, user_id: Uuid) -> Result<UserProgress, DomainError> {
        let record = sqlx::query_as::<_, ProgressRecord>(
            "SELECT current_title, last_chapter_completed, total_words_collected \
             FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;

        record.map_or_else(|| Ok(UserProgress::default()), ProgressRecord::into_domain)
    }

    async fn raise_last_chapter_completed(
        &self,
        user_id: Uuid,
        order_index: i32,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r"
            INSERT INTO users (id, last_chapter_completed) VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE
            SET last_chapter_completed = EXCLUDED.last_chapter_completed, updated_at = NOW()
            WHERE users.last_chapter_completed < EXCLUDED.last_chapter_completed
            ",
        )
        .bind(user_id)
        .bind(order_index)
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(result.rows_affected() > 0)
    }

    async fn increment_words_collected(
        &self,
        user_id: Uuid,
        delta: i64,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r"
            INSERT INTO users (id, total_words_collected) VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE
            SET total_words_collected = users.total_words_collected + EXCLUDED.total_words_collected,
                updated_at = NOW()
            ",
        )
        .bind(user_id)
        .bind(delta)
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(())
    }

    async fn set_title(&self, user_id: Uuid, title: Title) -> Result<(), DomainError> {
        sqlx::query(
            r"
            INSERT INTO users (id, current_title) VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE
            SET current_title = EXCLUDED.current_title, updated_at = NOW()
            ",
        )
        .bind(user_id)
        .bind(title.as_str())
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(())
    }
}

/// PostgreSQL-backed leaderboard, one score row per user.
#[derive(Debug, Clone)]
pub struct PgLeaderboardRepository {
    pool: PgPool,
}

impl PgLeaderboardRepository {
    /// Creates a new `PgLeaderboardRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaderboardRepository for PgLeaderboardRepository {
    async fn record_score(&self, user_id: Uuid, score: i64) -> Result<(), DomainError> {
        ensure_user(&self.pool, user_id).await?;
        sqlx::query(
            r"
            INSERT INTO leaderboard_scores (user_id, score, updated_at) VALUES ($1, $2, NOW())
            ON CONFLICT (user_id) DO UPDATE SET score = EXCLUDED.score, updated_at = NOW()
            ",
        )
        .bind(user_id)
        .bind(score)
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(())
    }
}
