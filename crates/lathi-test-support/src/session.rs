//! In-memory session repository.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use lathi_core::error::DomainError;
use lathi_core::repository::{SessionRepository, StoredSession};
use uuid::Uuid;

/// A session repository keyed on (user, chapter) that enforces the version
/// check on `save` the way the PostgreSQL adapter does.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    rows: Mutex<HashMap<(Uuid, Uuid), StoredSession>>,
    writes: AtomicUsize,
    conflict_next_save: AtomicBool,
}

impl InMemorySessionRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Returns `true` if no session is stored.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful writes (creates, replaces and saves).
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes the next `save` behave as if another writer got there first.
    pub fn fail_next_save_with_conflict(&self) {
        self.conflict_next_save.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn find(
        &self,
        user_id: Uuid,
        chapter_id: Uuid,
    ) -> Result<Option<StoredSession>, DomainError> {
        Ok(self.rows.lock().unwrap().get(&(user_id, chapter_id)).cloned())
    }

    async fn create_or_replace(
        &self,
        session: &StoredSession,
    ) -> Result<StoredSession, DomainError> {
        let mut rows = self.rows.lock().unwrap();
        let key = (session.user_id, session.chapter_id);
        let stored = match rows.get(&key) {
            Some(existing) => StoredSession {
                id: existing.id,
                created_at: existing.created_at,
                version: existing.version + 1,
                ..session.clone()
            },
            None => session.clone(),
        };
        rows.insert(key, stored.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(stored)
    }

    async fn save(&self, session: &StoredSession) -> Result<i64, DomainError> {
        let conflict = || DomainError::ConcurrencyConflict {
            aggregate_id: session.id,
            expected: session.version,
        };
        if self.conflict_next_save.swap(false, Ordering::SeqCst) {
            return Err(conflict());
        }

        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .get_mut(&(session.user_id, session.chapter_id))
            .filter(|row| row.id == session.id && row.version == session.version)
            .ok_or_else(conflict)?;
        let version = session.version + 1;
        *row = StoredSession {
            id: row.id,
            created_at: row.created_at,
            version,
            ..session.clone()
        };
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(version)
    }
}

/// A session repository whose every call fails with an infrastructure error.
#[derive(Debug)]
pub struct FailingSessionRepository;

#[async_trait]
impl SessionRepository for FailingSessionRepository {
    async fn find(
        &self,
        _user_id: Uuid,
        _chapter_id: Uuid,
    ) -> Result<Option<StoredSession>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn create_or_replace(
        &self,
        _session: &StoredSession,
    ) -> Result<StoredSession, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn save(&self, _session: &StoredSession) -> Result<i64, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
