//! In-memory content store.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use lathi_core::content::{Chapter, ChapterContent, Slide, Vocabulary};
use lathi_core::error::DomainError;
use lathi_core::repository::{ContentStore, ContentWriter};
use uuid::Uuid;

/// A content store holding chapters in memory, keyed by `order_index`.
/// Also accepts writes from the content import.
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    chapters: Mutex<BTreeMap<i32, (ChapterContent, Option<String>)>>,
    vocabulary: Mutex<BTreeMap<Uuid, Vocabulary>>,
    replacements: Mutex<usize>,
}

impl InMemoryContentStore {
    /// Creates a store seeded with `chapters`. Slides keep the given order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn new(chapters: Vec<ChapterContent>) -> Self {
        let store = Self::default();
        {
            let mut map = store.chapters.lock().unwrap();
            for chapter in chapters {
                map.insert(chapter.chapter.order_index, (chapter, None));
            }
        }
        store
    }

    /// Snapshot of all chapters ordered by `order_index`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn chapters(&self) -> Vec<ChapterContent> {
        self.chapters
            .lock()
            .unwrap()
            .values()
            .map(|(content, _)| content.clone())
            .collect()
    }

    /// Snapshot of the stored vocabulary.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn vocabulary(&self) -> Vec<Vocabulary> {
        self.vocabulary.lock().unwrap().values().cloned().collect()
    }

    /// Number of `replace_chapter` calls so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn replacements(&self) -> usize {
        *self.replacements.lock().unwrap()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn list_chapters(&self) -> Result<Vec<Chapter>, DomainError> {
        Ok(self
            .chapters
            .lock()
            .unwrap()
            .values()
            .map(|(content, _)| content.chapter.clone())
            .collect())
    }

    async fn get_chapter(&self, chapter_id: Uuid) -> Result<Option<ChapterContent>, DomainError> {
        Ok(self
            .chapters
            .lock()
            .unwrap()
            .values()
            .find(|(content, _)| content.chapter.id == chapter_id)
            .map(|(content, _)| content.clone()))
    }

    async fn get_slide(&self, slide_id: Uuid) -> Result<Option<Slide>, DomainError> {
        Ok(self
            .chapters
            .lock()
            .unwrap()
            .values()
            .flat_map(|(content, _)| content.slides.iter())
            .find(|slide| slide.id == slide_id)
            .cloned())
    }

    async fn count_chapters(&self) -> Result<i64, DomainError> {
        let count = self.chapters.lock().unwrap().len();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

#[async_trait]
impl ContentWriter for InMemoryContentStore {
    async fn upsert_vocabulary(&self, entries: &[Vocabulary]) -> Result<(), DomainError> {
        let mut vocabulary = self.vocabulary.lock().unwrap();
        for entry in entries {
            vocabulary.insert(entry.id, entry.clone());
        }
        Ok(())
    }

    async fn chapter_hash(&self, order_index: i32) -> Result<Option<String>, DomainError> {
        Ok(self
            .chapters
            .lock()
            .unwrap()
            .get(&order_index)
            .and_then(|(_, hash)| hash.clone()))
    }

    async fn replace_chapter(
        &self,
        content: &ChapterContent,
        content_hash: &str,
    ) -> Result<(), DomainError> {
        self.chapters.lock().unwrap().insert(
            content.chapter.order_index,
            (content.clone(), Some(content_hash.to_owned())),
        );
        *self.replacements.lock().unwrap() += 1;
        Ok(())
    }
}

/// A content store whose every call fails with an infrastructure error.
#[derive(Debug)]
pub struct FailingContentStore;

#[async_trait]
impl ContentStore for FailingContentStore {
    async fn list_chapters(&self) -> Result<Vec<Chapter>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn get_chapter(&self, _chapter_id: Uuid) -> Result<Option<ChapterContent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn get_slide(&self, _slide_id: Uuid) -> Result<Option<Slide>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn count_chapters(&self) -> Result<i64, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

#[async_trait]
impl ContentWriter for FailingContentStore {
    async fn upsert_vocabulary(&self, _entries: &[Vocabulary]) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn chapter_hash(&self, _order_index: i32) -> Result<Option<String>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn replace_chapter(
        &self,
        _content: &ChapterContent,
        _content_hash: &str,
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
