//! `PostgreSQL` implementation of the `ContentStore` and `ContentWriter`
//! traits.

use std::collections::HashMap;

use async_trait::async_trait;
use lathi_core::content::{Chapter, ChapterContent, Character, Choice, Slide, Vocabulary};
use lathi_core::error::DomainError;
use lathi_core::repository::{ContentStore, ContentWriter};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::infrastructure;

/// PostgreSQL-backed chapters, slides and vocabulary.
#[derive(Debug, Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    /// Creates a new `PgContentStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_vocabulary(
        &self,
        slide_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Vocabulary>>, DomainError> {
        if slide_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let records = sqlx::query_as::<_, SlideVocabularyRecord>(
            r"
            SELECT sv.slide_id, d.id, d.word_krama, d.word_ngoko, d.word_indo
            FROM slide_vocabularies sv
            JOIN dictionaries d ON d.id = sv.dictionary_id
            WHERE sv.slide_id = ANY($1)
            ORDER BY sv.slide_id, sv.position
            ",
        )
        .bind(slide_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;

        let mut by_slide: HashMap<Uuid, Vec<Vocabulary>> = HashMap::new();
        for record in records {
            let (slide_id, vocabulary) = record.into_domain();
            by_slide.entry(slide_id).or_default().push(vocabulary);
        }
        Ok(by_slide)
    }
}

#[derive(FromRow)]
struct ChapterRecord {
    id: Uuid,
    title: String,
    description: String,
    cover_image_url: String,
    order_index: i32,
}

impl ChapterRecord {
    fn into_domain(self) -> Chapter {
        Chapter {
            id: self.id,
            title: self.title,
            description: self.description,
            cover_image: self.cover_image_url,
            order_index: self.order_index,
        }
    }
}

#[derive(FromRow)]
struct SlideRecord {
    id: Uuid,
    chapter_id: Uuid,
    speaker_name: String,
    content: String,
    background_image_url: String,
    audio_url: String,
    characters: Json<Vec<Character>>,
    next_slide_id: Option<Uuid>,
    choices: Json<Vec<Choice>>,
}

impl SlideRecord {
    fn into_domain(self, vocabularies: Vec<Vocabulary>) -> Slide {
        Slide {
            id: self.id,
            chapter_id: self.chapter_id,
            speaker_name: self.speaker_name,
            content: self.content,
            background_image: self.background_image_url,
            audio_file: self.audio_url,
            characters: self.characters.0,
            next_slide_id: self.next_slide_id,
            choices: self.choices.0,
            vocabularies,
        }
    }
}

#[derive(FromRow)]
struct SlideVocabularyRecord {
    slide_id: Uuid,
    id: Uuid,
    word_krama: String,
    word_ngoko: String,
    word_indo: String,
}

impl SlideVocabularyRecord {
    fn into_domain(self) -> (Uuid, Vocabulary) {
        (
            self.slide_id,
            Vocabulary {
                id: self.id,
                word_krama: self.word_krama,
                word_ngoko: self.word_ngoko,
                word_indo: self.word_indo,
            },
        )
    }
}

const SLIDE_COLUMNS: &str = "id, chapter_id, speaker_name, content, background_image_url, \
                             audio_url, characters, next_slide_id, choices";

#[async_trait]
impl ContentStore for PgContentStore {
    async fn list_chapters(&self) -> Result<Vec<Chapter>, DomainError> {
        let records = sqlx::query_as::<_, ChapterRecord>(
            "SELECT id, title, description, cover_image_url, order_index \
             FROM chapters ORDER BY order_index",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(records.into_iter().map(ChapterRecord::into_domain).collect())
    }

    async fn get_chapter(&self, chapter_id: Uuid) -> Result<Option<ChapterContent>, DomainError> {
        let Some(chapter) = sqlx::query_as::<_, ChapterRecord>(
            "SELECT id, title, description, cover_image_url, order_index \
             FROM chapters WHERE id = $1",
        )
        .bind(chapter_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?
        else {
            return Ok(None);
        };

        let records = sqlx::query_as::<_, SlideRecord>(&format!(
            "SELECT {SLIDE_COLUMNS} FROM slides WHERE chapter_id = $1 ORDER BY id"
        ))
        .bind(chapter_id)
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;

        let slide_ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
        let mut vocabulary = self.load_vocabulary(&slide_ids).await?;
        let slides = records
            .into_iter()
            .map(|record| {
                let words = vocabulary.remove(&record.id).unwrap_or_default();
                record.into_domain(words)
            })
            .collect();

        Ok(Some(ChapterContent {
            chapter: chapter.into_domain(),
            slides,
        }))
    }

    async fn get_slide(&self, slide_id: Uuid) -> Result<Option<Slide>, DomainError> {
        let record = sqlx::query_as::<_, SlideRecord>(&format!(
            "SELECT {SLIDE_COLUMNS} FROM slides WHERE id = $1"
        ))
        .bind(slide_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;

        match record {
            Some(record) => {
                let words = self
                    .load_vocabulary(&[slide_id])
                    .await?
                    .remove(&slide_id)
                    .unwrap_or_default();
                Ok(Some(record.into_domain(words)))
            }
            None => Ok(None),
        }
    }

    async fn count_chapters(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chapters")
            .fetch_one(&self.pool)
            .await
            .map_err(infrastructure)
    }
}

#[async_trait]
impl ContentWriter for PgContentStore {
    async fn upsert_vocabulary(&self, entries: &[Vocabulary]) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(infrastructure)?;
        for entry in entries {
            sqlx::query(
                r"
                INSERT INTO dictionaries (id, word_krama, word_ngoko, word_indo)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO UPDATE
                SET word_ngoko = EXCLUDED.word_ngoko, word_indo = EXCLUDED.word_indo
                ",
            )
            .bind(entry.id)
            .bind(&entry.word_krama)
            .bind(&entry.word_ngoko)
            .bind(&entry.word_indo)
            .execute(&mut *tx)
            .await
            .map_err(infrastructure)?;
        }
        tx.commit().await.map_err(infrastructure)
    }

    async fn chapter_hash(&self, order_index: i32) -> Result<Option<String>, DomainError> {
        sqlx::query_scalar::<_, String>("SELECT content_hash FROM chapters WHERE order_index = $1")
            .bind(order_index)
            .fetch_optional(&self.pool)
            .await
            .map_err(infrastructure)
    }

    async fn replace_chapter(
        &self,
        content: &ChapterContent,
        content_hash: &str,
    ) -> Result<(), DomainError> {
        let chapter = &content.chapter;
        let mut tx = self.pool.begin().await.map_err(infrastructure)?;

        // Cascades to the old slides, their vocabulary links and sessions.
        sqlx::query("DELETE FROM chapters WHERE order_index = $1")
            .bind(chapter.order_index)
            .execute(&mut *tx)
            .await
            .map_err(infrastructure)?;

        sqlx::query(
            r"
            INSERT INTO chapters (id, title, description, cover_image_url, order_index, content_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(chapter.id)
        .bind(&chapter.title)
        .bind(&chapter.description)
        .bind(&chapter.cover_image)
        .bind(chapter.order_index)
        .bind(content_hash)
        .execute(&mut *tx)
        .await
        .map_err(infrastructure)?;

        for slide in &content.slides {
            sqlx::query(&format!(
                "INSERT INTO slides ({SLIDE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
            ))
            .bind(slide.id)
            .bind(slide.chapter_id)
            .bind(&slide.speaker_name)
            .bind(&slide.content)
            .bind(&slide.background_image)
            .bind(&slide.audio_file)
            .bind(Json(&slide.characters))
            .bind(slide.next_slide_id)
            .bind(Json(&slide.choices))
            .execute(&mut *tx)
            .await
            .map_err(infrastructure)?;

            for (position, vocabulary) in (0_i32..).zip(&slide.vocabularies) {
                sqlx::query(
                    r"
                    INSERT INTO slide_vocabularies (slide_id, dictionary_id, position)
                    VALUES ($1, $2, $3)
                    ON CONFLICT DO NOTHING
                    ",
                )
                .bind(slide.id)
                .bind(vocabulary.id)
                .bind(position)
                .execute(&mut *tx)
                .await
                .map_err(infrastructure)?;
            }
        }

        tx.commit().await.map_err(infrastructure)
    }
}
