//! Query handlers for the Story Session context.
//!
//! Read-only views over sessions and content, shaped for the client.

use lathi_core::content::{Chapter, Slide};
use lathi_core::error::DomainError;
use lathi_core::repository::{ContentStore, HistoryEntry, ProgressRepository, SessionRepository};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use super::assets::AssetUrlResolver;

/// Snapshot of a user's session for one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    /// Session identifier.
    pub session_id: Uuid,
    /// Slide the session is positioned on.
    pub current_slide_id: Uuid,
    /// Remaining hearts.
    pub current_hearts: i32,
    /// Hearts ran out.
    pub is_game_over: bool,
    /// The chapter was finished.
    pub is_completed: bool,
    /// Dialogue history so far.
    pub history_log: Vec<HistoryEntry>,
}

/// A chapter as listed for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub cover_image_url: String,
    pub order_index: i32,
    /// More than one chapter ahead of the user's last completed chapter.
    pub is_locked: bool,
    /// At or before the user's last completed chapter.
    pub is_completed: bool,
}

/// A chapter's slide graph, shaped for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterContentView {
    pub chapter_id: Uuid,
    pub title: String,
    pub slides: Vec<SlideView>,
}

/// One slide as the client renders it. Choice outcomes are withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlideView {
    pub id: Uuid,
    pub speaker_name: String,
    pub content: String,
    pub background_image_url: String,
    pub audio_url: String,
    pub characters: Vec<CharacterView>,
    pub next_slide_id: Option<Uuid>,
    pub choices: Vec<ChoiceView>,
    pub vocabularies: Vec<VocabularyView>,
}

/// A character on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterView {
    pub name: String,
    pub image_url: String,
    /// The character is the slide's speaker.
    pub is_active: bool,
}

/// A choice's index and text, without its target or mood impact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceView {
    pub index: usize,
    pub text: String,
}

/// A vocabulary entry unlocked by a slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VocabularyView {
    pub id: Uuid,
    pub word_krama: String,
    pub word_ngoko: String,
    pub word_indo: String,
}

/// Returns the user's session for the chapter, or `None` if the chapter was
/// never started.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the store fails.
#[instrument(skip(sessions))]
pub async fn get_user_session(
    user_id: Uuid,
    chapter_id: Uuid,
    sessions: &dyn SessionRepository,
) -> Result<Option<SessionView>, DomainError> {
    let view = sessions
        .find(user_id, chapter_id)
        .await?
        .map(|stored| SessionView {
            session_id: stored.id,
            current_slide_id: stored.current_slide_id,
            current_hearts: stored.current_hearts,
            is_game_over: stored.is_game_over,
            is_completed: stored.is_completed,
            history_log: stored.history_log,
        });
    Ok(view)
}

/// Lists all chapters in order with the user's lock and completion state.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if a store fails.
#[instrument(skip(content, progress, assets))]
pub async fn list_chapters(
    user_id: Uuid,
    content: &dyn ContentStore,
    progress: &dyn ProgressRepository,
    assets: &AssetUrlResolver,
) -> Result<Vec<ChapterSummary>, DomainError> {
    let last_completed = progress.get_progress(user_id).await?.last_chapter_completed;
    let chapters = content.list_chapters().await?;

    Ok(chapters
        .into_iter()
        .map(|chapter| summarize(chapter, last_completed, assets))
        .collect())
}

fn summarize(chapter: Chapter, last_completed: i32, assets: &AssetUrlResolver) -> ChapterSummary {
    ChapterSummary {
        id: chapter.id,
        cover_image_url: assets.resolve(&chapter.cover_image),
        is_locked: chapter.order_index > last_completed.saturating_add(1),
        is_completed: chapter.order_index <= last_completed,
        order_index: chapter.order_index,
        title: chapter.title,
        description: chapter.description,
    }
}

/// Returns a chapter's slides with asset URLs resolved.
///
/// # Errors
///
/// Returns `DomainError::ChapterNotFound` if the chapter does not exist and
/// `DomainError::Infrastructure` if the store fails.
#[instrument(skip(content, assets))]
pub async fn get_chapter_content(
    chapter_id: Uuid,
    content: &dyn ContentStore,
    assets: &AssetUrlResolver,
) -> Result<ChapterContentView, DomainError> {
    let chapter = content
        .get_chapter(chapter_id)
        .await?
        .ok_or(DomainError::ChapterNotFound(chapter_id))?;

    Ok(ChapterContentView {
        chapter_id: chapter.chapter.id,
        title: chapter.chapter.title,
        slides: chapter
            .slides
            .into_iter()
            .map(|slide| render_slide(slide, assets))
            .collect(),
    })
}

fn render_slide(slide: Slide, assets: &AssetUrlResolver) -> SlideView {
    let characters = slide
        .characters
        .iter()
        .map(|character| CharacterView {
            is_active: !slide.speaker_name.is_empty()
                && character.name.to_lowercase() == slide.speaker_name.to_lowercase(),
            image_url: assets.resolve(&character.image),
            name: character.name.clone(),
        })
        .collect();

    SlideView {
        id: slide.id,
        background_image_url: assets.resolve(&slide.background_image),
        audio_url: assets.resolve(&slide.audio_file),
        characters,
        next_slide_id: slide.next_slide_id,
        choices: slide
            .choices
            .into_iter()
            .enumerate()
            .map(|(index, choice)| ChoiceView {
                index,
                text: choice.text,
            })
            .collect(),
        vocabularies: slide
            .vocabularies
            .into_iter()
            .map(|v| VocabularyView {
                id: v.id,
                word_krama: v.word_krama,
                word_ngoko: v.word_ngoko,
                word_indo: v.word_indo,
            })
            .collect(),
        speaker_name: slide.speaker_name,
        content: slide.content,
    }
}
