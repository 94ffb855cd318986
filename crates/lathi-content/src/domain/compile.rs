//! Compilation of validated manifests into the runtime read model.

use std::collections::HashMap;

use lathi_core::content::{Chapter, ChapterContent, Character, Choice, Slide, Vocabulary};
use lathi_core::error::DomainError;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::manifest::{ChapterManifest, VocabularyManifest};

/// Namespace for vocabulary identifiers derived from the krama word.
const VOCABULARY_NAMESPACE: Uuid = Uuid::from_u128(0x6c61_7468_692d_766f_6361_6275_6c61_7279);

/// Stable identifier of a vocabulary entry.
#[must_use]
pub fn vocabulary_id(krama: &str) -> Uuid {
    Uuid::new_v5(&VOCABULARY_NAMESPACE, krama.as_bytes())
}

/// Builds the vocabulary read model, keyed by krama word.
#[must_use]
pub fn compile_vocabulary(entries: &[VocabularyManifest]) -> HashMap<String, Vocabulary> {
    entries
        .iter()
        .map(|entry| {
            let vocabulary = Vocabulary {
                id: vocabulary_id(&entry.krama),
                word_krama: entry.krama.clone(),
                word_ngoko: entry.ngoko.clone(),
                word_indo: entry.indo.clone(),
            };
            (entry.krama.clone(), vocabulary)
        })
        .collect()
}

/// SHA-256 over the chapter's canonical JSON form, hex encoded.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the manifest cannot be encoded.
pub fn content_hash(chapter: &ChapterManifest) -> Result<String, DomainError> {
    let canonical = serde_json::to_vec(chapter)
        .map_err(|e| DomainError::Infrastructure(format!("chapter encoding failed: {e}")))?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Compiles a validated chapter. Slide identifiers are time-ordered and
/// assigned in declaration order, so the first slide listed sorts first.
///
/// # Errors
///
/// Returns `DomainError::Validation` if a slide references a key or word the
/// manifest does not define.
pub fn compile_chapter(
    manifest: &ChapterManifest,
    vocabulary: &HashMap<String, Vocabulary>,
) -> Result<ChapterContent, DomainError> {
    let chapter = Chapter {
        id: Uuid::now_v7(),
        title: manifest.title.clone(),
        description: manifest.description.clone(),
        cover_image: manifest.cover_image.clone(),
        order_index: manifest.order_index,
    };

    let ids: HashMap<&str, Uuid> = manifest
        .slides
        .iter()
        .map(|slide| (slide.key.as_str(), Uuid::now_v7()))
        .collect();
    let resolve = |key: &str| {
        ids.get(key).copied().ok_or_else(|| {
            DomainError::Validation(format!(
                "chapter {}: unknown slide '{key}'",
                manifest.order_index
            ))
        })
    };

    let mut slides = Vec::with_capacity(manifest.slides.len());
    for slide in &manifest.slides {
        let choices = slide
            .choices
            .iter()
            .map(|choice| -> Result<Choice, DomainError> {
                Ok(Choice {
                    text: choice.text.clone(),
                    next_slide_id: choice.next.as_deref().map(resolve).transpose()?,
                    mood_impact: choice.mood_impact,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;
        let vocabularies = slide
            .vocabulary
            .iter()
            .map(|word| {
                vocabulary.get(word).cloned().ok_or_else(|| {
                    DomainError::Validation(format!("unknown vocabulary '{word}'"))
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        slides.push(Slide {
            id: resolve(&slide.key)?,
            chapter_id: chapter.id,
            speaker_name: slide.speaker.clone(),
            content: slide.content.clone(),
            background_image: slide.background.clone(),
            audio_file: slide.audio.clone(),
            characters: slide
                .characters
                .iter()
                .map(|c| Character {
                    name: c.name.clone(),
                    image: c.image.clone(),
                })
                .collect(),
            next_slide_id: slide.next.as_deref().map(resolve).transpose()?,
            choices,
            vocabularies,
        });
    }

    Ok(ChapterContent { chapter, slides })
}
