//! Command handlers for the content import.
//!
//! Parse, validate the whole pack, then write: vocabulary first, then each
//! chapter whose content hash changed.

use lathi_core::error::DomainError;
use lathi_core::repository::ContentWriter;
use tracing::{info, instrument};

use crate::domain::commands::ImportContentPack;
use crate::domain::compile::{compile_chapter, compile_vocabulary, content_hash};
use crate::domain::manifest::ContentPack;
use crate::domain::validation::validate;

/// What an import wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Vocabulary entries upserted.
    pub vocabulary: usize,
    /// Order indexes of chapters written.
    pub imported: Vec<i32>,
    /// Order indexes of chapters left alone because their hash matched.
    pub unchanged: Vec<i32>,
}

/// Handles the `ImportContentPack` command.
///
/// Nothing is written unless the whole pack validates.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the pack is malformed or fails
/// validation, and `DomainError::Infrastructure` if a write fails.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id, origin = %command.origin))]
pub async fn handle_import_content_pack(
    command: &ImportContentPack,
    writer: &dyn ContentWriter,
) -> Result<ImportReport, DomainError> {
    let pack = ContentPack::from_yaml(&command.source)?;
    validate(&pack)?;

    let vocabulary = compile_vocabulary(&pack.vocabulary);
    let entries: Vec<_> = pack
        .vocabulary
        .iter()
        .filter_map(|entry| vocabulary.get(&entry.krama).cloned())
        .collect();
    writer.upsert_vocabulary(&entries).await?;

    let mut report = ImportReport {
        vocabulary: entries.len(),
        ..ImportReport::default()
    };
    let mut chapters: Vec<_> = pack.chapters.iter().collect();
    chapters.sort_by_key(|chapter| chapter.order_index);

    for manifest in chapters {
        let hash = content_hash(manifest)?;
        if writer.chapter_hash(manifest.order_index).await?.as_deref() == Some(hash.as_str()) {
            report.unchanged.push(manifest.order_index);
            continue;
        }
        let content = compile_chapter(manifest, &vocabulary)?;
        writer.replace_chapter(&content, &hash).await?;
        info!(
            order_index = manifest.order_index,
            slides = content.slides.len(),
            "chapter imported"
        );
        report.imported.push(manifest.order_index);
    }

    info!(
        vocabulary = report.vocabulary,
        imported = report.imported.len(),
        unchanged = report.unchanged.len(),
        "content pack imported"
    );
    Ok(report)
}
