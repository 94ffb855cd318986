//! Content and session fixtures.

use lathi_core::clock::Clock;
use lathi_core::content::{Chapter, ChapterContent, Choice, Slide, Vocabulary};
use lathi_core::repository::StoredSession;
use uuid::Uuid;

/// Speaker of the decision slide in [`branching_chapter`].
pub const DECISION_SPEAKER: &str = "Pak Broto";

/// A linear slide with no characters, choices or vocabulary.
#[must_use]
pub fn slide(chapter_id: Uuid, speaker: &str, content: &str, next: Option<Uuid>) -> Slide {
    Slide {
        id: Uuid::now_v7(),
        chapter_id,
        speaker_name: speaker.to_owned(),
        content: content.to_owned(),
        background_image: "bg/warung.webp".to_owned(),
        audio_file: String::new(),
        characters: Vec::new(),
        next_slide_id: next,
        choices: Vec::new(),
        vocabularies: Vec::new(),
    }
}

/// A chapter header at `order_index`.
#[must_use]
pub fn chapter(order_index: i32) -> Chapter {
    Chapter {
        id: Uuid::now_v7(),
        title: format!("Bab {order_index}"),
        description: format!("Crita bab {order_index}"),
        cover_image: format!("covers/bab_{order_index}.webp"),
        order_index,
    }
}

/// A chapter of `len` slides linked in order; the last one is terminal.
#[must_use]
pub fn linear_chapter(order_index: i32, len: usize) -> ChapterContent {
    let chapter = chapter(order_index);
    let ids: Vec<Uuid> = (0..len).map(|_| Uuid::now_v7()).collect();
    let slides = ids
        .iter()
        .enumerate()
        .map(|(i, id)| Slide {
            id: *id,
            ..slide(
                chapter.id,
                if i % 2 == 0 { "" } else { "Sekar" },
                &format!("Adegan {}", i + 1),
                ids.get(i + 1).copied(),
            )
        })
        .collect();
    ChapterContent { chapter, slides }
}

/// A two-slide chapter: a decision slide spoken by [`DECISION_SPEAKER`] with
/// one choice per entry of `mood_impacts`, all leading to a terminal slide.
#[must_use]
pub fn branching_chapter(order_index: i32, mood_impacts: &[i32]) -> ChapterContent {
    let chapter = chapter(order_index);
    let decision_id = Uuid::now_v7();
    let ending = slide(chapter.id, "Sekar", "Matur nuwun, Mas.", None);
    let choices = mood_impacts
        .iter()
        .enumerate()
        .map(|(i, impact)| Choice {
            text: format!("Wangsulan {}", i + 1),
            next_slide_id: Some(ending.id),
            mood_impact: *impact,
        })
        .collect();
    let decision = Slide {
        id: decision_id,
        choices,
        ..slide(chapter.id, DECISION_SPEAKER, "Badhe dhahar punapa, Mas?", None)
    };
    ChapterContent {
        chapter,
        slides: vec![decision, ending],
    }
}

/// A vocabulary entry with a fresh identifier.
#[must_use]
pub fn vocabulary(krama: &str, ngoko: &str, indo: &str) -> Vocabulary {
    Vocabulary {
        id: Uuid::new_v4(),
        word_krama: krama.to_owned(),
        word_ngoko: ngoko.to_owned(),
        word_indo: indo.to_owned(),
    }
}

/// A freshly started session row positioned on `slide_id`.
#[must_use]
pub fn stored_session(
    user_id: Uuid,
    chapter_id: Uuid,
    slide_id: Uuid,
    clock: &dyn Clock,
) -> StoredSession {
    let now = clock.now();
    StoredSession {
        id: Uuid::now_v7(),
        user_id,
        chapter_id,
        current_slide_id: slide_id,
        current_hearts: 3,
        is_game_over: false,
        is_completed: false,
        history_log: Vec::new(),
        version: 0,
        created_at: now,
        updated_at: now,
    }
}
