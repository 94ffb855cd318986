//! Read model for story content.
//!
//! Chapters, slides, choices and vocabulary are seeded by the content import
//! and never modified by play.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An ordered unit of narrative content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Chapter identifier.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Short description shown in the chapter list.
    pub description: String,
    /// Object-storage key of the cover image.
    pub cover_image: String,
    /// 1-based position; defines unlock order and completion percentage.
    pub order_index: i32,
}

/// A chapter together with its slides in narrative order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterContent {
    /// The chapter.
    pub chapter: Chapter,
    /// Slides ordered by identifier (creation order).
    pub slides: Vec<Slide>,
}

impl ChapterContent {
    /// The slide a fresh session starts on.
    #[must_use]
    pub fn first_slide(&self) -> Option<&Slide> {
        self.slides.first()
    }
}

/// One beat of dialogue or a decision point within a chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    /// Slide identifier.
    pub id: Uuid,
    /// Owning chapter.
    pub chapter_id: Uuid,
    /// Speaker name; empty for the narrator.
    pub speaker_name: String,
    /// Body text.
    pub content: String,
    /// Object-storage key of the background image.
    pub background_image: String,
    /// Object-storage key of the voice-over, if any.
    pub audio_file: String,
    /// Characters on screen, left to right.
    pub characters: Vec<Character>,
    /// Linear successor; `None` at a terminal slide. Ignored when the slide
    /// has choices.
    pub next_slide_id: Option<Uuid>,
    /// Ordered branches; selection is by index.
    pub choices: Vec<Choice>,
    /// Vocabulary unlocked when the slide is processed.
    pub vocabularies: Vec<Vocabulary>,
}

impl Slide {
    /// Returns `true` if the slide is a decision point.
    #[must_use]
    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }

    /// Identifiers of the vocabulary entries attached to this slide.
    #[must_use]
    pub fn vocabulary_ids(&self) -> Vec<Uuid> {
        self.vocabularies.iter().map(|v| v.id).collect()
    }
}

/// A character portrait shown on a slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Character name, compared against the slide speaker.
    pub name: String,
    /// Object-storage key of the portrait.
    pub image: String,
}

/// One selectable branch of a decision slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Text shown to the player and recorded in the history.
    pub text: String,
    /// Slide the branch leads to.
    pub next_slide_id: Option<Uuid>,
    /// Signed heart delta; negative values damage hearts.
    pub mood_impact: i32,
}

/// A krama / ngoko / Indonesian word triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Dictionary entry identifier.
    pub id: Uuid,
    /// High (krama) register.
    pub word_krama: String,
    /// Low (ngoko) register.
    pub word_ngoko: String,
    /// Indonesian translation.
    pub word_indo: String,
}
