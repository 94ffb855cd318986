//! YAML content pack format.
//!
//! ```yaml
//! vocabulary:
//!   - { krama: sonten, ngoko: sore, indo: sore }
//! chapters:
//!   - order_index: 1
//!     title: Ana Kabar Kaget!
//!     description: Andi kudu nekat budhal nang Tulungagung.
//!     cover_image: chapters/ch1_cover.webp
//!     slides:
//!       - key: intro
//!         speaker: Narator
//!         background: bg/warmindo.webp
//!         content: Wanci sonten ing kutha Surabaya.
//!         vocabulary: [sonten]
//!         next: ask
//!       - key: ask
//!         speaker: Sekar
//!         content: Badhe dhahar punapa, Mas?
//!         choices:
//!           - { text: Dhahar, next: done, mood_impact: 1 }
//!           - { text: Badhog, next: done, mood_impact: -1 }
//!       - key: done
//!         content: Entosi cariyos salajengipun.
//! ```
//!
//! Slides reference each other by `key`; the first slide listed is where a
//! session starts.

use lathi_core::error::DomainError;
use serde::{Deserialize, Serialize};

/// A content pack: shared vocabulary plus chapters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentPack {
    #[serde(default)]
    pub vocabulary: Vec<VocabularyManifest>,
    #[serde(default)]
    pub chapters: Vec<ChapterManifest>,
}

impl ContentPack {
    /// Parses a pack from YAML.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the text is not a well-formed pack.
    pub fn from_yaml(source: &str) -> Result<Self, DomainError> {
        serde_yaml::from_str(source)
            .map_err(|e| DomainError::Validation(format!("malformed content pack: {e}")))
    }
}

/// A krama/ngoko/indo word triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VocabularyManifest {
    pub krama: String,
    pub ngoko: String,
    pub indo: String,
}

/// One chapter and its slides in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChapterManifest {
    pub order_index: i32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub slides: Vec<SlideManifest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlideManifest {
    pub key: String,
    #[serde(default)]
    pub speaker: String,
    pub content: String,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub audio: String,
    #[serde(default)]
    pub characters: Vec<CharacterManifest>,
    /// Key of the linear successor.
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChoiceManifest>,
    /// Krama words unlocked by the slide.
    #[serde(default)]
    pub vocabulary: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CharacterManifest {
    pub name: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChoiceManifest {
    pub text: String,
    /// Key of the target slide; absent for a choice that ends the chapter.
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub mood_impact: i32,
}
