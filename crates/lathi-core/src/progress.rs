//! Player progress types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Title tier derived from the share of chapters a player has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Title {
    /// Lowest tier, held by every new player.
    #[default]
    Cantrik,
    /// Middle tier.
    Abdi,
    /// Highest tier.
    Priyayi,
}

impl Title {
    /// The persisted name of the tier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cantrik => "cantrik",
            Self::Abdi => "abdi",
            Self::Priyayi => "priyayi",
        }
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Title {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cantrik" => Ok(Self::Cantrik),
            "abdi" => Ok(Self::Abdi),
            "priyayi" => Ok(Self::Priyayi),
            other => Err(DomainError::Infrastructure(format!(
                "unknown title tier: {other}"
            ))),
        }
    }
}

/// The progress fields of a user that the story engine reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserProgress {
    /// Highest chapter `order_index` completed; 0 if none.
    pub last_chapter_completed: i32,
    /// Number of distinct vocabulary entries unlocked.
    pub total_words_collected: i64,
    /// Current title tier.
    pub current_title: Title,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_round_trips_through_its_persisted_name() {
        for title in [Title::Cantrik, Title::Abdi, Title::Priyayi] {
            assert_eq!(title.as_str().parse::<Title>().unwrap(), title);
        }
    }

    #[test]
    fn test_unknown_title_is_an_infrastructure_error() {
        let err = "raja".parse::<Title>().unwrap_err();
        assert!(matches!(err, DomainError::Infrastructure(_)));
    }

    #[test]
    fn test_title_serializes_lowercase() {
        let json = serde_json::to_string(&Title::Priyayi).unwrap();
        assert_eq!(json, "\"priyayi\"");
    }
}
