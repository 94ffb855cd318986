//! Game rules: hearts, titles, scores and the lines the engine speaks.

use lathi_core::progress::{Title, UserProgress};

/// Hearts a session starts with, and the most it can hold.
pub const MAX_HEARTS: i32 = 3;

/// Speaker recorded for slides without a named speaker.
pub const NARRATOR: &str = "Narator";

/// Speaker recorded for lines the player picks.
pub const PROTAGONIST: &str = "Andi";

/// Who is disappointed on game over when the slide has no named speaker.
pub const FORMAL_ADDRESSEE: &str = "Panjenenganipun";

/// Message returned when a chapter is finished.
pub const COMPLETION_MESSAGE: &str = "Sugeng! Sampeyan wis rampung crita iki.";

/// Completion share (percent) up to which a player holds the lowest title.
const CANTRIK_MAX_PERCENT: f64 = 30.0;

/// Completion share (percent) up to which a player holds the middle title.
const ABDI_MAX_PERCENT: f64 = 70.0;

/// Message returned when hearts run out, naming the disappointed speaker.
#[must_use]
pub fn game_over_message(speaker_name: &str) -> String {
    let speaker = if speaker_name.is_empty() {
        FORMAL_ADDRESSEE
    } else {
        speaker_name
    };
    format!("{speaker} kuciwo karo omonganmu. Coba maneh ya!")
}

/// Speaker recorded in the history for a slide.
#[must_use]
pub fn history_speaker(speaker_name: &str) -> &str {
    if speaker_name.is_empty() {
        NARRATOR
    } else {
        speaker_name
    }
}

/// Applies a mood impact to the heart count, clamped to `[0, MAX_HEARTS]`.
#[must_use]
pub fn apply_mood(hearts: i32, mood_impact: i32) -> i32 {
    hearts.saturating_add(mood_impact).clamp(0, MAX_HEARTS)
}

/// Title tier for a player who has completed `last_chapter_completed` of
/// `total_chapters` chapters. `None` when there are no chapters.
#[must_use]
pub fn title_for_completion(last_chapter_completed: i32, total_chapters: i64) -> Option<Title> {
    if total_chapters <= 0 {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let percent = f64::from(last_chapter_completed) / total_chapters as f64 * 100.0;

    let title = if percent <= CANTRIK_MAX_PERCENT {
        Title::Cantrik
    } else if percent <= ABDI_MAX_PERCENT {
        Title::Abdi
    } else {
        Title::Priyayi
    };
    Some(title)
}

/// Leaderboard score: 100 per completed chapter plus 10 per collected word.
#[must_use]
pub fn leaderboard_score(progress: &UserProgress) -> i64 {
    i64::from(progress.last_chapter_completed) * 100 + progress.total_words_collected * 10
}
