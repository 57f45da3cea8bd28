//! Emotional states a character can display.

use serde::{Deserialize, Serialize};

/// Emotion tag shown next to a character's replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    #[default]
    Neutral,
    Defensive,
    Angry,
    Sad,
    Fearful,
    Openness,
    Suspicious,
}

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Emotion::Neutral,
        Emotion::Defensive,
        Emotion::Angry,
        Emotion::Sad,
        Emotion::Fearful,
        Emotion::Openness,
        Emotion::Suspicious,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Defensive => "defensive",
            Emotion::Angry => "angry",
            Emotion::Sad => "sad",
            Emotion::Fearful => "fearful",
            Emotion::Openness => "openness",
            Emotion::Suspicious => "suspicious",
        }
    }

    /// Parse an emotion tag, returning `None` for anything outside the set.
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Emotion::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(tag))
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
