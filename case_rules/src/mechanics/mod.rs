//! Game mechanics: trust thresholds, trust bands and keyword matching.

use serde::{Deserialize, Serialize};

/// Lowest trust value.
pub const TRUST_MIN: u8 = 0;
/// Highest trust value.
pub const TRUST_MAX: u8 = 100;
/// A suspect whose trust drops below this blocks the player.
pub const BLOCK_THRESHOLD: u8 = 10;
/// Largest magnitude a single trust delta may have. Anything beyond is discarded.
pub const MAX_TRUST_DELTA: i32 = 100;

/// Coarse description of a trust level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustBand {
    /// < 10.
    Blocked,
    /// 10-29.
    VeryLow,
    /// 30-59.
    Low,
    /// 60-84.
    Medium,
    /// 85+.
    High,
}

impl TrustBand {
    /// Classify a trust value.
    pub fn of(trust: u8) -> Self {
        match trust {
            t if t < BLOCK_THRESHOLD => TrustBand::Blocked,
            t if t < 30 => TrustBand::VeryLow,
            t if t < 60 => TrustBand::Low,
            t if t < 85 => TrustBand::Medium,
            _ => TrustBand::High,
        }
    }
}

/// How a keyword list is combined when matched against text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeywordMode {
    /// At least one keyword must appear.
    #[default]
    Any,
    /// Every keyword must appear.
    All,
}

/// Case-insensitive substring matcher over a fixed keyword list.
///
/// Keywords are lowercased once at construction; text is lowercased per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// True iff every keyword is a substring of `text`. An empty set never matches.
    pub fn all_in(&self, text: &str) -> bool {
        if self.keywords.is_empty() {
            return false;
        }
        let text = text.to_lowercase();
        self.keywords.iter().all(|k| text.contains(k.as_str()))
    }

    /// True iff at least one keyword is a substring of `text`.
    pub fn any_in(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }

    /// Match according to `mode`.
    pub fn matches(&self, text: &str, mode: KeywordMode) -> bool {
        match mode {
            KeywordMode::Any => self.any_in(text),
            KeywordMode::All => self.all_in(text),
        }
    }
}
