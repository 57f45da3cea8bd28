//! Per-character conversation logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who wrote a chat entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Player,
    /// The character whose conversation this is.
    Character,
    /// Game narration.
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl ChatEntry {
    pub fn player(text: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            speaker: Speaker::Player,
            text: text.into(),
            at,
        }
    }

    pub fn character(text: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            speaker: Speaker::Character,
            text: text.into(),
            at,
        }
    }

    pub fn system(text: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            speaker: Speaker::System,
            text: text.into(),
            at,
        }
    }
}

/// One conversation, oldest entry first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ChatHistory {
    entries: Vec<ChatEntry>,
}

impl ChatHistory {
    pub fn push(&mut self, entry: ChatEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    /// The last `n` entries.
    pub fn recent(&self, n: usize) -> &[ChatEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
