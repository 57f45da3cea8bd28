//! Accusation rules and the canned narration of the case.

use serde::{Deserialize, Serialize};

use crate::characters::CharacterId;
use crate::mechanics::KeywordSet;

/// When and how the endgame starts and resolves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccusationRules {
    /// The only character that can be formally accused in dialogue.
    pub suspect: CharacterId,
    /// Any of these in a message to `suspect` counts as an accusation.
    pub keywords: Vec<String>,
    /// Evidence count needed alongside `key_evidence`.
    pub min_evidence: usize,
    /// Every one of these must be collected.
    pub key_evidence: Vec<String>,
    /// Collecting this alone is enough to accuse.
    #[serde(default)]
    pub confession_evidence: Option<String>,
    /// Messages the player may spend after accusing.
    #[serde(default = "default_message_budget")]
    pub message_budget: u32,
    /// Character that receives the suspect's address.
    pub informant: CharacterId,
    /// All present -> the suspect is arrested.
    pub correct_address: Vec<String>,
    /// All present -> the suspect escapes.
    pub wrong_address: Vec<String>,
    /// Whether an `enable_accusation` trigger effect on its own satisfies readiness.
    #[serde(default)]
    pub trigger_unlocks: bool,
}

fn default_message_budget() -> u32 {
    10
}

impl AccusationRules {
    pub fn accusation_keywords(&self) -> KeywordSet {
        KeywordSet::new(&self.keywords)
    }

    pub fn correct_address_keywords(&self) -> KeywordSet {
        KeywordSet::new(&self.correct_address)
    }

    pub fn wrong_address_keywords(&self) -> KeywordSet {
        KeywordSet::new(&self.wrong_address)
    }
}

/// Fixed texts the engine inserts into conversations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Narration {
    /// First helper message of a new game.
    pub welcome: String,
    /// Shown when a suspect blocks the player.
    pub blocked: String,
    /// Reply to any message sent to the accused after the accusation.
    pub undelivered: String,
    /// The suspect's reply to a successful accusation.
    pub accused_reply: String,
    /// System narration announcing the countdown.
    pub countdown: String,
    /// Defensive reply when key evidence is missing.
    pub missing_key_evidence: String,
    /// Defensive reply when there is too little evidence. `{count}` is substituted.
    pub insufficient_evidence: String,
    pub arrested: String,
    pub escaped_wrong_address: String,
    pub escaped_timeout: String,
}

impl Narration {
    /// Defensive reply for an accusation that fails readiness.
    pub fn defensive_reply(&self, missing_key_evidence: bool, evidence_count: usize) -> String {
        if missing_key_evidence {
            self.missing_key_evidence.clone()
        } else {
            self.insufficient_evidence
                .replace("{count}", &evidence_count.to_string())
        }
    }
}
