//! Narrative trigger and trust lock definitions.

use serde::{Deserialize, Serialize};

use crate::characters::CharacterId;
use crate::mechanics::KeywordMode;

/// A one-shot narrative rule: once its condition holds, its effects apply for good.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub condition: TriggerCondition,
    /// Applied in order on activation.
    #[serde(default)]
    pub effects: Vec<TriggerEffect>,
}

/// What must hold for a trigger to fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerCondition {
    /// The player's message to `character` contains the keywords.
    KeywordMatch {
        #[serde(default)]
        character: Option<CharacterId>,
        keywords: Vec<String>,
        #[serde(default)]
        mode: KeywordMode,
    },
    /// The character's trust has reached `threshold`.
    TrustAtLeast {
        character: CharacterId,
        threshold: u8,
    },
    /// Every listed evidence id has been collected.
    EvidenceSetSubset { ids: Vec<String> },
    /// Every listed trigger has already fired.
    TriggerSetSubset { ids: Vec<String> },
}

/// What a trigger does when it fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerEffect {
    /// Replace the trust cap of `character`; 100 removes the bound.
    UnlockTrustCap { character: CharacterId, cap: u8 },
    /// Add an evidence item without keyword matching.
    GrantEvidence { id: String },
    /// Mark the case as ready for accusation.
    EnableAccusation,
}

/// An upper bound on a character's trust that holds until a trigger fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustLock {
    pub character: CharacterId,
    pub cap: u8,
    pub unlocking_trigger: String,
    #[serde(default)]
    pub description: Option<String>,
}
