//! What a committed turn changed, for rendering and logging.

use case_rules::{CharacterId, Emotion};
use serde::Serialize;

use crate::accusation::{AccusationReadiness, GamePhase, Outcome};
use crate::evidence::EvidenceItem;

/// Outbound result of one turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnEffects {
    pub character: CharacterId,
    pub new_trust: u8,
    pub new_emotion: Emotion,
    pub blocked: bool,
    /// Both matched and trigger-granted items, in discovery order.
    pub newly_discovered_evidence: Vec<EvidenceItem>,
    pub newly_activated_triggers: Vec<String>,
    pub newly_revealed_secrets: Vec<String>,
    pub new_phase: GamePhase,
    pub new_message_budget: u32,
    pub outcome: Option<Outcome>,
    /// The character's reply appended this turn.
    pub reply: Option<String>,
    /// System narration appended this turn.
    pub narration: Vec<String>,
    /// Set when the turn attempted an accusation.
    pub readiness: Option<AccusationReadiness>,
    /// An `enable_accusation` effect fired this turn.
    pub accusation_enabled: bool,
}

impl TurnEffects {
    pub fn discovered_ids(&self) -> Vec<&str> {
        self.newly_discovered_evidence
            .iter()
            .map(|e| e.id.as_str())
            .collect()
    }
}
