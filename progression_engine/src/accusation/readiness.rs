//! Whether the collected evidence supports a formal accusation, and endgame text checks.

use case_rules::{AccusationRules, CharacterId};
use serde::{Deserialize, Serialize};

use crate::evidence::EvidenceLog;
use crate::triggers::TriggerLedger;

/// Outcome of the readiness check, with enough detail to explain a refusal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccusationReadiness {
    pub can_accuse: bool,
    pub has_confession: bool,
    pub evidence_count: usize,
    pub missing_key_evidence: Vec<String>,
    /// An `enable_accusation` trigger has fired (only decisive if the case says so).
    pub enabled_by_trigger: bool,
}

/// Evaluate readiness: a confession, or at least `min_evidence` items including
/// every key item.
pub fn readiness(
    rules: &AccusationRules,
    evidence: &EvidenceLog,
    ledger: &TriggerLedger,
) -> AccusationReadiness {
    let has_confession = rules
        .confession_evidence
        .as_deref()
        .map(|id| evidence.contains(id))
        .unwrap_or(false);

    let missing_key_evidence: Vec<String> = rules
        .key_evidence
        .iter()
        .filter(|id| !evidence.contains(id))
        .cloned()
        .collect();

    let evidence_count = evidence.len();
    let enabled_by_trigger = ledger.accusation_enabled();

    let enough = evidence_count >= rules.min_evidence && missing_key_evidence.is_empty();
    let can_accuse = has_confession || enough || (rules.trigger_unlocks && enabled_by_trigger);

    AccusationReadiness {
        can_accuse,
        has_confession,
        evidence_count,
        missing_key_evidence,
        enabled_by_trigger,
    }
}

/// Whether a message to `character` is a formal accusation attempt.
pub fn is_accusation(rules: &AccusationRules, character: CharacterId, text: &str) -> bool {
    character == rules.suspect && rules.accusation_keywords().any_in(text)
}

/// Address named to the informant during the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressDisclosure {
    Correct,
    Wrong,
}

/// Look for the suspect's address in a message. The correct address wins a tie.
pub fn detect_address(rules: &AccusationRules, text: &str) -> Option<AddressDisclosure> {
    if rules.correct_address_keywords().all_in(text) {
        Some(AddressDisclosure::Correct)
    } else if rules.wrong_address_keywords().all_in(text) {
        Some(AddressDisclosure::Wrong)
    } else {
        None
    }
}
