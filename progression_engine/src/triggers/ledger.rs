//! Per-session record of fired triggers and their lasting effects.

use case_rules::CharacterId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One fired trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerActivation {
    pub id: String,
    pub activated_at: DateTime<Utc>,
}

/// Activated triggers in firing order, plus the state their effects changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TriggerLedger {
    activations: Vec<TriggerActivation>,
    /// Caps replaced by `unlock_trust_cap` effects.
    cap_overrides: BTreeMap<CharacterId, u8>,
    accusation_enabled: bool,
}

impl TriggerLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_activated(&self, id: &str) -> bool {
        self.activations.iter().any(|a| a.id == id)
    }

    /// Record a firing. Returns false if the trigger had already fired.
    pub fn record(&mut self, id: &str, at: DateTime<Utc>) -> bool {
        if self.is_activated(id) {
            return false;
        }
        self.activations.push(TriggerActivation {
            id: id.to_string(),
            activated_at: at,
        });
        true
    }

    pub fn activated_ids(&self) -> Vec<String> {
        self.activations.iter().map(|a| a.id.clone()).collect()
    }

    pub fn activations(&self) -> &[TriggerActivation] {
        &self.activations
    }

    pub fn set_cap(&mut self, character: CharacterId, cap: u8) {
        self.cap_overrides.insert(character, cap);
    }

    pub fn cap_override(&self, character: CharacterId) -> Option<u8> {
        self.cap_overrides.get(&character).copied()
    }

    pub fn enable_accusation(&mut self) {
        self.accusation_enabled = true;
    }

    pub fn accusation_enabled(&self) -> bool {
        self.accusation_enabled
    }
}
