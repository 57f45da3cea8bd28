//! Session state - everything that changes during one playthrough.

mod history;

pub use history::*;

use case_rules::{CaseFile, CharacterId, EvidenceCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::accusation::{AccusationState, GamePhase, Outcome};
use crate::evidence::{EvidenceItem, EvidenceLog};
use crate::triggers::TriggerLedger;
use crate::trust::TrustController;

/// Unique identifier for a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The complete mutable state of one game.
///
/// Turns never modify a live `SessionState`; they work on a clone and the
/// caller swaps it in once the turn is committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub id: SessionId,
    pub started_at: DateTime<Utc>,
    pub trust: TrustController,
    pub evidence: EvidenceLog,
    pub triggers: TriggerLedger,
    pub accusation: AccusationState,
    #[serde(default)]
    pub histories: BTreeMap<CharacterId, ChatHistory>,
    /// Completed player turns.
    #[serde(default)]
    pub turns: u64,
}

impl SessionState {
    /// A fresh game: initial trust, nothing collected, the helper's briefing seeded.
    pub fn new(id: SessionId, case: &CaseFile, at: DateTime<Utc>) -> Self {
        let mut state = Self {
            id,
            started_at: at,
            trust: TrustController::new(case),
            evidence: EvidenceLog::new(),
            triggers: TriggerLedger::new(),
            accusation: AccusationState::new(case.accusation.message_budget),
            histories: BTreeMap::new(),
            turns: 0,
        };
        state.push(
            CharacterId::Helper,
            ChatEntry::character(case.narration.welcome.clone(), at),
        );
        state
    }

    pub fn phase(&self) -> GamePhase {
        self.accusation.phase
    }

    pub fn history(&self, id: CharacterId) -> &[ChatEntry] {
        self.histories
            .get(&id)
            .map(|h| h.entries())
            .unwrap_or(&[])
    }

    pub fn push(&mut self, id: CharacterId, entry: ChatEntry) {
        self.histories.entry(id).or_default().push(entry);
    }

    /// Read-only end-of-game view; `None` until the game is over.
    pub fn summary(&self) -> Option<GameSummary> {
        let outcome = self.accusation.outcome?;
        if !self.accusation.is_finished() {
            return None;
        }
        Some(GameSummary {
            outcome,
            evidence: self.evidence.iter().cloned().collect(),
            stats: self.evidence.stats(),
            turns: self.turns,
        })
    }
}

/// What the player sees after the game ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub outcome: Outcome,
    /// Collected evidence, in discovery order.
    pub evidence: Vec<EvidenceItem>,
    pub stats: BTreeMap<EvidenceCategory, usize>,
    pub turns: u64,
}
