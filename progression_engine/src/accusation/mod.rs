//! Accusation Phase State Machine.
//!
//! `investigation` → `accusation_dialogue` → `game_over`. Phases only move
//! forward. Every transition method checks the current phase and refuses
//! anything out of order with [`EngineError::InvalidTransition`].

mod readiness;

pub use readiness::*;

use case_rules::CharacterId;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::EngineError;

/// Where the session is in the story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Investigation,
    AccusationDialogue,
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Investigation => "investigation",
            GamePhase::AccusationDialogue => "accusation_dialogue",
            GamePhase::GameOver => "game_over",
        }
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeReason {
    Arrested,
    Escaped,
    InsufficientEvidence,
}

/// Final result of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    pub reason: OutcomeReason,
}

impl Outcome {
    pub fn arrested() -> Self {
        Self {
            success: true,
            reason: OutcomeReason::Arrested,
        }
    }

    pub fn escaped() -> Self {
        Self {
            success: false,
            reason: OutcomeReason::Escaped,
        }
    }
}

/// Phase, remaining message budget and outcome of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccusationState {
    pub phase: GamePhase,
    pub message_budget: u32,
    pub outcome: Option<Outcome>,
    /// The character formally accused, once the dialogue phase starts.
    pub accused: Option<CharacterId>,
}

impl Default for AccusationState {
    fn default() -> Self {
        Self::new(10)
    }
}

impl AccusationState {
    pub fn new(message_budget: u32) -> Self {
        Self {
            phase: GamePhase::Investigation,
            message_budget,
            outcome: None,
            accused: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn is_accused(&self, id: CharacterId) -> bool {
        self.accused == Some(id)
    }

    /// investigation → accusation_dialogue.
    pub fn begin_dialogue(&mut self, accused: CharacterId, budget: u32) -> Result<(), EngineError> {
        if self.phase != GamePhase::Investigation {
            return Err(EngineError::invalid_transition(
                self.phase,
                "accusation already made",
            ));
        }
        self.phase = GamePhase::AccusationDialogue;
        self.message_budget = budget;
        self.accused = Some(accused);
        info!(accused = %accused, budget, "Accusation dialogue started");
        Ok(())
    }

    /// Spend one message of the countdown; returns what is left.
    pub fn spend_message(&mut self) -> Result<u32, EngineError> {
        if self.phase != GamePhase::AccusationDialogue {
            return Err(EngineError::invalid_transition(
                self.phase,
                "no countdown is running",
            ));
        }
        self.message_budget = self.message_budget.saturating_sub(1);
        Ok(self.message_budget)
    }

    /// accusation_dialogue → game_over.
    pub fn finish(&mut self, outcome: Outcome) -> Result<(), EngineError> {
        if self.phase != GamePhase::AccusationDialogue {
            return Err(EngineError::invalid_transition(
                self.phase,
                "the game can only end from the accusation dialogue",
            ));
        }
        self.phase = GamePhase::GameOver;
        self.outcome = Some(outcome);
        info!(success = outcome.success, reason = ?outcome.reason, "Game over");
        Ok(())
    }
}
