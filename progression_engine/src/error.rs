//! Error types for the progression engine.

use case_rules::{CaseFileError, CharacterId};
use thiserror::Error;

use crate::accusation::GamePhase;

/// A turn or transition the engine refuses to perform.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("The game is over; no further messages are processed")]
    SessionFinished,

    #[error("{0} has blocked the player")]
    CharacterBlocked(CharacterId),

    #[error("Player message is empty")]
    EmptyMessage,

    #[error("Invalid phase transition from {from:?}: {reason}")]
    InvalidTransition { from: GamePhase, reason: String },

    #[error("Case file error: {0}")]
    CaseFile(#[from] CaseFileError),

    #[error("Invalid engine config: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl EngineError {
    pub fn invalid_transition(from: GamePhase, reason: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from,
            reason: reason.into(),
        }
    }
}

/// Failure of the session store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Whether retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, StorageError::Serialization(_))
    }
}

/// Failure of the external dialogue service. Never shown to the player.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DialogueError {
    #[error("Dialogue service request failed: {0}")]
    Transport(String),

    #[error("Malformed dialogue response: {0}")]
    Malformed(String),
}

impl DialogueError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}
