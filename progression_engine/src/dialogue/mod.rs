//! Dialogue service port.
//!
//! The engine never generates text itself. It asks an external service to
//! judge the player's message (`analyze`) and to write the character's reply
//! (`respond`). Both calls may fail; the game driver substitutes neutral
//! defaults so a failure never reaches the player.

mod parse;

pub use parse::*;

use async_trait::async_trait;
use case_rules::{CharacterId, Emotion};
use serde::{Deserialize, Serialize};

use crate::error::DialogueError;
use crate::session::ChatEntry;

/// Input to `analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    pub character: CharacterId,
    pub player_text: String,
    pub trust: u8,
    pub emotion: Emotion,
    pub evidence_ids: Vec<String>,
    /// Secrets the character has already given away.
    pub revealed_secrets: Vec<String>,
}

/// The service's judgement of a player message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub trust_delta: i32,
    pub emotion: Emotion,
    /// Block the player regardless of trust.
    #[serde(default)]
    pub force_block: bool,
}

impl Analysis {
    /// The no-op result used when analysis is unavailable.
    pub fn neutral(current: Emotion) -> Self {
        Self {
            trust_delta: 0,
            emotion: current,
            force_block: false,
        }
    }
}

/// Input to `respond`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyRequest {
    pub character: CharacterId,
    pub player_text: String,
    /// Trust after this turn's update.
    pub trust: u8,
    pub emotion: Emotion,
    /// Most recent entries of the conversation, oldest first, excluding this message.
    pub history: Vec<ChatEntry>,
    pub evidence_ids: Vec<String>,
    /// Secrets the character may now talk about, including any unlocked this turn.
    pub revealed_secrets: Vec<String>,
    /// Collected-evidence digest; only sent to the helper.
    pub evidence_summary: Option<String>,
}

/// External text generation.
#[async_trait]
pub trait DialogueService: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Analysis, DialogueError>;

    async fn respond(&self, request: &ReplyRequest) -> Result<String, DialogueError>;
}
