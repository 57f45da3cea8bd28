//! The game driver.
//!
//! [`Game`] owns one session. It runs the turn reducer, calls the dialogue
//! service between stages and persists every committed turn before making it
//! the live state. Turns take `&mut self`, so a session processes one message
//! at a time.

mod config;

pub use config::*;

use case_rules::CharacterId;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::accusation::AccusationReadiness;
use crate::dialogue::{Analysis, AnalysisRequest, DialogueService, ReplyRequest};
use crate::error::{EngineError, StorageError};
use crate::session::{GameSummary, SessionId, SessionState};
use crate::storage::SessionStore;
use crate::turn::{
    accuse, open_turn, AccusationVerdict, PlayerTurnInput, Rulebook, TurnEffects, TurnOutcome,
    TurnStage,
};

/// Result of [`Game::accuse`].
#[derive(Debug, Clone)]
pub enum AccusationResponse {
    Accepted(TurnEffects),
    Rejected(AccusationReadiness),
}

/// One running session.
pub struct Game<D, S> {
    rules: Arc<Rulebook>,
    dialogue: D,
    store: S,
    config: EngineConfig,
    state: SessionState,
}

impl<D, S> Game<D, S>
where
    D: DialogueService,
    S: SessionStore,
{
    /// Start a fresh session and persist it.
    pub async fn new_game(
        rules: Arc<Rulebook>,
        dialogue: D,
        store: S,
        config: EngineConfig,
        at: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        let state = rules.new_session(SessionId::new(), at);
        save_with_retry(&store, &state, config.save_attempts).await?;
        info!(session = %state.id, "New game started");

        Ok(Self {
            rules,
            dialogue,
            store,
            config,
            state,
        })
    }

    /// Continue a saved session, if the store has it.
    pub async fn resume(
        rules: Arc<Rulebook>,
        dialogue: D,
        store: S,
        config: EngineConfig,
        id: SessionId,
    ) -> Result<Option<Self>, EngineError> {
        let Some(state) = store.load_state(id).await? else {
            return Ok(None);
        };
        info!(session = %id, phase = %state.phase(), "Game resumed");

        Ok(Some(Self {
            rules,
            dialogue,
            store,
            config,
            state,
        }))
    }

    pub fn id(&self) -> SessionId {
        self.state.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn rules(&self) -> &Rulebook {
        &self.rules
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Final summary; `None` until the game is over.
    pub fn summary(&self) -> Option<GameSummary> {
        self.state.summary()
    }

    /// Throw the current session away and start over under a new id.
    pub async fn restart(&mut self, at: DateTime<Utc>) -> Result<(), EngineError> {
        let state = self.rules.new_session(SessionId::new(), at);
        save_with_retry(&self.store, &state, self.config.save_attempts).await?;
        info!(old = %self.state.id, new = %state.id, "Game restarted");
        self.state = state;
        Ok(())
    }

    /// Play one player message through to a committed turn.
    ///
    /// On error the live state is exactly as before the call.
    pub async fn play_turn(&mut self, input: PlayerTurnInput) -> Result<TurnEffects, EngineError> {
        let rules = Arc::clone(&self.rules);
        let mut stage = open_turn(&self.state, &rules, input)?;

        let outcome = loop {
            stage = match stage {
                TurnStage::Done(outcome) => break outcome,
                TurnStage::Analyze(pending) => {
                    let analysis = self.analyze(&pending.analysis_request()).await;
                    pending.apply_analysis(&rules, analysis)
                }
                TurnStage::Reply(pending) => {
                    let request = pending.reply_request(self.config.history_window);
                    let reply = self.respond(&request).await;
                    TurnStage::Done(pending.apply_reply(&rules, &reply))
                }
            };
        };

        self.commit(outcome).await
    }

    /// Accuse a suspect outside of dialogue.
    pub async fn accuse(
        &mut self,
        suspect: CharacterId,
        at: DateTime<Utc>,
    ) -> Result<AccusationResponse, EngineError> {
        match accuse(&self.state, &self.rules, suspect, at)? {
            AccusationVerdict::Accepted(outcome) => {
                Ok(AccusationResponse::Accepted(self.commit(outcome).await?))
            }
            AccusationVerdict::Rejected(report) => Ok(AccusationResponse::Rejected(report)),
        }
    }

    async fn commit(&mut self, outcome: TurnOutcome) -> Result<TurnEffects, EngineError> {
        save_with_retry(&self.store, &outcome.state, self.config.save_attempts).await?;
        self.state = outcome.state;
        Ok(outcome.effects)
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Analysis {
        match self.dialogue.analyze(request).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(character = %request.character, error = %e, "Analysis failed; using neutral result");
                Analysis::neutral(request.emotion)
            }
        }
    }

    async fn respond(&self, request: &ReplyRequest) -> String {
        match self.dialogue.respond(request).await {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => {
                warn!(character = %request.character, "Empty reply; using fallback");
                self.config.fallback_reply.clone()
            }
            Err(e) => {
                warn!(character = %request.character, error = %e, "Reply failed; using fallback");
                self.config.fallback_reply.clone()
            }
        }
    }
}

/// Save, retrying retryable failures up to `attempts` times in total.
pub async fn save_with_retry<S>(
    store: &S,
    state: &SessionState,
    attempts: u32,
) -> Result<(), StorageError>
where
    S: SessionStore + ?Sized,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match store.save_state(state).await {
            Ok(()) => return Ok(()),
            Err(e) if e.is_retryable() && attempt < attempts => {
                warn!(session = %state.id, attempt, error = %e, "Saving session failed; retrying");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
