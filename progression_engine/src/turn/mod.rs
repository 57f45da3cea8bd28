//! The turn reducer.
//!
//! A turn is a pure function of the session state, the rulebook and the
//! player's input, split into stages around the two dialogue service calls:
//!
//! ```text
//! open_turn ──► Analyze(PendingTurn) ──apply_analysis──► Reply(ReplyPending) ──apply_reply──► TurnOutcome
//!     │                    │
//!     └──► Done            └──► Done (blocked)
//! ```
//!
//! Every stage works on a private clone of the state. Nothing reaches the
//! caller's `SessionState` until it swaps in [`TurnOutcome::state`], so an
//! abandoned turn leaves no trace.

mod effects;
mod rulebook;

pub use effects::*;
pub use rulebook::*;

use case_rules::{CharacterId, Emotion};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::accusation::{
    detect_address, is_accusation, readiness, AccusationReadiness, AccusationState,
    AddressDisclosure, GamePhase, Outcome,
};
use crate::dialogue::{clean_reply, Analysis, AnalysisRequest, ReplyRequest};
use crate::error::EngineError;
use crate::evidence::EvidenceItem;
use crate::session::{ChatEntry, SessionState};
use crate::triggers::TriggerContext;
use crate::trust::should_block;

/// Marker sent in the helper's evidence digest when nothing is collected.
const NO_EVIDENCE: &str = "Улик пока нет.";

/// One player message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerTurnInput {
    pub character: CharacterId,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl PlayerTurnInput {
    pub fn new(character: CharacterId, text: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            character,
            text: text.into(),
            at,
        }
    }
}

/// A committed turn: the next state and what changed.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub state: SessionState,
    pub effects: TurnEffects,
}

/// Where a turn stands between dialogue service calls.
pub enum TurnStage {
    Done(TurnOutcome),
    Analyze(PendingTurn),
    Reply(ReplyPending),
}

/// Result of a direct accusation.
#[derive(Debug, Clone)]
pub enum AccusationVerdict {
    Accepted(TurnOutcome),
    /// Not enough evidence; nothing changed.
    Rejected(AccusationReadiness),
}

#[derive(Debug, Default)]
struct TurnLog {
    discovered: Vec<EvidenceItem>,
    activated: Vec<String>,
    revealed_secrets: Vec<String>,
    reply: Option<String>,
    narration: Vec<String>,
    readiness: Option<AccusationReadiness>,
    accusation_enabled: bool,
}

/// The working copy of a turn in progress.
struct TurnDraft {
    state: SessionState,
    character: CharacterId,
    at: DateTime<Utc>,
    log: TurnLog,
}

impl TurnDraft {
    fn new(state: &SessionState, character: CharacterId, at: DateTime<Utc>) -> Self {
        Self {
            state: state.clone(),
            character,
            at,
            log: TurnLog::default(),
        }
    }

    fn said(&mut self, text: &str) {
        self.state
            .push(self.character, ChatEntry::player(text, self.at));
    }

    fn reply(&mut self, text: String) {
        self.state
            .push(self.character, ChatEntry::character(text.clone(), self.at));
        self.log.reply = Some(text);
    }

    fn narrate(&mut self, text: &str) {
        self.state
            .push(self.character, ChatEntry::system(text, self.at));
        self.log.narration.push(text.to_string());
    }

    /// Apply a phase change that the caller has already established is legal.
    fn transition(
        &mut self,
        change: impl FnOnce(&mut AccusationState) -> Result<(), EngineError>,
    ) -> bool {
        match change(&mut self.state.accusation) {
            Ok(()) => true,
            Err(e) => {
                debug_assert!(false, "{}", e);
                error!(error = %e, "Ignoring invalid phase transition");
                false
            }
        }
    }

    fn run_triggers(&mut self, rules: &Rulebook, ctx: TriggerContext<'_>) {
        let report = rules.triggers().evaluate(
            &ctx,
            &mut self.state.triggers,
            &mut self.state.evidence,
            self.at,
        );
        self.log.activated.extend(report.activated);
        self.log.discovered.extend(report.granted_evidence);
        self.log.accusation_enabled |= report.accusation_enabled;
    }

    fn finish(mut self) -> TurnOutcome {
        self.state.turns += 1;
        let c = self.character;
        let effects = TurnEffects {
            character: c,
            new_trust: self.state.trust.trust(c),
            new_emotion: self.state.trust.emotion(c),
            blocked: self.state.trust.is_blocked(c),
            newly_discovered_evidence: self.log.discovered,
            newly_activated_triggers: self.log.activated,
            newly_revealed_secrets: self.log.revealed_secrets,
            new_phase: self.state.accusation.phase,
            new_message_budget: self.state.accusation.message_budget,
            outcome: self.state.accusation.outcome,
            reply: self.log.reply,
            narration: self.log.narration,
            readiness: self.log.readiness,
            accusation_enabled: self.log.accusation_enabled,
        };
        TurnOutcome {
            state: self.state,
            effects,
        }
    }
}

/// Start a turn: reject what cannot be played, resolve what needs no dialogue
/// service, and run the pre-dialogue trigger pass.
pub fn open_turn(
    state: &SessionState,
    rules: &Rulebook,
    input: PlayerTurnInput,
) -> Result<TurnStage, EngineError> {
    if state.accusation.is_finished() {
        return Err(EngineError::SessionFinished);
    }
    if input.text.trim().is_empty() {
        return Err(EngineError::EmptyMessage);
    }

    let case = rules.case();
    let c = input.character;
    let text = input.text;
    let mut draft = TurnDraft::new(state, c, input.at);

    if state.phase() == GamePhase::AccusationDialogue {
        if state.accusation.is_accused(c) {
            draft.said(&text);
            draft.narrate(&case.narration.undelivered);
            return Ok(TurnStage::Done(draft.finish()));
        }

        if c == case.accusation.informant {
            if let Some(disclosure) = detect_address(&case.accusation, &text) {
                let (outcome, narration) = match disclosure {
                    AddressDisclosure::Correct => (Outcome::arrested(), &case.narration.arrested),
                    AddressDisclosure::Wrong => {
                        (Outcome::escaped(), &case.narration.escaped_wrong_address)
                    }
                };
                info!(?disclosure, "Address disclosed to the informant");
                draft.said(&text);
                draft.transition(|a| a.finish(outcome));
                draft.narrate(narration);
                return Ok(TurnStage::Done(draft.finish()));
            }
        }
    }

    if state.trust.is_blocked(c) {
        return Err(EngineError::CharacterBlocked(c));
    }

    draft.said(&text);

    if state.phase() == GamePhase::AccusationDialogue {
        let mut remaining = None;
        draft.transition(|a| {
            remaining = Some(a.spend_message()?);
            Ok(())
        });
        debug!(remaining = ?remaining, "Countdown message spent");

        if remaining == Some(0) {
            draft.transition(|a| a.finish(Outcome::escaped()));
            draft.narrate(&case.narration.escaped_timeout);
            return Ok(TurnStage::Done(draft.finish()));
        }
    }

    draft.run_triggers(rules, TriggerContext::before_dialogue(c, &text));

    if state.phase() == GamePhase::Investigation && is_accusation(&case.accusation, c, &text) {
        return Ok(TurnStage::Done(accuse_in_dialogue(draft, rules)));
    }

    if !c.tracks_trust() {
        // no analysis, so the post-update pass sees unchanged trust
        let trust = draft.state.trust.trust(c);
        draft.run_triggers(rules, TriggerContext::after_trust_update(c, trust));
        return Ok(TurnStage::Reply(ReplyPending { draft, text }));
    }
    Ok(TurnStage::Analyze(PendingTurn { draft, text }))
}

/// An accusation keyword reached the suspect: start the countdown or get a defensive reply.
fn accuse_in_dialogue(mut draft: TurnDraft, rules: &Rulebook) -> TurnOutcome {
    let case = rules.case();
    let report = readiness(&case.accusation, &draft.state.evidence, &draft.state.triggers);

    if report.can_accuse {
        draft.log.readiness = Some(report);
        start_countdown(&mut draft, rules);
    } else {
        info!(
            evidence_count = report.evidence_count,
            missing = ?report.missing_key_evidence,
            "Accusation refused"
        );
        let reply = case
            .narration
            .defensive_reply(!report.missing_key_evidence.is_empty(), report.evidence_count);
        draft.state.trust.set_emotion(draft.character, Emotion::Defensive);
        draft.reply(reply);
        draft.log.readiness = Some(report);
    }
    draft.finish()
}

fn start_countdown(draft: &mut TurnDraft, rules: &Rulebook) {
    let case = rules.case();
    let suspect = case.accusation.suspect;
    let budget = case.accusation.message_budget;

    if !draft.transition(|a| a.begin_dialogue(suspect, budget)) {
        return;
    }
    draft.state.trust.block(suspect);
    draft.state.trust.set_emotion(suspect, Emotion::Angry);
    draft.reply(case.narration.accused_reply.clone());
    draft.narrate(&case.narration.countdown);
}

/// Accuse a suspect directly, outside of dialogue.
///
/// The designated suspect is accepted when the evidence is ready and refused
/// otherwise. Naming anyone else is an error and changes nothing.
pub fn accuse(
    state: &SessionState,
    rules: &Rulebook,
    suspect: CharacterId,
    at: DateTime<Utc>,
) -> Result<AccusationVerdict, EngineError> {
    match state.phase() {
        GamePhase::Investigation => {}
        GamePhase::GameOver => return Err(EngineError::SessionFinished),
        phase => return Err(EngineError::invalid_transition(phase, "accusation already made")),
    }
    let case = rules.case();
    if suspect != case.accusation.suspect {
        info!(accused = %suspect, "Accusation of someone other than the suspect refused");
        return Err(EngineError::invalid_transition(
            GamePhase::Investigation,
            format!("{} cannot be accused", suspect),
        ));
    }
    if state.trust.is_blocked(suspect) {
        return Err(EngineError::CharacterBlocked(suspect));
    }

    let report = readiness(&case.accusation, &state.evidence, &state.triggers);
    if !report.can_accuse {
        return Ok(AccusationVerdict::Rejected(report));
    }
    let mut draft = TurnDraft::new(state, suspect, at);
    draft.log.readiness = Some(report);
    start_countdown(&mut draft, rules);
    Ok(AccusationVerdict::Accepted(draft.finish()))
}

/// A turn waiting for the dialogue service's analysis.
pub struct PendingTurn {
    draft: TurnDraft,
    text: String,
}

impl PendingTurn {
    pub fn character(&self) -> CharacterId {
        self.draft.character
    }

    pub fn analysis_request(&self) -> AnalysisRequest {
        let c = self.draft.character;
        AnalysisRequest {
            character: c,
            player_text: self.text.clone(),
            trust: self.draft.state.trust.trust(c),
            emotion: self.draft.state.trust.emotion(c),
            evidence_ids: self.draft.state.evidence.ids(),
            revealed_secrets: self.draft.state.trust.revealed_secrets(c),
        }
    }

    /// Apply the analysis: update trust and emotion, run the post-update
    /// trigger pass and decide whether the character still talks.
    pub fn apply_analysis(self, rules: &Rulebook, analysis: Analysis) -> TurnStage {
        let PendingTurn { mut draft, text } = self;
        let c = draft.character;

        let old_trust = draft.state.trust.trust(c);
        let cap = rules.triggers().trust_cap(&draft.state.triggers, c);
        let new_trust = draft.state.trust.apply_delta(c, analysis.trust_delta, cap);
        draft.state.trust.set_emotion(c, analysis.emotion);

        let revealed = draft
            .state
            .trust
            .reveal_secrets(rules.case(), c, old_trust, new_trust);
        if !revealed.is_empty() {
            debug!(character = %c, secrets = ?revealed, "Secrets unlocked");
        }
        draft.log.revealed_secrets.extend(revealed);

        draft.run_triggers(rules, TriggerContext::after_trust_update(c, new_trust));

        if c.tracks_trust() && (analysis.force_block || should_block(new_trust)) {
            draft.state.trust.block(c);
            draft.narrate(&rules.case().narration.blocked);
            return TurnStage::Done(draft.finish());
        }

        TurnStage::Reply(ReplyPending { draft, text })
    }
}

/// A turn waiting for the character's reply.
pub struct ReplyPending {
    draft: TurnDraft,
    text: String,
}

impl ReplyPending {
    pub fn character(&self) -> CharacterId {
        self.draft.character
    }

    /// Request for the reply, with up to `history_window` earlier entries.
    pub fn reply_request(&self, history_window: usize) -> ReplyRequest {
        let c = self.draft.character;
        let state = &self.draft.state;

        // the last entry is the message being answered
        let history = match state.histories.get(&c) {
            Some(h) => {
                let recent = h.recent(history_window.saturating_add(1));
                recent[..recent.len().saturating_sub(1)].to_vec()
            }
            None => Vec::new(),
        };

        ReplyRequest {
            character: c,
            player_text: self.text.clone(),
            trust: state.trust.trust(c),
            emotion: state.trust.emotion(c),
            history,
            evidence_ids: state.evidence.ids(),
            revealed_secrets: state.trust.revealed_secrets(c),
            evidence_summary: (!c.tracks_trust()).then(|| state.evidence.summary(NO_EVIDENCE)),
        }
    }

    /// Record the reply and scan it for evidence.
    pub fn apply_reply(self, rules: &Rulebook, raw_reply: &str) -> TurnOutcome {
        let mut draft = self.draft;
        let c = draft.character;

        let reply = clean_reply(raw_reply, rules.case().display_name(c));
        let found = rules.evidence().detect(&reply, c, draft.at);
        draft.reply(reply);

        let added = draft.state.evidence.merge(found);
        for item in &added {
            info!(evidence_id = %item.id, character = %c, "Evidence discovered");
        }
        draft.log.discovered.extend(added);

        draft.finish()
    }
}
