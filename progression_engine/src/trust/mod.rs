//! Trust & Emotion Controller.
//!
//! Owns each character's trust score, emotion tag, block flag and revealed
//! secrets. Trust is always within 0..=100 and below any active trust cap;
//! once a suspect blocks the player the flag is never cleared.

use case_rules::{
    CaseFile, CharacterId, Emotion, TrustBand, BLOCK_THRESHOLD, MAX_TRUST_DELTA, TRUST_MAX,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Trust, emotion and block state of a single character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustState {
    pub character: CharacterId,
    pub trust: u8,
    pub emotion: Emotion,
    pub blocked: bool,
    pub revealed_secret_ids: BTreeSet<String>,
}

impl TrustState {
    pub fn new(character: CharacterId, trust: u8) -> Self {
        Self {
            character,
            trust: trust.min(TRUST_MAX),
            emotion: Emotion::Neutral,
            blocked: false,
            revealed_secret_ids: BTreeSet::new(),
        }
    }
}

/// True iff a suspect at this trust level refuses to talk.
pub fn should_block(trust: u8) -> bool {
    trust < BLOCK_THRESHOLD
}

/// Coerce a raw delta to a usable one: out-of-range values become 0.
pub fn sanitize_delta(raw: i32) -> i32 {
    if (-MAX_TRUST_DELTA..=MAX_TRUST_DELTA).contains(&raw) {
        raw
    } else {
        0
    }
}

/// Coerce a numeric delta of unknown quality (e.g. parsed JSON) to an integer delta.
pub fn sanitize_raw_delta(raw: f64) -> i32 {
    if !raw.is_finite() || raw.abs() > MAX_TRUST_DELTA as f64 {
        return 0;
    }
    raw.round() as i32
}

/// Per-character trust book for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TrustController {
    states: BTreeMap<CharacterId, TrustState>,
}

impl TrustController {
    /// Fresh states for every character, at the case's initial trust.
    pub fn new(case: &CaseFile) -> Self {
        let states = CharacterId::ALL
            .into_iter()
            .map(|id| (id, TrustState::new(id, case.initial_trust(id))))
            .collect();
        Self { states }
    }

    pub fn get(&self, id: CharacterId) -> Option<&TrustState> {
        self.states.get(&id)
    }

    fn state_mut(&mut self, id: CharacterId) -> &mut TrustState {
        self.states
            .entry(id)
            .or_insert_with(|| TrustState::new(id, TRUST_MAX))
    }

    /// Current trust; characters without state count as fully trusting.
    pub fn trust(&self, id: CharacterId) -> u8 {
        self.get(id).map(|s| s.trust).unwrap_or(TRUST_MAX)
    }

    pub fn emotion(&self, id: CharacterId) -> Emotion {
        self.get(id).map(|s| s.emotion).unwrap_or_default()
    }

    pub fn is_blocked(&self, id: CharacterId) -> bool {
        self.get(id).map(|s| s.blocked).unwrap_or(false)
    }

    /// Coarse trust level for display.
    pub fn band(&self, id: CharacterId) -> TrustBand {
        TrustBand::of(self.trust(id))
    }

    /// Apply a trust delta, clamping to 0..=100 and then to `cap` if one is active.
    ///
    /// The helper ignores deltas entirely. Out-of-range deltas are treated as 0.
    pub fn apply_delta(&mut self, id: CharacterId, raw_delta: i32, cap: Option<u8>) -> u8 {
        if !id.tracks_trust() {
            return self.trust(id);
        }

        let delta = sanitize_delta(raw_delta);
        if delta != raw_delta {
            debug!(character = %id, raw_delta, "Discarding out-of-range trust delta");
        }

        let state = self.state_mut(id);
        let clamped = (i32::from(state.trust) + delta).clamp(0, i32::from(TRUST_MAX)) as u8;
        let capped = match cap {
            Some(cap) if clamped > cap => {
                debug!(character = %id, cap, wanted = clamped, "Trust held at cap");
                cap
            }
            _ => clamped,
        };

        state.trust = capped;
        capped
    }

    /// Replace a character's emotion.
    pub fn set_emotion(&mut self, id: CharacterId, emotion: Emotion) {
        self.state_mut(id).emotion = emotion;
    }

    /// Permanently block the player for this character.
    ///
    /// Returns true if the character was not blocked before. The helper never blocks.
    pub fn block(&mut self, id: CharacterId) -> bool {
        if !id.tracks_trust() {
            return false;
        }
        let state = self.state_mut(id);
        if state.blocked {
            return false;
        }
        state.blocked = true;
        info!(character = %id, trust = state.trust, "Character blocked the player");
        true
    }

    /// Reveal the secrets whose threshold lies in `(old_trust, new_trust]`.
    ///
    /// Only upward crossings reveal anything; returns the newly revealed ids.
    pub fn reveal_secrets(
        &mut self,
        case: &CaseFile,
        id: CharacterId,
        old_trust: u8,
        new_trust: u8,
    ) -> Vec<String> {
        if new_trust <= old_trust || !id.tracks_trust() {
            return Vec::new();
        }

        let crossed: Vec<String> = case
            .secrets_for(id)
            .into_iter()
            .filter(|s| s.trust_required > old_trust && s.trust_required <= new_trust)
            .map(|s| s.id.clone())
            .collect();

        let state = self.state_mut(id);
        crossed
            .into_iter()
            .filter(|secret| state.revealed_secret_ids.insert(secret.clone()))
            .collect()
    }

    /// Ids of every secret the character has revealed so far.
    pub fn revealed_secrets(&self, id: CharacterId) -> Vec<String> {
        self.get(id)
            .map(|s| s.revealed_secret_ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrustState> {
        self.states.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> TrustController {
        TrustController::new(&CaseFile::gromov().unwrap())
    }

    #[test]
    fn test_initial_states() {
        let trust = controller();
        assert_eq!(trust.trust(CharacterId::Anna), 50);
        assert_eq!(trust.trust(CharacterId::Boris), 40);
        assert_eq!(trust.emotion(CharacterId::Viktor), Emotion::Neutral);
        assert!(!trust.is_blocked(CharacterId::Viktor));
        assert_eq!(trust.band(CharacterId::Boris), TrustBand::Low);
        assert_eq!(trust.band(CharacterId::Helper), TrustBand::High);
    }

    #[test]
    fn test_apply_delta_stays_in_bounds() {
        for start in (0..=100u8).step_by(5) {
            for delta in (-100..=100).step_by(7) {
                let mut trust = TrustController::default();
                trust.state_mut(CharacterId::Anna).trust = start;

                let result = trust.apply_delta(CharacterId::Anna, delta, None);
                assert!(result <= 100);
                assert_eq!(
                    i32::from(result),
                    (i32::from(start) + delta).clamp(0, 100)
                );
            }
        }
    }

    #[test]
    fn test_apply_delta_respects_cap() {
        for start in (0..=100u8).step_by(10) {
            for delta in [-30, -5, 0, 5, 20, 60] {
                let mut trust = TrustController::default();
                trust.state_mut(CharacterId::Boris).trust = start;

                let result = trust.apply_delta(CharacterId::Boris, delta, Some(60));
                assert!(result <= 60, "start {start} delta {delta} gave {result}");
            }
        }
    }

    #[test]
    fn test_out_of_range_delta_is_ignored() {
        let mut trust = controller();
        assert_eq!(trust.apply_delta(CharacterId::Anna, 500, None), 50);
        assert_eq!(trust.apply_delta(CharacterId::Anna, -101, None), 50);
        assert_eq!(trust.apply_delta(CharacterId::Anna, i32::MIN, None), 50);
    }

    #[test]
    fn test_sanitize_raw_delta() {
        assert_eq!(sanitize_raw_delta(12.4), 12);
        assert_eq!(sanitize_raw_delta(-29.6), -30);
        assert_eq!(sanitize_raw_delta(f64::NAN), 0);
        assert_eq!(sanitize_raw_delta(f64::INFINITY), 0);
        assert_eq!(sanitize_raw_delta(250.0), 0);
    }

    #[test]
    fn test_helper_is_untouched() {
        let mut trust = controller();
        assert_eq!(trust.apply_delta(CharacterId::Helper, -90, None), 100);
        assert!(!trust.block(CharacterId::Helper));
        assert!(!trust.is_blocked(CharacterId::Helper));
    }

    #[test]
    fn test_should_block_threshold() {
        for t in 0..=100u8 {
            assert_eq!(should_block(t), t < 10);
        }
    }

    #[test]
    fn test_block_is_monotone() {
        let mut trust = controller();
        trust.apply_delta(CharacterId::Anna, -45, None);
        assert!(should_block(trust.trust(CharacterId::Anna)));
        assert!(trust.block(CharacterId::Anna));

        trust.apply_delta(CharacterId::Anna, 80, None);
        assert!(trust.is_blocked(CharacterId::Anna));
        assert!(!trust.block(CharacterId::Anna));
    }

    #[test]
    fn test_set_emotion() {
        let mut trust = controller();
        trust.set_emotion(CharacterId::Boris, Emotion::Suspicious);
        assert_eq!(trust.emotion(CharacterId::Boris), Emotion::Suspicious);
    }

    #[test]
    fn test_reveal_secrets_on_upward_crossing() {
        let case = CaseFile::gromov().unwrap();
        let mut trust = TrustController::new(&case);

        let revealed = trust.reveal_secrets(&case, CharacterId::Anna, 50, 90);
        assert_eq!(revealed, vec!["anna_secret_2", "anna_secret_3"]);

        // Falling and rising again reveals nothing new
        assert!(trust
            .reveal_secrets(&case, CharacterId::Anna, 90, 20)
            .is_empty());
        assert_eq!(
            trust.reveal_secrets(&case, CharacterId::Anna, 20, 90),
            vec!["anna_secret_1"]
        );
    }
}
