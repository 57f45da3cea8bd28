//! Trigger Rule Engine - one-shot narrative rules.
//!
//! The engine is built once from the case's trigger definitions and is
//! immutable; what has fired lives in the session's [`TriggerLedger`]. Triggers
//! are checked in declaration order in a single pass, so evidence granted or a
//! trigger fired earlier in the pass is visible to the ones after it.

mod ledger;

pub use ledger::*;

use case_rules::{
    CaseFile, CaseFileError, CharacterId, KeywordSet, SyntheticEvidence, TriggerCondition,
    TriggerDef, TriggerEffect, TrustLock, TRUST_MAX,
};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::evidence::{EvidenceItem, EvidenceLog, EvidenceOrigin};

/// What a trigger pass may look at besides the ledger and the evidence log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerContext<'a> {
    /// Character the player is talking to.
    pub character: Option<CharacterId>,
    /// The player's message; absent in the post-dialogue pass.
    pub message: Option<&'a str>,
    /// Current trust of `character`.
    pub trust_level: Option<u8>,
}

impl<'a> TriggerContext<'a> {
    /// Context for the pass before the dialogue service is called. Trust is
    /// left out: only message conditions are meant to fire here.
    pub fn before_dialogue(character: CharacterId, message: &'a str) -> Self {
        Self {
            character: Some(character),
            message: Some(message),
            trust_level: None,
        }
    }

    /// Context for the pass after trust has been updated.
    pub fn after_trust_update(character: CharacterId, trust: u8) -> Self {
        Self {
            character: Some(character),
            message: None,
            trust_level: Some(trust),
        }
    }
}

/// What one pass changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerReport {
    pub activated: Vec<String>,
    pub granted_evidence: Vec<EvidenceItem>,
    pub unlocked_caps: Vec<(CharacterId, u8)>,
    pub accusation_enabled: bool,
}

impl TriggerReport {
    pub fn is_empty(&self) -> bool {
        self.activated.is_empty()
    }
}

struct CompiledTrigger {
    def: TriggerDef,
    keywords: Option<KeywordSet>,
}

/// Evaluates trigger conditions and applies their effects.
pub struct TriggerEngine {
    triggers: Vec<CompiledTrigger>,
    locks: Vec<TrustLock>,
    grantable: HashMap<String, SyntheticEvidence>,
}

impl TriggerEngine {
    /// Build the engine from a case. Every granted evidence id must be defined.
    pub fn new(case: &CaseFile) -> Result<Self, CaseFileError> {
        let mut grantable = HashMap::new();
        for def in &case.triggers {
            for effect in &def.effects {
                if let TriggerEffect::GrantEvidence { id } = effect {
                    let template = case
                        .evidence_template(id)
                        .ok_or_else(|| CaseFileError::dangling(&def.id, "evidence", id))?;
                    grantable.insert(
                        id.clone(),
                        SyntheticEvidence {
                            id: id.clone(),
                            source: template.source,
                            title: template.title.to_string(),
                            description: template.description.to_string(),
                            category: template.category,
                        },
                    );
                }
            }
        }

        let mut engine = Self::from_parts(case.triggers.iter().cloned(), case.trust_locks.clone())?;
        engine.grantable = grantable;
        Ok(engine)
    }

    /// Build an engine from bare definitions. Only evidence registered with
    /// [`TriggerEngine::with_grantable`] can be granted.
    pub fn from_parts(
        triggers: impl IntoIterator<Item = TriggerDef>,
        locks: Vec<TrustLock>,
    ) -> Result<Self, CaseFileError> {
        let mut seen = HashSet::new();
        let mut compiled = Vec::new();

        for def in triggers {
            if !seen.insert(def.id.clone()) {
                return Err(CaseFileError::DuplicateId {
                    kind: "trigger",
                    id: def.id,
                });
            }
            let keywords = match &def.condition {
                TriggerCondition::KeywordMatch { keywords, .. } => Some(KeywordSet::new(keywords)),
                _ => None,
            };
            compiled.push(CompiledTrigger { def, keywords });
        }

        for lock in &locks {
            if !seen.contains(&lock.unlocking_trigger) {
                return Err(CaseFileError::dangling(
                    format!("trust lock on {}", lock.character),
                    "trigger",
                    &lock.unlocking_trigger,
                ));
            }
        }

        Ok(Self {
            triggers: compiled,
            locks,
            grantable: HashMap::new(),
        })
    }

    pub fn with_grantable(mut self, evidence: SyntheticEvidence) -> Self {
        self.grantable.insert(evidence.id.clone(), evidence);
        self
    }

    pub fn trigger_count(&self) -> usize {
        self.triggers.len()
    }

    /// Run one pass: fire every not-yet-fired trigger whose condition holds.
    pub fn evaluate(
        &self,
        ctx: &TriggerContext<'_>,
        ledger: &mut TriggerLedger,
        evidence: &mut EvidenceLog,
        at: DateTime<Utc>,
    ) -> TriggerReport {
        let mut report = TriggerReport::default();

        for trigger in &self.triggers {
            let def = &trigger.def;
            if ledger.is_activated(&def.id) {
                continue;
            }
            if !self.condition_holds(trigger, ctx, ledger, evidence) {
                continue;
            }

            ledger.record(&def.id, at);
            info!(trigger_id = %def.id, name = %def.name, "Trigger activated");
            report.activated.push(def.id.clone());

            for effect in &def.effects {
                self.apply_effect(effect, ledger, evidence, at, &mut report);
            }
        }

        report
    }

    fn condition_holds(
        &self,
        trigger: &CompiledTrigger,
        ctx: &TriggerContext<'_>,
        ledger: &TriggerLedger,
        evidence: &EvidenceLog,
    ) -> bool {
        match &trigger.def.condition {
            TriggerCondition::KeywordMatch {
                character, mode, ..
            } => {
                if character.is_some() && *character != ctx.character {
                    return false;
                }
                let message = match ctx.message {
                    Some(m) if !m.trim().is_empty() => m,
                    _ => return false,
                };
                trigger
                    .keywords
                    .as_ref()
                    .map(|k| k.matches(message, *mode))
                    .unwrap_or(false)
            }
            TriggerCondition::TrustAtLeast {
                character,
                threshold,
            } => {
                ctx.character == Some(*character)
                    && ctx.trust_level.map(|t| t >= *threshold).unwrap_or(false)
            }
            TriggerCondition::EvidenceSetSubset { ids } => ids.iter().all(|id| evidence.contains(id)),
            TriggerCondition::TriggerSetSubset { ids } => ids.iter().all(|id| ledger.is_activated(id)),
        }
    }

    fn apply_effect(
        &self,
        effect: &TriggerEffect,
        ledger: &mut TriggerLedger,
        evidence: &mut EvidenceLog,
        at: DateTime<Utc>,
        report: &mut TriggerReport,
    ) {
        match effect {
            TriggerEffect::UnlockTrustCap { character, cap } => {
                ledger.set_cap(*character, *cap);
                report.unlocked_caps.push((*character, *cap));
                debug!(character = %character, cap, "Trust cap replaced");
            }
            TriggerEffect::GrantEvidence { id } => match self.grantable.get(id) {
                Some(def) => {
                    let item = EvidenceItem::from_template(def.into(), at)
                        .with_origin(EvidenceOrigin::Granted);
                    if evidence.insert(item.clone()) {
                        debug!(evidence_id = %id, "Evidence granted by trigger");
                        report.granted_evidence.push(item);
                    }
                }
                None => {
                    debug_assert!(false, "grant of unknown evidence {id}");
                    tracing::error!(evidence_id = %id, "Trigger grants unknown evidence; ignored");
                }
            },
            TriggerEffect::EnableAccusation => {
                if !ledger.accusation_enabled() {
                    ledger.enable_accusation();
                    report.accusation_enabled = true;
                }
            }
        }
    }

    /// The cap currently bounding a character's trust, if any.
    ///
    /// A cap set by a trigger effect replaces the lock; otherwise a lock holds
    /// until its unlocking trigger fires.
    pub fn trust_cap(&self, ledger: &TriggerLedger, character: CharacterId) -> Option<u8> {
        if let Some(cap) = ledger.cap_override(character) {
            return (cap < TRUST_MAX).then_some(cap);
        }
        self.locks
            .iter()
            .find(|l| l.character == character && !ledger.is_activated(&l.unlocking_trigger))
            .map(|l| l.cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use case_rules::{EvidenceCategory, KeywordMode};
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    fn engine() -> TriggerEngine {
        TriggerEngine::new(&CaseFile::gromov().unwrap()).unwrap()
    }

    fn evidence_of(ids: &[&str]) -> EvidenceLog {
        let case = CaseFile::gromov().unwrap();
        let mut log = EvidenceLog::new();
        for id in ids {
            log.insert(EvidenceItem::from_template(
                case.evidence_template(id).unwrap(),
                at(),
            ));
        }
        log
    }

    fn def(id: &str, condition: TriggerCondition) -> TriggerDef {
        TriggerDef {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            condition,
            effects: Vec::new(),
        }
    }

    #[test]
    fn test_keyword_trigger_unlocks_boris() {
        let engine = engine();
        let mut ledger = TriggerLedger::new();
        let mut evidence = EvidenceLog::new();

        assert_eq!(engine.trust_cap(&ledger, CharacterId::Boris), Some(60));

        let ctx = TriggerContext::before_dialogue(CharacterId::Boris, "Как поживает ваша дочь?");
        let report = engine.evaluate(&ctx, &mut ledger, &mut evidence, at());

        assert_eq!(report.activated, vec!["boris_daughter_unlock"]);
        assert_eq!(report.unlocked_caps, vec![(CharacterId::Boris, 100)]);
        assert_eq!(engine.trust_cap(&ledger, CharacterId::Boris), None);
    }

    #[test]
    fn test_keyword_trigger_needs_right_character() {
        let engine = engine();
        let mut ledger = TriggerLedger::new();
        let mut evidence = EvidenceLog::new();

        let ctx = TriggerContext::before_dialogue(CharacterId::Anna, "У вас есть дочь?");
        assert!(engine.evaluate(&ctx, &mut ledger, &mut evidence, at()).is_empty());
    }

    #[test]
    fn test_keyword_trigger_needs_message() {
        let engine = engine();
        let mut ledger = TriggerLedger::new();
        let mut evidence = EvidenceLog::new();

        let ctx = TriggerContext::after_trust_update(CharacterId::Boris, 40);
        assert!(engine.evaluate(&ctx, &mut ledger, &mut evidence, at()).is_empty());
    }

    #[test]
    fn test_all_mode_keywords() {
        let engine = TriggerEngine::from_parts(
            [def(
                "both",
                TriggerCondition::KeywordMatch {
                    character: None,
                    keywords: vec!["k1".into(), "k2".into()],
                    mode: KeywordMode::All,
                },
            )],
            Vec::new(),
        )
        .unwrap();
        let mut ledger = TriggerLedger::new();
        let mut evidence = EvidenceLog::new();

        let only_one = TriggerContext::before_dialogue(CharacterId::Anna, "k1");
        assert!(engine.evaluate(&only_one, &mut ledger, &mut evidence, at()).is_empty());

        let both = TriggerContext::before_dialogue(CharacterId::Anna, "K2 and K1");
        assert_eq!(engine.evaluate(&both, &mut ledger, &mut evidence, at()).activated, vec!["both"]);
    }

    #[test]
    fn test_trust_trigger_grants_and_chains() {
        let engine = engine();
        let mut ledger = TriggerLedger::new();
        let mut evidence = EvidenceLog::new();

        let ctx = TriggerContext::after_trust_update(CharacterId::Viktor, 45);
        let report = engine.evaluate(&ctx, &mut ledger, &mut evidence, at());

        // Viktor's grant satisfies Anna's rebuttal in the same pass
        assert_eq!(
            report.activated,
            vec!["viktor_blames_anna", "anna_reveals_viktor_motive"]
        );
        assert_eq!(evidence.ids(), vec!["viktor_blames_anna", "viktor_has_motive"]);
        assert!(evidence
            .iter()
            .all(|e| e.origin == EvidenceOrigin::Granted));
        assert_eq!(evidence.get("viktor_has_motive").unwrap().category, EvidenceCategory::Motive);
    }

    #[test]
    fn test_trust_trigger_below_threshold() {
        let engine = engine();
        let mut ledger = TriggerLedger::new();
        let mut evidence = EvidenceLog::new();

        let ctx = TriggerContext::after_trust_update(CharacterId::Viktor, 39);
        assert!(engine.evaluate(&ctx, &mut ledger, &mut evidence, at()).is_empty());
    }

    #[test]
    fn test_triggers_are_one_shot() {
        let engine = engine();
        let mut ledger = TriggerLedger::new();
        let mut evidence = EvidenceLog::new();
        let ctx = TriggerContext::after_trust_update(CharacterId::Boris, 85);

        let first = engine.evaluate(&ctx, &mut ledger, &mut evidence, at());
        let second = engine.evaluate(&ctx, &mut ledger, &mut evidence, at());

        assert_eq!(first.activated, vec!["boris_reveals_address"]);
        assert!(second.is_empty());
        assert_eq!(evidence.len(), 1);
    }

    #[test]
    fn test_enable_accusation() {
        let engine = engine();
        let mut ledger = TriggerLedger::new();
        let mut evidence = evidence_of(&["boris_blackmail", "anna_saw_viktor", "office_address"]);

        let ctx = TriggerContext::after_trust_update(CharacterId::Anna, 50);
        let report = engine.evaluate(&ctx, &mut ledger, &mut evidence, at());

        assert_eq!(report.activated, vec!["ready_to_accuse"]);
        assert!(report.accusation_enabled);
        assert!(ledger.accusation_enabled());
    }

    #[test]
    fn test_trigger_set_subset() {
        let engine = TriggerEngine::from_parts(
            [
                def(
                    "first",
                    TriggerCondition::TrustAtLeast {
                        character: CharacterId::Anna,
                        threshold: 10,
                    },
                ),
                def(
                    "second",
                    TriggerCondition::TriggerSetSubset {
                        ids: vec!["first".into()],
                    },
                ),
            ],
            Vec::new(),
        )
        .unwrap();
        let mut ledger = TriggerLedger::new();
        let mut evidence = EvidenceLog::new();

        let ctx = TriggerContext::after_trust_update(CharacterId::Anna, 20);
        let report = engine.evaluate(&ctx, &mut ledger, &mut evidence, at());
        assert_eq!(report.activated, vec!["first", "second"]);
    }

    #[test]
    fn test_duplicate_trigger_ids_rejected() {
        let cond = TriggerCondition::EvidenceSetSubset { ids: Vec::new() };
        let result = TriggerEngine::from_parts([def("x", cond.clone()), def("x", cond)], Vec::new());
        assert!(matches!(result, Err(CaseFileError::DuplicateId { .. })));
    }

    #[test]
    fn test_dangling_lock_rejected() {
        let lock = TrustLock {
            character: CharacterId::Boris,
            cap: 60,
            unlocking_trigger: "missing".into(),
            description: None,
        };
        assert!(matches!(
            TriggerEngine::from_parts(Vec::new(), vec![lock]),
            Err(CaseFileError::DanglingReference { .. })
        ));
    }

    #[test]
    fn test_partial_cap_override() {
        let engine = engine();
        let mut ledger = TriggerLedger::new();
        ledger.set_cap(CharacterId::Boris, 75);
        assert_eq!(engine.trust_cap(&ledger, CharacterId::Boris), Some(75));
        assert_eq!(engine.trust_cap(&ledger, CharacterId::Anna), None);
    }
}
