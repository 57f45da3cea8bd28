//! The case file - the central, immutable description of one investigation.

mod accusation;
mod error;

pub use accusation::*;
pub use error::*;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::characters::{CharacterId, CharacterProfile};
use crate::evidence::{EvidenceRule, EvidenceTemplate, SyntheticEvidence};
use crate::triggers::{TriggerCondition, TriggerDef, TriggerEffect, TrustLock};

const GROMOV_CASE: &str = include_str!("../../data/gromov_case.toml");

/// A secret a suspect gives up once their trust reaches `trust_required`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretDef {
    pub id: String,
    pub character: CharacterId,
    pub trust_required: u8,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Everything static about a case: cast, rules, triggers and texts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseFile {
    pub title: String,

    pub characters: Vec<CharacterProfile>,

    #[serde(default)]
    pub secrets: Vec<SecretDef>,

    /// Keyword-matched evidence rules.
    #[serde(default)]
    pub evidence: Vec<EvidenceRule>,

    /// Evidence only triggers can grant.
    #[serde(default)]
    pub synthetic_evidence: Vec<SyntheticEvidence>,

    #[serde(default)]
    pub triggers: Vec<TriggerDef>,

    #[serde(default)]
    pub trust_locks: Vec<TrustLock>,

    pub accusation: AccusationRules,

    pub narration: Narration,
}

impl CaseFile {
    /// The bundled "НейроТех" murder case.
    pub fn gromov() -> Result<Self, CaseFileError> {
        Self::from_toml_str(GROMOV_CASE)
    }

    /// Parse and validate a case file from TOML text.
    pub fn from_toml_str(source: &str) -> Result<Self, CaseFileError> {
        let case: CaseFile = toml::from_str(source)?;
        case.validate()?;
        Ok(case)
    }

    /// Read, parse and validate a case file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CaseFileError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| CaseFileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Get a character's profile.
    pub fn profile(&self, id: CharacterId) -> Option<&CharacterProfile> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Display name, falling back to the identifier.
    pub fn display_name(&self, id: CharacterId) -> &str {
        self.profile(id)
            .map(|p| p.display_name.as_str())
            .unwrap_or(id.as_str())
    }

    /// Trust a character starts a new game with.
    pub fn initial_trust(&self, id: CharacterId) -> u8 {
        self.profile(id).map(|p| p.initial_trust).unwrap_or(50)
    }

    /// Look up any evidence definition, keyword-matched or synthetic.
    pub fn evidence_template(&self, id: &str) -> Option<EvidenceTemplate<'_>> {
        self.evidence
            .iter()
            .find(|r| r.id == id)
            .map(EvidenceTemplate::from)
            .or_else(|| {
                self.synthetic_evidence
                    .iter()
                    .find(|s| s.id == id)
                    .map(EvidenceTemplate::from)
            })
    }

    /// Whether an evidence id is defined anywhere in the case.
    pub fn has_evidence(&self, id: &str) -> bool {
        self.evidence_template(id).is_some()
    }

    /// The trust lock on a character, if any.
    pub fn trust_lock(&self, id: CharacterId) -> Option<&TrustLock> {
        self.trust_locks.iter().find(|l| l.character == id)
    }

    /// Secrets held by a character, in ascending trust order.
    pub fn secrets_for(&self, id: CharacterId) -> Vec<&SecretDef> {
        let mut secrets: Vec<_> = self.secrets.iter().filter(|s| s.character == id).collect();
        secrets.sort_by_key(|s| s.trust_required);
        secrets
    }

    /// Check the case for ambiguous or dangling definitions.
    pub fn validate(&self) -> Result<(), CaseFileError> {
        self.validate_characters()?;
        self.validate_evidence()?;
        self.validate_triggers()?;
        self.validate_locks()?;
        self.validate_secrets()?;
        self.validate_accusation()
    }

    fn validate_characters(&self) -> Result<(), CaseFileError> {
        let mut seen = HashSet::new();
        for profile in &self.characters {
            if !seen.insert(profile.id) {
                return Err(CaseFileError::DuplicateId {
                    kind: "character",
                    id: profile.id.to_string(),
                });
            }
            if profile.initial_trust > 100 {
                return Err(CaseFileError::invalid(format!(
                    "initial trust of {} is above 100",
                    profile.id
                )));
            }
        }
        if let Some(missing) = CharacterId::ALL.iter().find(|id| !seen.contains(*id)) {
            return Err(CaseFileError::invalid(format!(
                "character {} has no profile",
                missing
            )));
        }
        Ok(())
    }

    fn validate_evidence(&self) -> Result<(), CaseFileError> {
        let mut seen = HashSet::new();
        let ids = self
            .evidence
            .iter()
            .map(|r| r.id.as_str())
            .chain(self.synthetic_evidence.iter().map(|s| s.id.as_str()));
        for id in ids {
            if !seen.insert(id) {
                return Err(CaseFileError::DuplicateId {
                    kind: "evidence",
                    id: id.to_string(),
                });
            }
        }

        for rule in &self.evidence {
            if rule.keywords.is_empty() || rule.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(CaseFileError::invalid(format!(
                    "evidence rule {} needs non-empty keywords",
                    rule.id
                )));
            }
        }
        Ok(())
    }

    fn validate_triggers(&self) -> Result<(), CaseFileError> {
        let mut seen = HashSet::new();
        for trigger in &self.triggers {
            if !seen.insert(trigger.id.as_str()) {
                return Err(CaseFileError::DuplicateId {
                    kind: "trigger",
                    id: trigger.id.clone(),
                });
            }
        }

        for trigger in &self.triggers {
            let owner = format!("trigger {}", trigger.id);
            match &trigger.condition {
                TriggerCondition::KeywordMatch { keywords, .. } => {
                    if keywords.is_empty() || keywords.iter().any(|k| k.trim().is_empty()) {
                        return Err(CaseFileError::invalid(format!(
                            "{} needs non-empty keywords",
                            owner
                        )));
                    }
                }
                TriggerCondition::TrustAtLeast { threshold, .. } => {
                    if *threshold > 100 {
                        return Err(CaseFileError::invalid(format!(
                            "{} has a trust threshold above 100",
                            owner
                        )));
                    }
                }
                TriggerCondition::EvidenceSetSubset { ids }
                | TriggerCondition::TriggerSetSubset { ids }
                    if ids.is_empty() =>
                {
                    return Err(CaseFileError::invalid(format!(
                        "{} needs a non-empty id list",
                        owner
                    )));
                }
                TriggerCondition::EvidenceSetSubset { ids } => {
                    if let Some(id) = ids.iter().find(|id| !self.has_evidence(id)) {
                        return Err(CaseFileError::dangling(owner, "evidence", id.as_str()));
                    }
                }
                TriggerCondition::TriggerSetSubset { ids } => {
                    if let Some(id) = ids.iter().find(|id| !seen.contains(id.as_str())) {
                        return Err(CaseFileError::dangling(owner, "trigger", id.as_str()));
                    }
                }
            }

            for effect in &trigger.effects {
                match effect {
                    TriggerEffect::UnlockTrustCap { cap, .. } if *cap > 100 => {
                        return Err(CaseFileError::invalid(format!(
                            "{} unlocks a trust cap above 100",
                            owner
                        )));
                    }
                    TriggerEffect::GrantEvidence { id } if !self.has_evidence(id) => {
                        return Err(CaseFileError::dangling(owner, "evidence", id.as_str()));
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn validate_locks(&self) -> Result<(), CaseFileError> {
        let mut seen = HashSet::new();
        for lock in &self.trust_locks {
            if !seen.insert(lock.character) {
                return Err(CaseFileError::DuplicateId {
                    kind: "trust lock",
                    id: lock.character.to_string(),
                });
            }
            if !lock.character.tracks_trust() || lock.cap > 100 {
                return Err(CaseFileError::invalid(format!(
                    "trust lock on {} is not applicable",
                    lock.character
                )));
            }
            if !self.triggers.iter().any(|t| t.id == lock.unlocking_trigger) {
                return Err(CaseFileError::dangling(
                    format!("trust lock on {}", lock.character),
                    "trigger",
                    lock.unlocking_trigger.as_str(),
                ));
            }
        }
        Ok(())
    }

    fn validate_secrets(&self) -> Result<(), CaseFileError> {
        let mut seen = HashSet::new();
        for secret in &self.secrets {
            if !seen.insert(secret.id.as_str()) {
                return Err(CaseFileError::DuplicateId {
                    kind: "secret",
                    id: secret.id.clone(),
                });
            }
            if secret.trust_required > 100 {
                return Err(CaseFileError::invalid(format!(
                    "secret {} requires trust above 100",
                    secret.id
                )));
            }
        }
        Ok(())
    }

    fn validate_accusation(&self) -> Result<(), CaseFileError> {
        let rules = &self.accusation;
        if !rules.suspect.tracks_trust() || rules.informant == rules.suspect {
            return Err(CaseFileError::invalid(
                "the accused must be a suspect distinct from the informant",
            ));
        }
        if rules.keywords.is_empty()
            || rules.correct_address.is_empty()
            || rules.wrong_address.is_empty()
        {
            return Err(CaseFileError::invalid(
                "accusation and address keyword lists must not be empty",
            ));
        }
        if rules.message_budget == 0 {
            return Err(CaseFileError::invalid("message budget must be positive"));
        }
        let referenced = rules
            .key_evidence
            .iter()
            .chain(rules.confession_evidence.iter());
        for id in referenced {
            if !self.has_evidence(id) {
                return Err(CaseFileError::dangling("accusation rules", "evidence", id.as_str()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::EvidenceCategory;

    #[test]
    fn test_bundled_case_is_valid() {
        let case = CaseFile::gromov().unwrap();
        assert_eq!(case.characters.len(), 4);
        assert_eq!(case.initial_trust(CharacterId::Helper), 100);
        assert_eq!(case.initial_trust(CharacterId::Anna), 50);
        assert_eq!(case.initial_trust(CharacterId::Boris), 40);
        assert_eq!(case.initial_trust(CharacterId::Viktor), 60);
        assert_eq!(case.accusation.suspect, CharacterId::Viktor);
        assert_eq!(case.accusation.message_budget, 10);
    }

    #[test]
    fn test_evidence_template_lookup() {
        let case = CaseFile::gromov().unwrap();

        let rule = case.evidence_template("anna_saw_viktor").unwrap();
        assert_eq!(rule.source, CharacterId::Anna);
        assert_eq!(rule.category, EvidenceCategory::Witness);

        let synthetic = case.evidence_template("office_address").unwrap();
        assert_eq!(synthetic.source, CharacterId::Boris);

        assert!(case.evidence_template("no_such_fact").is_none());
    }

    #[test]
    fn test_boris_is_locked() {
        let case = CaseFile::gromov().unwrap();
        let lock = case.trust_lock(CharacterId::Boris).unwrap();
        assert_eq!(lock.cap, 60);
        assert_eq!(lock.unlocking_trigger, "boris_daughter_unlock");
        assert!(case.trust_lock(CharacterId::Anna).is_none());
    }

    #[test]
    fn test_secrets_sorted_by_trust() {
        let case = CaseFile::gromov().unwrap();
        let secrets = case.secrets_for(CharacterId::Anna);
        assert_eq!(secrets.len(), 3);
        assert!(secrets
            .windows(2)
            .all(|w| w[0].trust_required <= w[1].trust_required));
    }

    #[test]
    fn test_duplicate_evidence_id_rejected() {
        let mut case = CaseFile::gromov().unwrap();
        let duplicate = case.evidence[0].clone();
        case.evidence.push(duplicate);

        assert!(matches!(
            case.validate(),
            Err(CaseFileError::DuplicateId { kind: "evidence", .. })
        ));
    }

    #[test]
    fn test_duplicate_trigger_id_rejected() {
        let mut case = CaseFile::gromov().unwrap();
        let duplicate = case.triggers[0].clone();
        case.triggers.push(duplicate);

        assert!(matches!(
            case.validate(),
            Err(CaseFileError::DuplicateId { kind: "trigger", .. })
        ));
    }

    #[test]
    fn test_dangling_grant_rejected() {
        let mut case = CaseFile::gromov().unwrap();
        case.triggers[0]
            .effects
            .push(TriggerEffect::GrantEvidence {
                id: "missing_fact".to_string(),
            });

        assert!(matches!(
            case.validate(),
            Err(CaseFileError::DanglingReference { kind: "evidence", .. })
        ));
    }

    #[test]
    fn test_empty_subset_condition_rejected() {
        let mut case = CaseFile::gromov().unwrap();
        case.triggers[2].condition = TriggerCondition::EvidenceSetSubset { ids: Vec::new() };
        assert!(matches!(case.validate(), Err(CaseFileError::Invalid(_))));

        case.triggers[2].condition = TriggerCondition::TriggerSetSubset { ids: Vec::new() };
        assert!(matches!(case.validate(), Err(CaseFileError::Invalid(_))));
    }

    #[test]
    fn test_dangling_lock_trigger_rejected() {
        let mut case = CaseFile::gromov().unwrap();
        case.trust_locks[0].unlocking_trigger = "nothing".to_string();

        assert!(matches!(
            case.validate(),
            Err(CaseFileError::DanglingReference { kind: "trigger", .. })
        ));
    }

    #[test]
    fn test_parse_error_surfaces() {
        let result = CaseFile::from_toml_str("title = ");
        assert!(matches!(result, Err(CaseFileError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = CaseFile::load("/definitely/not/here.toml");
        assert!(matches!(result, Err(CaseFileError::Io { .. })));
    }
}
