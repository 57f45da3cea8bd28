//! Evidence Rule Engine - detects case facts in character replies.
//!
//! A rule fires only if **every** one of its keywords appears in the text
//! (case-insensitive substring). Detection is stateless; the log is the only
//! place discoveries are remembered, and the first discovery of an id wins.

mod item;

pub use item::*;

use case_rules::{CaseFile, CaseFileError, CharacterId, EvidenceRule, KeywordSet};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::debug;

struct CompiledRule {
    rule: EvidenceRule,
    keywords: KeywordSet,
}

/// Matches dialogue text against the case's evidence rules.
pub struct EvidenceEngine {
    rules: Vec<CompiledRule>,
}

impl EvidenceEngine {
    /// Build the engine from a case's keyword-matched rules.
    pub fn new(case: &CaseFile) -> Result<Self, CaseFileError> {
        Self::from_rules(case.evidence.iter().cloned())
    }

    /// Build the engine from an explicit rule list. Duplicate ids are rejected.
    pub fn from_rules(rules: impl IntoIterator<Item = EvidenceRule>) -> Result<Self, CaseFileError> {
        let mut seen = HashSet::new();
        let mut compiled = Vec::new();

        for rule in rules {
            if !seen.insert(rule.id.clone()) {
                return Err(CaseFileError::DuplicateId {
                    kind: "evidence",
                    id: rule.id,
                });
            }
            compiled.push(CompiledRule {
                keywords: rule.keyword_set(),
                rule,
            });
        }

        Ok(Self { rules: compiled })
    }

    /// Number of loaded rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Every rule owned by `source` whose keywords all appear in `text`.
    pub fn detect(&self, text: &str, source: CharacterId, at: DateTime<Utc>) -> Vec<EvidenceItem> {
        self.rules
            .iter()
            .filter(|c| c.rule.owner == source && c.keywords.all_in(text))
            .map(|c| {
                debug!(evidence_id = %c.rule.id, character = %source, "Evidence rule matched");
                EvidenceItem::from_template((&c.rule).into(), at)
            })
            .collect()
    }
}

/// Union `found` into a copy of `existing`; ids already present are left untouched.
pub fn collect(existing: &EvidenceLog, found: &[EvidenceItem]) -> EvidenceLog {
    let mut merged = existing.clone();
    merged.merge(found.iter().cloned());
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use case_rules::EvidenceCategory;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, minute, 0).unwrap()
    }

    fn rule(id: &str, owner: CharacterId, keywords: &[&str]) -> EvidenceRule {
        EvidenceRule {
            id: id.to_string(),
            owner,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            title: id.to_string(),
            description: String::new(),
            category: EvidenceCategory::Fact,
        }
    }

    #[test]
    fn test_anna_saw_viktor() {
        let engine = EvidenceEngine::new(&CaseFile::gromov().unwrap()).unwrap();
        let found = engine.detect("Виктор кабинет вечер", CharacterId::Anna, at(0));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "anna_saw_viktor");
        assert_eq!(found[0].source, CharacterId::Anna);
        assert_eq!(found[0].origin, EvidenceOrigin::Dialogue);
    }

    #[test]
    fn test_conjunctive_matching() {
        let engine =
            EvidenceEngine::from_rules([rule("pair", CharacterId::Boris, &["k1", "k2"])]).unwrap();

        assert!(engine.detect("only k1 here", CharacterId::Boris, at(0)).is_empty());
        assert_eq!(engine.detect("K2 ... k1", CharacterId::Boris, at(0)).len(), 1);
    }

    #[test]
    fn test_owner_must_match() {
        let engine = EvidenceEngine::new(&CaseFile::gromov().unwrap()).unwrap();
        // Anna's rule, but said by Boris
        assert!(engine
            .detect("Виктор кабинет вечер", CharacterId::Boris, at(0))
            .is_empty());
    }

    #[test]
    fn test_near_miss_does_not_fire() {
        let engine = EvidenceEngine::new(&CaseFile::gromov().unwrap()).unwrap();
        let found = engine.detect(
            "Виктор что-то говорил про шантаж, но я не уверен",
            CharacterId::Viktor,
            at(0),
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_detection_is_deterministic() {
        let engine = EvidenceEngine::new(&CaseFile::gromov().unwrap()).unwrap();
        let text = "Да, это я убил его. Яд был в виски.";

        let first: Vec<_> = engine
            .detect(text, CharacterId::Viktor, at(0))
            .into_iter()
            .map(|e| e.id)
            .collect();
        let second: Vec<_> = engine
            .detect(text, CharacterId::Viktor, at(1))
            .into_iter()
            .map(|e| e.id)
            .collect();

        assert_eq!(first, vec!["viktor_confession"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_rule_ids_rejected() {
        let result = EvidenceEngine::from_rules([
            rule("same", CharacterId::Anna, &["a"]),
            rule("same", CharacterId::Boris, &["b"]),
        ]);
        assert!(matches!(result, Err(CaseFileError::DuplicateId { .. })));
    }

    #[test]
    fn test_collect_is_idempotent() {
        let engine = EvidenceEngine::new(&CaseFile::gromov().unwrap()).unwrap();
        let found = engine.detect("Виктор кабинет вечер", CharacterId::Anna, at(0));

        let once = collect(&EvidenceLog::default(), &found);
        let twice = collect(&once, &found);
        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn test_collect_first_discovery_wins() {
        let engine = EvidenceEngine::new(&CaseFile::gromov().unwrap()).unwrap();
        let early = engine.detect("Виктор кабинет вечер", CharacterId::Anna, at(0));
        let late = engine.detect("Вечер, кабинет, Виктор", CharacterId::Anna, at(30));

        let log = collect(&collect(&EvidenceLog::default(), &early), &late);
        assert_eq!(log.get("anna_saw_viktor").unwrap().discovered_at, at(0));
    }
}
