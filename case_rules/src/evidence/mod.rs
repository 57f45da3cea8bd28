//! Evidence rule definitions.

use serde::{Deserialize, Serialize};

use crate::characters::CharacterId;
use crate::mechanics::KeywordSet;

/// Kind of case fact an evidence item represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceCategory {
    Alibi,
    Motive,
    Secret,
    Witness,
    Fact,
}

impl EvidenceCategory {
    pub const ALL: [EvidenceCategory; 5] = [
        EvidenceCategory::Alibi,
        EvidenceCategory::Motive,
        EvidenceCategory::Secret,
        EvidenceCategory::Witness,
        EvidenceCategory::Fact,
    ];
}

/// A fact that is revealed when a character says every one of its keywords.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceRule {
    pub id: String,
    /// Only replies from this character are matched against the rule.
    pub owner: CharacterId,
    /// All of these must appear (case-insensitive substring).
    pub keywords: Vec<String>,
    pub title: String,
    pub description: String,
    pub category: EvidenceCategory,
}

impl EvidenceRule {
    /// Compiled matcher for this rule's keywords.
    pub fn keyword_set(&self) -> KeywordSet {
        KeywordSet::new(&self.keywords)
    }
}

/// A fact that is never matched from dialogue; triggers grant it directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticEvidence {
    pub id: String,
    pub source: CharacterId,
    pub title: String,
    pub description: String,
    pub category: EvidenceCategory,
}

/// The parts of an evidence definition that end up in a discovered item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceTemplate<'a> {
    pub id: &'a str,
    pub source: CharacterId,
    pub title: &'a str,
    pub description: &'a str,
    pub category: EvidenceCategory,
}

impl<'a> From<&'a EvidenceRule> for EvidenceTemplate<'a> {
    fn from(rule: &'a EvidenceRule) -> Self {
        Self {
            id: &rule.id,
            source: rule.owner,
            title: &rule.title,
            description: &rule.description,
            category: rule.category,
        }
    }
}

impl<'a> From<&'a SyntheticEvidence> for EvidenceTemplate<'a> {
    fn from(item: &'a SyntheticEvidence) -> Self {
        Self {
            id: &item.id,
            source: item.source,
            title: &item.title,
            description: &item.description,
            category: item.category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_template() {
        let rule = EvidenceRule {
            id: "boris_cameras".to_string(),
            owner: CharacterId::Boris,
            keywords: vec!["камер".to_string(), "отключ".to_string()],
            title: "Камеры отключены".to_string(),
            description: "Камеры были отключены.".to_string(),
            category: EvidenceCategory::Fact,
        };

        let template = EvidenceTemplate::from(&rule);
        assert_eq!(template.id, "boris_cameras");
        assert_eq!(template.source, CharacterId::Boris);
        assert!(rule.keyword_set().all_in("Камеры были ОТКЛЮЧЕНЫ"));
    }

    #[test]
    fn test_category_serde_names() {
        let json = toml::to_string(&SyntheticEvidence {
            id: "office_address".to_string(),
            source: CharacterId::Boris,
            title: "Адрес".to_string(),
            description: "-".to_string(),
            category: EvidenceCategory::Witness,
        })
        .unwrap();
        assert!(json.contains("category = \"witness\""));
        assert!(json.contains("source = \"boris\""));
    }
}
