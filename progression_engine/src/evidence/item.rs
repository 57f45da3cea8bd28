//! Discovered evidence and the insertion-ordered log that holds it.

use case_rules::{CharacterId, EvidenceCategory, EvidenceTemplate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How an evidence item entered the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceOrigin {
    /// Matched from a character's reply.
    Dialogue,
    /// Granted by a trigger effect.
    Granted,
}

/// A case fact the player has discovered. Identity is the rule id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub source: CharacterId,
    pub category: EvidenceCategory,
    pub discovered_at: DateTime<Utc>,
    pub origin: EvidenceOrigin,
}

impl EvidenceItem {
    /// Instantiate an evidence definition as a dialogue discovery.
    pub fn from_template(template: EvidenceTemplate<'_>, at: DateTime<Utc>) -> Self {
        Self {
            id: template.id.to_string(),
            title: template.title.to_string(),
            description: template.description.to_string(),
            source: template.source,
            category: template.category,
            discovered_at: at,
            origin: EvidenceOrigin::Dialogue,
        }
    }

    /// Set how the item was obtained.
    pub fn with_origin(mut self, origin: EvidenceOrigin) -> Self {
        self.origin = origin;
        self
    }
}

/// Collected evidence, in discovery order, without duplicate ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EvidenceLog {
    items: Vec<EvidenceItem>,
}

impl EvidenceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item unless its id is already present. Returns whether it was added.
    pub fn insert(&mut self, item: EvidenceItem) -> bool {
        if self.contains(&item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Insert every new item; returns the ones actually added.
    pub fn merge(&mut self, found: impl IntoIterator<Item = EvidenceItem>) -> Vec<EvidenceItem> {
        found
            .into_iter()
            .filter(|item| self.insert(item.clone()))
            .collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|e| e.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&EvidenceItem> {
        self.items.iter().find(|e| e.id == id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.items.iter().map(|e| e.id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EvidenceItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Count of collected items per category; every category is present.
    pub fn stats(&self) -> BTreeMap<EvidenceCategory, usize> {
        let mut stats: BTreeMap<_, _> = EvidenceCategory::ALL.into_iter().map(|c| (c, 0)).collect();
        for item in &self.items {
            *stats.entry(item.category).or_default() += 1;
        }
        stats
    }

    /// One line per item, for the helper's prompt.
    pub fn summary(&self, empty_marker: &str) -> String {
        if self.items.is_empty() {
            return format!("Всего улик: 0\n{}", empty_marker);
        }
        let mut summary = format!("Всего улик: {}\n", self.items.len());
        for item in &self.items {
            summary.push_str(&format!("- {}: {} (от {})\n", item.id, item.title, item.source));
        }
        summary
    }
}
