//! Character definitions for the case.

mod emotion;

pub use emotion::*;

use serde::{Deserialize, Serialize};

/// The fixed cast of the investigation.
///
/// Suspects take part in trust and evidence mechanics; the helper does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterId {
    Helper,
    Anna,
    Boris,
    Viktor,
}

impl CharacterId {
    /// Every character, helper first.
    pub const ALL: [CharacterId; 4] = [
        CharacterId::Helper,
        CharacterId::Anna,
        CharacterId::Boris,
        CharacterId::Viktor,
    ];

    /// Whether this character's trust is tracked at all.
    pub fn tracks_trust(&self) -> bool {
        !matches!(self, CharacterId::Helper)
    }

    /// Stable lowercase identifier, as used in case files.
    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterId::Helper => "helper",
            CharacterId::Anna => "anna",
            CharacterId::Boris => "boris",
            CharacterId::Viktor => "viktor",
        }
    }
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CharacterId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CharacterId::ALL
            .into_iter()
            .find(|id| id.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("unknown character: {}", s))
    }
}

/// Static description of a character in the case file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub id: CharacterId,
    pub display_name: String,
    #[serde(default)]
    pub role: Option<String>,
    /// Trust at the start of a new game (0-100).
    pub initial_trust: u8,
}

impl CharacterProfile {
    /// Create a profile with the given display name and starting trust.
    pub fn new(id: CharacterId, display_name: impl Into<String>, initial_trust: u8) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            role: None,
            initial_trust: initial_trust.min(100),
        }
    }

    /// Set the character's role in the story.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_is_exempt_from_trust() {
        assert!(!CharacterId::Helper.tracks_trust());
        assert!(CharacterId::Anna.tracks_trust());
        assert!(CharacterId::Boris.tracks_trust());
        assert!(CharacterId::Viktor.tracks_trust());
    }

    #[test]
    fn test_character_id_parsing() {
        assert_eq!("viktor".parse::<CharacterId>(), Ok(CharacterId::Viktor));
        assert_eq!(" Anna ".parse::<CharacterId>(), Ok(CharacterId::Anna));
        assert!("gromov".parse::<CharacterId>().is_err());
    }

    #[test]
    fn test_profile_clamps_initial_trust() {
        let profile = CharacterProfile::new(CharacterId::Boris, "Борис Титов", 140)
            .with_role("Охранник");
        assert_eq!(profile.initial_trust, 100);
        assert_eq!(profile.role.as_deref(), Some("Охранник"));
    }
}
