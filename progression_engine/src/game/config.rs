//! Engine settings, loadable from TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::EngineError;

/// Tunables of the game driver. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Earlier conversation entries passed to `respond`.
    pub history_window: usize,
    /// Attempts per save before a turn is abandoned.
    pub save_attempts: u32,
    /// Reply shown when the dialogue service cannot produce one.
    pub fallback_reply: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_window: 5,
            save_attempts: 3,
            fallback_reply: "Извините, я задумался... Повторите, пожалуйста?".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, EngineError> {
        toml::from_str(source).map_err(|e| EngineError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&source)
    }

    pub fn with_history_window(mut self, entries: usize) -> Self {
        self.history_window = entries;
        self
    }

    pub fn with_save_attempts(mut self, attempts: u32) -> Self {
        self.save_attempts = attempts;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config() {
        let config = EngineConfig::from_toml_str("history_window = 8").unwrap();
        assert_eq!(config.history_window, 8);
        assert_eq!(config.save_attempts, 3);
        assert_eq!(config.fallback_reply, EngineConfig::default().fallback_reply);
    }

    #[test]
    fn test_bad_config() {
        assert!(matches!(
            EngineConfig::from_toml_str("save_attempts = \"many\""),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "save_attempts = 1\nfallback_reply = \"...\"\n").unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.save_attempts, 1);
        assert_eq!(config.fallback_reply, "...");
        assert!(EngineConfig::load(dir.path().join("missing.toml")).is_err());
    }
}
