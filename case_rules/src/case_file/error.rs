//! Errors raised while loading a case file.

use thiserror::Error;

/// A case file that cannot be played. Always fatal at startup.
#[derive(Debug, Error)]
pub enum CaseFileError {
    #[error("Failed to read case file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse case file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("{owner} references unknown {kind} '{id}'")]
    DanglingReference {
        owner: String,
        kind: &'static str,
        id: String,
    },

    #[error("Invalid case file: {0}")]
    Invalid(String),
}

impl CaseFileError {
    pub fn dangling(owner: impl Into<String>, kind: &'static str, id: impl Into<String>) -> Self {
        Self::DanglingReference {
            owner: owner.into(),
            kind,
            id: id.into(),
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}
