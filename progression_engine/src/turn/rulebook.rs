//! The validated case together with the engines compiled from it.

use case_rules::{CaseFile, CaseFileError};
use chrono::{DateTime, Utc};

use crate::evidence::EvidenceEngine;
use crate::session::{SessionId, SessionState};
use crate::triggers::TriggerEngine;

/// Static rules of one case. Shared read-only by every session.
pub struct Rulebook {
    case: CaseFile,
    evidence: EvidenceEngine,
    triggers: TriggerEngine,
}

impl Rulebook {
    /// Validate the case and compile its evidence and trigger rules.
    pub fn new(case: CaseFile) -> Result<Self, CaseFileError> {
        case.validate()?;
        Ok(Self {
            evidence: EvidenceEngine::new(&case)?,
            triggers: TriggerEngine::new(&case)?,
            case,
        })
    }

    /// The bundled Gromov case.
    pub fn gromov() -> Result<Self, CaseFileError> {
        Self::new(CaseFile::gromov()?)
    }

    pub fn case(&self) -> &CaseFile {
        &self.case
    }

    pub fn evidence(&self) -> &EvidenceEngine {
        &self.evidence
    }

    pub fn triggers(&self) -> &TriggerEngine {
        &self.triggers
    }

    pub fn new_session(&self, id: SessionId, at: DateTime<Utc>) -> SessionState {
        SessionState::new(id, &self.case, at)
    }
}
