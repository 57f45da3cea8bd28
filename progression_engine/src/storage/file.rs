//! One JSON document per session on the local filesystem.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::SessionStore;
use crate::error::StorageError;
use crate::session::{SessionId, SessionState};

/// Stores each session as `{base_path}/{session_id}.json`.
///
/// Writes go to a temp file that is then renamed over the record, so a
/// failed save leaves the previous record intact.
#[derive(Debug, Clone)]
pub struct JsonFileSessionStore {
    base_path: PathBuf,
}

impl JsonFileSessionStore {
    /// Create the store, creating `base_path` if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn path_for(&self, id: SessionId) -> PathBuf {
        self.base_path.join(format!("{}.json", id))
    }
}

#[async_trait]
impl SessionStore for JsonFileSessionStore {
    async fn load_state(&self, id: SessionId) -> Result<Option<SessionState>, StorageError> {
        let path = self.path_for(id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let state = serde_json::from_slice(&bytes)?;
        tracing::debug!(session = %id, path = %path.display(), "Loaded session");
        Ok(Some(state))
    }

    async fn save_state(&self, state: &SessionState) -> Result<(), StorageError> {
        let path = self.path_for(state.id);
        let json = serde_json::to_vec_pretty(state)?;

        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &json).await?;
        tokio::fs::rename(&temp_path, &path).await?;

        tracing::debug!(
            session = %state.id,
            path = %path.display(),
            size = json.len(),
            "Saved session"
        );
        Ok(())
    }
}
