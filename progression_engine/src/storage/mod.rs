//! Session persistence port and its two stores.

mod file;

pub use file::*;

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::session::{SessionId, SessionState};

/// Load and save whole session records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The stored state, or `None` if the session was never saved.
    async fn load_state(&self, id: SessionId) -> Result<Option<SessionState>, StorageError>;

    /// Replace the stored state of `state.id`.
    async fn save_state(&self, state: &SessionState) -> Result<(), StorageError>;
}

/// Keeps sessions in process memory.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionState>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load_state(&self, id: SessionId) -> Result<Option<SessionState>, StorageError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn save_state(&self, state: &SessionState) -> Result<(), StorageError> {
        self.sessions.write().await.insert(state.id, state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use case_rules::CaseFile;
    use chrono::Utc;

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemorySessionStore::new();
        let state = SessionState::new(SessionId::new(), &CaseFile::gromov().unwrap(), Utc::now());

        assert!(store.load_state(state.id).await.unwrap().is_none());

        store.save_state(&state).await.unwrap();
        assert_eq!(store.load_state(state.id).await.unwrap(), Some(state.clone()));
        assert_eq!(store.len().await, 1);

        store.save_state(&state).await.unwrap();
        assert_eq!(store.len().await, 1);
    }
}
