use crate::{db::SwipeStore, error::AppResult, models::SessionState};

/// Per-instance cache of a session's memory row
///
/// The first `load` reads (or lazily creates) the row; later loads return the
/// cached copy. `commit` replaces the cached copy and overwrites the stored row
/// without any concurrency check, which relies on the registry allowing one
/// in-flight call per session.
pub struct SessionMemory {
    session_id: String,
    cached: Option<SessionState>,
}

impl SessionMemory {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            cached: None,
        }
    }

    pub async fn load(&mut self, store: &dyn SwipeStore) -> AppResult<SessionState> {
        if let Some(state) = &self.cached {
            return Ok(state.clone());
        }

        let state = store.load_session_memory(&self.session_id).await?;
        self.cached = Some(state.clone());
        Ok(state)
    }

    pub async fn commit(&mut self, store: &dyn SwipeStore, state: SessionState) -> AppResult<()> {
        store.save_session_memory(&self.session_id, &state).await?;
        self.cached = Some(state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;

    #[tokio::test]
    async fn test_load_creates_row_once() {
        let store = InMemoryStore::new();
        store.create_session("s1").await.unwrap();

        let mut memory = SessionMemory::new("s1");
        assert_eq!(memory.load(&store).await.unwrap(), SessionState::default());
        assert_eq!(store.session_memory("s1"), Some(SessionState::default()));
    }

    #[tokio::test]
    async fn test_second_load_uses_cache() {
        let store = InMemoryStore::new();
        store.create_session("s1").await.unwrap();

        let mut memory = SessionMemory::new("s1");
        memory.load(&store).await.unwrap();

        // A change behind the instance's back is not observed
        let external = SessionState {
            current_category: Some(5),
            intent_vector: None,
        };
        store.save_session_memory("s1", &external).await.unwrap();

        assert_eq!(memory.load(&store).await.unwrap(), SessionState::default());
    }

    #[tokio::test]
    async fn test_commit_persists_and_caches() {
        let store = InMemoryStore::new();
        store.create_session("s1").await.unwrap();

        let mut memory = SessionMemory::new("s1");
        memory.load(&store).await.unwrap();
        let state = SessionState {
            current_category: Some(2),
            intent_vector: Some(vec![0.5]),
        };
        memory.commit(&store, state.clone()).await.unwrap();

        assert_eq!(store.session_memory("s1"), Some(state.clone()));
        assert_eq!(memory.load(&store).await.unwrap(), state);
    }

    #[tokio::test]
    async fn test_unknown_session_fails() {
        let store = InMemoryStore::new();
        let mut memory = SessionMemory::new("missing");
        assert!(memory.load(&store).await.is_err());
    }
}
