//! In-memory conversation session store.
//!
//! Process-wide and lazily populated; entries are not expected to survive a
//! restart, since a flow resumes by re-sending the triggering message.

use crate::core::chat::FlowState;
use crate::core::traits::SessionStore;
use async_trait::async_trait;
use di::{inject, injectable};
use log::debug;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Inactivity timeout applied to both chat surfaces.
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(10 * 60);

pub struct InMemorySessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, (FlowState, Instant)>>,
}

#[injectable(SessionStore)]
impl InMemorySessionStore {
    #[inject]
    pub fn create() -> InMemorySessionStore {
        InMemorySessionStore::with_ttl(SESSION_TIMEOUT)
    }
}

impl InMemorySessionStore {
    pub fn with_ttl(ttl: Duration) -> InMemorySessionStore {
        InMemorySessionStore {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> Option<FlowState> {
        let mut sessions = self.sessions.write().await;

        if let Some((_, touched)) = sessions.get(key) {
            if touched.elapsed() > self.ttl {
                sessions.remove(key);
                return None;
            }
        }

        sessions.get_mut(key).map(|(state, touched)| {
            *touched = Instant::now();
            state.clone()
        })
    }

    async fn set(&self, key: &str, state: FlowState) {
        self.sessions
            .write()
            .await
            .insert(key.to_owned(), (state, Instant::now()));
    }

    async fn delete(&self, key: &str) {
        self.sessions.write().await.remove(key);
    }

    async fn sweep_expired(&self) {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|_, (_, touched)| touched.elapsed() <= self.ttl);

        if sessions.len() < before {
            debug!("swept {} expired sessions", before - sessions.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = InMemorySessionStore::with_ttl(Duration::from_secs(60));

        store.set("CL-08051301", FlowState::CollectAdmin).await;
        assert!(matches!(
            store.get("CL-08051301").await,
            Some(FlowState::CollectAdmin)
        ));
    }

    #[tokio::test]
    async fn sessions_are_scoped_per_actor() {
        let store = InMemorySessionStore::with_ttl(Duration::from_secs(60));

        store.set("CL-08051301", FlowState::CollectAdmin).await;
        store.set("AD-08051301", FlowState::CollectCancel).await;

        assert!(matches!(
            store.get("CL-08051301").await,
            Some(FlowState::CollectAdmin)
        ));
        assert!(matches!(
            store.get("AD-08051301").await,
            Some(FlowState::CollectCancel)
        ));
        assert!(store.get("CL-08051399").await.is_none());
    }

    #[tokio::test]
    async fn delete_removes_the_entry() {
        let store = InMemorySessionStore::with_ttl(Duration::from_secs(60));

        store.set("CL-08051301", FlowState::CollectVip).await;
        store.delete("CL-08051301").await;

        assert!(store.get("CL-08051301").await.is_none());
    }

    #[tokio::test]
    async fn expired_entries_behave_as_absent() {
        let store = InMemorySessionStore::with_ttl(Duration::from_millis(20));

        store.set("CL-08051301", FlowState::CollectAdmin).await;
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(store.get("CL-08051301").await.is_none());
    }

    #[tokio::test]
    async fn sweep_drops_only_expired_entries() {
        let store = InMemorySessionStore::with_ttl(Duration::from_millis(50));

        store.set("CL-08051301", FlowState::CollectAdmin).await;
        tokio::time::sleep(Duration::from_millis(80)).await;
        store.set("CL-08051302", FlowState::CollectVip).await;

        store.sweep_expired().await;

        assert_eq!(store.sessions.read().await.len(), 1);
        assert!(store.get("CL-08051302").await.is_some());
    }
}
