//! Injected session repository
//!
//! The host application owns session persistence (keychain, MDM lists and
//! so on). The login flow only needs get/add/remove, so the store is an
//! injected trait rather than process-wide state.

use async_trait::async_trait;
use tokio::sync::RwLock;
use url::Url;

use crate::models::Session;

/// Repository of established sessions, keyed by instance URL + user id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, base_url: &Url, user_id: &str) -> Option<Session>;
    async fn add(&self, session: Session);
    async fn remove(&self, base_url: &Url, user_id: &str) -> Option<Session>;
    async fn all(&self) -> Vec<Session>;
}

/// In-memory store, suitable for tests and as a cache layer in hosts that
/// persist elsewhere.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<Vec<Session>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(session: &Session, base_url: &Url, user_id: &str) -> bool {
    session.base_url == *base_url && session.user_id == user_id
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, base_url: &Url, user_id: &str) -> Option<Session> {
        self.sessions
            .read()
            .await
            .iter()
            .find(|session| matches(session, base_url, user_id))
            .cloned()
    }

    /// Adding a session for an already-stored instance/user replaces it.
    async fn add(&self, session: Session) {
        let mut sessions = self.sessions.write().await;
        sessions.retain(|existing| existing.unique_id() != session.unique_id());
        sessions.push(session);
    }

    async fn remove(&self, base_url: &Url, user_id: &str) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        let index = sessions
            .iter()
            .position(|session| matches(session, base_url, user_id))?;
        Some(sessions.remove(index))
    }

    async fn all(&self) -> Vec<Session> {
        self.sessions.read().await.clone()
    }
}
