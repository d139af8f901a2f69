//! In-memory session registry
//!
//! One session per user, created on first use. Mutation of a given user's
//! session is serialized by a per-user lock; different users never contend
//! beyond the brief map lookup.

use crate::state_machine::{Session, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<UserId, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, user_id: UserId) -> Arc<Mutex<Session>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(slot) = sessions.get(&user_id) {
                return slot.clone();
            }
        }

        self.sessions
            .write()
            .await
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(user_id))))
            .clone()
    }

    /// Snapshot of the user's session, creating a fresh one if needed
    pub async fn get_or_create(&self, user_id: UserId) -> Session {
        self.slot(user_id).await.lock().await.clone()
    }

    /// Run `mutator` with exclusive access to the user's session
    pub async fn update<R>(&self, user_id: UserId, mutator: impl FnOnce(&mut Session) -> R) -> R {
        let slot = self.slot(user_id).await;
        let mut session = slot.lock().await;
        mutator(&mut session)
    }

    /// Number of users with a live session
    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }
}
