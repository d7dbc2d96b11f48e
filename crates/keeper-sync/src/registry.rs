//! Connection registry (spec §4.3) — tracks every live session per user so
//! a `new` frame on one device can fan out an `update` to the user's other
//! devices.
//!
//! Generalizes the teacher's `SessionManager`: guarded by `RwLock`, multiple
//! simultaneous readers permitted (spec §5). Unlike the teacher, sessions
//! are removed on disconnect — spec §9 Open Question 1 resolves in favor of
//! cleanup, since an unbounded registry would leak a row per dropped
//! connection forever.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};

pub type Outbox = mpsc::UnboundedSender<Message>;

/// Tracks every live session, keyed by user id then by session id.
#[derive(Default)]
pub struct ConnectionRegistry {
    sessions: RwLock<HashMap<i64, HashMap<String, Outbox>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly-authenticated session's outbound mailbox.
    pub async fn register(&self, user_id: i64, session_id: String, outbox: Outbox) {
        self.sessions
            .write()
            .await
            .entry(user_id)
            .or_default()
            .insert(session_id, outbox);
    }

    /// Remove a session on disconnect (reader loop exit — spec §4.2 `Closed`).
    pub async fn remove(&self, user_id: i64, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(user_sessions) = sessions.get_mut(&user_id) {
            user_sessions.remove(session_id);
            if user_sessions.is_empty() {
                sessions.remove(&user_id);
            }
        }
    }

    /// Fan out a frame to every session belonging to `user_id`, including the
    /// session that produced the write — spec §9 treats self-echo as
    /// confirmation, not noise to suppress. Dead mailboxes (the peer already
    /// dropped its receiver) are skipped; they get cleaned up by that
    /// session's own disconnect path rather than from here, keeping this a
    /// pure read.
    pub async fn publish(&self, user_id: i64, message: Message) {
        let sessions = self.sessions.read().await;
        if let Some(user_sessions) = sessions.get(&user_id) {
            for outbox in user_sessions.values() {
                let _ = outbox.send(message.clone());
            }
        }
    }

    /// Send a frame to exactly one session — the snapshot reply and a
    /// session's own invalid-token notice must never reach its peers.
    pub async fn send_to(&self, user_id: i64, session_id: &str, message: Message) {
        let sessions = self.sessions.read().await;
        if let Some(outbox) = sessions.get(&user_id).and_then(|s| s.get(session_id)) {
            let _ = outbox.send(message);
        }
    }

    pub async fn is_online(&self, user_id: i64) -> bool {
        self.sessions
            .read()
            .await
            .get(&user_id)
            .is_some_and(|s| !s.is_empty())
    }

    pub async fn active_session_count(&self) -> usize {
        self.sessions.read().await.values().map(|s| s.len()).sum()
    }
}

pub type SharedRegistry = Arc<ConnectionRegistry>;
