//! Per-sender session state.
//!
//! Sessions are in-memory only: created on a sender's first message,
//! discarded at process exit, and reset to the root menu on "volver". Each
//! session sits behind its own mutex so rapid double-sends from one sender
//! serialize instead of interleaving menu transitions.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

/// Which menu the sender is currently in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionMode {
    #[default]
    Root,
    Member,
    Admin,
    AdminPick,
}

/// A free-text argument the next inbound message will be consumed as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Awaiting {
    #[default]
    None,
    AddMember,
    RemoveMember,
    PickClub,
}

/// Menu state for one sender.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Club the sender is operating on, once bound.
    pub club_id: Option<String>,
    pub mode: SessionMode,
    pub awaiting: Awaiting,
}

/// Map from sender id to their session, each behind its own lock.
#[derive(Debug, Default)]
pub struct SessionTable {
    inner: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionTable {
    /// Get the sender's session handle, creating a root-mode one on first
    /// contact.
    pub async fn entry(&self, sender_id: &str) -> Arc<Mutex<Session>> {
        if let Some(session) = self.inner.read().await.get(sender_id) {
            return session.clone();
        }
        let mut table = self.inner.write().await;
        table
            .entry(sender_id.to_string())
            .or_default()
            .clone()
    }

    /// Number of senders seen so far.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// True when no sender has a session yet.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_contact_creates_a_root_session() {
        let table = SessionTable::default();
        assert!(table.is_empty().await);

        let session = table.entry("111").await;
        let guard = session.lock().await;
        assert_eq!(*guard, Session::default());
        assert_eq!(guard.mode, SessionMode::Root);
        drop(guard);

        assert_eq!(table.len().await, 1);
    }

    #[tokio::test]
    async fn entries_are_shared_per_sender() {
        let table = SessionTable::default();
        let a = table.entry("111").await;
        a.lock().await.mode = SessionMode::Admin;

        let b = table.entry("111").await;
        assert_eq!(b.lock().await.mode, SessionMode::Admin);
        assert_eq!(table.len().await, 1);
    }
}
