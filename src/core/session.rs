//! Session registry and conversation transcripts
//!
//! Each open WebSocket connection owns exactly one [`Session`], created when
//! the connection is accepted and discarded when it closes. The registry maps
//! connection identifiers to sessions and must be safe for concurrent
//! register/unregister across independent connections; an individual
//! transcript is only ever touched by its own connection's handler.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

/// Speaker role for a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a conversation transcript
///
/// Serializes as `{"role": "...", "content": "..."}` so a transcript can be
/// submitted to the completion API without transformation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Opaque process-unique identifier for one open connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Mint a fresh identifier for a newly accepted connection.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Registry consistency errors
///
/// Both variants indicate a handler lifecycle bug rather than a runtime
/// condition: registration happens once on accept and unregistration once on
/// close.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("connection {0} is already registered")]
    AlreadyRegistered(ConnectionId),

    #[error("connection {0} is not registered")]
    NotFound(ConnectionId),
}

/// Live transcript state for one open connection
///
/// Turns are append-only and strictly chronological. On a fully processed
/// message the transcript grows by a user turn and an assistant turn; a
/// failure mid-exchange leaves a trailing unanswered user turn (no rollback).
#[derive(Debug, Default)]
pub struct Session {
    turns: Mutex<Vec<Turn>>,
}

impl Session {
    pub fn push(&self, turn: Turn) {
        self.turns.lock().push(turn);
    }

    /// Snapshot of the full transcript in chronological order.
    pub fn history(&self) -> Vec<Turn> {
        self.turns.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.turns.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.lock().is_empty()
    }
}

/// Registry mapping open connections to their sessions
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<ConnectionId, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty transcript for a newly accepted connection.
    pub fn register(&self, id: ConnectionId) -> Result<Arc<Session>, RegistryError> {
        let mut sessions = self.sessions.write();
        if sessions.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered(id));
        }
        let session = Arc::new(Session::default());
        sessions.insert(id, session.clone());
        Ok(session)
    }

    /// Look up the session for an open connection.
    pub fn get(&self, id: ConnectionId) -> Result<Arc<Session>, RegistryError> {
        self.sessions
            .read()
            .get(&id)
            .cloned()
            .ok_or(RegistryError::NotFound(id))
    }

    /// Remove a closed connection's session and discard its transcript.
    ///
    /// Callers invoke this exactly once per connection lifecycle; a second
    /// call reports `NotFound`.
    pub fn unregister(&self, id: ConnectionId) -> Result<(), RegistryError> {
        match self.sessions.write().remove(&id) {
            Some(_) => Ok(()),
            None => Err(RegistryError::NotFound(id)),
        }
    }

    /// Number of currently open sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
