//! Session-keyed runtime session bookkeeping.
//!
//! Chat clients keep their own logical session ids. The agent runtime wants a
//! separate, sufficiently long runtime session id per conversation, which is
//! derived on first use and reused for every later request of the same
//! logical session.
//!
//! Entries are never expired automatically. Callers that run long enough for
//! this to matter must call [`SessionStore::evict`] or [`SessionStore::clear`].

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// Minimum length the agent runtime accepts for a runtime session id.
pub const MIN_RUNTIME_SESSION_ID_LEN: usize = 33;

const MAX_PREFIX_LEN: usize = 64;

/// A runtime session bound to a logical session id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSession {
    /// Logical session id supplied by the caller.
    pub session_id: String,
    /// Derived id sent to the runtime.
    pub runtime_session_id: String,
    /// When the session was first used.
    pub created_at: DateTime<Utc>,
    /// When the session was last looked up.
    pub last_used: DateTime<Utc>,
}

impl RuntimeSession {
    fn new(session_id: &str) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.to_string(),
            runtime_session_id: derive_runtime_session_id(session_id),
            created_at: now,
            last_used: now,
        }
    }
}

/// Derive a fresh runtime session id for a logical session id.
///
/// The result is the logical id reduced to `[A-Za-z0-9_-]` (at most 64
/// characters), a dash, and a UUID v4.
///
/// # Example
///
/// ```rust
/// use agentstream_core::session::{derive_runtime_session_id, MIN_RUNTIME_SESSION_ID_LEN};
///
/// let id = derive_runtime_session_id("chat 42");
/// assert!(id.starts_with("chat42-"));
/// assert!(id.len() >= MIN_RUNTIME_SESSION_ID_LEN);
/// ```
#[must_use]
pub fn derive_runtime_session_id(session_id: &str) -> String {
    let prefix: String = session_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(MAX_PREFIX_LEN)
        .collect();
    let suffix = Uuid::new_v4().to_string();

    if prefix.is_empty() {
        suffix
    } else {
        format!("{prefix}-{suffix}")
    }
}

/// Map from logical session id to runtime session.
///
/// The store is owned by whatever orchestrates sessions and can be shared
/// behind an `Arc` between concurrent requests.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, RuntimeSession>>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the runtime session id for a logical session, creating it on first use.
    pub fn runtime_session_id(&self, session_id: &str) -> String {
        let mut sessions = self.sessions.write();
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                let session = RuntimeSession::new(session_id);
                debug!(
                    session_id = %session_id,
                    runtime_session_id = %session.runtime_session_id,
                    "Created runtime session"
                );
                session
            });
        session.last_used = Utc::now();
        session.runtime_session_id.clone()
    }

    /// Look up a session without creating it.
    #[must_use]
    pub fn get(&self, session_id: &str) -> Option<RuntimeSession> {
        self.sessions.read().get(session_id).cloned()
    }

    /// Check whether a logical session is known.
    #[must_use]
    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().contains_key(session_id)
    }

    /// Remove a session. The next lookup derives a new runtime id.
    pub fn evict(&self, session_id: &str) -> Option<RuntimeSession> {
        let removed = self.sessions.write().remove(session_id);
        if removed.is_some() {
            debug!(session_id = %session_id, "Evicted runtime session");
        }
        removed
    }

    /// Remove every session.
    pub fn clear(&self) {
        self.sessions.write().clear();
    }

    /// Number of known sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// All known logical session ids.
    #[must_use]
    pub fn session_ids(&self) -> Vec<String> {
        self.sessions.read().keys().cloned().collect()
    }
}
