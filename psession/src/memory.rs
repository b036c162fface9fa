//! In-memory TTL-backed implementation of the session store.
//!
//! ```rust
//! use psession::{DEFAULT_SESSION_TTL, InMemoryTtlStore};
//!
//! let store = InMemoryTtlStore::new();
//! assert_eq!(DEFAULT_SESSION_TTL.as_secs(), 3600);
//! let _ = store;
//! ```

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use pcommon::{BoxFuture, SessionId};
use pprovider::Turn;

use crate::{SessionStore, StoreError};

/// Entries expire this long after their most recent write; any write
/// re-arms the deadline.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug)]
struct Entry {
    turns: Vec<Turn>,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct InMemoryTtlStore {
    sessions: Mutex<HashMap<String, Entry>>,
    ttl: Duration,
}

impl Default for InMemoryTtlStore {
    fn default() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl: DEFAULT_SESSION_TTL,
        }
    }
}

impl InMemoryTtlStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl SessionStore for InMemoryTtlStore {
    fn load<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> BoxFuture<'a, Result<Vec<Turn>, StoreError>> {
        Box::pin(async move {
            let mut sessions = self
                .sessions
                .lock()
                .map_err(|_| StoreError::new("session store lock poisoned"))?;

            match sessions.get(session_id.as_str()) {
                Some(entry) if Instant::now() >= entry.expires_at => {
                    // Expired reads as never-existed; drop it lazily.
                    sessions.remove(session_id.as_str());
                    Ok(Vec::new())
                }
                Some(entry) => Ok(entry.turns.clone()),
                None => Ok(Vec::new()),
            }
        })
    }

    fn save<'a>(
        &'a self,
        session_id: &'a SessionId,
        turns: Vec<Turn>,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            let mut sessions = self
                .sessions
                .lock()
                .map_err(|_| StoreError::new("session store lock poisoned"))?;

            sessions.insert(
                session_id.to_string(),
                Entry {
                    turns,
                    expires_at: Instant::now() + self.ttl,
                },
            );

            Ok(())
        })
    }
}
