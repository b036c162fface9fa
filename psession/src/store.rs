//! Session history storage contract.

use pcommon::{BoxFuture, SessionId};
use pprovider::Turn;

use crate::StoreError;

/// TTL-backed key-value store of ordered turn lists, keyed by session
/// identifier. The gateway owns the lifecycle policy (create, trim, expire);
/// the store only holds and ages the sequences.
pub trait SessionStore: Send + Sync {
    /// Returns the stored turns in order, or an empty sequence when the key
    /// is absent or expired. Never fails on a missing key.
    fn load<'a>(
        &'a self,
        session_id: &'a SessionId,
    ) -> BoxFuture<'a, Result<Vec<Turn>, StoreError>>;

    /// Replaces the entire stored sequence for the session and re-arms its
    /// TTL. A full overwrite, not an append: the caller computes the
    /// complete new sequence first, and a concurrent writer's turns are
    /// intentionally discarded.
    fn save<'a>(
        &'a self,
        session_id: &'a SessionId,
        turns: Vec<Turn>,
    ) -> BoxFuture<'a, Result<(), StoreError>>;
}
