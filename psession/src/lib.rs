//! Time-bounded session history storage for the conversation gateway.

mod error;
mod memory;
mod store;

pub use error::StoreError;
pub use memory::{DEFAULT_SESSION_TTL, InMemoryTtlStore};
pub use store::SessionStore;
