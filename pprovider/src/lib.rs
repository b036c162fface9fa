//! Normalized provider model and one adapter per upstream wire shape.

mod credentials;
mod error;
mod model;
mod provider;
mod registry;

pub mod adapters;
pub mod prelude;

pub use credentials::ApiKey;
pub use error::{ProviderError, ProviderErrorKind};
pub use model::{Completion, CompletionRequest, ProviderId, Role, Turn};
pub use provider::ChatProvider;
pub use registry::ProviderRegistry;
