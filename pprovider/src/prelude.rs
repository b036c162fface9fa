//! Common `pprovider` imports for downstream crates.

pub use crate::{
    ApiKey, ChatProvider, Completion, CompletionRequest, ProviderError, ProviderErrorKind,
    ProviderId, ProviderRegistry, Role, Turn,
};
pub use pcommon::BoxFuture;
