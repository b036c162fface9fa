//! The provider capability every adapter implements.

use pcommon::BoxFuture;

use crate::{ApiKey, Completion, CompletionRequest, ProviderError, ProviderId};

/// One upstream chat-completion service. Implementations are stateless,
/// single-attempt, and never mutate session history; the gateway owns any
/// retry decision.
pub trait ChatProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    fn complete<'a>(
        &'a self,
        request: CompletionRequest,
        auth: ApiKey,
    ) -> BoxFuture<'a, Result<Completion, ProviderError>>;
}
