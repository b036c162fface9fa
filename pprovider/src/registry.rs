//! Provider registry for startup-time adapter lookup.
//!
//! ```rust
//! use pprovider::ProviderRegistry;
//!
//! let registry = ProviderRegistry::new();
//! assert!(registry.is_empty());
//! assert_eq!(registry.len(), 0);
//! ```

use std::sync::Arc;

use pcommon::Registry;

use crate::{ChatProvider, ProviderId};

/// Lookup table built once at startup, replacing string comparisons
/// scattered through the request path.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Registry<ProviderId, Arc<dyn ChatProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<P>(&mut self, provider: P)
    where
        P: ChatProvider + 'static,
    {
        self.register_arc(Arc::new(provider));
    }

    /// Registers an already-shared adapter, useful when the caller keeps a
    /// handle for inspection or reuse.
    pub fn register_arc(&mut self, provider: Arc<dyn ChatProvider>) {
        self.providers.insert(provider.id(), provider);
    }

    pub fn get(&self, provider_id: ProviderId) -> Option<Arc<dyn ChatProvider>> {
        self.providers.get(&provider_id).cloned()
    }

    pub fn remove(&mut self, provider_id: ProviderId) -> Option<Arc<dyn ChatProvider>> {
        self.providers.remove(&provider_id)
    }

    pub fn contains(&self, provider_id: ProviderId) -> bool {
        self.providers.contains_key(&provider_id)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
