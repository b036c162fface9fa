//! Gateway-level errors and seam conversions.

use std::error::Error;
use std::fmt::{Display, Formatter};

use pprovider::{ProviderError, ProviderErrorKind};
use psession::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Rejected before any store or network effect.
    InvalidRequest,
    /// Unknown provider selector; no network call, no history mutation.
    UnsupportedProvider,
    Authentication,
    Upstream,
    MalformedResponse,
    Transport,
    Store,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::InvalidRequest, message)
    }

    pub fn unsupported_provider(selector: &str) -> Self {
        Self::new(
            GatewayErrorKind::UnsupportedProvider,
            format!("unsupported provider: {selector}"),
        )
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Store, message)
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for GatewayError {}

impl From<ProviderError> for GatewayError {
    fn from(value: ProviderError) -> Self {
        let kind = match value.kind {
            ProviderErrorKind::Authentication => GatewayErrorKind::Authentication,
            ProviderErrorKind::Upstream => GatewayErrorKind::Upstream,
            ProviderErrorKind::MalformedResponse => GatewayErrorKind::MalformedResponse,
            ProviderErrorKind::Transport | ProviderErrorKind::Timeout => {
                GatewayErrorKind::Transport
            }
            ProviderErrorKind::InvalidRequest => GatewayErrorKind::InvalidRequest,
        };

        Self::new(kind, value.message)
    }
}

impl From<StoreError> for GatewayError {
    fn from(value: StoreError) -> Self {
        Self::store(value.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_map_onto_gateway_kinds() {
        let auth: GatewayError = ProviderError::authentication("bad key").into();
        assert_eq!(auth.kind, GatewayErrorKind::Authentication);
        assert_eq!(auth.message, "bad key");

        let timeout: GatewayError = ProviderError::timeout("deadline").into();
        assert_eq!(timeout.kind, GatewayErrorKind::Transport);

        let malformed: GatewayError = ProviderError::malformed_response("no choices").into();
        assert_eq!(malformed.kind, GatewayErrorKind::MalformedResponse);
    }

    #[test]
    fn store_errors_map_onto_store_kind() {
        let err: GatewayError = StoreError::new("connection refused").into();
        assert_eq!(err.kind, GatewayErrorKind::Store);
        assert_eq!(err.message, "connection refused");
    }

    #[test]
    fn unsupported_provider_names_the_selector() {
        let err = GatewayError::unsupported_provider("unknown");
        assert_eq!(err.message, "unsupported provider: unknown");
    }
}
