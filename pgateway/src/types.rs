//! Gateway request, reply, and boundary envelope types.
//!
//! ```rust
//! use pgateway::TurnRequest;
//!
//! let request = TurnRequest::new("s1", "hello", "sk-live-123");
//! assert_eq!(request.provider, "gpt");
//! ```

use pcommon::SessionId;
use pprovider::ProviderId;
use serde::Serialize;

use crate::GatewayError;

/// One inbound gateway call: the shape the HTTP front end hands over after
/// its own extraction (bearer-header stripping included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRequest {
    pub session_id: SessionId,
    pub provider: String,
    pub prompt: String,
    pub api_key: String,
}

impl TurnRequest {
    pub fn new(
        session_id: impl Into<SessionId>,
        prompt: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            provider: "gpt".to_string(),
            prompt: prompt.into(),
            api_key: api_key.into(),
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    pub session_id: SessionId,
    pub provider: ProviderId,
    pub text: String,
}

/// The serialized boundary envelope returned to the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ApiResponse {
    Success { result: String },
    Error { message: String },
}

impl ApiResponse {
    pub fn success(result: impl Into<String>) -> Self {
        Self::Success {
            result: result.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

impl From<Result<TurnReply, GatewayError>> for ApiResponse {
    fn from(value: Result<TurnReply, GatewayError>) -> Self {
        match value {
            Ok(reply) => Self::success(reply.text),
            Err(error) => Self::error(error.message),
        }
    }
}
