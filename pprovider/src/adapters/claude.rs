//! Claude adapter for the Anthropic messages API.
//!
//! Anthropic's wire shape differs from the OpenAI-compatible providers: the
//! system prompt is a top-level field, messages carry only user/assistant
//! roles, auth rides an `x-api-key` header, and the text payload sits in a
//! content-block array.

use std::sync::Arc;
use std::time::Duration;

use pcommon::BoxFuture;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    ApiKey, ChatProvider, Completion, CompletionRequest, ProviderError, ProviderId, Role,
};

pub const CLAUDE_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct ClaudeRequest {
    pub model: String,
    pub system: Option<String>,
    pub messages: Vec<ClaudeMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaudeMessage {
    pub role: ClaudeRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaudeRole {
    User,
    Assistant,
}

impl ClaudeRole {
    fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaudeResponse {
    pub model: String,
    pub content: String,
}

pub trait ClaudeTransport: Send + Sync + std::fmt::Debug {
    fn complete<'a>(
        &'a self,
        request: ClaudeRequest,
        auth: ApiKey,
    ) -> BoxFuture<'a, Result<ClaudeResponse, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct ClaudeHttpTransport {
    client: Client,
    base_url: String,
}

impl ClaudeHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: CLAUDE_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let envelope_message = extract_error_message(&body);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::authentication(
                envelope_message.unwrap_or_else(|| format!("authentication failed ({status})")),
            ),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ProviderError::timeout(
                envelope_message.unwrap_or_else(|| format!("upstream timeout ({status})")),
            ),
            _ => match envelope_message {
                Some(message) => ProviderError::upstream(message),
                None => ProviderError::transport(format!("http {status}")),
            },
        }
    }
}

impl ClaudeTransport for ClaudeHttpTransport {
    fn complete<'a>(
        &'a self,
        request: ClaudeRequest,
        auth: ApiKey,
    ) -> BoxFuture<'a, Result<ClaudeResponse, ProviderError>> {
        Box::pin(async move {
            let api_request = build_api_request(request);
            let url = self.endpoint("messages");
            let response = self
                .client
                .post(url)
                .timeout(REQUEST_TIMEOUT)
                .header("x-api-key", auth.expose())
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&api_request)
                .send()
                .await
                .map_err(|err| {
                    if err.is_timeout() {
                        ProviderError::timeout(err.to_string())
                    } else {
                        ProviderError::transport(err.to_string())
                    }
                })?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let parsed: ClaudeApiResponse = response
                .json()
                .await
                .map_err(|err| ProviderError::malformed_response(err.to_string()))?;

            ClaudeResponse::try_from(parsed)
        })
    }
}

#[derive(Clone)]
pub struct ClaudeProvider {
    transport: Arc<dyn ClaudeTransport>,
    fallback_model: String,
}

impl ClaudeProvider {
    pub fn new(transport: Arc<dyn ClaudeTransport>) -> Self {
        Self {
            transport,
            fallback_model: "claude-3-5-sonnet-latest".to_string(),
        }
    }

    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = model.into();
        self
    }

    pub fn default_http_transport(client: Client) -> ClaudeHttpTransport {
        ClaudeHttpTransport::new(client)
    }
}

impl ChatProvider for ClaudeProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Claude
    }

    fn complete<'a>(
        &'a self,
        mut request: CompletionRequest,
        auth: ApiKey,
    ) -> BoxFuture<'a, Result<Completion, ProviderError>> {
        Box::pin(async move {
            if request.model.trim().is_empty() {
                request.model = self.fallback_model.clone();
            }
            request.validate()?;

            let requested_model = request.model.clone();
            let response = self
                .transport
                .complete(build_claude_request(request), auth)
                .await?;

            let model = if response.model.trim().is_empty() {
                requested_model
            } else {
                response.model
            };

            Ok(Completion {
                provider: ProviderId::Claude,
                model,
                text: response.content,
            })
        })
    }
}

/// Splits the window the Anthropic way: system turns are concatenated into
/// the top-level `system` field, everything else keeps its slot in the
/// `messages` array in order.
pub(crate) fn build_claude_request(request: CompletionRequest) -> ClaudeRequest {
    let mut system_parts = Vec::new();
    let mut messages = Vec::new();

    for turn in request.turns {
        match turn.role {
            // An empty system slot is omitted from the wire entirely.
            Role::System if turn.content.trim().is_empty() => {}
            Role::System => system_parts.push(turn.content),
            Role::User => messages.push(ClaudeMessage {
                role: ClaudeRole::User,
                content: turn.content,
            }),
            Role::Assistant => messages.push(ClaudeMessage {
                role: ClaudeRole::Assistant,
                content: turn.content,
            }),
        }
    }

    let system = if system_parts.is_empty() {
        None
    } else {
        Some(system_parts.join("\n\n"))
    };

    ClaudeRequest {
        model: request.model,
        system,
        messages,
        temperature: request.temperature,
        // The messages API requires max_tokens on every call.
        max_tokens: request.max_tokens.unwrap_or(1000),
    }
}

pub(crate) fn build_api_request(request: ClaudeRequest) -> ClaudeApiRequest {
    ClaudeApiRequest {
        model: request.model,
        system: request.system,
        messages: request
            .messages
            .into_iter()
            .map(|message| ClaudeApiMessage {
                role: message.role.as_str().to_string(),
                content: message.content,
            })
            .collect(),
        temperature: request.temperature,
        max_tokens: request.max_tokens,
    }
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ClaudeApiErrorEnvelope>(body).ok()?;
    Some(parsed.error.message)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClaudeApiErrorEnvelope {
    pub error: ClaudeApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClaudeApiError {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ClaudeApiRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<ClaudeApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ClaudeApiMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClaudeApiResponse {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub content: Vec<ClaudeApiContentBlock>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClaudeApiContentBlock {
    pub text: Option<String>,
}

impl TryFrom<ClaudeApiResponse> for ClaudeResponse {
    type Error = ProviderError;

    fn try_from(value: ClaudeApiResponse) -> Result<Self, Self::Error> {
        let block = value
            .content
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::malformed_response("response field missing: content"))?;

        let content = block.text.ok_or_else(|| {
            ProviderError::malformed_response("response field missing: content[0].text")
        })?;

        Ok(Self {
            model: value.model,
            content,
        })
    }
}
