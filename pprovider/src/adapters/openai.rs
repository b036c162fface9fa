//! OpenAI chat-completions adapter: transport trait, reqwest HTTP
//! implementation, and wire payload models.
//!
//! The Mistral and DeepSeek adapters ride the same transport with different
//! base URLs, so everything wire-shaped lives here.

use std::sync::Arc;
use std::time::Duration;

use pcommon::BoxFuture;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    ApiKey, ChatProvider, Completion, CompletionRequest, ProviderError, ProviderId, Role,
};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Upper bound on one upstream call. Adapters are single-attempt; any retry
/// belongs to the operational layer above the gateway.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiRequest {
    pub model: String,
    pub messages: Vec<OpenAiMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiMessage {
    pub role: OpenAiRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAiRole {
    System,
    User,
    Assistant,
}

impl OpenAiRole {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl From<Role> for OpenAiRole {
    fn from(value: Role) -> Self {
        match value {
            Role::System => Self::System,
            Role::User => Self::User,
            Role::Assistant => Self::Assistant,
        }
    }
}

impl From<crate::Turn> for OpenAiMessage {
    fn from(value: crate::Turn) -> Self {
        Self {
            role: value.role.into(),
            content: value.content,
        }
    }
}

/// Parsed success payload: the single extracted text plus the model the
/// upstream reports it used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiResponse {
    pub model: String,
    pub content: String,
}

pub trait OpenAiTransport: Send + Sync + std::fmt::Debug {
    fn complete<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: ApiKey,
    ) -> BoxFuture<'a, Result<OpenAiResponse, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct OpenAiHttpTransport {
    client: Client,
    base_url: String,
}

impl OpenAiHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: OPENAI_BASE_URL.to_string(),
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
                // The provider spoke: preserve its message verbatim.
                Some(message) => ProviderError::upstream(message),
                None => ProviderError::transport(format!("http {status}: {}", truncate(&body, 4096))),
            },
        }
    }
}

impl OpenAiTransport for OpenAiHttpTransport {
    fn complete<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: ApiKey,
    ) -> BoxFuture<'a, Result<OpenAiResponse, ProviderError>> {
        Box::pin(async move {
            let api_request = build_api_request(request);
            let url = self.endpoint("chat/completions");
            let response = self
                .client
                .post(url)
                .timeout(REQUEST_TIMEOUT)
                .bearer_auth(auth.expose())
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

            let parsed: OpenAiApiResponse = response
                .json()
                .await
                .map_err(|err| ProviderError::malformed_response(err.to_string()))?;

            OpenAiResponse::try_from(parsed)
        })
    }
}

#[derive(Clone)]
pub struct OpenAiProvider {
    transport: Arc<dyn OpenAiTransport>,
    fallback_model: String,
}

impl OpenAiProvider {
    pub fn new(transport: Arc<dyn OpenAiTransport>) -> Self {
        Self {
            transport,
            fallback_model: "gpt-4".to_string(),
        }
    }

    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = model.into();
        self
    }

    pub fn default_http_transport(client: Client) -> OpenAiHttpTransport {
        OpenAiHttpTransport::new(client)
    }

    fn apply_defaults(&self, mut request: CompletionRequest) -> CompletionRequest {
        if request.model.trim().is_empty() {
            request.model = self.fallback_model.clone();
        }

        request.temperature.get_or_insert(0.3);
        request.max_tokens.get_or_insert(1000);
        request
    }
}

impl ChatProvider for OpenAiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Gpt
    }

    fn complete<'a>(
        &'a self,
        request: CompletionRequest,
        auth: ApiKey,
    ) -> BoxFuture<'a, Result<Completion, ProviderError>> {
        Box::pin(async move {
            let request = self.apply_defaults(request);
            request.validate()?;

            let requested_model = request.model.clone();
            let response = self
                .transport
                .complete(build_openai_request(request), auth)
                .await?;

            Ok(Completion {
                provider: ProviderId::Gpt,
                model: reported_or(response.model, requested_model),
                text: response.content,
            })
        })
    }
}

/// Some gateways omit `model` in the response body; the normalized result
/// then falls back to the model that was requested.
pub(crate) fn reported_or(reported: String, requested: String) -> String {
    if reported.trim().is_empty() {
        requested
    } else {
        reported
    }
}

pub(crate) fn build_openai_request(request: CompletionRequest) -> OpenAiRequest {
    OpenAiRequest {
        model: request.model,
        messages: request.turns.into_iter().map(OpenAiMessage::from).collect(),
        temperature: request.temperature,
        max_tokens: request.max_tokens,
    }
}

pub(crate) fn build_api_request(request: OpenAiRequest) -> OpenAiApiRequest {
    OpenAiApiRequest {
        model: request.model,
        messages: request
            .messages
            .into_iter()
            .map(|message| OpenAiApiMessage {
                role: message.role.as_str().to_string(),
                content: message.content,
            })
            .collect(),
        temperature: request.temperature,
        max_tokens: request.max_tokens,
    }
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<OpenAiApiErrorEnvelope>(body).ok()?;
    Some(parsed.error.message)
}

pub(crate) fn truncate(input: &str, max: usize) -> String {
    if input.len() <= max {
        return input.to_string();
    }

    // The cut must land on a char boundary or the slice panics.
    let mut cut = max;
    while !input.is_char_boundary(cut) {
        cut -= 1;
    }

    let mut output = input[..cut].to_string();
    output.push_str("...");
    output
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiErrorEnvelope {
    pub error: OpenAiApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiError {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiRequest {
    pub model: String,
    pub messages: Vec<OpenAiApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiResponse {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<OpenAiApiChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiChoice {
    pub message: OpenAiApiAssistantMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiAssistantMessage {
    pub content: Option<String>,
}

impl TryFrom<OpenAiApiResponse> for OpenAiResponse {
    type Error = ProviderError;

    fn try_from(value: OpenAiApiResponse) -> Result<Self, Self::Error> {
        let choice = value.choices.into_iter().next().ok_or_else(|| {
            ProviderError::malformed_response("response field missing: choices")
        })?;

        let content = choice.message.content.ok_or_else(|| {
            ProviderError::malformed_response(
                "response field missing: choices[0].message.content",
            )
        })?;

        Ok(Self {
            model: value.model,
            content,
        })
    }
}
