//! Gemini adapter for the `generateContent` API.
//!
//! Gemini takes a single prompt here rather than a role-tagged window, so
//! the adapter linearizes the window into one text blob, preserving turn
//! order and labelling each turn with its speaker role.

use std::sync::Arc;
use std::time::Duration;

use pcommon::BoxFuture;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    ApiKey, ChatProvider, Completion, CompletionRequest, ProviderError, ProviderId, Role, Turn,
};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiRequest {
    pub model: String,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiResponse {
    pub content: String,
}

pub trait GeminiTransport: Send + Sync + std::fmt::Debug {
    fn complete<'a>(
        &'a self,
        request: GeminiRequest,
        auth: ApiKey,
    ) -> BoxFuture<'a, Result<GeminiResponse, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct GeminiHttpTransport {
    client: Client,
    base_url: String,
}

impl GeminiHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
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

impl GeminiTransport for GeminiHttpTransport {
    fn complete<'a>(
        &'a self,
        request: GeminiRequest,
        auth: ApiKey,
    ) -> BoxFuture<'a, Result<GeminiResponse, ProviderError>> {
        Box::pin(async move {
            let api_request = build_api_request(&request);
            let url = self.endpoint(&request.model);
            let response = self
                .client
                .post(url)
                .timeout(REQUEST_TIMEOUT)
                .header("x-goog-api-key", auth.expose())
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

            let parsed: GeminiApiResponse = response
                .json()
                .await
                .map_err(|err| ProviderError::malformed_response(err.to_string()))?;

            GeminiResponse::try_from(parsed)
        })
    }
}

#[derive(Clone)]
pub struct GeminiProvider {
    transport: Arc<dyn GeminiTransport>,
    fallback_model: String,
}

impl GeminiProvider {
    pub fn new(transport: Arc<dyn GeminiTransport>) -> Self {
        Self {
            transport,
            fallback_model: "gemini-1.5-flash".to_string(),
        }
    }

    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = model.into();
        self
    }

    pub fn default_http_transport(client: Client) -> GeminiHttpTransport {
        GeminiHttpTransport::new(client)
    }
}

impl ChatProvider for GeminiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Gemini
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

            let model = request.model.clone();
            let gemini_request = GeminiRequest {
                model: model.clone(),
                prompt: linearize_window(&request.turns),
            };

            let response = self.transport.complete(gemini_request, auth).await?;

            Ok(Completion {
                provider: ProviderId::Gemini,
                model,
                text: response.content,
            })
        })
    }
}

/// Flattens a role-tagged window into one prompt, keeping chronological
/// order and labelling each turn with its role.
pub(crate) fn linearize_window(turns: &[Turn]) -> String {
    let mut prompt = String::new();
    for turn in turns {
        let label = match turn.role {
            Role::System => "System",
            Role::User => "User",
            Role::Assistant => "Assistant",
        };

        if !prompt.is_empty() {
            prompt.push_str("\n\n");
        }
        prompt.push_str(label);
        prompt.push_str(": ");
        prompt.push_str(&turn.content);
    }

    prompt
}

pub(crate) fn build_api_request(request: &GeminiRequest) -> GeminiApiRequest {
    GeminiApiRequest {
        contents: vec![GeminiApiContent {
            parts: vec![GeminiApiPart {
                text: request.prompt.clone(),
            }],
        }],
    }
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<GeminiApiErrorEnvelope>(body).ok()?;
    Some(parsed.error.message)
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiApiErrorEnvelope {
    pub error: GeminiApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiApiError {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GeminiApiRequest {
    pub contents: Vec<GeminiApiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GeminiApiContent {
    #[serde(default)]
    pub parts: Vec<GeminiApiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GeminiApiPart {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiApiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiApiCandidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiApiCandidate {
    pub content: Option<GeminiApiContent>,
}

impl TryFrom<GeminiApiResponse> for GeminiResponse {
    type Error = ProviderError;

    fn try_from(value: GeminiApiResponse) -> Result<Self, Self::Error> {
        let candidate = value.candidates.into_iter().next().ok_or_else(|| {
            ProviderError::malformed_response("response field missing: candidates")
        })?;

        let content = candidate.content.ok_or_else(|| {
            ProviderError::malformed_response("response field missing: candidates[0].content")
        })?;

        let part = content.parts.into_iter().next().ok_or_else(|| {
            ProviderError::malformed_response(
                "response field missing: candidates[0].content.parts",
            )
        })?;

        Ok(Self { content: part.text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn window_linearizes_in_order_with_role_labels() {
        let prompt = linearize_window(&[
            Turn::new(Role::System, "be brief"),
            Turn::new(Role::User, "hello"),
            Turn::new(Role::Assistant, "hi"),
        ]);

        assert_eq!(prompt, "System: be brief\n\nUser: hello\n\nAssistant: hi");
    }

    #[test]
    fn api_request_serializes_expected_wire_shape() {
        let request = GeminiRequest {
            model: "gemini-1.5-flash".to_string(),
            prompt: "User: hello".to_string(),
        };

        let value = serde_json::to_value(build_api_request(&request)).expect("serialize");
        assert_eq!(
            value,
            json!({"contents": [{"parts": [{"text": "User: hello"}]}]})
        );
    }

    #[test]
    fn response_parse_requires_candidate_text() {
        let empty: GeminiApiResponse =
            serde_json::from_value(json!({"candidates": []})).expect("parse");
        let err = GeminiResponse::try_from(empty).expect_err("must fail");
        assert!(err.message.contains("candidates"));

        let no_parts: GeminiApiResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": []}}]
        }))
        .expect("parse");
        let err = GeminiResponse::try_from(no_parts).expect_err("must fail");
        assert!(err.message.contains("candidates[0].content.parts"));

        let ok: GeminiApiResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "hi"}]}}]
        }))
        .expect("parse");
        assert_eq!(GeminiResponse::try_from(ok).expect("must parse").content, "hi");
    }

    #[test]
    fn error_envelope_message_is_extracted_verbatim() {
        let body = r#"{"error": {"code": 429, "message": "quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(
            extract_error_message(body),
            Some("quota exceeded".to_string())
        );
    }
}
