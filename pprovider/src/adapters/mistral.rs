//! Mistral provider implemented over the OpenAI-compatible transport.

use std::sync::Arc;

use pcommon::BoxFuture;
use reqwest::Client;

use crate::adapters::openai::{
    OpenAiHttpTransport, OpenAiTransport, build_openai_request, reported_or,
};
use crate::{ApiKey, ChatProvider, Completion, CompletionRequest, ProviderError, ProviderId};

pub const MISTRAL_BASE_URL: &str = "https://api.mistral.ai/v1";

#[derive(Clone)]
pub struct MistralProvider {
    transport: Arc<dyn OpenAiTransport>,
    fallback_model: String,
}

impl MistralProvider {
    pub fn new(transport: Arc<dyn OpenAiTransport>) -> Self {
        Self {
            transport,
            fallback_model: "mistral-small-latest".to_string(),
        }
    }

    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = model.into();
        self
    }

    pub fn default_http_transport(client: Client) -> OpenAiHttpTransport {
        OpenAiHttpTransport::new(client).with_base_url(MISTRAL_BASE_URL)
    }
}

impl ChatProvider for MistralProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Mistral
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
                .complete(build_openai_request(request), auth)
                .await?;

            Ok(Completion {
                provider: ProviderId::Mistral,
                model: reported_or(response.model, requested_model),
                text: response.content,
            })
        })
    }
}
