#![cfg(all(
    feature = "provider-openai",
    feature = "provider-mistral",
    feature = "provider-deepseek"
))]

use std::sync::{Arc, Mutex};

use pcommon::BoxFuture;
use pprovider::adapters::deepseek::DeepSeekProvider;
use pprovider::adapters::mistral::MistralProvider;
use pprovider::adapters::openai::{
    OpenAiProvider, OpenAiRequest, OpenAiResponse, OpenAiRole, OpenAiTransport,
};
use pprovider::{
    ApiKey, ChatProvider, CompletionRequest, ProviderError, ProviderErrorKind, ProviderId, Role,
    Turn,
};

#[derive(Debug, Default)]
struct FakeTransport {
    captured_auth: Mutex<Option<String>>,
    captured_request: Mutex<Option<OpenAiRequest>>,
    fail_with: Mutex<Option<ProviderError>>,
}

impl FakeTransport {
    fn failing(error: ProviderError) -> Self {
        Self {
            fail_with: Mutex::new(Some(error)),
            ..Self::default()
        }
    }
}

impl OpenAiTransport for FakeTransport {
    fn complete<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: ApiKey,
    ) -> BoxFuture<'a, Result<OpenAiResponse, ProviderError>> {
        Box::pin(async move {
            let model = request.model.clone();
            *self.captured_request.lock().expect("request lock") = Some(request);
            *self.captured_auth.lock().expect("auth lock") = Some(auth.expose().to_string());

            if let Some(error) = self.fail_with.lock().expect("failure lock").take() {
                return Err(error);
            }

            Ok(OpenAiResponse {
                model,
                content: "hello world".to_string(),
            })
        })
    }
}

#[tokio::test]
async fn gpt_complete_maps_response_and_applies_defaults() {
    let transport = Arc::new(FakeTransport::default());
    let provider = OpenAiProvider::new(transport.clone());

    let request = CompletionRequest::new(
        "",
        vec![
            Turn::new(Role::System, "be brief"),
            Turn::new(Role::User, "hi"),
        ],
    );

    let completion = provider
        .complete(request, ApiKey::new("sk-live-123"))
        .await
        .expect("completion should succeed");

    assert_eq!(completion.provider, ProviderId::Gpt);
    assert_eq!(completion.model, "gpt-4");
    assert_eq!(completion.text, "hello world");

    let auth = transport
        .captured_auth
        .lock()
        .expect("auth lock")
        .clone()
        .expect("auth should be captured");
    assert_eq!(auth, "sk-live-123");

    let captured = transport
        .captured_request
        .lock()
        .expect("request lock")
        .clone()
        .expect("request should be captured");
    assert_eq!(captured.model, "gpt-4");
    assert_eq!(captured.messages.len(), 2);
    assert_eq!(captured.messages[0].role, OpenAiRole::System);
    assert_eq!(captured.temperature, Some(0.3));
    assert_eq!(captured.max_tokens, Some(1000));
}

#[tokio::test]
async fn missing_reported_model_falls_back_to_the_requested_one() {
    #[derive(Debug)]
    struct BlankModelTransport;

    impl OpenAiTransport for BlankModelTransport {
        fn complete<'a>(
            &'a self,
            _request: OpenAiRequest,
            _auth: ApiKey,
        ) -> BoxFuture<'a, Result<OpenAiResponse, ProviderError>> {
            Box::pin(async {
                Ok(OpenAiResponse {
                    model: String::new(),
                    content: "hello world".to_string(),
                })
            })
        }
    }

    let provider = OpenAiProvider::new(Arc::new(BlankModelTransport));
    let request = CompletionRequest::new("gpt-4o", vec![Turn::new(Role::User, "hi")]);

    let completion = provider
        .complete(request, ApiKey::new("sk-live-123"))
        .await
        .expect("completion should succeed");

    assert_eq!(completion.model, "gpt-4o");
}

#[tokio::test]
async fn gpt_complete_propagates_transport_errors_unchanged() {
    let transport = Arc::new(FakeTransport::failing(ProviderError::upstream(
        "model overloaded",
    )));
    let provider = OpenAiProvider::new(transport);

    let request = CompletionRequest::new("gpt-4", vec![Turn::new(Role::User, "hi")]);
    let error = provider
        .complete(request, ApiKey::new("sk-live-123"))
        .await
        .expect_err("completion should fail");

    assert_eq!(error.kind, ProviderErrorKind::Upstream);
    assert_eq!(error.message, "model overloaded");
}

#[tokio::test]
async fn gpt_complete_rejects_invalid_request_before_any_call() {
    let transport = Arc::new(FakeTransport::default());
    let provider = OpenAiProvider::new(transport.clone());

    let request = CompletionRequest::new("gpt-4", Vec::new());
    let error = provider
        .complete(request, ApiKey::new("sk-live-123"))
        .await
        .expect_err("empty window should fail");

    assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
    assert!(transport.captured_request.lock().expect("request lock").is_none());
}

#[tokio::test]
async fn mistral_variant_uses_its_own_id_and_fallback_model() {
    let transport = Arc::new(FakeTransport::default());
    let provider = MistralProvider::new(transport.clone());

    let request = CompletionRequest::new("", vec![Turn::new(Role::User, "hi")]);
    let completion = provider
        .complete(request, ApiKey::new("mk-1"))
        .await
        .expect("completion should succeed");

    assert_eq!(completion.provider, ProviderId::Mistral);
    assert_eq!(completion.model, "mistral-small-latest");

    let captured = transport
        .captured_request
        .lock()
        .expect("request lock")
        .clone()
        .expect("request should be captured");
    // The mistral variant passes generation settings through untouched.
    assert_eq!(captured.temperature, None);
    assert_eq!(captured.max_tokens, None);
}

#[tokio::test]
async fn deepseek_variant_uses_its_own_id_and_fallback_model() {
    let transport = Arc::new(FakeTransport::default());
    let provider = DeepSeekProvider::new(transport.clone());

    let request = CompletionRequest::new("", vec![Turn::new(Role::User, "hi")]);
    let completion = provider
        .complete(request, ApiKey::new("dk-1"))
        .await
        .expect("completion should succeed");

    assert_eq!(completion.provider, ProviderId::DeepSeek);
    assert_eq!(completion.model, "deepseek-chat");
}
