//! The gateway turn pipeline: validate, dispatch, invoke, persist.

use std::sync::Arc;

use pprovider::{
    ApiKey, CompletionRequest, ProviderId, ProviderRegistry, Role, Turn,
};
use psession::SessionStore;

use crate::{GatewayError, TurnReply, TurnRequest};

/// Total turns retained per session after any write. Oldest turns drop
/// first; the bound is by count, not age.
pub const HISTORY_LIMIT: usize = 10;

/// Retained turns actually sent upstream, after the system turn.
pub const WINDOW_TURNS: usize = 6;

pub const DEFAULT_PROVIDER: ProviderId = ProviderId::Gpt;

/// Orchestrates one conversation turn end to end. Holds the only mutable
/// view of session histories; adapters stay stateless and the system prompt
/// is read-only after startup.
pub struct Gateway {
    registry: ProviderRegistry,
    store: Arc<dyn SessionStore>,
    system_prompt: String,
}

impl Gateway {
    pub fn new(registry: ProviderRegistry, store: Arc<dyn SessionStore>) -> Self {
        Self {
            registry,
            store,
            system_prompt: String::new(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Runs one turn. Error paths short-circuit without touching history:
    /// validation and unknown selectors return before any store or network
    /// effect, and a failed upstream call leaves the stored history exactly
    /// as it was. Only a successful completion writes.
    pub async fn handle(&self, request: TurnRequest) -> Result<TurnReply, GatewayError> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(GatewayError::invalid_request("prompt must not be empty"));
        }

        if request.session_id.is_empty() {
            return Err(GatewayError::invalid_request("session_id must not be empty"));
        }

        if request.api_key.trim().is_empty() {
            return Err(GatewayError::invalid_request("api_key must not be empty"));
        }

        let selector = match request.provider.trim() {
            "" => DEFAULT_PROVIDER.to_string(),
            other => other.to_string(),
        };

        let provider_id = ProviderId::parse(&selector)
            .ok_or_else(|| GatewayError::unsupported_provider(&selector))?;
        let provider = self
            .registry
            .get(provider_id)
            .ok_or_else(|| GatewayError::unsupported_provider(&selector))?;

        let mut history = self.store.load(&request.session_id).await?;
        history.push(Turn::new(Role::User, prompt));
        trim_to_limit(&mut history);

        let window = self.build_window(&history);
        let completion = provider
            .complete(
                CompletionRequest::new(String::new(), window),
                ApiKey::new(request.api_key.as_str()),
            )
            .await?;

        history.push(Turn::new(Role::Assistant, completion.text.as_str()));
        trim_to_limit(&mut history);

        // The answer is already in hand; a failed history write degrades
        // future continuity, not this reply.
        if let Err(error) = self.store.save(&request.session_id, history).await {
            tracing::error!(
                session_id = %request.session_id,
                provider = %provider_id,
                error = %error,
                "history write failed after successful completion"
            );
        }

        Ok(TurnReply {
            session_id: request.session_id,
            provider: provider_id,
            text: completion.text,
        })
    }

    /// The outgoing window: the system turn plus the most recent retained
    /// turns, at most `1 + WINDOW_TURNS` long. Derived per call, never
    /// stored. The system prompt is resent on every call.
    fn build_window(&self, history: &[Turn]) -> Vec<Turn> {
        let tail = history.len().saturating_sub(WINDOW_TURNS);
        let mut window = Vec::with_capacity(WINDOW_TURNS + 1);
        window.push(Turn::new(Role::System, self.system_prompt.as_str()));
        window.extend(history[tail..].iter().cloned());
        window
    }
}

fn trim_to_limit(history: &mut Vec<Turn>) {
    if history.len() > HISTORY_LIMIT {
        history.drain(..history.len() - HISTORY_LIMIT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_turns(count: usize) -> Vec<Turn> {
        (0..count)
            .map(|index| {
                let role = if index % 2 == 0 {
                    Role::User
                } else {
                    Role::Assistant
                };
                Turn::new(role, format!("turn {index}"))
            })
            .collect()
    }

    #[test]
    fn trim_keeps_only_the_newest_turns() {
        let mut history = numbered_turns(12);
        trim_to_limit(&mut history);

        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].content, "turn 2");
        assert_eq!(history[9].content, "turn 11");

        let mut short = numbered_turns(4);
        trim_to_limit(&mut short);
        assert_eq!(short.len(), 4);
    }

    #[test]
    fn window_is_system_plus_newest_six() {
        let gateway = Gateway::new(
            ProviderRegistry::new(),
            Arc::new(psession::InMemoryTtlStore::new()),
        )
        .with_system_prompt("be brief");

        let history = numbered_turns(10);
        let window = gateway.build_window(&history);

        assert_eq!(window.len(), WINDOW_TURNS + 1);
        assert_eq!(window[0], Turn::new(Role::System, "be brief"));
        assert_eq!(window[1].content, "turn 4");
        assert_eq!(window[6].content, "turn 9");
    }

    #[test]
    fn window_keeps_the_system_slot_even_with_an_empty_prompt() {
        let gateway = Gateway::new(
            ProviderRegistry::new(),
            Arc::new(psession::InMemoryTtlStore::new()),
        );

        let window = gateway.build_window(&numbered_turns(1));
        assert_eq!(window.len(), 2);
        assert_eq!(window[0], Turn::new(Role::System, ""));
    }
}
