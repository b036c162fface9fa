//! Provider-agnostic request, completion, and turn model types.
//!
//! ```rust
//! use pprovider::{CompletionRequest, ProviderErrorKind, Role, Turn};
//!
//! let ok = CompletionRequest::new_validated(
//!     "gpt-4",
//!     vec![Turn::new(Role::User, "Summarize this thread")],
//! );
//! assert!(ok.is_ok());
//!
//! let err = CompletionRequest::new_validated("", vec![Turn::new(Role::User, "hi")])
//!     .err()
//!     .expect("empty model should fail");
//! assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
//! ```

use std::fmt::{Display, Formatter};

use crate::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Gpt,
    Mistral,
    DeepSeek,
    Claude,
    Gemini,
}

impl ProviderId {
    /// Resolves a caller-supplied selector string. Unknown selectors return
    /// `None`; the gateway turns that into an unsupported-provider error
    /// without any network or store effect.
    pub fn parse(selector: &str) -> Option<Self> {
        match selector.trim().to_ascii_lowercase().as_str() {
            "gpt" => Some(Self::Gpt),
            "mistral" => Some(Self::Mistral),
            "deepseek" => Some(Self::DeepSeek),
            "claude" => Some(Self::Claude),
            "gemini" => Some(Self::Gemini),
            _ => None,
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            Self::Gpt => "gpt",
            Self::Mistral => "mistral",
            Self::DeepSeek => "deepseek",
            Self::Claude => "claude",
            Self::Gemini => "gemini",
        };

        f.write_str(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One conversation message, immutable once created. Ordering within a
/// session is chronological and significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// The outgoing window handed to an adapter: a system turn followed by the
/// most recent conversation turns. Derived by the gateway, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub turns: Vec<Turn>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, turns: Vec<Turn>) -> Self {
        Self {
            model: model.into(),
            turns,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn new_validated(
        model: impl Into<String>,
        turns: Vec<Turn>,
    ) -> Result<Self, ProviderError> {
        let request = Self::new(model, turns);
        request.validate()?;
        Ok(request)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        if self.turns.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one turn is required",
            ));
        }

        if let Some(max_tokens) = self.max_tokens
            && max_tokens == 0
        {
            return Err(ProviderError::invalid_request(
                "max_tokens must be greater than zero",
            ));
        }

        if let Some(temperature) = self.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(ProviderError::invalid_request(
                "temperature must be in the inclusive range 0.0..=2.0",
            ));
        }

        Ok(())
    }
}

/// The normalized result every adapter produces: a single text payload, no
/// provider-specific JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub provider: ProviderId,
    pub model: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderErrorKind;

    #[test]
    fn provider_id_display_is_stable() {
        assert_eq!(ProviderId::Gpt.to_string(), "gpt");
        assert_eq!(ProviderId::Mistral.to_string(), "mistral");
        assert_eq!(ProviderId::DeepSeek.to_string(), "deepseek");
        assert_eq!(ProviderId::Claude.to_string(), "claude");
        assert_eq!(ProviderId::Gemini.to_string(), "gemini");
    }

    #[test]
    fn provider_id_parse_accepts_selectors_case_insensitively() {
        assert_eq!(ProviderId::parse("gpt"), Some(ProviderId::Gpt));
        assert_eq!(ProviderId::parse("  DeepSeek "), Some(ProviderId::DeepSeek));
        assert_eq!(ProviderId::parse("GEMINI"), Some(ProviderId::Gemini));
        assert_eq!(ProviderId::parse("unknown"), None);
        assert_eq!(ProviderId::parse(""), None);
    }

    #[test]
    fn completion_request_validate_enforces_contract() {
        let empty_model = CompletionRequest::new("   ", vec![Turn::new(Role::User, "hi")]);
        let err = empty_model.validate().expect_err("empty model must fail");
        assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);

        let empty_turns = CompletionRequest::new("gpt-4", Vec::new());
        let err = empty_turns.validate().expect_err("empty turns must fail");
        assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);

        let bad_temperature =
            CompletionRequest::new("gpt-4", vec![Turn::new(Role::User, "hi")])
                .with_temperature(2.5);
        let err = bad_temperature
            .validate()
            .expect_err("temperature outside range must fail");
        assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);

        let bad_max_tokens = CompletionRequest::new("gpt-4", vec![Turn::new(Role::User, "hi")])
            .with_max_tokens(0);
        let err = bad_max_tokens
            .validate()
            .expect_err("max_tokens=0 must fail");
        assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);

        let valid = CompletionRequest::new("gpt-4", vec![Turn::new(Role::User, "hi")])
            .with_temperature(0.3)
            .with_max_tokens(1000);
        assert!(valid.validate().is_ok());
    }
}
