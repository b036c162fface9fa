#[cfg(feature = "provider-openai")]
pub mod openai;

#[cfg(feature = "provider-mistral")]
pub mod mistral;

#[cfg(feature = "provider-deepseek")]
pub mod deepseek;

#[cfg(feature = "provider-claude")]
pub mod claude;

#[cfg(feature = "provider-gemini")]
pub mod gemini;
