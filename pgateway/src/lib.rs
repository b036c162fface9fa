//! Conversation gateway: session history, provider dispatch, normalized
//! replies.

mod error;
mod prompt;
mod service;
mod types;

pub use error::{GatewayError, GatewayErrorKind};
pub use prompt::load_system_prompt;
pub use service::{DEFAULT_PROVIDER, Gateway, HISTORY_LIMIT, WINDOW_TURNS};
pub use types::{ApiResponse, TurnReply, TurnRequest};
