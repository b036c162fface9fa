//! Store infrastructure errors.
//!
//! A missing or expired session is not an error (it loads as an empty
//! history); `StoreError` means the store itself was unreachable or broken,
//! so callers can tell "no history" from "store unavailable".

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub message: String,
    pub retryable: bool,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "session store error: {}", self.message)
    }
}

impl Error for StoreError {}
