//! Per-request API key wrapper with redacted debug output.
//!
//! Keys are caller-supplied on every inbound request, so there is no at-rest
//! credential store; the wrapper only keeps the raw value out of logs and
//! zeroes it on drop.
//!
//! ```rust
//! use pprovider::ApiKey;
//!
//! let key = ApiKey::new("sk-live-123");
//! assert_eq!(key.expose(), "sk-live-123");
//! assert_eq!(format!("{key:?}"), "[REDACTED]");
//! ```

#[derive(PartialEq, Eq)]
pub struct ApiKey {
    value: String,
}

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

impl Clone for ApiKey {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for ApiKey {
    fn drop(&mut self) {
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}
