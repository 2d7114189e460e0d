//! auth
//!
//! Credential handling for the remote service.
//!
//! # Design
//!
//! The token is opaque to this crate: nothing validates, inspects, or logs
//! it. [`AccessToken`] exists so the value cannot leak through formatting;
//! `Debug` prints a redaction marker and there is no `Display`. Only the
//! transport layer reads the raw value, to build the `Authorization`
//! header.

use std::fmt;

/// An access token for the hosting API.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a token value.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(REDACTED)")
    }
}
