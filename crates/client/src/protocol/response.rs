//! Response helpers.
//!
//! `http::Response` has no place for the reason phrase of the status line, so
//! transports that receive a non-canonical phrase attach it as a
//! [`ReasonPhrase`] extension.

use crate::protocol::Response;

/// The reason phrase sent by the server, stored as a response extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasonPhrase(String);

impl ReasonPhrase {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ReasonPhrase {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ReasonPhrase {
    fn from(value: String) -> Self {
        Self(value)
    }
}

pub trait ResponseExt {
    /// Returns the reason phrase of the status line.
    ///
    /// The [`ReasonPhrase`] extension wins; otherwise the canonical reason of
    /// the status code is used, or an empty string for unknown codes.
    fn reason_phrase(&self) -> &str;
}

impl ResponseExt for Response {
    fn reason_phrase(&self) -> &str {
        self.extensions()
            .get::<ReasonPhrase>()
            .map(ReasonPhrase::as_str)
            .or_else(|| self.status().canonical_reason())
            .unwrap_or("")
    }
}
