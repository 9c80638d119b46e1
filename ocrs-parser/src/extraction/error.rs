//! Error types for the extraction pipeline.

use thiserror::Error;

/// Raw input rejected before any extraction attempt is made.
///
/// Fatal for the run: malformed input is never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// The trimmed input is empty.
    #[error("Input text is empty")]
    Empty,

    /// The trimmed input exceeds the accepted length.
    #[error("Input too large: {length} characters (max {max})")]
    TooLarge {
        /// Length of the trimmed input, in characters.
        length: usize,
        /// Maximum accepted length, in characters.
        max: usize,
    },
}

/// Failure reported by an extraction provider for a single call.
///
/// Consumes one attempt; the display string becomes that attempt's error set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The backend returned no usable content.
    #[error("Empty response from {provider}")]
    EmptyResponse {
        /// Name of the provider that produced the response.
        provider: String,
    },

    /// The backend returned content that is not valid JSON.
    #[error("Malformed response from {provider}: {message}")]
    MalformedResponse {
        /// Name of the provider that produced the response.
        provider: String,
        /// Parser error message.
        message: String,
    },

    /// The backend call itself failed (transport, authentication, rate limit).
    #[error("{provider} request failed: {message}")]
    Backend {
        /// Name of the provider that made the call.
        provider: String,
        /// Backend error message.
        message: String,
    },
}

/// The schema document could not be read or compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Schema error: {0}")]
pub struct SchemaError(pub String);

/// Which tier rejected an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The provider call failed.
    Provider,
    /// The record did not match the schema.
    Structural,
    /// The record violated a domain rule.
    Semantic,
}

impl FailureKind {
    /// Returns the label used in log events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Structural => "structural",
            Self::Semantic => "semantic",
        }
    }
}
