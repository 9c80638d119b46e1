//! The contract between the pipeline and an extraction backend.
//!
//! [`Extractor`] is mandatory. [`FeedbackExtractor`] is an optional second
//! capability a provider advertises through [`Extractor::as_feedback`]; the
//! pipeline queries it at runtime and falls back to [`Extractor::parse`] when
//! it is absent.

use std::ops::Add;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extraction::error::ProviderError;
use crate::preprocess::InputFormat;

/// Tokens consumed by one or more provider calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens.
    pub input_tokens: u64,
    /// Completion tokens.
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Usage with the given token counts.
    #[must_use]
    pub const fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Prompt plus completion tokens.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

impl Add for TokenUsage {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            input_tokens: self.input_tokens.saturating_add(rhs.input_tokens),
            output_tokens: self.output_tokens.saturating_add(rhs.output_tokens),
        }
    }
}

/// A candidate record returned by a provider, before any validation.
///
/// `value` may carry `null` in place of absent optional fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// The raw structured output.
    pub value: Value,
    /// Name of the provider that produced it.
    pub provider: String,
    /// Model that produced it.
    pub model: String,
    /// Tokens consumed by the call.
    pub usage: TokenUsage,
}

/// Turns recipe text into a candidate structured record.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extracts a record from normalized text, steered by its format tier.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the backend fails or its output is unusable.
    async fn parse(
        &self,
        text: &str,
        format: InputFormat,
    ) -> Result<ExtractedRecord, ProviderError>;

    /// The feedback capability of this provider, if it has one.
    fn as_feedback(&self) -> Option<&dyn FeedbackExtractor> {
        None
    }
}

/// Re-extraction that takes the previous attempt's errors into account.
#[async_trait]
pub trait FeedbackExtractor: Extractor {
    /// Extracts a record again, asking the backend to correct `errors`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the backend fails or its output is unusable.
    async fn parse_with_feedback(
        &self,
        text: &str,
        format: InputFormat,
        errors: &[String],
    ) -> Result<ExtractedRecord, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixed;

    #[async_trait]
    impl Extractor for Fixed {
        async fn parse(
            &self,
            _text: &str,
            _format: InputFormat,
        ) -> Result<ExtractedRecord, ProviderError> {
            Ok(ExtractedRecord {
                value: json!({}),
                provider: "fixed".into(),
                model: "none".into(),
                usage: TokenUsage::default(),
            })
        }
    }

    #[test]
    fn test_feedback_capability_defaults_to_absent() {
        assert!(Fixed.as_feedback().is_none());
    }

    #[test]
    fn test_token_usage_adds() {
        let sum = TokenUsage::new(10, 2) + TokenUsage::new(5, 1);
        assert_eq!(sum, TokenUsage::new(15, 3));
        assert_eq!(sum.total(), 18);
    }

    #[tokio::test]
    async fn test_parse_through_trait_object() {
        let provider: Box<dyn Extractor> = Box::new(Fixed);
        let record = provider.parse("text", InputFormat::Unstructured).await.unwrap();
        assert_eq!(record.provider, "fixed");
    }
}
