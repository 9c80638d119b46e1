//! Mapping of rig completion failures and raw completions onto [`ProviderError`].

use ocrs_parser::extraction::ProviderError;
use rig::completion::CompletionError;
use serde_json::Value;

/// Wraps a rig completion failure as a backend error.
#[must_use]
pub fn backend_error(provider: &str, error: &CompletionError) -> ProviderError {
    ProviderError::Backend {
        provider: provider.to_string(),
        message: error.to_string(),
    }
}

/// Parses the text of a completion into a JSON value.
///
/// # Errors
///
/// Returns [`ProviderError::EmptyResponse`] for blank text and
/// [`ProviderError::MalformedResponse`] when the text is not JSON.
pub fn parse_content(provider: &str, content: &str) -> Result<Value, ProviderError> {
    if content.trim().is_empty() {
        return Err(ProviderError::EmptyResponse {
            provider: provider.to_string(),
        });
    }
    serde_json::from_str(content).map_err(|e| ProviderError::MalformedResponse {
        provider: provider.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_content_is_empty_response() {
        assert_eq!(
            parse_content("openai", "  \n"),
            Err(ProviderError::EmptyResponse {
                provider: "openai".into()
            })
        );
    }

    #[test]
    fn test_non_json_is_malformed() {
        assert!(matches!(
            parse_content("openai", "Sure! Here is your recipe"),
            Err(ProviderError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_json_is_parsed() {
        let value = parse_content("openai", r#"{"spec":"OCRS/1.0"}"#).unwrap();
        assert_eq!(value["spec"], "OCRS/1.0");
    }

    #[test]
    fn test_backend_error_keeps_message() {
        let err = backend_error("openai", &CompletionError::ProviderError("rate limited".into()));
        assert!(err.to_string().starts_with("openai request failed: "));
        assert!(err.to_string().contains("rate limited"));
    }
}
