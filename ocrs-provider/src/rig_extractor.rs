//! An extraction provider on top of any rig [`CompletionModel`].
//!
//! Requests carry the strict variant of the schema as a `json_schema`
//! response format, so a conforming backend only ever returns shapes that
//! deserialize; nullable unions stand in for optional fields.

use async_trait::async_trait;
use ocrs_parser::extraction::ProviderError;
use ocrs_parser::extraction::feedback::{Role, Turn, build_system_prompt, extraction_turns};
use ocrs_parser::preprocess::InputFormat;
use ocrs_parser::provider::{ExtractedRecord, Extractor, FeedbackExtractor, TokenUsage};
use ocrs_parser::schema::{SchemaNode, StrictSchema};
use rig::completion::message::AssistantContent;
use rig::completion::{CompletionModel, Message};
use serde_json::{Value, json};

use crate::config::ProviderConfig;
use crate::errors::{backend_error, parse_content};

/// A rig-backed provider supporting both plain and feedback extraction.
pub struct RigExtractor<M> {
    model: M,
    system_prompt: String,
    strict_schema: StrictSchema,
    request_params: Value,
    config: ProviderConfig,
}

impl<M: CompletionModel> RigExtractor<M> {
    /// Creates a provider, deriving and caching the strict schema once.
    #[must_use]
    pub fn new(
        model: M,
        system_prompt: impl Into<String>,
        schema: &SchemaNode,
        config: ProviderConfig,
    ) -> Self {
        let strict_schema = schema.to_strict();
        let request_params = json!({
            "seed": config.seed,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": config.schema_name,
                    "strict": true,
                    "schema": strict_schema.as_value(),
                }
            }
        });
        Self {
            model,
            system_prompt: system_prompt.into(),
            strict_schema,
            request_params,
            config,
        }
    }

    /// The cached strict schema sent with every request.
    #[must_use]
    pub const fn strict_schema(&self) -> &StrictSchema {
        &self.strict_schema
    }

    /// The request configuration.
    #[must_use]
    pub const fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn complete(
        &self,
        text: &str,
        format: InputFormat,
        errors: &[String],
    ) -> Result<ExtractedRecord, ProviderError> {
        let provider = self.config.provider_name.as_str();
        let mut messages: Vec<Message> = extraction_turns(text, errors)
            .into_iter()
            .map(to_message)
            .collect();
        let prompt = messages.pop().unwrap_or_else(|| Message::user(text));

        tracing::debug!(
            event = "provider_request",
            provider,
            model = %self.config.model,
            format = %format,
            feedback_errors = errors.len(),
            "provider_request"
        );

        let response = self
            .model
            .completion_request(prompt)
            .preamble(build_system_prompt(&self.system_prompt, format))
            .messages(messages)
            .temperature(self.config.temperature)
            .max_tokens(self.config.max_tokens)
            .additional_params(self.request_params.clone())
            .send()
            .await
            .map_err(|e| backend_error(provider, &e))?;

        let content: String = response
            .choice
            .iter()
            .filter_map(|part| match part {
                AssistantContent::Text(reply) => Some(reply.text.as_str()),
                _ => None,
            })
            .collect();

        Ok(ExtractedRecord {
            value: parse_content(provider, &content)?,
            provider: provider.to_string(),
            model: self.config.model.clone(),
            usage: TokenUsage::new(response.usage.input_tokens, response.usage.output_tokens),
        })
    }
}

fn to_message(turn: Turn) -> Message {
    match turn.role {
        Role::User => Message::user(turn.content),
        Role::Assistant => Message::assistant(turn.content),
    }
}

#[async_trait]
impl<M: CompletionModel + 'static> Extractor for RigExtractor<M> {
    async fn parse(
        &self,
        text: &str,
        format: InputFormat,
    ) -> Result<ExtractedRecord, ProviderError> {
        self.complete(text, format, &[]).await
    }

    fn as_feedback(&self) -> Option<&dyn FeedbackExtractor> {
        Some(self)
    }
}

#[async_trait]
impl<M: CompletionModel + 'static> FeedbackExtractor for RigExtractor<M> {
    async fn parse_with_feedback(
        &self,
        text: &str,
        format: InputFormat,
        errors: &[String],
    ) -> Result<ExtractedRecord, ProviderError> {
        self.complete(text, format, errors).await
    }
}
