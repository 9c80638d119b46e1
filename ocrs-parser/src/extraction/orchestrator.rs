//! The extraction pipeline: preprocessing followed by a bounded
//! extract/validate/retry loop.

use std::sync::Arc;

use serde::Serialize;
use tokio::time::Instant;

use super::config::ExtractionConfig;
use super::error::{FailureKind, InputError, ProviderError, SchemaError};
use super::metrics::ExtractionMetrics;
use crate::preprocess::{PreprocessedText, preprocess};
use crate::provider::{ExtractedRecord, Extractor};
use crate::recipe::OcrsRecipe;
use crate::schema::StructuralValidator;
use crate::semantic::{SemanticRuleEngine, Severity};

/// Outcome of a pipeline run that got past preprocessing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PipelineResult {
    /// The record passed both validation tiers.
    Success {
        /// The validated recipe.
        recipe: OcrsRecipe,
        /// Messages of warn-level findings.
        warnings: Vec<String>,
        /// Run metrics.
        metrics: ExtractionMetrics,
    },
    /// Every attempt failed.
    Failure {
        /// Error messages from the last attempt only.
        errors: Vec<String>,
        /// Always empty; warnings of a rejected record are not reported.
        warnings: Vec<String>,
        /// Run metrics.
        metrics: ExtractionMetrics,
    },
}

impl PipelineResult {
    /// Whether the run produced a validated recipe.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The validated recipe, if any.
    #[must_use]
    pub const fn recipe(&self) -> Option<&OcrsRecipe> {
        match self {
            Self::Success { recipe, .. } => Some(recipe),
            Self::Failure { .. } => None,
        }
    }

    /// Warn-level messages. Empty on failure.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        match self {
            Self::Success { warnings, .. } | Self::Failure { warnings, .. } => warnings,
        }
    }

    /// Final error messages. Empty on success.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        match self {
            Self::Success { .. } => &[],
            Self::Failure { errors, .. } => errors,
        }
    }

    /// Run metrics.
    #[must_use]
    pub const fn metrics(&self) -> &ExtractionMetrics {
        match self {
            Self::Success { metrics, .. } | Self::Failure { metrics, .. } => metrics,
        }
    }
}

/// Where a run is in the attempt loop.
enum State {
    Extracting,
    StructuralValidating(ExtractedRecord),
    SemanticValidating(OcrsRecipe),
    Retrying {
        kind: FailureKind,
        errors: Vec<String>,
    },
    Succeeded {
        recipe: OcrsRecipe,
        warnings: Vec<String>,
    },
    Failed,
}

/// Turns raw recipe text into a validated [`OcrsRecipe`].
///
/// Holds only read-only state, so one pipeline can serve concurrent runs.
pub struct Pipeline<P> {
    provider: P,
    validator: Arc<StructuralValidator>,
    rules: SemanticRuleEngine,
    config: ExtractionConfig,
}

impl<P: Extractor> Pipeline<P> {
    /// Creates a pipeline with the canonical validator, the built-in rules,
    /// and default retry configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the canonical schema fails to compile.
    pub fn new(provider: P) -> Result<Self, SchemaError> {
        Ok(Self {
            provider,
            validator: Arc::new(StructuralValidator::canonical()?),
            rules: SemanticRuleEngine::default(),
            config: ExtractionConfig::default(),
        })
    }

    /// Replaces the semantic rule registry.
    #[must_use]
    pub fn with_rules(mut self, rules: SemanticRuleEngine) -> Self {
        self.rules = rules;
        self
    }

    /// Replaces the structural validator.
    #[must_use]
    pub fn with_validator(mut self, validator: Arc<StructuralValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Replaces the retry configuration.
    #[must_use]
    pub const fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// The extraction provider.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// The retry configuration.
    #[must_use]
    pub const fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Runs the full pipeline on raw text.
    ///
    /// Makes at most [`ExtractionConfig::max_attempts`] provider calls and
    /// returns on the first attempt that passes both validation tiers.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] when the input is empty or too large; the
    /// provider is never called in that case.
    pub async fn run(&self, raw_text: &str) -> Result<PipelineResult, InputError> {
        let input = preprocess(raw_text)?;
        Ok(self.run_preprocessed(&input).await)
    }

    /// Runs the attempt loop on already preprocessed text.
    pub async fn run_preprocessed(&self, input: &PreprocessedText) -> PipelineResult {
        let start = Instant::now();
        let max_attempts = self.config.max_attempts();
        let mut metrics = ExtractionMetrics::default();
        let mut attempt: usize = 0;
        let mut last_errors: Vec<String> = Vec::new();
        let mut state = State::Extracting;

        loop {
            state = match state {
                State::Extracting => {
                    attempt += 1;
                    metrics.attempts = attempt;
                    metrics.provider_calls += 1;

                    tracing::debug!(
                        event = "pipeline_attempt_started",
                        attempt,
                        max_attempts,
                        format = %input.format,
                        "pipeline_attempt_started"
                    );

                    match self.extract(input, attempt, &last_errors).await {
                        Ok(record) => {
                            metrics.add_usage(record.usage);
                            State::StructuralValidating(record)
                        }
                        Err(e) => {
                            tracing::warn!(
                                event = "provider_error",
                                attempt,
                                error = %e,
                                "provider_error"
                            );
                            State::Retrying {
                                kind: FailureKind::Provider,
                                errors: vec![e.to_string()],
                            }
                        }
                    }
                }

                State::StructuralValidating(record) => match self.validator.validate(record.value) {
                    Ok(recipe) => State::SemanticValidating(recipe),
                    Err(issues) => {
                        tracing::warn!(
                            event = "structural_validation_failed",
                            attempt,
                            issue_count = issues.len(),
                            "structural_validation_failed"
                        );
                        State::Retrying {
                            kind: FailureKind::Structural,
                            errors: issues.iter().map(ToString::to_string).collect(),
                        }
                    }
                },

                State::SemanticValidating(recipe) => {
                    let mut failures = Vec::new();
                    let mut warnings = Vec::new();
                    for finding in self.rules.evaluate(&recipe) {
                        match finding.severity {
                            Severity::Fail => failures.push(finding.message),
                            Severity::Warn => warnings.push(finding.message),
                            Severity::Pass => {}
                        }
                    }

                    if failures.is_empty() {
                        State::Succeeded { recipe, warnings }
                    } else {
                        tracing::warn!(
                            event = "semantic_validation_failed",
                            attempt,
                            failure_count = failures.len(),
                            "semantic_validation_failed"
                        );
                        State::Retrying {
                            kind: FailureKind::Semantic,
                            errors: failures,
                        }
                    }
                }

                State::Retrying { kind, errors } => {
                    last_errors = errors;
                    if attempt < max_attempts {
                        tracing::debug!(
                            event = "pipeline_retrying",
                            attempt,
                            failed_tier = kind.as_str(),
                            "pipeline_retrying"
                        );
                        State::Extracting
                    } else {
                        State::Failed
                    }
                }

                State::Succeeded { recipe, warnings } => {
                    metrics.wall_time = start.elapsed();
                    tracing::info!(
                        event = "pipeline_succeeded",
                        attempts = attempt,
                        warning_count = warnings.len(),
                        input_tokens = metrics.usage.input_tokens,
                        output_tokens = metrics.usage.output_tokens,
                        "pipeline_succeeded"
                    );
                    return PipelineResult::Success {
                        recipe,
                        warnings,
                        metrics,
                    };
                }

                State::Failed => {
                    metrics.wall_time = start.elapsed();
                    tracing::warn!(
                        event = "pipeline_exhausted",
                        attempts = attempt,
                        error_count = last_errors.len(),
                        "pipeline_exhausted"
                    );
                    return PipelineResult::Failure {
                        errors: last_errors,
                        warnings: Vec::new(),
                        metrics,
                    };
                }
            };
        }
    }

    /// Calls the base operation on the first attempt or when the provider has
    /// no feedback capability; otherwise re-extracts with the previous errors.
    async fn extract(
        &self,
        input: &PreprocessedText,
        attempt: usize,
        last_errors: &[String],
    ) -> Result<ExtractedRecord, ProviderError> {
        match self.provider.as_feedback() {
            Some(feedback) if attempt > 1 => {
                feedback
                    .parse_with_feedback(&input.text, input.format, last_errors)
                    .await
            }
            _ => self.provider.parse(&input.text, input.format).await,
        }
    }
}
