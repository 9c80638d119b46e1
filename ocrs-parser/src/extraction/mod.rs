//! The extraction retry loop and its supporting types.
//!
//! - [`Pipeline`] - preprocessing plus the bounded extract/validate/retry loop
//! - [`PipelineResult`] - success with warnings, or the last attempt's errors
//! - [`InputError`] / [`ProviderError`] - typed failures
//! - [`ExtractionMetrics`] - attempt, token and timing metrics
//! - [`ExtractionConfig`] - retry configuration
//! - [`build_error_feedback`] - correction text sent back to providers

pub mod config;
pub mod error;
pub mod feedback;
pub mod metrics;
pub mod orchestrator;

pub use config::ExtractionConfig;
pub use error::{FailureKind, InputError, ProviderError, SchemaError};
pub use feedback::{Role, Turn, build_error_feedback, build_system_prompt, extraction_turns};
pub use metrics::ExtractionMetrics;
pub use orchestrator::{Pipeline, PipelineResult};
