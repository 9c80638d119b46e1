//! Rig-backed extraction provider for the OCRS recipe parser.
//!
//! [`RigExtractor`] adapts any rig [`rig::completion::CompletionModel`] to the
//! parser's `Extractor` and `FeedbackExtractor` capabilities.

pub mod config;
pub mod errors;
pub mod rig_extractor;

pub use config::ProviderConfig;
pub use rig_extractor::RigExtractor;
