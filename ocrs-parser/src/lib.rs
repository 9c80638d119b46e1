//! Validated extraction of OCRS/1.0 cheesemaking recipes from free-form text.
//!
//! Raw text is normalized and classified, handed to an [`provider::Extractor`],
//! and the returned record is checked structurally against the canonical schema
//! and semantically against domain rules. Failures are fed back to the provider
//! for a bounded number of corrective retries.

pub mod extraction;
pub mod preprocess;
pub mod provider;
pub mod recipe;
pub mod schema;
pub mod semantic;

/// Common traits and types for running the pipeline.
pub mod prelude {
    pub use crate::extraction::{
        ExtractionConfig, ExtractionMetrics, InputError, Pipeline, PipelineResult, ProviderError,
        SchemaError,
    };
    pub use crate::preprocess::{InputFormat, PreprocessedText, preprocess};
    pub use crate::provider::{ExtractedRecord, Extractor, FeedbackExtractor, TokenUsage};
    pub use crate::recipe::OcrsRecipe;
    pub use crate::schema::{SchemaNode, StrictSchema, StructuralValidator, ValidationIssue};
    pub use crate::semantic::{Rule, SemanticFinding, SemanticRuleEngine, Severity};
}
