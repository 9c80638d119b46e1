//! The canonical OCRS/1.0 schema, its strict variant, and structural validation.

pub mod node;
pub mod validator;

use serde_json::Value;

pub use node::{SchemaNode, StrictSchema};
pub use validator::{StructuralValidator, ValidationIssue, strip_nulls};

use crate::extraction::error::SchemaError;

/// The OCRS/1.0 JSON-schema document with its natural optionality.
const OCRS_SCHEMA: &str = include_str!("../../schemas/ocrs-1.0.json");

/// Returns the canonical OCRS/1.0 schema.
///
/// # Errors
///
/// Returns [`SchemaError`] if the embedded document is not valid JSON.
pub fn ocrs_schema() -> Result<Value, SchemaError> {
    serde_json::from_str(OCRS_SCHEMA).map_err(|e| SchemaError(e.to_string()))
}

/// Returns the strict variant of the canonical schema, for structured-output requests.
///
/// # Errors
///
/// Returns [`SchemaError`] if the embedded document is not valid JSON.
pub fn ocrs_strict_schema() -> Result<StrictSchema, SchemaError> {
    Ok(SchemaNode::from_value(&ocrs_schema()?).to_strict())
}
