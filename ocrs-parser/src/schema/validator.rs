//! Structural validation of extracted records against the canonical schema.

use std::fmt;

use jsonschema::Validator;
use jsonschema::error::ValidationErrorKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ocrs_schema;
use crate::extraction::error::SchemaError;
use crate::recipe::OcrsRecipe;

/// Path reported for errors on the record itself.
const ROOT_PATH: &str = "(root)";

/// One structural violation, located by a dotted field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Dotted path to the offending field, e.g. `steps.0.stepNumber`.
    pub path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Schema error at {}: {}", self.path, self.message)
    }
}

/// Removes every `null`-valued field at every depth.
///
/// Strict structured output encodes "absent" as `null`; after stripping, an
/// explicit `null` and a missing field are indistinguishable. Array elements
/// are stripped recursively but never removed.
#[must_use]
pub fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

/// Checks extracted records against a compiled schema and yields typed recipes.
pub struct StructuralValidator {
    validator: Validator,
}

impl fmt::Debug for StructuralValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuralValidator").finish_non_exhaustive()
    }
}

impl StructuralValidator {
    /// Compiles a validator for the given JSON-schema document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the schema does not compile.
    pub fn new(schema: &Value) -> Result<Self, SchemaError> {
        let validator = Validator::new(schema).map_err(|e| SchemaError(e.to_string()))?;
        Ok(Self { validator })
    }

    /// Compiles a validator for the embedded OCRS/1.0 schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the embedded schema cannot be read.
    pub fn canonical() -> Result<Self, SchemaError> {
        Self::new(&ocrs_schema()?)
    }

    /// Strips nulls, validates, and deserializes an extracted record.
    ///
    /// Every violation found in one full pass is returned, not just the first.
    ///
    /// # Errors
    ///
    /// Returns all [`ValidationIssue`]s when the record does not conform.
    pub fn validate(&self, extracted: Value) -> Result<OcrsRecipe, Vec<ValidationIssue>> {
        let cleaned = strip_nulls(extracted);

        let issues: Vec<ValidationIssue> = self
            .validator
            .iter_errors(&cleaned)
            .map(|error| {
                let mut path = pointer_to_dotted(&error.instance_path.to_string());
                if let ValidationErrorKind::Required { property } = &error.kind {
                    if let Some(name) = property.as_str() {
                        path = join_path(&path, name);
                    }
                }
                ValidationIssue {
                    path: display_path(path),
                    message: error.to_string(),
                }
            })
            .collect();

        if !issues.is_empty() {
            return Err(issues);
        }

        serde_json::from_value(cleaned).map_err(|e| {
            vec![ValidationIssue {
                path: ROOT_PATH.to_string(),
                message: e.to_string(),
            }]
        })
    }
}

/// Converts a JSON pointer such as `/steps/0/title` into `steps.0.title`.
fn pointer_to_dotted(pointer: &str) -> String {
    pointer
        .split('/')
        .skip(1)
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}

fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

fn display_path(path: String) -> String {
    if path.is_empty() {
        ROOT_PATH.to_string()
    } else {
        path
    }
}
