//! Recursive schema model and the strict structured-output transform.

use serde_json::{Map, Value, json};

/// A recursive description of an expected output shape.
///
/// Parsed from a JSON-schema document. Only the object/array skeleton is
/// modelled; every other node (scalars, enums, `anyOf` unions) is kept verbatim
/// as a [`SchemaNode::Primitive`].
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// `type: "object"` with `properties`.
    Object {
        /// Properties in declaration order.
        properties: Vec<(String, SchemaNode)>,
        /// Names of properties that must be present.
        required: Vec<String>,
        /// Free-text description, preserved verbatim.
        description: Option<String>,
    },
    /// `type: "array"` with `items`.
    Array {
        /// Schema for every element.
        items: Box<SchemaNode>,
        /// Free-text description, preserved verbatim.
        description: Option<String>,
    },
    /// Any other schema fragment.
    Primitive(Value),
}

impl SchemaNode {
    /// Parses a JSON-schema document into a node tree.
    ///
    /// Parsing is total: anything that is not a recognizable object or array
    /// schema becomes a primitive.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::Primitive(value.clone());
        };

        let description = map
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string);

        match (map.get("type").and_then(Value::as_str), map.get("properties"), map.get("items")) {
            (Some("object"), Some(Value::Object(props)), _) => {
                let properties = props
                    .iter()
                    .map(|(key, prop)| (key.clone(), Self::from_value(prop)))
                    .collect();
                let required = map
                    .get("required")
                    .and_then(Value::as_array)
                    .map(|keys| {
                        keys.iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                Self::Object {
                    properties,
                    required,
                    description,
                }
            }
            (Some("array"), _, Some(items)) => Self::Array {
                items: Box::new(Self::from_value(items)),
                description,
            },
            _ => Self::Primitive(value.clone()),
        }
    }

    /// Renders the node back into a JSON-schema document.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Object {
                properties,
                required,
                description,
            } => {
                let props: Map<String, Value> = properties
                    .iter()
                    .map(|(key, prop)| (key.clone(), prop.to_value()))
                    .collect();
                let mut out = Map::new();
                out.insert("type".into(), json!("object"));
                out.insert("properties".into(), Value::Object(props));
                out.insert("required".into(), json!(required));
                insert_description(&mut out, description.as_deref());
                Value::Object(out)
            }
            Self::Array { items, description } => {
                let mut out = Map::new();
                out.insert("type".into(), json!("array"));
                out.insert("items".into(), items.to_value());
                insert_description(&mut out, description.as_deref());
                Value::Object(out)
            }
            Self::Primitive(value) => value.clone(),
        }
    }

    /// Whether `key` is listed as required on this object node.
    #[must_use]
    pub fn is_required(&self, key: &str) -> bool {
        matches!(self, Self::Object { required, .. } if required.iter().any(|k| k == key))
    }

    /// Builds the strict variant of this schema.
    ///
    /// Every object lists all of its properties as required and forbids
    /// additional ones. Properties that were optional accept either their
    /// schema or `null`. Primitives lose their `propertyOrdering` hint.
    ///
    /// # Examples
    ///
    /// ```
    /// use ocrs_parser::schema::SchemaNode;
    /// use serde_json::json;
    ///
    /// let node = SchemaNode::from_value(&json!({
    ///     "type": "object",
    ///     "properties": { "name": { "type": "string" }, "origin": { "type": "string" } },
    ///     "required": ["name"]
    /// }));
    /// let strict = node.to_strict();
    ///
    /// assert_eq!(strict.as_value()["required"], json!(["name", "origin"]));
    /// assert_eq!(strict.as_value()["additionalProperties"], json!(false));
    /// ```
    #[must_use]
    pub fn to_strict(&self) -> StrictSchema {
        StrictSchema(strict_value(self))
    }
}

fn insert_description(out: &mut Map<String, Value>, description: Option<&str>) {
    if let Some(text) = description {
        out.insert("description".into(), json!(text));
    }
}

fn strict_value(node: &SchemaNode) -> Value {
    match node {
        SchemaNode::Object {
            properties,
            required,
            description,
        } => {
            let mut props = Map::new();
            for (key, prop) in properties {
                let strict = strict_value(prop);
                let value = if required.iter().any(|k| k == key) {
                    strict
                } else {
                    json!({ "anyOf": [strict, { "type": "null" }] })
                };
                props.insert(key.clone(), value);
            }
            let all_keys: Vec<&str> = properties.iter().map(|(key, _)| key.as_str()).collect();

            let mut out = Map::new();
            out.insert("type".into(), json!("object"));
            out.insert("properties".into(), Value::Object(props));
            out.insert("required".into(), json!(all_keys));
            out.insert("additionalProperties".into(), json!(false));
            insert_description(&mut out, description.as_deref());
            Value::Object(out)
        }
        SchemaNode::Array { items, description } => {
            let mut out = Map::new();
            out.insert("type".into(), json!("array"));
            out.insert("items".into(), strict_value(items));
            insert_description(&mut out, description.as_deref());
            Value::Object(out)
        }
        SchemaNode::Primitive(Value::Object(map)) => {
            let mut map = map.clone();
            map.remove("propertyOrdering");
            Value::Object(map)
        }
        SchemaNode::Primitive(value) => value.clone(),
    }
}

/// A schema in which every property is required and no extra properties are allowed.
///
/// Optionality is encoded as a nullable union instead. Built once from a
/// [`SchemaNode`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct StrictSchema(Value);

impl StrictSchema {
    /// The strict JSON-schema document.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the schema, returning the JSON-schema document.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Re-reads the strict document as a node tree.
    #[must_use]
    pub fn to_node(&self) -> SchemaNode {
        SchemaNode::from_value(&self.0)
    }
}
