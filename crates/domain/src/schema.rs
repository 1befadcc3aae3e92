//! Declarative description of an action's structured output.
//!
//! A [`SchemaNode`] is what an action hands over; the provider layer
//! translates it into the typed schema tree its structured-output call
//! needs.  Nodes can be built directly or parsed from a JSON Schema–like
//! map with [`SchemaNode::from_json`].

use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// Named properties in declaration order, plus the set of required names.
    Object {
        properties: Vec<(String, SchemaNode)>,
        required: BTreeSet<String>,
    },
    /// `None` element schema means an untyped array.
    Array { items: Option<Box<SchemaNode>> },
    /// Optional set of allowed values.
    String { allowed: Option<Vec<String>> },
    Number,
    Integer,
    Boolean,
}

impl Default for SchemaNode {
    fn default() -> Self {
        SchemaNode::string()
    }
}

impl SchemaNode {
    pub fn object() -> Self {
        SchemaNode::Object {
            properties: Vec::new(),
            required: BTreeSet::new(),
        }
    }

    pub fn array(items: SchemaNode) -> Self {
        SchemaNode::Array {
            items: Some(Box::new(items)),
        }
    }

    pub fn untyped_array() -> Self {
        SchemaNode::Array { items: None }
    }

    pub fn string() -> Self {
        SchemaNode::String { allowed: None }
    }

    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SchemaNode::String {
            allowed: Some(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Add an optional property.  No-op on non-object nodes.
    pub fn property(self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.push_property(name.into(), node, false)
    }

    /// Add a required property.  No-op on non-object nodes.
    pub fn required_property(self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.push_property(name.into(), node, true)
    }

    fn push_property(mut self, name: String, node: SchemaNode, required: bool) -> Self {
        if let SchemaNode::Object {
            properties,
            required: req,
        } = &mut self
        {
            if required {
                req.insert(name.clone());
            }
            match properties.iter_mut().find(|(n, _)| *n == name) {
                Some(slot) => slot.1 = node,
                None => properties.push((name, node)),
            }
        }
        self
    }

    /// Parse a loosely-typed JSON Schema–like description.
    ///
    /// Permissive on purpose: a missing or unrecognised `type` yields a string
    /// node, a non-object `items` yields an untyped array, non-string `enum`
    /// members are dropped, and a non-object node input is a plain string.
    /// Malformed input degrades instead of failing the whole call.
    pub fn from_json(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return SchemaNode::string();
        };

        match map.get("type").and_then(Value::as_str).unwrap_or("string") {
            "object" => {
                let required: BTreeSet<String> = map
                    .get("required")
                    .and_then(Value::as_array)
                    .map(|names| {
                        names
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();

                let properties = map
                    .get("properties")
                    .and_then(Value::as_object)
                    .map(|props| {
                        props
                            .iter()
                            .map(|(name, node)| (name.clone(), SchemaNode::from_json(node)))
                            .collect()
                    })
                    .unwrap_or_default();

                SchemaNode::Object {
                    properties,
                    required,
                }
            }
            "array" => SchemaNode::Array {
                items: map
                    .get("items")
                    .filter(|items| items.is_object())
                    .map(|items| Box::new(SchemaNode::from_json(items))),
            },
            "integer" => SchemaNode::Integer,
            "number" => SchemaNode::Number,
            "boolean" => SchemaNode::Boolean,
            other => {
                if other != "string" {
                    tracing::debug!(
                        schema_type = %other,
                        "unknown schema type, treating as string"
                    );
                }
                SchemaNode::String {
                    allowed: map.get("enum").and_then(Value::as_array).map(|values| {
                        values
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    }),
                }
            }
        }
    }
}
