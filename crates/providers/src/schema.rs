//! Schema translation.
//!
//! Turns an action's declarative [`SchemaNode`] into the typed tree a
//! structured-output call carries, and renders that tree as JSON Schema for
//! wire adapters.  Pure and recursive; no I/O.

use aa_domain::schema::SchemaNode;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaType {
    /// Properties keep declaration order.
    Object(Vec<(String, TypedSchema)>),
    /// `None` means any element type.
    Array(Option<Box<TypedSchema>>),
    String { allowed: Option<Vec<String>> },
    Number,
    Integer,
    Boolean,
}

/// A node of the typed schema tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedSchema {
    kind: SchemaType,
    required: bool,
}

impl TypedSchema {
    fn leaf(kind: SchemaType) -> Self {
        Self {
            kind,
            required: false,
        }
    }

    pub fn object(properties: Vec<(String, TypedSchema)>) -> Self {
        Self::leaf(SchemaType::Object(properties))
    }

    pub fn array() -> Self {
        Self::leaf(SchemaType::Array(None))
    }

    pub fn string() -> Self {
        Self::leaf(SchemaType::String { allowed: None })
    }

    pub fn number() -> Self {
        Self::leaf(SchemaType::Number)
    }

    pub fn integer() -> Self {
        Self::leaf(SchemaType::Integer)
    }

    pub fn boolean() -> Self {
        Self::leaf(SchemaType::Boolean)
    }

    /// Set the element type.  No-op on non-array nodes.
    pub fn items(mut self, element: TypedSchema) -> Self {
        if let SchemaType::Array(items) = &mut self.kind {
            *items = Some(Box::new(element));
        }
        self
    }

    /// Restrict a string node to the given values.  No-op on other nodes.
    pub fn allowed(mut self, values: Vec<String>) -> Self {
        if let SchemaType::String { allowed } = &mut self.kind {
            *allowed = Some(values);
        }
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn kind(&self) -> &SchemaType {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Look up a direct property of an object node.
    pub fn property(&self, name: &str) -> Option<&TypedSchema> {
        match &self.kind {
            SchemaType::Object(props) => props.iter().find(|(n, _)| n == name).map(|(_, s)| s),
            _ => None,
        }
    }

    /// Render as a JSON Schema document.
    pub fn to_json_schema(&self) -> Value {
        match &self.kind {
            SchemaType::Object(props) => {
                let mut properties = Map::new();
                let mut required = Vec::new();
                for (name, schema) in props {
                    if schema.required {
                        required.push(Value::String(name.clone()));
                    }
                    properties.insert(name.clone(), schema.to_json_schema());
                }
                json!({
                    "type": "object",
                    "properties": properties,
                    "required": required,
                    "additionalProperties": false,
                })
            }
            SchemaType::Array(items) => match items {
                Some(element) => json!({"type": "array", "items": element.to_json_schema()}),
                None => json!({"type": "array"}),
            },
            SchemaType::String { allowed } => match allowed {
                Some(values) => json!({"type": "string", "enum": values}),
                None => json!({"type": "string"}),
            },
            SchemaType::Number => json!({"type": "number"}),
            SchemaType::Integer => json!({"type": "integer"}),
            SchemaType::Boolean => json!({"type": "boolean"}),
        }
    }
}

/// Translate a declarative schema into the typed tree.
pub fn translate(node: &SchemaNode) -> TypedSchema {
    match node {
        SchemaNode::Object {
            properties,
            required,
        } => TypedSchema::object(
            properties
                .iter()
                .map(|(name, child)| {
                    let prop = translate(child);
                    let prop = if required.contains(name) {
                        prop.required()
                    } else {
                        prop
                    };
                    (name.clone(), prop)
                })
                .collect(),
        ),
        SchemaNode::Array { items } => match items {
            Some(element) => TypedSchema::array().items(translate(element)),
            None => TypedSchema::array(),
        },
        SchemaNode::Number => TypedSchema::number(),
        SchemaNode::Integer => TypedSchema::integer(),
        SchemaNode::Boolean => TypedSchema::boolean(),
        SchemaNode::String { allowed } => match allowed {
            Some(values) => TypedSchema::string().allowed(values.clone()),
            None => TypedSchema::string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_set_marks_only_named_properties() {
        let node = SchemaNode::object()
            .required_property("a", SchemaNode::string())
            .property("b", SchemaNode::Integer);
        let tree = translate(&node);

        let a = tree.property("a").unwrap();
        let b = tree.property("b").unwrap();
        assert!(a.is_required());
        assert!(!b.is_required());
        assert_eq!(a.kind(), &SchemaType::String { allowed: None });
        assert_eq!(b.kind(), &SchemaType::Integer);
    }

    #[test]
    fn properties_keep_declaration_order() {
        let node = SchemaNode::object()
            .property("zeta", SchemaNode::Boolean)
            .property("alpha", SchemaNode::Number);
        let SchemaType::Object(props) = translate(&node).kind().clone() else {
            panic!("expected object");
        };
        let names: Vec<_> = props.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha"]);
    }

    #[test]
    fn array_without_items_is_untyped() {
        assert_eq!(translate(&SchemaNode::untyped_array()), TypedSchema::array());
    }

    #[test]
    fn nested_array_of_enums() {
        let tree = translate(&SchemaNode::array(SchemaNode::enumeration(["low", "high"])));
        assert_eq!(
            tree.to_json_schema(),
            json!({"type": "array", "items": {"type": "string", "enum": ["low", "high"]}})
        );
    }

    #[test]
    fn object_renders_required_list() {
        let node = SchemaNode::object()
            .required_property("title", SchemaNode::string())
            .property("score", SchemaNode::Number);
        assert_eq!(
            translate(&node).to_json_schema(),
            json!({
                "type": "object",
                "properties": {
                    "title": {"type": "string"},
                    "score": {"type": "number"}
                },
                "required": ["title"],
                "additionalProperties": false,
            })
        );
    }
}
