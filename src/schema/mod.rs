//! JSON-Schema-backed typing for check expressions.
//!
//! A [`Schema`] describes the shape of the workflow input. The
//! [`SchemaProvider`] flattens it into dotted lookup names so that the
//! expression type-checker can resolve references like `input.group.id`
//! at compile time.

use crate::expr::{Type, TypeProvider};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The subset of JSON Schema understood by the type provider.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Schema {
    /// Declared type of this node. Nodes without one only type-check
    /// through their properties.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SchemaKind>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, Schema>,

    /// `additionalProperties: true` disables compile-time field checks
    /// beneath this node: every reference into it types as `any`.
    #[serde(
        rename = "additionalProperties",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<bool>,
}

impl Schema {
    /// Parse a schema from a JSON document.
    pub fn from_json(source: &str) -> Result<Schema, serde_json::Error> {
        serde_json::from_str(source)
    }
}

/// Declared JSON types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Null,
    Boolean,
    Object,
    Array,
    Number,
    Integer,
    String,
}

/// Resolves expression types by dotted name from a flattened schema.
///
/// For a schema with a `group` object holding an `id` string, registered
/// under the root `input`, the flattened map holds:
///
/// ```text
/// input          -> the root schema
/// input.group    -> the 'group' object node
/// input.group.id -> the 'id' string node
/// ```
pub struct SchemaProvider {
    types: AHashMap<String, Schema>,
}

impl SchemaProvider {
    /// Flatten `schema` under the root lookup name `root` (usually "input").
    pub fn new(root: &str, schema: &Schema) -> Self {
        let mut provider = SchemaProvider {
            types: AHashMap::new(),
        };
        provider.map_schema(root.to_string(), schema);
        provider
    }

    fn map_schema(&mut self, key: String, schema: &Schema) {
        for (child, child_schema) in &schema.properties {
            self.map_schema(format!("{key}.{child}"), child_schema);
        }
        self.types.insert(key, schema.clone());
    }
}

impl TypeProvider for SchemaProvider {
    fn find_type(&self, name: &str) -> Option<Type> {
        let schema = self.types.get(name)?;
        match schema.kind? {
            SchemaKind::Null => Some(Type::Null),
            SchemaKind::Boolean => Some(Type::Bool),
            SchemaKind::Object => {
                // child keys of an open object cannot be checked at
                // compile time, so the whole subtree becomes 'any'
                if schema.additional_properties == Some(true) {
                    Some(Type::Any)
                } else {
                    Some(Type::Object(name.to_string()))
                }
            }
            // arrays are typed as lists of strings; element access beyond
            // that is not supported by the expression language
            SchemaKind::Array => Some(Type::List(Box::new(Type::String))),
            SchemaKind::Number => Some(Type::Double),
            SchemaKind::Integer => Some(Type::Int),
            SchemaKind::String => Some(Type::String),
        }
    }
}
