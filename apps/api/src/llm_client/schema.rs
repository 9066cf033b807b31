//! Response-schema declarations sent with every structured LLM call.
//!
//! Serialises to the OpenAPI subset accepted by Gemini's `responseSchema`.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    Object,
    String,
    Integer,
    Array,
}

/// A declared JSON shape: field names, types and required-ness.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Declaration order of `properties`; the map itself is sorted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub property_ordering: Vec<String>,
}

impl Schema {
    fn leaf(kind: SchemaType, description: &str) -> Self {
        Schema {
            kind,
            description: Some(description.to_string()),
            properties: BTreeMap::new(),
            required: Vec::new(),
            items: None,
            property_ordering: Vec::new(),
        }
    }

    pub fn object() -> Self {
        Schema {
            kind: SchemaType::Object,
            description: None,
            properties: BTreeMap::new(),
            required: Vec::new(),
            items: None,
            property_ordering: Vec::new(),
        }
    }

    pub fn string(description: &str) -> Self {
        Self::leaf(SchemaType::String, description)
    }

    pub fn integer(description: &str) -> Self {
        Self::leaf(SchemaType::Integer, description)
    }

    pub fn array_of(items: Schema, description: &str) -> Self {
        Schema {
            items: Some(Box::new(items)),
            ..Self::leaf(SchemaType::Array, description)
        }
    }

    /// Adds a property that the model must always emit.
    pub fn required(mut self, name: &str, schema: Schema) -> Self {
        self.required.push(name.to_string());
        self.optional(name, schema)
    }

    pub fn optional(mut self, name: &str, schema: Schema) -> Self {
        self.property_ordering.push(name.to_string());
        self.properties.insert(name.to_string(), schema);
        self
    }
}
