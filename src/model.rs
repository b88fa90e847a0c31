//! Schema descriptors produced by the engine.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Kind of a [`SchemaType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Primitive,
    Array,
    Reference,
}

/// The resolved schema of a type: a primitive tag, an array of items, or a
/// reference to a registered model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaType {
    Primitive { name: String, format: Option<String> },
    Reference { name: String },
    Array { item: ItemRef },
}

/// Element of an array schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    /// Canonical name of the element type
    pub name: String,
    /// Whether the element is a primitive rather than a model
    pub primitive: bool,
}

impl SchemaType {
    pub fn primitive(name: impl Into<String>, format: Option<String>) -> Self {
        SchemaType::Primitive {
            name: name.into(),
            format,
        }
    }

    pub fn reference(name: impl Into<String>) -> Self {
        SchemaType::Reference { name: name.into() }
    }

    pub fn array(item: ItemRef) -> Self {
        SchemaType::Array { item }
    }

    /// Schema of an operation without a response body
    pub fn void() -> Self {
        Self::primitive("void", None)
    }

    pub fn kind(&self) -> SchemaKind {
        match self {
            SchemaType::Primitive { .. } => SchemaKind::Primitive,
            SchemaType::Reference { .. } => SchemaKind::Reference,
            SchemaType::Array { .. } => SchemaKind::Array,
        }
    }

    /// The type tag: the primitive name, the model name, or `array`
    pub fn name(&self) -> &str {
        match self {
            SchemaType::Primitive { name, .. } | SchemaType::Reference { name } => name,
            SchemaType::Array { .. } => "array",
        }
    }

    pub fn format(&self) -> Option<&str> {
        match self {
            SchemaType::Primitive { format, .. } => format.as_deref(),
            _ => None,
        }
    }

    pub fn items(&self) -> Option<&ItemRef> {
        match self {
            SchemaType::Array { item } => Some(item),
            _ => None,
        }
    }

    /// Canonical name of the array element, set only for arrays
    pub fn item_ref(&self) -> Option<&str> {
        self.items().map(|item| item.name.as_str())
    }

    pub fn is_array(&self) -> bool {
        matches!(self, SchemaType::Array { .. })
    }

    /// Whether the schema points at a model that has to be registered
    pub fn needs_registration(&self) -> bool {
        match self {
            SchemaType::Reference { .. } => true,
            SchemaType::Array { item } => !item.primitive,
            SchemaType::Primitive { .. } => false,
        }
    }
}

impl ItemRef {
    pub fn model(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primitive: false,
        }
    }

    pub fn primitive(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primitive: true,
        }
    }
}

impl Serialize for ItemRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        if self.primitive {
            map.serialize_entry("type", &self.name)?;
        } else {
            map.serialize_entry("$ref", &self.name)?;
        }
        map.end()
    }
}

/// One field of a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyDescriptor {
    #[serde(rename = "type")]
    pub property_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemRef>,
}

impl PropertyDescriptor {
    /// A descriptor carrying the shape of `schema`
    pub fn for_schema(schema: &SchemaType) -> Self {
        Self {
            property_type: schema.name().to_string(),
            format: schema.format().map(str::to_string),
            description: None,
            required: false,
            enum_values: None,
            items: schema.items().cloned(),
        }
    }

    pub fn item_ref(&self) -> Option<&str> {
        self.items.as_ref().map(|item| item.name.as_str())
    }
}

/// Model properties keyed by display name, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(String, PropertyDescriptor)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the name is already present; returns whether it was inserted
    pub fn insert_if_absent(&mut self, name: String, property: PropertyDescriptor) -> bool {
        if self.contains(&name) {
            return false;
        }
        self.entries.push((name, property));
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == name)
    }

    pub fn get(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.entries.iter().find(|(key, _)| key == name).map(|(_, p)| p)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyDescriptor)> {
        self.entries.iter().map(|(key, p)| (key.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, property) in &self.entries {
            map.serialize_entry(key, property)?;
        }
        map.end()
    }
}

/// Full structural description of one model type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelDescriptor {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
    /// Member names, set only for enums
    #[serde(rename = "values", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl ModelDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: None,
            properties: Properties::new(),
            enum_values: None,
        }
    }
}
