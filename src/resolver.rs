//! Type to schema resolution.
//!
//! [`TypeResolver::resolve`] maps any [`TypeRef`] to a [`SchemaType`] and
//! [`TypeResolver::canonical_name`] computes the registry key of a type. Both
//! are pure: nothing is registered here, the caller decides whether a resolved
//! reference needs a model.

use crate::catalog::{TypeCatalog, TypeDef, TypeRef};
use crate::classifier::{Classification, TypeClassifier};
use crate::config::{EnvelopeConvention, TypeConventions};
use crate::model::{ItemRef, SchemaType};

/// Resolves types to schema types and canonical names
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'a> {
    classifier: TypeClassifier<'a>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(catalog: &'a TypeCatalog, conventions: &'a TypeConventions) -> Self {
        Self {
            classifier: TypeClassifier::new(catalog, conventions),
        }
    }

    pub fn classifier(&self) -> &TypeClassifier<'a> {
        &self.classifier
    }

    pub fn conventions(&self) -> &'a TypeConventions {
        self.classifier.conventions()
    }

    /// Resolve a type to its schema type
    pub fn resolve(&self, ty: &'a TypeRef) -> SchemaType {
        match self.classifier.classify(ty) {
            Classification::Wrapper(inner) => self.resolve(inner),
            Classification::Array(elem) => SchemaType::array(self.item_ref(elem)),
            Classification::Primitive(scalar) | Classification::Ignored(scalar) => {
                SchemaType::primitive(scalar.name, scalar.format)
            }
            Classification::Enum(_) | Classification::Model(..) => {
                SchemaType::reference(self.canonical_name(ty))
            }
        }
    }

    fn item_ref(&self, elem: &'a TypeRef) -> ItemRef {
        let name = self.canonical_name(elem);
        match self.classifier.classify(self.payload(elem)) {
            Classification::Enum(_) | Classification::Model(..) => ItemRef::model(name),
            _ => ItemRef::primitive(name),
        }
    }

    /// The registry key of a type.
    ///
    /// Wrappers, collections and generic non-envelope models are named after
    /// their (first) type argument; envelopes are named `envelope<payload>` so
    /// each payload type gets its own model.
    pub fn canonical_name(&self, ty: &'a TypeRef) -> String {
        match self.classifier.classify(ty) {
            Classification::Wrapper(inner) | Classification::Array(inner) => self.canonical_name(inner),
            Classification::Primitive(scalar) | Classification::Ignored(scalar) => scalar.name,
            Classification::Enum(def) => def.name.to_lowercase(),
            Classification::Model(def, args) => match args.first() {
                Some(payload) if self.envelope(def).is_some() => {
                    format!("{}<{}>", def.name.to_lowercase(), self.envelope_payload_name(payload))
                }
                Some(payload) => self.canonical_name(payload),
                None => def.name.to_lowercase(),
            },
        }
    }

    fn envelope_payload_name(&self, payload: &'a TypeRef) -> String {
        let payload = self.classifier.unwrap(payload);
        match self.classifier.classify(payload) {
            Classification::Array(elem) => format!("array<{}>", self.canonical_name(elem)),
            _ => self.canonical_name(payload),
        }
    }

    /// The type whose model documents `ty`: wrappers, collections and generic
    /// non-envelope models are peeled off until an envelope or a plain type remains.
    pub fn payload(&self, mut ty: &'a TypeRef) -> &'a TypeRef {
        loop {
            ty = match self.classifier.classify(ty) {
                Classification::Wrapper(inner) | Classification::Array(inner) => inner,
                Classification::Model(def, [first, ..]) if self.envelope(def).is_none() => first,
                _ => return ty,
            };
        }
    }

    /// Envelope conventions for a model definition, if it is an envelope
    pub fn envelope(&self, def: &TypeDef) -> Option<&'a EnvelopeConvention> {
        self.conventions().envelope(&def.name)
    }

    /// Enum member names when `ty` (after unwrapping) is an enum
    pub fn enum_values(&self, ty: &'a TypeRef) -> Option<Vec<String>> {
        match self.classifier.classify(self.classifier.unwrap(ty)) {
            Classification::Enum(def) => Some(def.variants().to_vec()),
            _ => None,
        }
    }
}
