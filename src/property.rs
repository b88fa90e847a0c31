use crate::catalog::{FieldDef, TypeDef, TypeRef};
use crate::config::EnvelopeConvention;
use crate::docs::DocumentationSource;
use crate::error::{Error, Result};
use crate::model::{PropertyDescriptor, SchemaType};
use crate::resolver::TypeResolver;
use log::debug;
use std::collections::HashMap;

/// The model a field is being extracted for
#[derive(Debug, Clone, Copy)]
pub struct DeclaringContext<'a> {
    pub def: &'a TypeDef,
    /// Actual type arguments of the declaring type
    pub args: &'a [TypeRef],
    /// Set when the declaring type is an envelope
    pub envelope: Option<&'a EnvelopeConvention>,
}

/// A field turned into a model property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedProperty {
    /// Key of the property in the model
    pub name: String,
    pub descriptor: PropertyDescriptor,
    /// The field type after envelope and generic substitution
    pub ty: TypeRef,
    pub schema: SchemaType,
}

/// Turns struct fields into property descriptors
pub struct PropertyExtractor<'a> {
    resolver: TypeResolver<'a>,
    docs: &'a dyn DocumentationSource,
}

impl<'a> PropertyExtractor<'a> {
    pub fn new(resolver: TypeResolver<'a>, docs: &'a dyn DocumentationSource) -> Self {
        Self { resolver, docs }
    }

    pub fn extract(&self, field: &FieldDef, context: &DeclaringContext<'_>) -> Result<ExtractedProperty> {
        let ty = self.field_type(field, context)?;
        let schema = self.resolver.resolve(&ty);
        let conventions = self.resolver.conventions();

        let mut descriptor = PropertyDescriptor::for_schema(&schema);
        descriptor.required = match ty.name() {
            Some(name) if conventions.is_optional_wrapper(name) => false,
            _ => self.docs.is_required(context.def, field),
        };
        if !conventions.is_ignored(schema.name()) {
            descriptor.description = self.docs.field_summary(context.def, field);
        }
        descriptor.enum_values = self.resolver.enum_values(&ty);

        debug!(
            "Property {}.{} -> {}",
            context.def.name,
            field.display_name(),
            schema.name()
        );

        Ok(ExtractedProperty {
            name: field.display_name().to_string(),
            descriptor,
            ty,
            schema,
        })
    }

    fn field_type(&self, field: &FieldDef, context: &DeclaringContext<'_>) -> Result<TypeRef> {
        let params: HashMap<&str, &TypeRef> = context
            .def
            .generics
            .iter()
            .map(String::as_str)
            .zip(context.args.iter())
            .collect();
        let declared = field.ty.substitute(&params);

        let Some(envelope) = context.envelope else {
            return Ok(declared);
        };
        if let Some(input) = envelope.field_types.get(&field.name) {
            let ty = TypeRef::parse(input)?;
            if !self.resolver.classifier().is_known(&ty) {
                return Err(Error::UnresolvedType { input: input.clone() });
            }
            return Ok(ty);
        }
        // A content field declared without the type parameter still carries the payload
        if field.name == envelope.content_field && declared == field.ty {
            if let Some(payload) = context.args.first() {
                return Ok(payload.clone());
            }
        }
        Ok(declared)
    }
}
