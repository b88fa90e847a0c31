use crate::catalog::{TypeCatalog, TypeRef};
use crate::config::GeneratorConfig;
use crate::docs::DocumentationSource;
use crate::error::{Error, Result};
use crate::model::{ModelDescriptor, SchemaType};
use crate::registry::{ModelRegistry, Registration};
use crate::resolver::TypeResolver;
use log::debug;
use std::collections::BTreeMap;

/// Schema builder - resolves operation types and collects the models they reach.
///
/// Owns its registry, so separate builders never share models. The builder is
/// `Send + Sync`; several threads may document operations at the same time.
pub struct SchemaBuilder {
    catalog: TypeCatalog,
    config: GeneratorConfig,
    docs: Box<dyn DocumentationSource>,
    registry: ModelRegistry,
}

impl SchemaBuilder {
    pub fn new(catalog: TypeCatalog, config: GeneratorConfig, docs: Box<dyn DocumentationSource>) -> Self {
        debug!("Initializing SchemaBuilder over {} type definitions", catalog.len());
        Self {
            catalog,
            config,
            docs,
            registry: ModelRegistry::new(),
        }
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn resolver(&self) -> TypeResolver<'_> {
        TypeResolver::new(&self.catalog, &self.config.conventions)
    }

    /// Schema of an operation's return type; `None` means no response body
    pub fn response_type(&self, ty: Option<&TypeRef>) -> Result<SchemaType> {
        match ty {
            Some(ty) => self.schema_for(ty),
            None => Ok(SchemaType::void()),
        }
    }

    /// Schema of a return type given as Rust type syntax, e.g. `Metadata<Vec<Tag>>`.
    ///
    /// Fails when the text does not parse or names a type that is not known.
    pub fn response_type_override(&self, input: &str) -> Result<SchemaType> {
        let ty = TypeRef::parse(input)?;
        if !self.resolver().classifier().is_known(&ty) {
            return Err(Error::UnresolvedType {
                input: input.to_string(),
            });
        }
        self.schema_for(&ty)
    }

    /// Schema of a parameter type
    pub fn parameter_type(&self, ty: &TypeRef) -> Result<SchemaType> {
        self.schema_for(ty)
    }

    /// Member names when `ty` is (a wrapped) enum
    pub fn enum_values(&self, ty: &TypeRef) -> Option<Vec<String>> {
        self.resolver().enum_values(ty)
    }

    fn schema_for(&self, ty: &TypeRef) -> Result<SchemaType> {
        let resolver = self.resolver();
        let schema = resolver.resolve(ty);
        if schema.needs_registration() {
            Registration::new(resolver, &*self.docs, &self.registry, self.config.max_depth)
                .register(ty, 0)?;
        }
        Ok(schema)
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// All models registered so far, ordered by name
    pub fn models(&self) -> BTreeMap<String, ModelDescriptor> {
        self.registry.snapshot()
    }
}
