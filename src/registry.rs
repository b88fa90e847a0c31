//! The model registry and the recursive registration walk.
//!
//! The registry is append-only: a descriptor is built completely by one
//! [`Registration`] walk and then published with an atomic insert-if-absent.
//! Concurrent walks over the same type may both build a descriptor; the first
//! to publish wins and everyone observes that one.

use crate::catalog::TypeRef;
use crate::classifier::Classification;
use crate::docs::DocumentationSource;
use crate::error::Result;
use crate::model::ModelDescriptor;
use crate::property::{DeclaringContext, PropertyExtractor};
use crate::resolver::TypeResolver;
use log::debug;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Recursion limit for nested models
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Thread-safe store of model descriptors keyed by canonical name
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: RwLock<BTreeMap<String, Arc<ModelDescriptor>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Inserts are atomic, so a panic elsewhere never leaves the map half-written
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Arc<ModelDescriptor>>> {
        self.models.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Arc<ModelDescriptor>>> {
        self.models.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<ModelDescriptor>> {
        self.read().get(name).cloned()
    }

    /// Publish a complete descriptor unless one with the same id exists.
    ///
    /// Returns the descriptor held by the registry afterwards.
    pub fn insert_if_absent(&self, model: ModelDescriptor) -> Arc<ModelDescriptor> {
        let mut models = self.write();
        models
            .entry(model.id.clone())
            .or_insert_with(|| Arc::new(model))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Copy of all models, ordered by name
    pub fn snapshot(&self) -> BTreeMap<String, ModelDescriptor> {
        self.read()
            .iter()
            .map(|(name, model)| (name.clone(), model.as_ref().clone()))
            .collect()
    }
}

/// One registration walk over a type graph
pub struct Registration<'a> {
    resolver: TypeResolver<'a>,
    docs: &'a dyn DocumentationSource,
    registry: &'a ModelRegistry,
    max_depth: usize,
    /// Models being built higher up in this walk
    in_progress: HashSet<String>,
}

impl<'a> Registration<'a> {
    pub fn new(
        resolver: TypeResolver<'a>,
        docs: &'a dyn DocumentationSource,
        registry: &'a ModelRegistry,
        max_depth: usize,
    ) -> Self {
        Self {
            resolver,
            docs,
            registry,
            max_depth,
            in_progress: HashSet::new(),
        }
    }

    /// Register `ty` and every model reachable from it
    pub fn register(&mut self, ty: &TypeRef, depth: usize) -> Result<()> {
        let effective = self.resolver.payload(ty);
        let name = self.resolver.canonical_name(effective);
        if self.registry.contains(&name) || self.in_progress.contains(&name) {
            return Ok(());
        }

        match self.resolver.classifier().classify(effective) {
            Classification::Enum(def) => {
                debug!("Registering enum model {}", name);
                let mut model = ModelDescriptor::new(name);
                model.description = self.docs.type_summary(def);
                model.enum_values = Some(def.variants().to_vec());
                self.registry.insert_if_absent(model);
                Ok(())
            }
            Classification::Model(def, args) => {
                debug!("Registering model {} at depth {}", name, depth);
                let context = DeclaringContext {
                    def,
                    args,
                    envelope: self.resolver.envelope(def),
                };
                self.in_progress.insert(name.clone());
                let built = self.build_model(&name, &context, depth);
                self.in_progress.remove(&name);
                self.registry.insert_if_absent(built?);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn build_model(&mut self, name: &str, context: &DeclaringContext<'_>, depth: usize) -> Result<ModelDescriptor> {
        let mut model = ModelDescriptor::new(name);
        model.description = self.docs.type_summary(context.def);

        let extractor = PropertyExtractor::new(self.resolver, self.docs);
        for field in context.def.fields().iter().filter(|f| !f.skip) {
            let property = extractor.extract(field, context)?;
            if !model
                .properties
                .insert_if_absent(property.name.clone(), property.descriptor)
            {
                debug!("Dropping duplicate property {} of {}", property.name, name);
            }
            if property.schema.needs_registration() && depth < self.max_depth {
                self.register(&property.ty, depth + 1)?;
            }
        }
        Ok(model)
    }
}
