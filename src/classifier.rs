//! Decides what a type *is* for documentation purposes.

use crate::catalog::{TypeCatalog, TypeDef, TypeRef};
use crate::config::TypeConventions;
use log::debug;

/// Schema tag and format of a scalar type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    pub name: String,
    pub format: Option<String>,
}

/// The shape of a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification<'a> {
    /// A scalar that is documented by its tag
    Primitive(Scalar),
    /// A scalar whose tag is in the ignore set (`string`, `object`, ...)
    Ignored(Scalar),
    /// A collection; carries the element type
    Array(&'a TypeRef),
    /// A transparent wrapper or newtype; carries the wrapped type
    Wrapper(&'a TypeRef),
    /// An enum from the catalog
    Enum(&'a TypeDef),
    /// A struct from the catalog together with its type arguments
    Model(&'a TypeDef, &'a [TypeRef]),
}

impl Scalar {
    fn new(name: &str, format: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            format: format.map(str::to_string),
        }
    }
}

/// Classifies [`TypeRef`]s against the type catalog and the configured conventions
#[derive(Debug, Clone, Copy)]
pub struct TypeClassifier<'a> {
    catalog: &'a TypeCatalog,
    conventions: &'a TypeConventions,
}

impl<'a> TypeClassifier<'a> {
    pub fn new(catalog: &'a TypeCatalog, conventions: &'a TypeConventions) -> Self {
        Self {
            catalog,
            conventions,
        }
    }

    pub fn catalog(&self) -> &'a TypeCatalog {
        self.catalog
    }

    pub fn conventions(&self) -> &'a TypeConventions {
        self.conventions
    }

    pub fn classify(&self, ty: &'a TypeRef) -> Classification<'a> {
        match ty {
            TypeRef::Named { name, args } => self.classify_named(name, args),
            TypeRef::Slice(elem) if is_byte(elem) => self.scalar("string", Some("byte")),
            TypeRef::Slice(elem) => Classification::Array(elem),
            TypeRef::Tuple(elems) if elems.is_empty() => self.scalar("void", None),
            TypeRef::Tuple(_) | TypeRef::Opaque => self.scalar("object", None),
        }
    }

    fn classify_named(&self, name: &str, args: &'a [TypeRef]) -> Classification<'a> {
        let conventions = self.conventions;

        if let Some(first) = args.first() {
            if conventions.is_wrapper(name) {
                return Classification::Wrapper(first);
            }
            if conventions.is_sequence(name) {
                if is_byte(first) {
                    return self.scalar("string", Some("byte"));
                }
                return Classification::Array(first);
            }
        }

        if conventions.is_map(name) {
            return self.scalar("object", None);
        }
        if let Some((tag, format)) = builtin_scalar(name) {
            return self.scalar(tag, format);
        }
        if let Some(mapping) = conventions.scalars.get(name) {
            return self.scalar(&mapping.schema_type, mapping.format.as_deref());
        }

        match self.catalog.get(name) {
            Some(def) if def.is_enum() => Classification::Enum(def),
            Some(def) => match def.newtype_inner() {
                Some(inner) => Classification::Wrapper(newtype_payload(def, inner, args)),
                None => Classification::Model(def, args),
            },
            None => {
                debug!("Type `{}` is not defined in the sources, documenting as object", name);
                self.scalar("object", None)
            }
        }
    }

    fn scalar(&self, tag: &str, format: Option<&str>) -> Classification<'a> {
        let scalar = Scalar::new(tag, format);
        if self.conventions.is_ignored(tag) {
            Classification::Ignored(scalar)
        } else {
            Classification::Primitive(scalar)
        }
    }

    /// Strip wrappers until a non-wrapper type is reached
    pub fn unwrap(&self, mut ty: &'a TypeRef) -> &'a TypeRef {
        while let Classification::Wrapper(inner) = self.classify(ty) {
            ty = inner;
        }
        ty
    }

    /// Whether every named type in `ty` is a known scalar, convention or catalog type
    pub fn is_known(&self, ty: &TypeRef) -> bool {
        match ty {
            TypeRef::Named { name, args } => {
                let name = name.as_str();
                if builtin_scalar(name).is_some() || self.conventions.scalars.contains_key(name) {
                    return true;
                }
                let shape_known = self.conventions.is_wrapper(name)
                    || self.conventions.is_sequence(name)
                    || self.conventions.is_map(name)
                    || self.catalog.get(name).is_some();
                shape_known && args.iter().all(|arg| self.is_known(arg))
            }
            TypeRef::Slice(elem) => self.is_known(elem),
            TypeRef::Tuple(elems) => elems.iter().all(|e| self.is_known(e)),
            TypeRef::Opaque => false,
        }
    }
}

// A newtype over a bare type parameter forwards the matching argument
fn newtype_payload<'a>(def: &TypeDef, inner: &'a TypeRef, args: &'a [TypeRef]) -> &'a TypeRef {
    let param = match inner {
        TypeRef::Named { name, args: inner_args } if inner_args.is_empty() => name,
        _ => return inner,
    };
    def.generics
        .iter()
        .position(|g| g == param)
        .and_then(|i| args.get(i))
        .unwrap_or(inner)
}

fn is_byte(ty: &TypeRef) -> bool {
    ty.name() == Some("u8")
}

/// Schema tag and format of the Rust primitives
fn builtin_scalar(name: &str) -> Option<(&'static str, Option<&'static str>)> {
    let mapping = match name {
        "String" | "str" | "char" => ("string", None),
        "bool" => ("boolean", None),
        "i8" | "i16" | "i32" | "u8" | "u16" | "u32" => ("integer", Some("int32")),
        "i64" | "i128" | "isize" | "u64" | "u128" | "usize" => ("integer", Some("int64")),
        "f32" => ("number", Some("float")),
        "f64" => ("number", Some("double")),
        _ => return None,
    };
    Some(mapping)
}
