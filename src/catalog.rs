//! The type catalog: a table of every struct and enum defined in the service sources.
//!
//! Rust has no runtime reflection, so the schema engine reflects over this table
//! instead. It is built once at startup from the parsed sources and is read-only
//! afterwards. Types are addressed by their simple name; the type expressions of
//! fields are kept as [`TypeRef`] trees.

use crate::error::{Error, Result};
use crate::source::SourceFile;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::fmt;
use syn::visit::Visit;

/// A reference to a type as written in source, reduced to what schema generation needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A path type; `name` is its last segment, `args` its type arguments
    Named { name: String, args: Vec<TypeRef> },
    /// `[T]` or `[T; N]`
    Slice(Box<TypeRef>),
    /// `(A, B)`; the empty tuple is the unit type
    Tuple(Vec<TypeRef>),
    /// Syntax that carries no usable shape (`impl Trait`, `dyn Trait`, fn pointers, ...)
    Opaque,
}

/// A struct or enum definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub name: String,
    /// Names of the declared type parameters, in order
    pub generics: Vec<String>,
    pub kind: TypeDefKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDefKind {
    /// Named fields in declaration order (empty for unit and multi-field tuple structs)
    Struct(Vec<FieldDef>),
    /// Serialized variant names in declaration order
    Enum(Vec<String>),
    /// Serializes as the wrapped type: one-field tuple structs and `#[serde(transparent)]`
    Newtype(TypeRef),
}

/// A named struct field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeRef,
    /// Serialized name from `#[serde(rename = "...")]` or the container's `rename_all`
    pub rename: Option<String>,
    /// Set by `#[serde(skip)]` or `#[serde(skip_serializing)]`
    pub skip: bool,
}

/// Serde attributes relevant to the serialized shape of an item, field or variant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SerdeAttributes {
    rename: Option<String>,
    rename_all: Option<RenameRule>,
    skip: bool,
    transparent: bool,
}

/// Case conversion named by `#[serde(rename_all = "...")]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

/// Lookup table of all type definitions found in the sources
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: HashMap<String, TypeDef>,
}

impl TypeRef {
    /// A plain named type without arguments
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A named type with type arguments
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args,
        }
    }

    pub fn unit() -> Self {
        TypeRef::Tuple(Vec::new())
    }

    /// Parse Rust type syntax such as `Vec<Tag>` or `Metadata<Option<User>>`
    pub fn parse(input: &str) -> Result<Self> {
        let ty: syn::Type = syn::parse_str(input).map_err(|e| Error::InvalidTypeSyntax {
            input: input.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::from_syn(&ty))
    }

    /// Reduce a `syn::Type` to a `TypeRef`
    pub fn from_syn(ty: &syn::Type) -> Self {
        match ty {
            syn::Type::Path(type_path) => Self::from_path(&type_path.path),
            syn::Type::Reference(reference) => Self::from_syn(&reference.elem),
            syn::Type::Paren(paren) => Self::from_syn(&paren.elem),
            syn::Type::Group(group) => Self::from_syn(&group.elem),
            syn::Type::Slice(slice) => TypeRef::Slice(Box::new(Self::from_syn(&slice.elem))),
            syn::Type::Array(array) => TypeRef::Slice(Box::new(Self::from_syn(&array.elem))),
            syn::Type::Tuple(tuple) => TypeRef::Tuple(tuple.elems.iter().map(Self::from_syn).collect()),
            _ => TypeRef::Opaque,
        }
    }

    fn from_path(path: &syn::Path) -> Self {
        let Some(segment) = path.segments.last() else {
            return TypeRef::Opaque;
        };

        let mut args = Vec::new();
        if let syn::PathArguments::AngleBracketed(angle) = &segment.arguments {
            for arg in &angle.args {
                if let syn::GenericArgument::Type(inner) = arg {
                    args.push(Self::from_syn(inner));
                }
            }
        }

        TypeRef::Named {
            name: segment.ident.to_string(),
            args,
        }
    }

    /// The last path segment of a named type
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeRef::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Named { args, .. } => args,
            _ => &[],
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, TypeRef::Tuple(elems) if elems.is_empty())
    }

    /// Replace type parameters (by name) with concrete arguments
    pub fn substitute(&self, params: &HashMap<&str, &TypeRef>) -> TypeRef {
        match self {
            TypeRef::Named { name, args } if args.is_empty() => match params.get(name.as_str()) {
                Some(actual) => (*actual).clone(),
                None => self.clone(),
            },
            TypeRef::Named { name, args } => TypeRef::Named {
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(params)).collect(),
            },
            TypeRef::Slice(elem) => TypeRef::Slice(Box::new(elem.substitute(params))),
            TypeRef::Tuple(elems) => TypeRef::Tuple(elems.iter().map(|e| e.substitute(params)).collect()),
            TypeRef::Opaque => TypeRef::Opaque,
        }
    }

    /// Every type name mentioned in this type, arguments included
    pub fn names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeRef::Named { name, args } => {
                out.push(name);
                args.iter().for_each(|a| a.names(out));
            }
            TypeRef::Slice(elem) => elem.names(out),
            TypeRef::Tuple(elems) => elems.iter().for_each(|e| e.names(out)),
            TypeRef::Opaque => {}
        }
    }

    /// Replace `Self` with `owner`
    pub fn replace_self(&self, owner: &TypeRef) -> TypeRef {
        match self {
            TypeRef::Named { name, args } if name == "Self" && args.is_empty() => owner.clone(),
            TypeRef::Named { name, args } => TypeRef::Named {
                name: name.clone(),
                args: args.iter().map(|a| a.replace_self(owner)).collect(),
            },
            TypeRef::Slice(elem) => TypeRef::Slice(Box::new(elem.replace_self(owner))),
            TypeRef::Tuple(elems) => TypeRef::Tuple(elems.iter().map(|e| e.replace_self(owner)).collect()),
            TypeRef::Opaque => TypeRef::Opaque,
        }
    }
}

impl RenameRule {
    fn parse(rule: &str) -> Option<Self> {
        let rule = match rule {
            "lowercase" => RenameRule::Lower,
            "UPPERCASE" => RenameRule::Upper,
            "PascalCase" => RenameRule::Pascal,
            "camelCase" => RenameRule::Camel,
            "snake_case" => RenameRule::Snake,
            "SCREAMING_SNAKE_CASE" => RenameRule::ScreamingSnake,
            "kebab-case" => RenameRule::Kebab,
            "SCREAMING-KEBAB-CASE" => RenameRule::ScreamingKebab,
            _ => return None,
        };
        Some(rule)
    }

    /// Rename a `snake_case` field name
    pub fn apply_to_field(self, field: &str) -> String {
        match self {
            RenameRule::Lower | RenameRule::Snake => field.to_string(),
            RenameRule::Upper | RenameRule::ScreamingSnake => field.to_ascii_uppercase(),
            RenameRule::Pascal => {
                let mut pascal = String::with_capacity(field.len());
                let mut capitalize = true;
                for ch in field.chars() {
                    if ch == '_' {
                        capitalize = true;
                    } else if capitalize {
                        pascal.push(ch.to_ascii_uppercase());
                        capitalize = false;
                    } else {
                        pascal.push(ch);
                    }
                }
                pascal
            }
            RenameRule::Camel => lower_first(&RenameRule::Pascal.apply_to_field(field)),
            RenameRule::Kebab => field.replace('_', "-"),
            RenameRule::ScreamingKebab => field.to_ascii_uppercase().replace('_', "-"),
        }
    }

    /// Rename a `PascalCase` variant name
    pub fn apply_to_variant(self, variant: &str) -> String {
        match self {
            RenameRule::Pascal => variant.to_string(),
            RenameRule::Lower => variant.to_ascii_lowercase(),
            RenameRule::Upper => variant.to_ascii_uppercase(),
            RenameRule::Camel => lower_first(variant),
            RenameRule::Snake => {
                let mut snake = String::with_capacity(variant.len() + 4);
                for (i, ch) in variant.chars().enumerate() {
                    if i > 0 && ch.is_uppercase() {
                        snake.push('_');
                    }
                    snake.push(ch.to_ascii_lowercase());
                }
                snake
            }
            RenameRule::ScreamingSnake => RenameRule::Snake.apply_to_variant(variant).to_ascii_uppercase(),
            RenameRule::Kebab => RenameRule::Snake.apply_to_variant(variant).replace('_', "-"),
            RenameRule::ScreamingKebab => RenameRule::ScreamingSnake.apply_to_variant(variant).replace('_', "-"),
        }
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named { name, args } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            TypeRef::Slice(elem) => write!(f, "[{}]", elem),
            TypeRef::Tuple(elems) => {
                write!(f, "(")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, ")")
            }
            TypeRef::Opaque => write!(f, "_"),
        }
    }
}

impl TypeDef {
    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeDefKind::Enum(_))
    }

    /// Struct fields; empty for enums and newtypes
    pub fn fields(&self) -> &[FieldDef] {
        match &self.kind {
            TypeDefKind::Struct(fields) => fields,
            _ => &[],
        }
    }

    /// Serialized enum variant names; empty for structs
    pub fn variants(&self) -> &[String] {
        match &self.kind {
            TypeDefKind::Enum(variants) => variants,
            _ => &[],
        }
    }

    /// The wrapped type of a newtype
    pub fn newtype_inner(&self) -> Option<&TypeRef> {
        match &self.kind {
            TypeDefKind::Newtype(inner) => Some(inner),
            _ => None,
        }
    }

    /// The type as referenced from its own body, with its parameters as arguments
    fn self_type(name: &str, generics: &[String]) -> TypeRef {
        TypeRef::generic(name, generics.iter().map(TypeRef::named).collect())
    }

    fn from_struct(item: &syn::ItemStruct) -> Self {
        let name = item.ident.to_string();
        let generics = type_params(&item.generics);
        let owner = Self::self_type(&name, &generics);
        let serde = SerdeAttributes::parse(&item.attrs);

        let kind = match &item.fields {
            syn::Fields::Named(named) => {
                let fields: Vec<FieldDef> = named
                    .named
                    .iter()
                    .filter_map(|f| FieldDef::from_syn(f, serde.rename_all, &owner))
                    .collect();
                let mut serialized = fields.iter().filter(|f| !f.skip);
                let transparent = match (serialized.next(), serialized.next()) {
                    (Some(only), None) if serde.transparent => Some(only.ty.clone()),
                    _ => None,
                };
                match transparent {
                    Some(inner) => TypeDefKind::Newtype(inner),
                    None => TypeDefKind::Struct(fields),
                }
            }
            syn::Fields::Unnamed(unnamed) => match unnamed.unnamed.first() {
                Some(only) if unnamed.unnamed.len() == 1 => {
                    TypeDefKind::Newtype(TypeRef::from_syn(&only.ty).replace_self(&owner))
                }
                _ => TypeDefKind::Struct(Vec::new()),
            },
            syn::Fields::Unit => TypeDefKind::Struct(Vec::new()),
        };

        Self { name, generics, kind }
    }

    fn from_enum(item: &syn::ItemEnum) -> Self {
        let serde = SerdeAttributes::parse(&item.attrs);
        let variants = item
            .variants
            .iter()
            .filter_map(|variant| {
                let attrs = SerdeAttributes::parse(&variant.attrs);
                if attrs.skip {
                    return None;
                }
                let name = variant.ident.to_string();
                Some(match (attrs.rename, serde.rename_all) {
                    (Some(rename), _) => rename,
                    (None, Some(rule)) => rule.apply_to_variant(&name),
                    (None, None) => name,
                })
            })
            .collect();

        Self {
            name: item.ident.to_string(),
            generics: type_params(&item.generics),
            kind: TypeDefKind::Enum(variants),
        }
    }
}

fn type_params(generics: &syn::Generics) -> Vec<String> {
    generics.type_params().map(|p| p.ident.to_string()).collect()
}

impl FieldDef {
    fn from_syn(field: &syn::Field, rename_all: Option<RenameRule>, owner: &TypeRef) -> Option<Self> {
        let name = field.ident.as_ref()?.to_string();
        let serde = SerdeAttributes::parse(&field.attrs);
        let rename = serde
            .rename
            .or_else(|| rename_all.map(|rule| rule.apply_to_field(&name)))
            .filter(|rename| *rename != name);
        Some(Self {
            ty: TypeRef::from_syn(&field.ty).replace_self(owner),
            name,
            rename,
            skip: serde.skip,
        })
    }

    /// The key this field is serialized under
    pub fn display_name(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.name)
    }
}

impl SerdeAttributes {
    fn parse(attrs: &[syn::Attribute]) -> Self {
        let mut serde = SerdeAttributes::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
            let parsed = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    if let Some(rename) = serialized_name(&meta)? {
                        serde.rename = Some(rename);
                    }
                } else if meta.path.is_ident("rename_all") {
                    if let Some(rule) = serialized_name(&meta)? {
                        serde.rename_all = RenameRule::parse(&rule);
                        if serde.rename_all.is_none() {
                            debug!("Unknown rename_all rule `{}`", rule);
                        }
                    }
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    serde.skip = true;
                } else if meta.path.is_ident("transparent") {
                    serde.transparent = true;
                } else if meta.input.peek(syn::Token![=]) {
                    let _: syn::Expr = meta.value()?.parse()?;
                } else if meta.input.peek(syn::token::Paren) {
                    let nested;
                    syn::parenthesized!(nested in meta.input);
                    nested.parse_terminated(<syn::Meta as syn::parse::Parse>::parse, syn::Token![,])?;
                }
                Ok(())
            });
            if let Err(e) = parsed {
                debug!("Ignoring unparseable serde attribute: {}", e);
            }
        }
        serde
    }
}

/// The serialize half of `key = "..."` or `key(serialize = "...", deserialize = "...")`
fn serialized_name(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<Option<String>> {
    if meta.input.peek(syn::Token![=]) {
        let lit: syn::LitStr = meta.value()?.parse()?;
        return Ok(Some(lit.value()));
    }
    let mut name = None;
    meta.parse_nested_meta(|inner| {
        let lit: syn::LitStr = inner.value()?.parse()?;
        if inner.path.is_ident("serialize") {
            name = Some(lit.value());
        }
        Ok(())
    })?;
    Ok(name)
}

/// Collects struct and enum items, descending into inline modules
struct DefinitionVisitor<'c> {
    catalog: &'c mut TypeCatalog,
}

impl<'ast> Visit<'ast> for DefinitionVisitor<'_> {
    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        self.catalog.insert(TypeDef::from_struct(node));
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        self.catalog.insert(TypeDef::from_enum(node));
    }

    // Type definitions inside function bodies are not part of the API surface
    fn visit_item_fn(&mut self, _node: &'ast syn::ItemFn) {}

    fn visit_impl_item_fn(&mut self, _node: &'ast syn::ImplItemFn) {}
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the catalog from parsed sources
    pub fn from_sources(files: &[SourceFile]) -> Self {
        let mut catalog = Self::new();
        for file in files {
            DefinitionVisitor {
                catalog: &mut catalog,
            }
            .visit_file(&file.syntax);
        }
        catalog.break_newtype_cycles();
        debug!("Type catalog holds {} definitions", catalog.len());
        catalog
    }

    // A newtype that reaches itself through newtypes would unwrap forever
    fn break_newtype_cycles(&mut self) {
        let cyclic: Vec<String> = self
            .types
            .values()
            .filter(|def| self.newtype_reaches(&def.name, def, &mut HashSet::new()))
            .map(|def| def.name.clone())
            .collect();
        for name in cyclic {
            warn!("Newtype `{}` wraps itself, documenting it as a model", name);
            if let Some(def) = self.types.get_mut(&name) {
                def.kind = TypeDefKind::Struct(Vec::new());
            }
        }
    }

    fn newtype_reaches<'a>(&'a self, target: &str, def: &'a TypeDef, seen: &mut HashSet<&'a str>) -> bool {
        let Some(inner) = def.newtype_inner() else {
            return false;
        };
        let mut names = Vec::new();
        inner.names(&mut names);
        names.into_iter().any(|name| {
            name == target
                || (seen.insert(name)
                    && self
                        .types
                        .get(name)
                        .is_some_and(|next| self.newtype_reaches(target, next, seen)))
        })
    }

    /// Register a definition; the first definition of a name wins
    pub fn insert(&mut self, def: TypeDef) {
        if self.types.contains_key(&def.name) {
            warn!("Duplicate definition of `{}` ignored", def.name);
            return;
        }
        self.types.insert(def.name.clone(), def);
    }

    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
