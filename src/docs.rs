//! Documentation lookups for types, fields and handlers.
//!
//! The schema engine only sees the [`DocumentationSource`] trait. The default
//! implementation, [`DocComments`], indexes the `///` comments of the service
//! sources. A doc block is split into a summary (its first paragraph), remarks
//! (the remaining paragraphs) and `@tag value` lines:
//!
//! ```text
//! /// Get a tag by id
//! ///
//! /// Looks the tag up in the primary store.
//! ///
//! /// @param id The tag id
//! /// @response 404 Tag not found
//! /// @returns Metadata<Tag>
//! ```
//!
//! On a field, `@required` marks it as required.

use crate::catalog::{FieldDef, TypeDef};
use crate::source::SourceFile;
use log::debug;
use std::collections::HashMap;
use syn::visit::Visit;

/// Read-only documentation lookups used while building models.
///
/// Implementations must be cheap and side-effect free; they are called while
/// walking type graphs, possibly from several threads at once.
pub trait DocumentationSource: Send + Sync {
    /// Summary of a type definition
    fn type_summary(&self, ty: &TypeDef) -> Option<String>;

    /// Summary of a field of `owner`
    fn field_summary(&self, owner: &TypeDef, field: &FieldDef) -> Option<String>;

    /// Whether the documentation marks the field as required
    fn is_required(&self, owner: &TypeDef, field: &FieldDef) -> bool;
}

/// A documentation source with no entries
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDocumentation;

impl DocumentationSource for NoDocumentation {
    fn type_summary(&self, _ty: &TypeDef) -> Option<String> {
        None
    }

    fn field_summary(&self, _owner: &TypeDef, _field: &FieldDef) -> Option<String> {
        None
    }

    fn is_required(&self, _owner: &TypeDef, _field: &FieldDef) -> bool {
        false
    }
}

/// A `@name value` line of a doc block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTag {
    pub name: String,
    pub value: String,
}

/// A parsed doc comment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocBlock {
    pub summary: Option<String>,
    pub remarks: Option<String>,
    pub tags: Vec<DocTag>,
}

impl DocBlock {
    /// Parse the `#[doc = "..."]` attributes of an item
    pub fn from_attrs(attrs: &[syn::Attribute]) -> Self {
        let lines: Vec<String> = attrs
            .iter()
            .filter(|attr| attr.path().is_ident("doc"))
            .filter_map(|attr| match &attr.meta {
                syn::Meta::NameValue(nv) => match &nv.value {
                    syn::Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Str(s), ..
                    }) => Some(s.value()),
                    _ => None,
                },
                _ => None,
            })
            .collect();
        Self::parse(&lines.join("\n"))
    }

    /// Parse raw doc text
    pub fn parse(text: &str) -> Self {
        let mut block = DocBlock::default();
        let mut paragraphs: Vec<String> = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in text.lines().map(str::trim) {
            if let Some(tag) = line.strip_prefix('@') {
                let (name, value) = tag.split_once(char::is_whitespace).unwrap_or((tag, ""));
                block.tags.push(DocTag {
                    name: name.to_string(),
                    value: value.trim().to_string(),
                });
            } else if line.is_empty() {
                if !current.is_empty() {
                    paragraphs.push(current.join(" "));
                    current.clear();
                }
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            paragraphs.push(current.join(" "));
        }

        let mut paragraphs = paragraphs.into_iter();
        block.summary = paragraphs.next();
        let remarks: Vec<String> = paragraphs.collect();
        if !remarks.is_empty() {
            block.remarks = Some(remarks.join("\n\n"));
        }
        block
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.remarks.is_none() && self.tags.is_empty()
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }

    /// Values of every tag with the given name, in order
    pub fn tag_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tags.iter().filter(move |t| t.name == name).map(|t| t.value.as_str())
    }

    /// Value of the first tag with the given name
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.iter().find(|t| t.name == name).map(|t| t.value.as_str())
    }
}

/// Doc comments of the type definitions in the service sources
#[derive(Debug, Clone, Default)]
pub struct DocComments {
    types: HashMap<String, DocBlock>,
    /// Keyed by `Type.field`
    fields: HashMap<String, DocBlock>,
}

struct DocVisitor<'d> {
    docs: &'d mut DocComments,
}

impl<'ast> Visit<'ast> for DocVisitor<'_> {
    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        let type_name = node.ident.to_string();
        for field in &node.fields {
            if let Some(ident) = &field.ident {
                let block = DocBlock::from_attrs(&field.attrs);
                self.docs.insert_field(&type_name, &ident.to_string(), block);
            }
        }
        self.docs.insert_type(&type_name, DocBlock::from_attrs(&node.attrs));
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        self.docs
            .insert_type(&node.ident.to_string(), DocBlock::from_attrs(&node.attrs));
    }

    // Same scope as the type catalog: items inside function bodies are skipped
    fn visit_item_fn(&mut self, _node: &'ast syn::ItemFn) {}

    fn visit_impl_item_fn(&mut self, _node: &'ast syn::ImplItemFn) {}
}

impl DocComments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the doc comments of every struct and enum in the sources
    pub fn from_sources(files: &[SourceFile]) -> Self {
        let mut docs = Self::new();
        for file in files {
            DocVisitor { docs: &mut docs }.visit_file(&file.syntax);
        }
        debug!(
            "Indexed documentation for {} types and {} fields",
            docs.types.len(),
            docs.fields.len()
        );
        docs
    }

    /// Add a type entry; the first entry for a name is kept
    pub fn insert_type(&mut self, type_name: &str, block: DocBlock) {
        if !block.is_empty() {
            self.types.entry(type_name.to_string()).or_insert(block);
        }
    }

    /// Add a field entry; the first entry for a field is kept
    pub fn insert_field(&mut self, type_name: &str, field_name: &str, block: DocBlock) {
        if !block.is_empty() {
            self.fields
                .entry(format!("{}.{}", type_name, field_name))
                .or_insert(block);
        }
    }

    fn field(&self, owner: &TypeDef, field: &FieldDef) -> Option<&DocBlock> {
        self.fields.get(&format!("{}.{}", owner.name, field.name))
    }
}

impl DocumentationSource for DocComments {
    fn type_summary(&self, ty: &TypeDef) -> Option<String> {
        self.types.get(&ty.name).and_then(|b| b.summary.clone())
    }

    fn field_summary(&self, owner: &TypeDef, field: &FieldDef) -> Option<String> {
        self.field(owner, field).and_then(|b| b.summary.clone())
    }

    fn is_required(&self, owner: &TypeDef, field: &FieldDef) -> bool {
        self.field(owner, field)
            .map(|b| b.has_tag("required"))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TypeCatalog;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_summary_remarks_and_tags() {
        let block = DocBlock::parse(
            " Get a tag\n by id\n\n Implementation notes.\n\n Second note.\n @response 404 Not found\n @returns Metadata<Tag>\n @required",
        );
        assert_eq!(block.summary.as_deref(), Some("Get a tag by id"));
        assert_eq!(block.remarks.as_deref(), Some("Implementation notes.\n\nSecond note."));
        assert_eq!(block.tag("response"), Some("404 Not found"));
        assert_eq!(block.tag("returns"), Some("Metadata<Tag>"));
        assert!(block.has_tag("required"));
        assert_eq!(block.tag("required"), Some(""));
    }

    #[test]
    fn test_parse_empty_text() {
        let block = DocBlock::parse("");
        assert!(block.is_empty());
    }

    #[test]
    fn test_repeated_tags_keep_order() {
        let block = DocBlock::parse("@response 400 Bad request\n@response 401 Not authorized");
        let values: Vec<&str> = block.tag_values("response").collect();
        assert_eq!(values, vec!["400 Bad request", "401 Not authorized"]);
        assert!(block.summary.is_none());
    }

    #[test]
    fn test_first_tag_value_outlives_lookup_name() {
        let block = DocBlock::parse("Get a tag\n\n@returns Metadata<Tag>\n@returns Tag");
        let value = {
            let name = String::from("returns");
            block.tag(&name)
        };
        assert_eq!(value, Some("Metadata<Tag>"));
        assert_eq!(block.tag("param"), None);
    }

    #[test]
    fn test_definitions_in_function_bodies_are_not_indexed() {
        let code = r#"
            fn helper() {
                /// Local shadow
                struct Tag { /// Local field
                    name: String }
            }

            /// A tag
            pub struct Tag {
                pub name: String,
            }
        "#;
        let file = SourceFile::from_source("tags.rs", code).unwrap();
        let docs = DocComments::from_sources(std::slice::from_ref(&file));
        let catalog = TypeCatalog::from_sources(&[file]);

        let tag = catalog.get("Tag").unwrap();
        assert_eq!(docs.type_summary(tag).as_deref(), Some("A tag"));
        assert_eq!(docs.field_summary(tag, &tag.fields()[0]), None);
    }

    #[test]
    fn test_doc_comments_from_sources() {
        let code = r#"
            /// A tag attached to content
            pub struct Tag {
                /// Display name
                /// @required
                pub name: String,
                pub value: i32,
            }

            /// Kind of tag
            pub enum TagType { Normal, Complex }
        "#;
        let file = SourceFile::from_source("tags.rs", code).unwrap();
        let docs = DocComments::from_sources(std::slice::from_ref(&file));
        let catalog = TypeCatalog::from_sources(&[file]);

        let tag = catalog.get("Tag").unwrap();
        let name = &tag.fields()[0];
        let value = &tag.fields()[1];

        assert_eq!(docs.type_summary(tag).as_deref(), Some("A tag attached to content"));
        assert_eq!(docs.field_summary(tag, name).as_deref(), Some("Display name"));
        assert!(docs.is_required(tag, name));
        assert_eq!(docs.field_summary(tag, value), None);
        assert!(!docs.is_required(tag, value));
        assert_eq!(
            docs.type_summary(catalog.get("TagType").unwrap()).as_deref(),
            Some("Kind of tag")
        );
    }

    #[test]
    fn test_no_documentation() {
        let file = SourceFile::from_source("t.rs", "/// Doc\npub struct A { pub x: u8 }").unwrap();
        let catalog = TypeCatalog::from_sources(&[file]);
        let a = catalog.get("A").unwrap();
        assert_eq!(NoDocumentation.type_summary(a), None);
        assert!(!NoDocumentation.is_required(a, &a.fields()[0]));
    }
}
