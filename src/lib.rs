//! apidocs-from-source - API documentation listings from Rust web service sources.
//!
//! The core is a type-to-schema engine: given the type of an operation's
//! response or parameter, it produces a schema type and registers every model
//! reachable from it into a deduplicated, depth-bounded model dictionary.
//! Because Rust has no runtime reflection, the engine reflects over a
//! [`catalog::TypeCatalog`] built from the parsed sources.
//!
//! # Architecture
//!
//! 1. [`source`] - Scans a project directory and parses its Rust files
//! 2. [`catalog`] - Table of struct and enum definitions found in the sources
//! 3. [`classifier`] - Decides whether a type is a scalar, array, wrapper, enum or model
//! 4. [`resolver`] - Maps types to schema types and canonical model names
//! 5. [`property`] - Turns struct fields into model properties
//! 6. [`registry`] - Thread-safe model store and the recursive registration walk
//! 7. [`schema_builder`] - Entry points used per documented operation
//! 8. [`docs`] - Doc comment lookups for summaries and requiredness
//! 9. [`discovery`] - Finds routed handlers and their parameters
//! 10. [`listing`] - Builds the resource listing document
//! 11. [`serializer`] - Serializes the listing to YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use apidocs_from_source::{
//!     config::GeneratorConfig,
//!     listing::generate_listing,
//!     serializer::serialize_json,
//!     source::SourceSet,
//! };
//! use std::path::Path;
//!
//! let config = GeneratorConfig::default();
//! let sources = SourceSet::load(Path::new("./my-service"), &config.exclude_dirs).unwrap();
//! let generated = generate_listing(&sources.files, &config);
//! println!("{}", serialize_json(&generated.listing).unwrap());
//! ```
//!
//! The engine can also be driven directly:
//!
//! ```
//! use apidocs_from_source::{
//!     catalog::{TypeCatalog, TypeRef},
//!     config::GeneratorConfig,
//!     docs::NoDocumentation,
//!     schema_builder::SchemaBuilder,
//!     source::SourceFile,
//! };
//!
//! let file = SourceFile::from_source(
//!     "models.rs",
//!     "pub struct Tag { pub name: String, pub rating: Rating }
//!      pub struct Rating { pub value: u8, pub tag: Option<Box<Tag>> }",
//! )
//! .unwrap();
//! let builder = SchemaBuilder::new(
//!     TypeCatalog::from_sources(&[file]),
//!     GeneratorConfig::default(),
//!     Box::new(NoDocumentation),
//! );
//!
//! let schema = builder.response_type(Some(&TypeRef::parse("Vec<Tag>").unwrap())).unwrap();
//! assert_eq!(schema.item_ref(), Some("tag"));
//! assert_eq!(builder.models().len(), 2);
//! ```

pub mod catalog;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod docs;
pub mod error;
pub mod listing;
pub mod model;
pub mod property;
pub mod registry;
pub mod resolver;
pub mod schema_builder;
pub mod serializer;
pub mod source;
