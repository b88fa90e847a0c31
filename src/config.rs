//! Generator configuration.
//!
//! Everything the classifier needs to know about type *shapes* lives in
//! [`TypeConventions`]: which generic types are transparent wrappers, which are
//! sequences, which are maps, which ecosystem types are scalars and which
//! generic types are response envelopes. The defaults cover the common Rust web
//! stack; a YAML file can extend or replace them.

use crate::registry::DEFAULT_MAX_DEPTH;
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Top-level configuration for a generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Version string reported as `apiVersion`
    pub api_version: String,
    /// Base URL reported as `basePath`
    pub base_path: String,
    /// Optional `resourcePath` for the listing
    pub resource_path: Option<String>,
    /// Lowercase every route path
    pub lowercase_routes: bool,
    /// Drop everything after `?` in route paths
    pub ignore_route_query_parameters: bool,
    /// Maximum nesting depth for model discovery
    pub max_depth: usize,
    /// Directory names skipped while scanning sources
    pub exclude_dirs: Vec<String>,
    /// Type shape conventions
    pub conventions: TypeConventions,
}

/// Name-based conventions used to classify types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeConventions {
    /// Generic types unwrapped to their first type argument
    pub wrappers: Vec<String>,
    /// Wrappers that make a property optional
    pub optional_wrappers: Vec<String>,
    /// Generic collection types rendered as arrays
    pub sequences: Vec<String>,
    /// Key/value collections rendered as `object`
    pub maps: Vec<String>,
    /// Non-std types that serialize as scalars
    pub scalars: BTreeMap<String, ScalarMapping>,
    /// Schema names that never get descriptions or models
    pub ignored: Vec<String>,
    /// Generic response envelopes that keep their own identity per payload type
    pub envelopes: Vec<EnvelopeConvention>,
}

/// Schema tag (and optional format) for a scalar type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarMapping {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// A generic envelope such as `Metadata<T>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeConvention {
    /// Type name of the envelope
    pub name: String,
    /// Field that carries the payload; it resolves to the envelope's type argument
    #[serde(default = "default_content_field")]
    pub content_field: String,
    /// Field name -> Rust type string, replacing the declared field type
    #[serde(default)]
    pub field_types: BTreeMap<String, String>,
}

fn default_content_field() -> String {
    "content".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_version: "1.0.0".to_string(),
            base_path: "http://localhost".to_string(),
            resource_path: None,
            lowercase_routes: false,
            ignore_route_query_parameters: false,
            max_depth: DEFAULT_MAX_DEPTH,
            exclude_dirs: vec!["target".to_string()],
            conventions: TypeConventions::default(),
        }
    }
}

impl Default for TypeConventions {
    fn default() -> Self {
        let names = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let mut scalars = BTreeMap::new();
        for (name, schema_type, format) in [
            ("DateTime", "string", Some("date-time")),
            ("NaiveDateTime", "string", Some("date-time")),
            ("SystemTime", "string", Some("date-time")),
            ("NaiveDate", "string", Some("date")),
            ("Uuid", "string", Some("uuid")),
            ("PathBuf", "string", None),
            ("Decimal", "number", None),
            ("Value", "object", None),
        ] {
            scalars.insert(
                name.to_string(),
                ScalarMapping {
                    schema_type: schema_type.to_string(),
                    format: format.map(str::to_string),
                },
            );
        }

        Self {
            wrappers: names(&["Option", "Box", "Arc", "Rc", "Cow", "Json", "Result"]),
            optional_wrappers: names(&["Option"]),
            sequences: names(&["Vec", "VecDeque", "LinkedList", "HashSet", "BTreeSet", "BinaryHeap"]),
            maps: names(&["HashMap", "BTreeMap"]),
            scalars,
            ignored: names(&["void", "object", "string", "boolean"]),
            envelopes: ["Metadata", "PagedMetadata", "ActionsMetadata"]
                .iter()
                .map(|name| EnvelopeConvention {
                    name: name.to_string(),
                    content_field: default_content_field(),
                    field_types: BTreeMap::new(),
                })
                .collect(),
        }
    }
}

impl TypeConventions {
    pub fn is_wrapper(&self, name: &str) -> bool {
        self.wrappers.iter().any(|w| w == name)
    }

    pub fn is_optional_wrapper(&self, name: &str) -> bool {
        self.optional_wrappers.iter().any(|w| w == name)
    }

    pub fn is_sequence(&self, name: &str) -> bool {
        self.sequences.iter().any(|s| s == name)
    }

    pub fn is_map(&self, name: &str) -> bool {
        self.maps.iter().any(|m| m == name)
    }

    /// Whether a canonical schema name belongs to the ignore set
    pub fn is_ignored(&self, schema_name: &str) -> bool {
        self.ignored.iter().any(|i| i == schema_name)
    }

    pub fn envelope(&self, name: &str) -> Option<&EnvelopeConvention> {
        self.envelopes.iter().find(|e| e.name == name)
    }
}

impl GeneratorConfig {
    /// Load a configuration file; missing keys fall back to the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse a configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config = serde_yaml::from_str(content).context("Failed to parse YAML configuration")?;
        Ok(config)
    }
}
