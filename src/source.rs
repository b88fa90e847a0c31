//! Loading of the service sources the type catalog and operation discovery read from.
//!
//! A [`SourceSet`] is every `.rs` file under a project root that parsed cleanly.
//! Files that cannot be read or parsed are recorded as warnings and skipped, so a
//! single broken file never prevents documentation from being generated.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A parsed Rust source file
#[derive(Debug)]
pub struct SourceFile {
    /// Path the source was read from
    pub path: PathBuf,
    /// The parsed syntax tree
    pub syntax: syn::File,
}

/// All source files of a project that parsed successfully
#[derive(Debug, Default)]
pub struct SourceSet {
    pub files: Vec<SourceFile>,
    /// Paths that could not be visited, read or parsed
    pub warnings: Vec<String>,
}

impl SourceFile {
    /// Read and parse a file from disk
    pub fn read(path: &Path) -> Result<Self> {
        debug!("Parsing file: {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        Self::from_source(path, &content)
    }

    /// Parse in-memory source text attributed to `path`
    pub fn from_source(path: impl Into<PathBuf>, content: &str) -> Result<Self> {
        let path = path.into();
        let syntax = syn::parse_file(content)
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;
        Ok(Self { path, syntax })
    }
}

impl SourceSet {
    /// Walk `root` and parse every `.rs` file, skipping hidden directories and
    /// any directory named in `exclude_dirs`.
    pub fn load(root: &Path, exclude_dirs: &[String]) -> Result<Self> {
        if !root.is_dir() {
            anyhow::bail!("Project path is not a directory: {}", root.display());
        }

        let mut set = SourceSet::default();
        let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
            if entry.path() == root {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !name.starts_with('.') && !exclude_dirs.iter().any(|dir| *dir == name)
        });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    set.warn(format!("Failed to access path: {}", e));
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("rs") {
                continue;
            }
            match SourceFile::read(path) {
                Ok(file) => set.files.push(file),
                Err(e) => set.warn(format!("Skipping {}: {:#}", path.display(), e)),
            }
        }

        debug!(
            "Loaded {} source files ({} skipped)",
            set.files.len(),
            set.warnings.len()
        );
        Ok(set)
    }

    /// Build a set from already parsed files
    pub fn from_files(files: Vec<SourceFile>) -> Self {
        Self {
            files,
            warnings: Vec::new(),
        }
    }

    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }
}
