//! Marker document generation
//!
//! The inverse of loading: scans installed packages for descriptor files
//! (`package.json`) and assembles a document that can be written out as a
//! marker file.
//!
//! - [`from_node_modules`]: `js`/`bin` sections from a `node_modules` tree
//! - [`from_ancestors`]: arbitrary categories from the start directory and its ancestors

mod ancestors;
mod node_modules;

pub use ancestors::{from_ancestors, AncestorOptions};
pub use node_modules::from_node_modules;

use crate::loader::{RawDoc, Section, BIN_SECTION, JS_SECTION};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Per-package descriptor file name
pub const DESCRIPTOR_FILE: &str = "package.json";

/// Errors that can occur during document generation
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Failed to list a directory or read a descriptor
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Descriptor is not valid JSON or has unexpected field types
    #[error("failed to parse '{}': {source}", .path.display())]
    Descriptor {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A descriptor reader thread panicked
    #[error("descriptor reader thread panicked")]
    WorkerPanicked,
}

/// Executable declaration of a descriptor
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BinField {
    /// A single entry named after the package
    Single(String),
    /// Named entries
    Named(Map<String, Value>),
}

/// The descriptor fields the generator uses
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Descriptor {
    #[serde(default)]
    pub name: Option<String>,

    /// Optional unique id, registered as a second key for the package
    #[serde(default)]
    pub uid: Option<String>,

    #[serde(default)]
    pub bin: Option<BinField>,
}

impl Descriptor {
    /// Executable entries as `(name, path relative to the package)`
    ///
    /// A single `bin` string is named after `package_name` without its scope.
    pub fn bin_entries(&self, package_name: &str) -> Vec<(String, String)> {
        match &self.bin {
            None => Vec::new(),
            Some(BinField::Single(entry)) => {
                let name = package_name.rsplit('/').next().unwrap_or(package_name);
                vec![(name.to_string(), entry.clone())]
            }
            Some(BinField::Named(entries)) => entries
                .iter()
                .filter_map(|(name, entry)| entry.as_str().map(|e| (name.clone(), e.to_string())))
                .collect(),
        }
    }
}

/// Read the descriptor of a package directory
///
/// Returns `Ok(None)` when the directory has no descriptor file.
pub fn read_descriptor(dir: &Path) -> Result<Option<Descriptor>, GenerateError> {
    let path = dir.join(DESCRIPTOR_FILE);
    if !path.is_file() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|source| GenerateError::Io {
        path: path.clone(),
        source,
    })?;
    let descriptor =
        serde_json::from_str(&content).map_err(|source| GenerateError::Descriptor { path, source })?;
    Ok(Some(descriptor))
}

/// Read the descriptors of many directories on a scoped worker pool
///
/// Results come back in the order of `dirs` regardless of which worker
/// finished first; the first failing directory in that order is reported.
pub(crate) fn read_descriptors(dirs: &[PathBuf]) -> Result<Vec<Option<Descriptor>>, GenerateError> {
    if dirs.len() < 2 {
        return dirs.iter().map(|dir| read_descriptor(dir)).collect();
    }

    let workers = num_cpus::get().clamp(1, dirs.len());
    let chunk_size = dirs.len().div_ceil(workers);

    let chunks = crossbeam::thread::scope(|scope| {
        let handles: Vec<_> = dirs
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move |_| {
                    chunk
                        .iter()
                        .map(|dir| read_descriptor(dir))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join())
            .collect::<Vec<_>>()
    })
    .map_err(|_| GenerateError::WorkerPanicked)?;

    let mut out = Vec::with_capacity(dirs.len());
    for chunk in chunks {
        for result in chunk.map_err(|_| GenerateError::WorkerPanicked)? {
            out.push(result?);
        }
    }
    Ok(out)
}

/// Immediate subdirectories of `dir`, sorted, hidden entries skipped
pub(crate) fn list_subdirs(dir: &Path) -> Result<Vec<PathBuf>, GenerateError> {
    let entries = std::fs::read_dir(dir).map_err(|source| GenerateError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| GenerateError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        let path = entry.path();
        if !hidden && path.is_dir() {
            dirs.push(path);
        }
    }

    dirs.sort();
    Ok(dirs)
}

/// A generated document: ordered categories of `name -> relative path`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedDoc {
    categories: Vec<(String, Section)>,
}

impl GeneratedDoc {
    pub fn new() -> Self {
        Self::default()
    }

    /// The section for `category`, created empty if missing
    pub fn section_mut(&mut self, category: &str) -> &mut Section {
        let index = match self.categories.iter().position(|(c, _)| c == category) {
            Some(index) => index,
            None => {
                self.categories.push((category.to_string(), Section::new()));
                self.categories.len() - 1
            }
        };
        &mut self.categories[index].1
    }

    pub fn section(&self, category: &str) -> Option<&Section> {
        self.categories
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, s)| s)
    }

    /// Category names in creation order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|(c, _)| c.as_str())
    }

    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        for (category, section) in &self.categories {
            object.insert(category.clone(), section.to_value());
        }
        Value::Object(object)
    }

    /// Pretty JSON in marker file format
    pub fn to_string_pretty(&self) -> String {
        // A Value built from string maps always serializes.
        serde_json::to_string_pretty(&self.to_value()).unwrap_or_default()
    }

    /// The `js` and `bin` sections as a [`RawDoc`]
    pub fn to_raw(&self) -> RawDoc {
        RawDoc {
            js: self.section(JS_SECTION).cloned(),
            bin: self.section(BIN_SECTION).cloned(),
        }
    }
}
