//! Marker file loading (lib.json)
//!
//! Reads a marker file into a [`RawDoc`], keeping section entries in document order.

use serde_json::map::Entry;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the module section
pub const JS_SECTION: &str = "js";

/// Name of the executable section
pub const BIN_SECTION: &str = "bin";

/// Errors in marker document content
#[derive(Debug, Error)]
pub enum DocError {
    /// Text is not valid JSON
    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    /// JSON is valid but does not have the marker document shape
    #[error("{0}")]
    Shape(String),
}

/// Errors that can occur while loading a marker file
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read the file
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the file
    #[error("failed to parse '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: DocError,
    },
}

/// An ordered `name -> path` section of a marker document
///
/// Backed by an insertion-ordered JSON object whose values are all strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    entries: Map<String, Value>,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing the value of an existing name in place
    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<String>) {
        self.entries.insert(name.into(), Value::String(path.into()));
    }

    /// Insert an entry only if the name is not taken yet
    ///
    /// Returns whether the entry was inserted.
    pub fn insert_new(&mut self, name: impl Into<String>, path: impl Into<String>) -> bool {
        match self.entries.entry(name.into()) {
            Entry::Vacant(slot) => {
                slot.insert(Value::String(path.into()));
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).and_then(Value::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entries in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(n, p)| p.as_str().map(|p| (n.as_str(), p)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn from_value(section: &str, value: &Value) -> Result<Self, DocError> {
        let object = value
            .as_object()
            .ok_or_else(|| DocError::Shape(format!("'{}' must be an object", section)))?;

        if let Some((name, _)) = object.iter().find(|(_, path)| !path.is_string()) {
            return Err(DocError::Shape(format!(
                "'{}.{}' must be a string path",
                section, name
            )));
        }
        Ok(Self {
            entries: object.clone(),
        })
    }

    pub(crate) fn to_value(&self) -> Value {
        Value::Object(self.entries.clone())
    }
}

impl<N: Into<String>, P: Into<String>> FromIterator<(N, P)> for Section {
    fn from_iter<I: IntoIterator<Item = (N, P)>>(iter: I) -> Self {
        let mut section = Section::new();
        for (name, path) in iter {
            section.insert(name, path);
        }
        section
    }
}

/// Raw marker document with optional `js` and `bin` sections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDoc {
    pub js: Option<Section>,
    pub bin: Option<Section>,
}

impl RawDoc {
    /// Parse a document from JSON text
    pub fn from_str(content: &str) -> Result<Self, DocError> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(&value)
    }

    /// Build a document from parsed JSON
    ///
    /// Top-level keys other than `js` and `bin` are ignored.
    pub fn from_value(value: &Value) -> Result<Self, DocError> {
        let object = value
            .as_object()
            .ok_or_else(|| DocError::Shape("document must be a JSON object".to_string()))?;

        let js = object
            .get(JS_SECTION)
            .map(|v| Section::from_value(JS_SECTION, v))
            .transpose()?;
        let bin = object
            .get(BIN_SECTION)
            .map(|v| Section::from_value(BIN_SECTION, v))
            .transpose()?;

        Ok(Self { js, bin })
    }

    /// Serialize to pretty JSON, omitting absent sections
    pub fn to_string_pretty(&self) -> String {
        let mut object = Map::new();
        if let Some(js) = &self.js {
            object.insert(JS_SECTION.to_string(), js.to_value());
        }
        if let Some(bin) = &self.bin {
            object.insert(BIN_SECTION.to_string(), bin.to_value());
        }
        // A Value built from string maps always serializes.
        serde_json::to_string_pretty(&Value::Object(object)).unwrap_or_default()
    }
}

/// Load a marker file
///
/// Returns `Ok(None)` when `path` does not exist or is not a regular file.
pub fn load(path: &Path) -> Result<Option<RawDoc>, LoadError> {
    if !path.is_file() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let doc = RawDoc::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        path = %path.display(),
        js = doc.js.as_ref().map_or(0, Section::len),
        bin = doc.bin.as_ref().map_or(0, Section::len),
        "loaded marker file"
    );

    Ok(Some(doc))
}
