//! Namespace construction
//!
//! Folds marker documents into a chain of [`Namespace`] values. Documents are
//! merged from the most distant ancestor inward; each result becomes the
//! parent of the next, so the innermost namespace wins on name collisions and
//! falls back to its ancestors for everything else.

use crate::config::Options;
use crate::loader::{self, LoadError, RawDoc, Section, JS_SECTION};
use crate::paths::{self, PathWalker, MARKER_NAMES};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while building a namespace
#[derive(Debug, Error)]
pub enum NamespaceError {
    /// No marker file anywhere between the start directory and the root
    #[error(
        "cannot locate '[.~]lib.json' for '{}'; searched: {}",
        .start.display(),
        display_paths(.searched)
    )]
    ConfigNotFound {
        start: PathBuf,
        searched: Vec<PathBuf>,
    },

    /// A document was given without the directory its paths are relative to
    #[error("no base directory set for document")]
    MissingBaseDirectory,

    /// The document lacks a section the caller requires
    #[error("no '{0}' section found in document")]
    MissingDocSection(&'static str),

    /// The start directory could not be made absolute
    #[error("invalid start directory '{}': {source}", .path.display())]
    InvalidStart {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A marker file could not be read or parsed
    #[error(transparent)]
    Load(#[from] LoadError),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Derive the upper-case alias of a package name
///
/// `.` and `-` become `_`. Returns `None` when the result is not made only of
/// `A-Z`, `0-9` and `_`.
pub fn alias_for(name: &str) -> Option<String> {
    let alias = name.to_uppercase().replace(['.', '-'], "_");
    let valid = !alias.is_empty()
        && alias
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
    valid.then_some(alias)
}

/// Resolved `name -> absolute path` mapping for one section
#[derive(Debug, Clone, Default)]
pub struct PackageMap {
    paths: HashMap<String, Arc<Path>>,
    declared: Vec<String>,
}

impl PackageMap {
    /// Resolve every entry of `section` against `base_dir`
    ///
    /// With `aliases` set, each name whose alias is valid is also registered
    /// under the alias, sharing the same `Arc<Path>`. Later declarations
    /// overwrite earlier keys.
    fn build(section: Option<&Section>, base_dir: &Path, aliases: bool) -> Self {
        let mut map = PackageMap::default();
        let Some(section) = section else {
            return map;
        };

        for (name, rel) in section.iter() {
            let path: Arc<Path> = Arc::from(paths::resolve_against(base_dir, rel));
            if aliases {
                if let Some(alias) = alias_for(name) {
                    map.paths.insert(alias, Arc::clone(&path));
                }
            }
            map.paths.insert(name.to_string(), path);
            map.declared.push(name.to_string());
        }

        map
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Path>> {
        self.paths.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }

    /// Declared names (aliases excluded), in document order
    pub fn declared(&self) -> impl Iterator<Item = &str> {
        self.declared.iter().map(String::as_str)
    }

    /// Resolved paths of declared names, in document order
    pub fn declared_paths(&self) -> impl Iterator<Item = &Path> {
        self.declared
            .iter()
            .filter_map(|name| self.paths.get(name))
            .map(|p| &**p)
    }

    /// Number of keys, aliases included
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// A merged, resolved marker document with an optional parent
#[derive(Debug)]
pub struct Namespace {
    base_dir: PathBuf,
    js: PackageMap,
    bin: PackageMap,
    parent: Option<Arc<Namespace>>,
    source: Option<PathBuf>,
}

impl Namespace {
    /// Fold `doc` onto `parent`
    ///
    /// Relative paths in `doc` are resolved against `base_dir`, which must be
    /// absolute. No section is required.
    pub fn merge(doc: RawDoc, base_dir: &Path, parent: Option<Arc<Namespace>>) -> Self {
        let base_dir = paths::normalize(base_dir);
        let js = PackageMap::build(doc.js.as_ref(), &base_dir, true);
        let bin = PackageMap::build(doc.bin.as_ref(), &base_dir, false);

        tracing::debug!(
            base_dir = %base_dir.display(),
            js = js.declared.len(),
            bin = bin.declared.len(),
            has_parent = parent.is_some(),
            "merged namespace"
        );

        Self {
            base_dir,
            js,
            bin,
            parent,
            source: None,
        }
    }

    /// An empty namespace: no packages, no parent
    pub fn empty(base_dir: &Path) -> Self {
        Self::merge(RawDoc::default(), base_dir, None)
    }

    /// Build a standalone namespace from a document
    ///
    /// The document must carry a `js` section.
    pub fn for_doc(doc: RawDoc, base_dir: Option<&Path>) -> Result<Self, NamespaceError> {
        let base_dir = base_dir
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(NamespaceError::MissingBaseDirectory)?;
        if doc.js.is_none() {
            return Err(NamespaceError::MissingDocSection(JS_SECTION));
        }

        let base_dir = std::path::absolute(base_dir).map_err(|source| {
            NamespaceError::InvalidStart {
                path: base_dir.to_path_buf(),
                source,
            }
        })?;
        Ok(Self::merge(doc, &base_dir, None))
    }

    /// Discover and merge every marker file from `start` up to the root
    ///
    /// Per directory only the first existing marker name is loaded. The
    /// returned namespace belongs to the marker file closest to `start`.
    pub fn for_dir(start: &Path, options: &Options) -> Result<Arc<Self>, NamespaceError> {
        let walker = PathWalker::new(start).map_err(|source| NamespaceError::InvalidStart {
            path: start.to_path_buf(),
            source,
        })?;

        let mut searched = Vec::new();
        let mut found = Vec::new();
        for dir in walker.directories() {
            for name in MARKER_NAMES {
                let path = dir.join(name);
                searched.push(path.clone());
                if let Some(doc) = loader::load(&path)? {
                    found.push((dir.to_path_buf(), path, doc));
                    break;
                }
            }
        }

        tracing::debug!(
            start = %walker.start().display(),
            found = found.len(),
            "marker file discovery finished"
        );

        let namespace = found
            .into_iter()
            .rev()
            .fold(None, |parent, (dir, path, doc)| {
                let mut namespace = Namespace::merge(doc, &dir, parent);
                namespace.source = Some(path);
                Some(Arc::new(namespace))
            });

        match namespace {
            Some(namespace) => Ok(namespace),
            None if options.allow_missing => Ok(Arc::new(Namespace::empty(walker.start()))),
            None => Err(NamespaceError::ConfigNotFound {
                start: walker.start().to_path_buf(),
                searched,
            }),
        }
    }

    /// Directory the document's paths are relative to
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn js(&self) -> &PackageMap {
        &self.js
    }

    pub fn bin(&self) -> &PackageMap {
        &self.bin
    }

    pub fn parent(&self) -> Option<&Arc<Namespace>> {
        self.parent.as_ref()
    }

    /// Marker file this namespace was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// This namespace followed by its ancestors, closest first
    pub fn chain(&self) -> impl Iterator<Item = &Namespace> {
        std::iter::successors(Some(self), |ns| ns.parent.as_deref())
    }
}
