//! Name resolution
//!
//! Resolves `name` or `name/sub/path` against a namespace chain. Module names
//! fall back through the host's standard resolution, then the parent
//! namespace, then the host's built-in modules. Executable names only
//! consult declared entries along the parent chain.

use crate::namespace::Namespace;
use crate::paths;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions probed by [`NodeResolver`], in order
pub const DEFAULT_EXTENSIONS: &[&str] = &["js", "json", "node"];

/// Descriptor file consulted for a package's `main` entry
pub const DESCRIPTOR_FILE: &str = "package.json";

/// Node's built-in module names
pub const BUILTIN_MODULES: &[&str] = &[
    "assert", "async_hooks", "buffer", "child_process", "cluster", "console", "constants",
    "crypto", "dgram", "diagnostics_channel", "dns", "domain", "events", "fs", "http", "http2",
    "https", "inspector", "module", "net", "os", "path", "perf_hooks", "process", "punycode",
    "querystring", "readline", "repl", "stream", "string_decoder", "sys", "timers", "tls",
    "trace_events", "tty", "url", "util", "v8", "vm", "wasi", "worker_threads", "zlib",
];

/// Maximum number of tried paths recorded in a failure
const MAX_TRIED_PATHS: usize = 20;

/// Failure of the host's standard resolution
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot find module '{id}' from '{}'", .basedir.display())]
pub struct StandardResolveError {
    pub id: String,
    pub basedir: PathBuf,
    /// Candidate paths probed before giving up
    pub tried: Vec<PathBuf>,
}

/// Errors that can occur during name resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No tier could resolve a module name
    #[error("cannot resolve '{id}': {source}")]
    Unresolved {
        id: String,
        #[source]
        source: StandardResolveError,
    },

    /// Executable name not declared
    #[error("cannot resolve bin '{0}'")]
    Bin(String),
}

/// The host ecosystem's standard module resolution
pub trait HostResolver: Send + Sync {
    /// Resolve `id` the way a standard import from `basedir` would
    fn resolve(&self, id: &str, basedir: &Path) -> Result<PathBuf, StandardResolveError>;

    /// Whether `name` is a module built into the host
    fn is_builtin(&self, name: &str) -> bool;
}

/// Node-style resolution over the real filesystem
#[derive(Debug, Clone)]
pub struct NodeResolver {
    extensions: &'static [&'static str],
}

impl Default for NodeResolver {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS,
        }
    }
}

impl NodeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the file a path refers to: the file itself, a probed extension,
    /// or the directory's entry point
    pub fn resolve_path(&self, base: &Path) -> Option<PathBuf> {
        let mut tried = Vec::new();
        self.resolve_file(base, &mut tried)
            .or_else(|| self.resolve_directory(base, &mut tried))
    }

    fn resolve_file(&self, base: &Path, tried: &mut Vec<PathBuf>) -> Option<PathBuf> {
        add_tried(tried, base);
        if base.is_file() {
            return Some(base.to_path_buf());
        }

        let file_name = base.file_name()?.to_string_lossy().into_owned();
        for ext in self.extensions {
            let with_ext = base.with_file_name(format!("{}.{}", file_name, ext));
            add_tried(tried, &with_ext);
            if with_ext.is_file() {
                return Some(with_ext);
            }
        }
        None
    }

    /// Directory entry point: descriptor `main`, then `index.*`
    fn resolve_directory(&self, dir: &Path, tried: &mut Vec<PathBuf>) -> Option<PathBuf> {
        if !dir.is_dir() {
            return None;
        }

        let descriptor = dir.join(DESCRIPTOR_FILE);
        if let Some(main) = read_main_field(&descriptor) {
            let main_path = paths::resolve_against(dir, &main);
            if let Some(found) = self.resolve_file(&main_path, tried) {
                return Some(found);
            }
            if main_path.is_dir() && main_path != dir {
                if let Some(found) = self.resolve_index(&main_path, tried) {
                    return Some(found);
                }
            }
        }

        self.resolve_index(dir, tried)
    }

    fn resolve_index(&self, dir: &Path, tried: &mut Vec<PathBuf>) -> Option<PathBuf> {
        self.resolve_file(&dir.join("index"), tried)
    }

    fn resolve_bare(&self, id: &str, basedir: &Path, tried: &mut Vec<PathBuf>) -> Option<PathBuf> {
        for dir in basedir.ancestors() {
            if dir.file_name().is_some_and(|n| n == "node_modules") {
                continue;
            }
            let node_modules = dir.join("node_modules");
            if !node_modules.is_dir() {
                continue;
            }

            let candidate = node_modules.join(id);
            if let Some(found) = self
                .resolve_file(&candidate, tried)
                .or_else(|| self.resolve_directory(&candidate, tried))
            {
                return Some(found);
            }
        }
        None
    }
}

impl HostResolver for NodeResolver {
    fn resolve(&self, id: &str, basedir: &Path) -> Result<PathBuf, StandardResolveError> {
        let mut tried = Vec::new();

        let found = if id.is_empty() {
            None
        } else if is_path_like(id) {
            let base = paths::resolve_against(basedir, id);
            self.resolve_file(&base, &mut tried)
                .or_else(|| self.resolve_directory(&base, &mut tried))
        } else {
            self.resolve_bare(id, basedir, &mut tried)
        };

        tracing::trace!(id, basedir = %basedir.display(), found = ?found, "standard resolution");

        found.ok_or_else(|| StandardResolveError {
            id: id.to_string(),
            basedir: basedir.to_path_buf(),
            tried,
        })
    }

    fn is_builtin(&self, name: &str) -> bool {
        let name = name.strip_prefix("node:").unwrap_or(name);
        BUILTIN_MODULES.contains(&name)
    }
}

fn is_path_like(id: &str) -> bool {
    matches!(id, "." | "..")
        || id.starts_with("./")
        || id.starts_with("../")
        || Path::new(id).is_absolute()
}

fn read_main_field(descriptor: &Path) -> Option<String> {
    let content = std::fs::read_to_string(descriptor).ok()?;
    let value: Value = serde_json::from_str(&content).ok()?;
    value
        .get("main")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

fn add_tried(tried: &mut Vec<PathBuf>, path: &Path) {
    if tried.len() < MAX_TRIED_PATHS {
        tried.push(path.to_path_buf());
    }
}

/// Split an identifier into its package name and the remaining sub-path
pub fn split_identifier(id: &str) -> (&str, &str) {
    id.split_once('/').unwrap_or((id, ""))
}

fn join_subpath(root: &Path, rest: &str) -> PathBuf {
    if rest.is_empty() {
        root.to_path_buf()
    } else {
        paths::resolve_against(root, rest)
    }
}

/// Resolve a module identifier against `namespace` and its parents
///
/// Per namespace: a declared head wins; otherwise the host's standard
/// resolution from the namespace's base directory; otherwise the parent.
/// When the chain ends (or `max_levels` parents have been consulted) the
/// lower-cased identifier is tried as a host built-in. The reported failure
/// is the standard-resolution error of the last namespace tried.
pub fn resolve_js(
    namespace: &Namespace,
    host: &dyn HostResolver,
    id: &str,
    max_levels: usize,
) -> Result<PathBuf, ResolveError> {
    let (head, rest) = split_identifier(id);
    let mut last_error = None;

    for (level, current) in namespace.chain().enumerate() {
        if level > max_levels {
            tracing::debug!(id, max_levels, "parent chain cut off");
            break;
        }

        if let Some(root) = current.js().get(head) {
            let resolved = join_subpath(root, rest);
            tracing::debug!(id, level, path = %resolved.display(), "resolved declared module");
            return Ok(resolved);
        }

        match host.resolve(id, current.base_dir()) {
            Ok(resolved) => {
                tracing::debug!(id, level, path = %resolved.display(), "resolved via standard resolution");
                return Ok(resolved);
            }
            Err(err) => last_error = Some(err),
        }
    }

    let builtin = id.to_lowercase();
    if host.is_builtin(&builtin) {
        tracing::debug!(id, "resolved as built-in module");
        return Ok(PathBuf::from(builtin));
    }

    let source = last_error.unwrap_or_else(|| StandardResolveError {
        id: id.to_string(),
        basedir: namespace.base_dir().to_path_buf(),
        tried: Vec::new(),
    });
    Err(ResolveError::Unresolved {
        id: id.to_string(),
        source,
    })
}

/// Resolve an executable identifier against `namespace` and its parents
///
/// Only declared executables count; standard resolution is never consulted.
pub fn resolve_bin(
    namespace: &Namespace,
    id: &str,
    max_levels: usize,
) -> Result<PathBuf, ResolveError> {
    let (head, rest) = split_identifier(id);
    namespace
        .chain()
        .take(max_levels.saturating_add(1))
        .find_map(|current| current.bin().get(head))
        .map(|root| join_subpath(root, rest))
        .ok_or_else(|| ResolveError::Bin(id.to_string()))
}
