//! On-demand namespace access
//!
//! [`JsNamespace`] and [`BinNamespace`] expose a namespace chain by name.
//! Nothing is resolved or loaded when they are built; each access resolves
//! the requested name, and `require` additionally loads it once and keeps the
//! result keyed by resolved path.

use crate::config::Options;
use crate::loader::RawDoc;
use crate::namespace::{Namespace, NamespaceError};
use crate::resolver::{self, HostResolver, NodeResolver, ResolveError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Members of a [`JsNamespace`] that are never treated as package names
pub const RESERVED_MEMBERS: &[&str] = &["require", "resolve", "NODE_PATH", "inspect"];

/// Public members listed by [`JsNamespace::keys`]
pub const PUBLIC_MEMBERS: &[&str] = &["require", "resolve"];

/// Boxed error returned by a [`ModuleLoader`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while requiring a module
#[derive(Debug, Error)]
pub enum RequireError {
    /// The identifier did not resolve
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The resolved path could not be loaded
    #[error("failed to load module '{id}' from '{}': {source}", .path.display())]
    Load {
        id: String,
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

/// The host's "load code at this path" primitive
pub trait ModuleLoader: Send + Sync {
    type Module: Send + Sync;

    fn load(&self, path: &Path) -> Result<Self::Module, BoxError>;

    /// Provide a module built into the host; nothing is read from disk
    fn load_builtin(&self, name: &str) -> Result<Self::Module, BoxError>;
}

/// A loaded module: the entry file and its source text
///
/// Built-in modules carry their bare name as `path` and no source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub path: PathBuf,
    pub source: String,
    pub builtin: bool,
}

/// Loads module source from disk
///
/// Directories are loaded through their entry point as found by [`NodeResolver`].
#[derive(Debug, Clone, Default)]
pub struct SourceLoader {
    entries: NodeResolver,
}

impl ModuleLoader for SourceLoader {
    type Module = Module;

    fn load(&self, path: &Path) -> Result<Module, BoxError> {
        let entry = self
            .entries
            .resolve_path(path)
            .ok_or_else(|| format!("no loadable entry at '{}'", path.display()))?;
        let source = std::fs::read_to_string(&entry)?;
        Ok(Module {
            path: entry,
            source,
            builtin: false,
        })
    }

    fn load_builtin(&self, name: &str) -> Result<Module, BoxError> {
        Ok(Module {
            path: PathBuf::from(name),
            source: String::new(),
            builtin: true,
        })
    }
}

/// Result of a reserved-member aware lookup on [`JsNamespace`]
#[derive(Debug)]
pub enum Member<M> {
    /// The `require` capability
    Require,
    /// The `resolve` capability
    Resolve,
    /// The `inspect` meta member
    Inspect,
    /// The derived `NODE_PATH` search path
    NodePath(Vec<PathBuf>),
    /// A loaded package
    Module(Arc<M>),
}

/// Module namespace: resolve and load by name
pub struct JsNamespace<L: ModuleLoader = SourceLoader> {
    namespace: Arc<Namespace>,
    host: Arc<dyn HostResolver>,
    loader: L,
    options: Options,
    loaded: Mutex<HashMap<PathBuf, Arc<L::Module>>>,
}

impl<L: ModuleLoader> JsNamespace<L> {
    pub fn new(
        namespace: Arc<Namespace>,
        host: Arc<dyn HostResolver>,
        loader: L,
        options: Options,
    ) -> Self {
        Self {
            namespace,
            host,
            loader,
            options,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve an identifier to a path without loading it
    pub fn resolve(&self, id: &str) -> Result<PathBuf, ResolveError> {
        resolver::resolve_js(&self.namespace, self.host.as_ref(), id, self.options.max_levels)
    }

    /// Resolve and load an identifier
    ///
    /// Each resolved path is loaded at most once per namespace.
    pub fn require(&self, id: &str) -> Result<Arc<L::Module>, RequireError> {
        let path = self.resolve(id)?;

        if let Some(module) = self.loaded.lock().get(&path) {
            return Ok(Arc::clone(module));
        }

        let builtin = self.builtin_name(&path);
        tracing::debug!(id, path = %path.display(), builtin = builtin.is_some(), "loading module");
        let module = match builtin {
            Some(name) => self.loader.load_builtin(name),
            None => self.loader.load(&path),
        }
        .map_err(|source| RequireError::Load {
            id: id.to_string(),
            path: path.clone(),
            source,
        })?;

        let mut loaded = self.loaded.lock();
        let module = loaded.entry(path).or_insert_with(|| Arc::new(module));
        Ok(Arc::clone(module))
    }

    /// Bare name of a resolved built-in; declared and standard paths are absolute
    fn builtin_name<'p>(&self, path: &'p Path) -> Option<&'p str> {
        if path.is_absolute() {
            return None;
        }
        path.to_str().filter(|name| self.host.is_builtin(name))
    }

    /// Lookup by package name; same as [`require`](Self::require)
    pub fn get(&self, name: &str) -> Result<Arc<L::Module>, RequireError> {
        self.require(name)
    }

    /// Member access that keeps reserved names out of resolution
    pub fn member(&self, key: &str) -> Result<Member<L::Module>, RequireError> {
        match key {
            "require" => Ok(Member::Require),
            "resolve" => Ok(Member::Resolve),
            "inspect" => Ok(Member::Inspect),
            "NODE_PATH" => Ok(Member::NodePath(self.node_path())),
            name => self.require(name).map(Member::Module),
        }
    }

    /// Public member names
    pub fn keys(&self) -> &'static [&'static str] {
        PUBLIC_MEMBERS
    }

    /// Derived module search path
    ///
    /// Closest namespace first; within one namespace, the containing
    /// directories of its declared packages in document order. After the
    /// last namespace come the configured search paths. Each directory
    /// appears once, at its first position.
    pub fn node_path(&self) -> Vec<PathBuf> {
        let mut out: Vec<PathBuf> = Vec::new();
        let mut push = |dir: &Path| {
            if !out.iter().any(|existing| existing == dir) {
                out.push(dir.to_path_buf());
            }
        };

        for namespace in self.namespace.chain().take(self.options.max_levels.saturating_add(1)) {
            for path in namespace.js().declared_paths() {
                if let Some(dir) = path.parent() {
                    push(dir);
                }
            }
        }
        for dir in &self.options.search_paths {
            push(dir);
        }

        out
    }

    /// Number of modules loaded so far
    pub fn loaded_count(&self) -> usize {
        self.loaded.lock().len()
    }

    pub fn namespace(&self) -> &Arc<Namespace> {
        &self.namespace
    }

    pub fn options(&self) -> &Options {
        &self.options
    }
}

/// Executable namespace: resolve only
#[derive(Debug, Clone)]
pub struct BinNamespace {
    namespace: Arc<Namespace>,
    max_levels: usize,
}

impl BinNamespace {
    pub fn new(namespace: Arc<Namespace>, max_levels: usize) -> Self {
        Self {
            namespace,
            max_levels,
        }
    }

    /// Resolve a declared executable; no standard-resolution fallback
    pub fn resolve(&self, id: &str) -> Result<PathBuf, ResolveError> {
        resolver::resolve_bin(&self.namespace, id, self.max_levels)
    }

    /// Lookup by executable name; same as [`resolve`](Self::resolve)
    pub fn get(&self, name: &str) -> Result<PathBuf, ResolveError> {
        self.resolve(name)
    }
}

/// The `js` and `bin` namespaces built from one namespace chain
pub struct Lib<L: ModuleLoader = SourceLoader> {
    pub js: JsNamespace<L>,
    pub bin: BinNamespace,
}

impl Lib<SourceLoader> {
    /// Discover marker files from `start` and build both namespaces
    pub fn for_dir(start: &Path, options: Options) -> Result<Self, NamespaceError> {
        let namespace = Namespace::for_dir(start, &options)?;
        Ok(Self::with_parts(
            namespace,
            Arc::new(NodeResolver::new()),
            SourceLoader::default(),
            options,
        ))
    }

    /// Build both namespaces from a single document
    ///
    /// The search path comes from the environment, see [`Options::from_env`].
    pub fn for_doc(doc: RawDoc, base_dir: Option<&Path>) -> Result<Self, NamespaceError> {
        Self::for_doc_with(doc, base_dir, Options::from_env())
    }

    /// Build both namespaces from a single document with explicit options
    pub fn for_doc_with(
        doc: RawDoc,
        base_dir: Option<&Path>,
        options: Options,
    ) -> Result<Self, NamespaceError> {
        let namespace = Arc::new(Namespace::for_doc(doc, base_dir)?);
        Ok(Self::with_parts(
            namespace,
            Arc::new(NodeResolver::new()),
            SourceLoader::default(),
            options,
        ))
    }
}

impl<L: ModuleLoader> Lib<L> {
    /// Build both namespaces with a custom host resolver and loader
    pub fn with_parts(
        namespace: Arc<Namespace>,
        host: Arc<dyn HostResolver>,
        loader: L,
        options: Options,
    ) -> Self {
        Self {
            bin: BinNamespace::new(Arc::clone(&namespace), options.max_levels),
            js: JsNamespace::new(namespace, host, loader, options),
        }
    }
}
