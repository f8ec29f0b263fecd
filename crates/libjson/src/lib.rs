//! libjson: package location resolution from `lib.json` marker files
//!
//! This crate provides:
//! - Marker file discovery from a directory up to the filesystem root
//! - Marker document parsing (`lib.json`, `.~lib.json`)
//! - Namespace merging with child-overrides-parent precedence
//! - Upper-case alias registration for package names
//! - Module and executable name resolution with standard-resolution fallback
//! - Lazy, memoized module loading
//! - Marker document generation from installed dependencies

pub mod config;
pub mod generator;
pub mod lazy;
pub mod loader;
pub mod namespace;
pub mod paths;
pub mod resolver;

pub use config::Options;
pub use generator::{
    from_ancestors, from_node_modules, AncestorOptions, Descriptor, GenerateError, GeneratedDoc,
};
pub use lazy::{BinNamespace, JsNamespace, Lib, Member, Module, ModuleLoader, RequireError, SourceLoader};
pub use loader::{load, DocError, LoadError, RawDoc, Section};
pub use namespace::{alias_for, Namespace, NamespaceError, PackageMap};
pub use paths::PathWalker;
pub use resolver::{
    resolve_bin, resolve_js, HostResolver, NodeResolver, ResolveError, StandardResolveError,
};
