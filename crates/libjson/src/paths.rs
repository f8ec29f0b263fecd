//! Directory walking and lexical path helpers
//!
//! Enumerates the ancestor directories searched for marker files and
//! provides the path arithmetic shared by the loader and the generator.

use std::path::{Component, Path, PathBuf};

/// Hidden-override marker file name. Shadows [`PLAIN_MARKER`] in the same directory.
pub const HIDDEN_MARKER: &str = ".~lib.json";

/// Plain marker file name.
pub const PLAIN_MARKER: &str = "lib.json";

/// Marker file names tried per directory, in precedence order.
pub const MARKER_NAMES: [&str; 2] = [HIDDEN_MARKER, PLAIN_MARKER];

/// Enumerates candidate directories from a start directory up to the filesystem root.
#[derive(Debug, Clone)]
pub struct PathWalker {
    start: PathBuf,
}

impl PathWalker {
    /// Create a walker rooted at `start`
    ///
    /// Relative start paths are made absolute against the process working
    /// directory and normalized lexically.
    pub fn new(start: &Path) -> std::io::Result<Self> {
        let start = normalize(&std::path::absolute(start)?);
        Ok(Self { start })
    }

    /// The normalized start directory
    pub fn start(&self) -> &Path {
        &self.start
    }

    /// Ancestor directories, closest first, ending with the filesystem root
    pub fn directories(&self) -> impl Iterator<Item = &Path> {
        self.start.ancestors()
    }

    /// Candidate marker files, closest directory first
    ///
    /// Each directory contributes its hidden-override name before its plain name.
    pub fn marker_candidates(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.directories()
            .flat_map(|dir| MARKER_NAMES.iter().map(move |name| dir.join(name)))
    }
}

/// Normalize a path lexically
///
/// Collapses `.` and `..` components without touching the filesystem, so
/// symlinked directories keep the spelling the caller used.
pub fn normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            _ => components.push(component),
        }
    }

    if components.is_empty() {
        return PathBuf::from(".");
    }
    components.iter().collect()
}

/// Join `rel` onto `base` and normalize. Absolute `rel` replaces `base`.
pub fn resolve_against(base: &Path, rel: &str) -> PathBuf {
    normalize(&base.join(rel))
}

/// Express `target` relative to `from_dir`, using `/` separators
///
/// Both paths are expected to be absolute and normalized. The result starts
/// with `..` segments when `target` is outside `from_dir`, and is `.` when
/// the two are equal.
pub fn relative_to(from_dir: &Path, target: &Path) -> String {
    let from: Vec<Component<'_>> = from_dir.components().collect();
    let to: Vec<Component<'_>> = target.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from.len() {
        parts.push("..".to_string());
    }
    for component in &to[common..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}
