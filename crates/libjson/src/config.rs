//! Resolution options

use std::path::PathBuf;

/// Environment variable seeding the search path when the parent chain ends
pub const SEARCH_PATH_ENV: &str = "NODE_PATH";

/// Default cap on how many parent namespaces a lookup may walk
pub const DEFAULT_MAX_LEVELS: usize = 64;

/// Options threaded into namespace construction and resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Return an empty namespace instead of failing when no marker file exists
    pub allow_missing: bool,

    /// Maximum number of parent namespaces consulted by a single lookup
    pub max_levels: usize,

    /// Directories appended to `NODE_PATH` after the whole parent chain
    pub search_paths: Vec<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            allow_missing: false,
            max_levels: DEFAULT_MAX_LEVELS,
            search_paths: Vec::new(),
        }
    }
}

impl Options {
    /// Default options with `search_paths` read from `NODE_PATH`
    pub fn from_env() -> Self {
        let search_paths = std::env::var_os(SEARCH_PATH_ENV)
            .map(|value| {
                std::env::split_paths(&value)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            search_paths,
            ..Self::default()
        }
    }

    /// Set the non-fatal empty-namespace mode
    pub fn with_allow_missing(mut self, allow_missing: bool) -> Self {
        self.allow_missing = allow_missing;
        self
    }

    pub fn with_max_levels(mut self, max_levels: usize) -> Self {
        self.max_levels = max_levels;
        self
    }

    pub fn with_search_paths(mut self, search_paths: Vec<PathBuf>) -> Self {
        self.search_paths = search_paths;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert!(!options.allow_missing);
        assert_eq!(options.max_levels, DEFAULT_MAX_LEVELS);
        assert!(options.search_paths.is_empty());
    }

    #[test]
    fn test_builders() {
        let options = Options::default()
            .with_allow_missing(true)
            .with_max_levels(3)
            .with_search_paths(vec![PathBuf::from("/opt/lib")]);

        assert!(options.allow_missing);
        assert_eq!(options.max_levels, 3);
        assert_eq!(options.search_paths, vec![PathBuf::from("/opt/lib")]);
    }
}
