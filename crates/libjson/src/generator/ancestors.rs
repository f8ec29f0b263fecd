use super::{list_subdirs, read_descriptors, GeneratedDoc, GenerateError};
use crate::paths;
use std::path::{Path, PathBuf};

/// Options for [`from_ancestors`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AncestorOptions {
    /// Number of ancestor levels above the start directory to scan; `None` scans up to the root
    pub max_levels: Option<usize>,

    /// Directory below each level whose subdirectories are scanned
    pub sub_path: Option<String>,
}

/// Generate a document by scanning the start directory and its ancestors
///
/// `lookups` maps a file name to the category it is recorded under. At each
/// level, every subdirectory containing that file is recorded with its path
/// relative to `start`. The key is the directory name, or the descriptor's
/// declared name (and unique id) when that name differs. Closer levels win.
pub fn from_ancestors(
    start: &Path,
    lookups: &[(String, String)],
    options: &AncestorOptions,
) -> Result<GeneratedDoc, GenerateError> {
    let start = std::path::absolute(start)
        .map(|p| paths::normalize(&p))
        .map_err(|source| GenerateError::Io {
            path: start.to_path_buf(),
            source,
        })?;

    let mut doc = GeneratedDoc::new();
    for (_, category) in lookups {
        doc.section_mut(category);
    }

    let levels = options.max_levels.map_or(usize::MAX, |max| max.saturating_add(1));
    for level_dir in start.ancestors().take(levels) {
        let scan_dir = match &options.sub_path {
            Some(sub_path) => level_dir.join(sub_path),
            None => level_dir.to_path_buf(),
        };
        if !scan_dir.is_dir() {
            continue;
        }

        let matches = matching_subdirs(&scan_dir, lookups)?;
        if matches.is_empty() {
            continue;
        }

        let dirs: Vec<PathBuf> = matches.iter().map(|(dir, _)| dir.clone()).collect();
        let descriptors = read_descriptors(&dirs)?;

        for ((dir, categories), descriptor) in matches.iter().zip(descriptors) {
            let dir_name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let rel = paths::relative_to(&start, dir);

            let mut keys = vec![dir_name.clone()];
            if let Some(descriptor) = descriptor {
                if let Some(name) = descriptor.name.filter(|n| *n != dir_name) {
                    keys = vec![name];
                    if let Some(uid) = descriptor.uid {
                        keys.push(uid);
                    }
                }
            }

            for category in categories {
                let section = doc.section_mut(category);
                for key in &keys {
                    section.insert_new(key.as_str(), rel.as_str());
                }
            }
        }

        tracing::debug!(
            dir = %scan_dir.display(),
            matched = matches.len(),
            "scanned ancestor level"
        );
    }

    Ok(doc)
}

/// Subdirectories of `scan_dir` containing at least one lookup file, with
/// the categories they matched
fn matching_subdirs(
    scan_dir: &Path,
    lookups: &[(String, String)],
) -> Result<Vec<(PathBuf, Vec<String>)>, GenerateError> {
    let mut out = Vec::new();
    for dir in list_subdirs(scan_dir)? {
        let categories: Vec<String> = lookups
            .iter()
            .filter(|(file, _)| dir.join(file).is_file())
            .map(|(_, category)| category.clone())
            .collect();
        if !categories.is_empty() {
            out.push((dir, categories));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn lookups(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(f, c)| (f.to_string(), c.to_string()))
            .collect()
    }

    #[test]
    fn test_records_matching_subdirs() {
        let temp = tempfile::tempdir().unwrap();
        let start = temp.path().join("project");
        fs::create_dir_all(start.join("alpha")).unwrap();
        fs::create_dir_all(start.join("beta")).unwrap();
        fs::write(start.join("alpha/lib.json"), "{}").unwrap();

        let doc = from_ancestors(
            &start,
            &lookups(&[("lib.json", "markers")]),
            &AncestorOptions {
                max_levels: Some(0),
                sub_path: None,
            },
        )
        .unwrap();

        let markers = doc.section("markers").unwrap();
        assert_eq!(markers.get("alpha"), Some("alpha"));
        assert!(!markers.contains("beta"));
    }

    #[test]
    fn test_descriptor_name_replaces_dir_name() {
        let temp = tempfile::tempdir().unwrap();
        let start = temp.path().join("project");
        let pkg = start.join("node_modules/dir-name");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(
            pkg.join("package.json"),
            r#"{ "name": "declared", "uid": "id-7" }"#,
        )
        .unwrap();

        let doc = from_ancestors(
            &start,
            &lookups(&[("package.json", "descriptors")]),
            &AncestorOptions {
                max_levels: Some(0),
                sub_path: Some("node_modules".to_string()),
            },
        )
        .unwrap();

        let section = doc.section("descriptors").unwrap();
        assert_eq!(section.get("declared"), Some("node_modules/dir-name"));
        assert_eq!(section.get("id-7"), Some("node_modules/dir-name"));
        assert!(!section.contains("dir-name"));
    }

    #[test]
    fn test_closer_level_wins() {
        let temp = tempfile::tempdir().unwrap();
        let outer = temp.path().join("outer");
        let start = outer.join("inner");
        fs::create_dir_all(start.join("shared")).unwrap();
        fs::create_dir_all(outer.join("shared")).unwrap();
        fs::create_dir_all(outer.join("only-outer")).unwrap();
        for dir in ["inner/shared", "shared", "only-outer"] {
            fs::write(outer.join(dir).join("marker"), "").unwrap();
        }

        let doc = from_ancestors(
            &start,
            &lookups(&[("marker", "found")]),
            &AncestorOptions {
                max_levels: Some(1),
                sub_path: None,
            },
        )
        .unwrap();

        let found = doc.section("found").unwrap();
        assert_eq!(found.get("shared"), Some("shared"));
        assert_eq!(found.get("only-outer"), Some("../only-outer"));
    }
}
