use super::{list_subdirs, read_descriptors, GeneratedDoc, GenerateError};
use crate::loader::{BIN_SECTION, JS_SECTION};
use crate::paths;
use std::path::{Path, PathBuf};

/// Installed-dependency directory scanned under the base directory
pub const NODE_MODULES: &str = "node_modules";

/// Generate a document from `base_dir/node_modules`
///
/// Every installed package with a descriptor contributes `js[name]` (and
/// `js[uid]` when the id is not taken) pointing at its directory, plus one
/// `bin` entry per declared executable. Paths are relative to `base_dir`.
/// Earlier packages (in sorted directory order) keep names that later ones
/// also declare.
pub fn from_node_modules(base_dir: &Path) -> Result<GeneratedDoc, GenerateError> {
    let base_dir = std::path::absolute(base_dir)
        .map(|p| paths::normalize(&p))
        .map_err(|source| GenerateError::Io {
            path: base_dir.to_path_buf(),
            source,
        })?;
    let root = base_dir.join(NODE_MODULES);

    let mut doc = GeneratedDoc::new();
    doc.section_mut(JS_SECTION);
    doc.section_mut(BIN_SECTION);

    if !root.is_dir() {
        tracing::debug!(root = %root.display(), "no installed dependencies");
        return Ok(doc);
    }

    let candidates = package_dirs(&root)?;
    let descriptors = read_descriptors(&candidates)?;

    for (dir, descriptor) in candidates.iter().zip(descriptors) {
        let Some(descriptor) = descriptor else {
            tracing::trace!(dir = %dir.display(), "no descriptor, skipping");
            continue;
        };

        let rel = paths::relative_to(&base_dir, dir);
        let name = descriptor
            .name
            .clone()
            .unwrap_or_else(|| paths::relative_to(&root, dir));

        let js = doc.section_mut(JS_SECTION);
        js.insert_new(name.as_str(), rel.as_str());
        if let Some(uid) = &descriptor.uid {
            js.insert_new(uid.as_str(), rel.as_str());
        }

        let bin = doc.section_mut(BIN_SECTION);
        for (bin_name, entry) in descriptor.bin_entries(&name) {
            let entry = paths::resolve_against(dir, &entry);
            bin.insert_new(bin_name, paths::relative_to(&base_dir, &entry));
        }
    }

    tracing::debug!(
        root = %root.display(),
        candidates = candidates.len(),
        "generated document from installed dependencies"
    );

    Ok(doc)
}

/// Package directories under `root`: direct children, with `@scope`
/// directories replaced by their children
fn package_dirs(root: &Path) -> Result<Vec<PathBuf>, GenerateError> {
    let mut out = Vec::new();
    for dir in list_subdirs(root)? {
        let scoped = dir
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with('@'));
        if scoped {
            out.extend(list_subdirs(&dir)?);
        } else {
            out.push(dir);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn install(base: &Path, dir: &str, descriptor: Option<&str>) {
        let pkg = base.join("node_modules").join(dir);
        fs::create_dir_all(&pkg).unwrap();
        if let Some(descriptor) = descriptor {
            fs::write(pkg.join("package.json"), descriptor).unwrap();
        }
    }

    #[test]
    fn test_missing_node_modules_gives_empty_sections() {
        let temp = tempfile::tempdir().unwrap();
        let doc = from_node_modules(temp.path()).unwrap();
        assert!(doc.section("js").unwrap().is_empty());
        assert!(doc.section("bin").unwrap().is_empty());
    }

    #[test]
    fn test_scoped_packages_and_uid() {
        let temp = tempfile::tempdir().unwrap();
        install(temp.path(), "@acme/widget", Some(r#"{ "name": "@acme/widget", "uid": "w-1" }"#));
        install(temp.path(), "plain", Some(r#"{ "name": "plain" }"#));
        install(temp.path(), "no-descriptor", None);

        let doc = from_node_modules(temp.path()).unwrap();
        let js = doc.section("js").unwrap();
        assert_eq!(js.get("@acme/widget"), Some("node_modules/@acme/widget"));
        assert_eq!(js.get("w-1"), Some("node_modules/@acme/widget"));
        assert_eq!(js.get("plain"), Some("node_modules/plain"));
        assert!(!js.contains("no-descriptor"));
    }

    #[test]
    fn test_first_package_keeps_duplicate_name() {
        let temp = tempfile::tempdir().unwrap();
        install(temp.path(), "a-first", Some(r#"{ "name": "same" }"#));
        install(temp.path(), "b-second", Some(r#"{ "name": "same" }"#));

        let doc = from_node_modules(temp.path()).unwrap();
        assert_eq!(doc.section("js").unwrap().get("same"), Some("node_modules/a-first"));
    }

    #[test]
    fn test_bin_paths_relative_to_base() {
        let temp = tempfile::tempdir().unwrap();
        install(temp.path(), "tool", Some(r#"{ "name": "tool", "bin": "./bin/cli.js" }"#));

        let doc = from_node_modules(temp.path()).unwrap();
        assert_eq!(
            doc.section("bin").unwrap().get("tool"),
            Some("node_modules/tool/bin/cli.js")
        );
    }

    #[test]
    fn test_broken_descriptor_is_fatal() {
        let temp = tempfile::tempdir().unwrap();
        install(temp.path(), "broken", Some("{ nope"));

        let err = from_node_modules(temp.path()).unwrap_err();
        assert!(matches!(err, GenerateError::Descriptor { .. }));
        assert!(err.to_string().contains("broken"));
    }
}
