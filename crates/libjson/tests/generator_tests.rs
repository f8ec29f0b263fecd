//! Integration tests for marker document generation

use libjson::paths::resolve_against;
use libjson::{from_ancestors, from_node_modules, AncestorOptions, Lib, Namespace, Options};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn install(base: &Path, name: &str, bin: Option<&str>) {
    let pkg = base.join("node_modules").join(name);
    fs::create_dir_all(&pkg).unwrap();
    let descriptor = match bin {
        Some(entry) => format!(r#"{{ "name": "{}", "bin": "{}" }}"#, name, entry),
        None => format!(r#"{{ "name": "{}" }}"#, name),
    };
    fs::write(pkg.join("package.json"), descriptor).unwrap();
    fs::write(pkg.join("index.js"), "module.exports = 1;\n").unwrap();
}

fn install_five(base: &Path) {
    install(base, "alpha", None);
    install(base, "beta", Some("cli.js"));
    install(base, "gamma", None);
    install(base, "@scope/delta", Some("bin/delta.js"));
    install(base, "epsilon", None);
    fs::create_dir_all(base.join("node_modules/.bin")).unwrap();
}

#[test]
fn test_five_packages_two_executables() {
    let temp = TempDir::new().unwrap();
    install_five(temp.path());

    let doc = from_node_modules(temp.path()).unwrap();
    assert!(doc.section("js").unwrap().len() >= 5);
    assert_eq!(doc.section("bin").unwrap().len(), 2);
    assert_eq!(
        doc.section("bin").unwrap().get("delta"),
        Some("node_modules/@scope/delta/bin/delta.js")
    );
}

#[test]
fn test_generated_document_resolves_to_recorded_paths() {
    let temp = TempDir::new().unwrap();
    let base = temp.path();
    install_five(base);

    let doc = from_node_modules(base).unwrap();
    let namespace = Namespace::merge(doc.to_raw(), base, None);

    for (name, rel) in doc.section("js").unwrap().iter() {
        assert_eq!(&**namespace.js().get(name).unwrap(), resolve_against(base, rel));
    }
    for (name, rel) in doc.section("bin").unwrap().iter() {
        assert_eq!(&**namespace.bin().get(name).unwrap(), resolve_against(base, rel));
    }
}

#[test]
fn test_written_document_round_trips_through_discovery() {
    let temp = TempDir::new().unwrap();
    let base = temp.path();
    install_five(base);

    let doc = from_node_modules(base).unwrap();
    fs::write(base.join("lib.json"), doc.to_string_pretty()).unwrap();

    let lib = Lib::for_dir(base, Options::default()).unwrap();
    assert_eq!(lib.js.resolve("gamma").unwrap(), base.join("node_modules/gamma"));
    assert_eq!(lib.js.resolve("GAMMA").unwrap(), base.join("node_modules/gamma"));
    assert_eq!(
        lib.bin.resolve("beta").unwrap(),
        base.join("node_modules/beta/cli.js")
    );

    let module = lib.js.require("alpha").unwrap();
    assert_eq!(module.path, base.join("node_modules/alpha/index.js"));
    assert_eq!(module.source, "module.exports = 1;\n");
}

#[test]
fn test_ancestor_scan_finds_parent_node_modules() {
    let temp = TempDir::new().unwrap();
    let base = temp.path();
    install(base, "shared", None);
    let app = base.join("apps/web");
    install(&app, "local", None);

    let lookups = vec![("package.json".to_string(), "descriptors".to_string())];
    let doc = from_ancestors(
        &app,
        &lookups,
        &AncestorOptions {
            max_levels: Some(2),
            sub_path: Some("node_modules".to_string()),
        },
    )
    .unwrap();

    let section = doc.section("descriptors").unwrap();
    assert_eq!(section.get("local"), Some("node_modules/local"));
    assert_eq!(section.get("shared"), Some("../../node_modules/shared"));
}
