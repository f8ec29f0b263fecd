//! Integration tests for the libjson binary.
//!
//! Runs the built executable against temporary project trees.

use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn libjson(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_libjson"))
        .arg("--cwd")
        .arg(cwd)
        .args(args)
        .env_remove("VERBOSE")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run libjson")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(
        root.join("lib.json"),
        r#"{
            "js": { "lib.json": "." },
            "bin": { "tool": "bin/index.js" }
        }"#,
    )
    .unwrap();
    temp
}

fn canonical(path: &Path) -> std::path::PathBuf {
    path.canonicalize().unwrap()
}

// ────────────────────────────────────────────────────────────────────────────
// resolve.js / resolve.bin
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_resolve_js_prints_declared_path() {
    let temp = project();
    let root = canonical(temp.path());

    let output = libjson(&root, &["resolve.js", "lib.json"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), root.display().to_string());

    let output = libjson(&root, &["resolve.js", "LIB_JSON/src/a.js"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), root.join("src/a.js").display().to_string());
}

#[test]
fn test_resolve_bin_prints_entry() {
    let temp = project();
    let root = canonical(temp.path());

    let output = libjson(&root, &["resolve.bin", "tool"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), root.join("bin/index.js").display().to_string());
}

#[test]
fn test_resolve_bin_undeclared_fails() {
    let temp = project();
    let output = libjson(temp.path(), &["resolve.bin", "missing"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot resolve bin 'missing'"));
}

#[test]
fn test_resolve_js_unresolvable_fails() {
    let temp = project();
    let output = libjson(temp.path(), &["resolve.js", "no-such-module-anywhere"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no-such-module-anywhere"));
}

#[test]
fn test_missing_cwd_fails() {
    let temp = TempDir::new().unwrap();
    let output = libjson(&temp.path().join("nope"), &["resolve.js", "x"]);
    assert!(!output.status.success());
}

// ────────────────────────────────────────────────────────────────────────────
// from
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_from_node_modules_prints_document() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let pkg = root.join("node_modules/tool");
    fs::create_dir_all(&pkg).unwrap();
    fs::write(
        pkg.join("package.json"),
        r#"{ "name": "tool", "bin": { "tool": "cli.js" } }"#,
    )
    .unwrap();

    let output = libjson(root, &["from", "node_modules"]);
    assert!(output.status.success());

    let doc: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(doc["js"]["tool"], "node_modules/tool");
    assert_eq!(doc["bin"]["tool"], "node_modules/tool/cli.js");
}

#[test]
fn test_from_ancestors_prints_categories() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("pkg")).unwrap();
    fs::write(root.join("pkg/package.json"), r#"{ "name": "pkg" }"#).unwrap();

    let output = libjson(
        root,
        &["from", "ancestors", "--find", "package.json=descriptors", "--max-levels", "0"],
    );
    assert!(output.status.success());

    let doc: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(doc["descriptors"]["pkg"], "pkg");
}

#[test]
fn test_unsupported_command_fails() {
    let temp = TempDir::new().unwrap();
    assert!(!libjson(temp.path(), &["from", "bower_components"]).status.success());
    assert!(!libjson(temp.path(), &["resolve.py", "x"]).status.success());
}

// ────────────────────────────────────────────────────────────────────────────
// flags
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_verbose_writes_diagnostics_to_stderr() {
    let temp = project();
    let root = canonical(temp.path());

    let output = libjson(&root, &["--debug", "resolve.js", "lib.json"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), root.display().to_string());
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_node_path_lists_package_parents() {
    let temp = project();
    let root = canonical(temp.path());

    let output = Command::new(env!("CARGO_BIN_EXE_libjson"))
        .arg("--cwd")
        .arg(&root)
        .arg("node-path")
        .env("NODE_PATH", "/opt/node_libs")
        .output()
        .unwrap();
    assert!(output.status.success());

    let printed = stdout(&output);
    let entries: Vec<_> = std::env::split_paths(&printed).collect();
    assert_eq!(entries.first(), root.parent().map(Path::to_path_buf).as_ref());
    assert_eq!(entries.last(), Some(&std::path::PathBuf::from("/opt/node_libs")));
}
