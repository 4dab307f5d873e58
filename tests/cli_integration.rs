//! Integration tests for the command-line interface
//!
//! Runs the built binary against throwaway Python projects

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to create a project with a `src/shop` package
fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let pkg = dir.path().join("src").join("shop");
    fs::create_dir_all(&pkg).unwrap();
    fs::write(pkg.join("__init__.py"), "").unwrap();
    fs::write(pkg.join("cart.py"), "def total(a, b):\n    return a + b\n").unwrap();
    fs::write(pkg.join("stock.py"), "def low(count):\n    return count < 5\n").unwrap();
    dir
}

fn pymutant(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pymutant"))
        .args(args)
        .current_dir(cwd)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn json_records(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_list_ops() {
    let dir = TempDir::new().unwrap();
    let output = pymutant(dir.path(), &["--list-ops"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for tag in ["AOD", "AOR", "EHD", "IOP", "SCI", "SIR"] {
        assert!(stdout.contains(tag), "missing {tag}:\n{stdout}");
    }
    assert!(stdout.contains("standard set"));
}

#[test]
fn test_target_is_required() {
    let dir = TempDir::new().unwrap();
    let output = pymutant(dir.path(), &[]);
    assert!(!output.status.success());
}

#[test]
fn test_mutate_directory_prints_diffs() {
    let dir = setup_project();
    let output = pymutant(dir.path(), &["--target", "src/shop", "--ops", "AOR"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[#0] Mutation"));
    assert!(stdout.contains("- [AOR] shop.cart.total"));
    assert!(stdout.contains("-    return a + b"));
    assert!(stdout.contains("+    return a - b"));
    assert!(stdout.trim_end().ends_with("mutants"));
}

#[test]
fn test_diff_has_unified_hunk_headers() {
    let dir = setup_project();
    let output = pymutant(dir.path(), &["--target", "src/shop/cart.py", "--ops", "AOR"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--- src/shop/cart.py"), "{stdout}");
    assert!(stdout.contains("+++ src/shop/cart.py"), "{stdout}");
    assert!(stdout.contains("@@ -1,2 +1,2 @@"), "{stdout}");
    assert!(stdout.contains(" def total(a, b):"), "{stdout}");
}

#[test]
fn test_json_output() {
    let dir = setup_project();
    let output = pymutant(dir.path(), &["--target", "src/shop", "--ops", "ROR", "--json"]);

    assert!(output.status.success());
    let records = json_records(&output);
    assert!(!records.is_empty());
    for (index, record) in records.iter().enumerate() {
        assert_eq!(record["index"], index);
        assert_eq!(record["operator"], "ROR");
        assert_eq!(record["module"], "shop.stock.low");
        assert_eq!(record["scope"], "low");
        assert_eq!(record["span"]["start"]["line"], 1);
        assert_eq!(record["id"].as_str().unwrap().len(), 16);
    }
}

#[test]
fn test_module_pattern_target() {
    let dir = setup_project();
    let output = pymutant(dir.path(), &["--target", "shop.c*", "--ops", "AOR", "--json"]);
    assert!(!output.status.success(), "glob characters are not patterns");

    let output = pymutant(dir.path(), &["--target", "shop.*", "--ops", "AOR,ROR", "--json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let modules: Vec<String> = json_records(&output)
        .iter()
        .map(|record| record["module"].as_str().unwrap().to_string())
        .collect();
    assert!(modules.iter().any(|m| m == "shop.cart.total"));
    assert!(modules.iter().any(|m| m == "shop.stock.low"));
}

#[test]
fn test_scope_filter() {
    let dir = setup_project();
    let output = pymutant(
        dir.path(),
        &["--target", "src/shop", "--ops", "AOR,ROR,CRP", "--scope", "shop.stock.*", "--json"],
    );

    assert!(output.status.success());
    let records = json_records(&output);
    assert!(!records.is_empty());
    assert!(records
        .iter()
        .all(|record| record["module"] == "shop.stock.low"));
}

#[test]
fn test_config_file_in_working_directory() {
    let dir = setup_project();
    fs::write(
        dir.path().join("pymutant.toml"),
        "[mutate]\noperators = [\"CRP\"]\nexclude = [\"shop.cart\"]\n",
    )
    .unwrap();

    let output = pymutant(dir.path(), &["--target", "src/shop", "--json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let records = json_records(&output);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["operator"], "CRP");
    assert_eq!(records[0]["replacement"], "6");
}

#[test]
fn test_unknown_operator_fails() {
    let dir = setup_project();
    let output = pymutant(dir.path(), &["--target", "src/shop", "--ops", "AOX"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("AOX"), "{stderr}");
}

#[test]
fn test_unparsable_module_is_skipped() {
    let dir = setup_project();
    fs::write(dir.path().join("src/shop/broken.py"), "def f(:\n").unwrap();

    let output = pymutant(dir.path(), &["--target", "src/shop", "--ops", "AOR", "--json"]);
    assert!(output.status.success());
    assert!(!json_records(&output).is_empty());
}

#[test]
fn test_skip_invalid_drops_unparsable_mutants() {
    let dir = setup_project();
    fs::write(
        dir.path().join("src/shop/greet.py"),
        "def greet(name=\"\"):\n    return name\n",
    )
    .unwrap();

    let args = ["--target", "src/shop/greet.py", "--ops", "CRP", "--json"];
    let all = json_records(&pymutant(dir.path(), &args));
    assert_eq!(all.len(), 2);

    let mut strict = args.to_vec();
    strict.push("--skip-invalid");
    let valid = json_records(&pymutant(dir.path(), &strict));
    assert_eq!(valid.len(), 1);
    assert_eq!(valid[0]["replacement"], "'pymutant'");
}
