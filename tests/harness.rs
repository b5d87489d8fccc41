//! Golden-file test harness for the LightScript desugarer.
//!
//! Discovers `.input.json` files (serialized parser output) under
//! `tests/fixtures/`, runs the pipeline (validate → desugar → consistency
//! check → emit), and compares the JavaScript output against the
//! corresponding `.expected.js` file.
//!
//! Set `LSC_UPDATE_FIXTURES=1` to overwrite expected files with actual
//! output.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use lsc_ast::{Program, TypeRegistry};
use lsc_desugar::{check, desugar_program, Options};

fn fixtures_dir() -> PathBuf {
    // CARGO_MANIFEST_DIR is crates/lsc_test/, so go up two levels to the
    // workspace root.
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
}

fn collect_input_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if !dir.exists() {
        return files;
    }
    for entry in walkdir(dir) {
        if entry
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".input.json"))
        {
            files.push(entry);
        }
    }
    files.sort();
    files
}

fn walkdir(dir: &Path) -> Vec<PathBuf> {
    let mut result = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                result.extend(walkdir(&path));
            } else {
                result.push(path);
            }
        }
    }
    result
}

fn run_pipeline(source: &str) -> Result<String> {
    let mut program: Program = serde_json::from_str(source)?;
    if let Err(errors) = TypeRegistry::global().validate_program(&mut program) {
        bail!("malformed input tree:\n{}", errors.join("\n"));
    }
    let mut desugared = desugar_program(program, &Options::default())?;
    if let Err(problems) = check::check_program(&mut desugared) {
        bail!("output consistency check failed:\n{}", problems.join("\n"));
    }
    Ok(lsc_codegen::emit_program(&desugared)?)
}

#[test]
fn golden_file_tests() {
    let fixtures = fixtures_dir();
    let input_files = collect_input_files(&fixtures);

    assert!(
        !input_files.is_empty(),
        "No test fixtures found in {}",
        fixtures.display()
    );

    let update_mode = std::env::var("LSC_UPDATE_FIXTURES").is_ok();
    let mut failures = Vec::new();

    for input_path in &input_files {
        let expected_path = input_path
            .to_str()
            .unwrap()
            .replace(".input.json", ".expected.js");
        let expected_path = PathBuf::from(&expected_path);

        let test_name = input_path
            .strip_prefix(&fixtures)
            .unwrap()
            .display()
            .to_string();

        let source = match std::fs::read_to_string(input_path) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: failed to read input: {e}"));
                continue;
            }
        };

        let actual = match run_pipeline(&source) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: pipeline failed: {e}"));
                continue;
            }
        };

        if update_mode {
            if let Err(e) = std::fs::write(&expected_path, &actual) {
                failures.push(format!("{test_name}: failed to write expected: {e}"));
            }
            continue;
        }

        if !expected_path.exists() {
            failures.push(format!(
                "{test_name}: missing expected file: {}",
                expected_path.display()
            ));
            continue;
        }

        let expected = match std::fs::read_to_string(&expected_path) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: failed to read expected: {e}"));
                continue;
            }
        };
        if actual.trim() != expected.trim() {
            failures.push(format!(
                "{test_name}: output mismatch\n--- expected ---\n{}\n--- actual ---\n{}",
                expected.trim(),
                actual.trim()
            ));
        }
    }

    if !failures.is_empty() {
        panic!(
            "\n{} golden test(s) failed:\n\n{}",
            failures.len(),
            failures.join("\n\n")
        );
    }
}

/// Every fixture's desugared tree must survive a JSON round trip intact
/// (the shape the downstream code generator consumes).
#[test]
fn ast_roundtrip_tests() {
    let fixtures = fixtures_dir();
    let input_files = collect_input_files(&fixtures);

    let mut failures = Vec::new();

    for input_path in &input_files {
        let test_name = input_path
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();

        let source = match std::fs::read_to_string(input_path) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: failed to read: {e}"));
                continue;
            }
        };

        let program: Program = match serde_json::from_str(&source) {
            Ok(p) => p,
            Err(e) => {
                failures.push(format!("{test_name}: input does not deserialize: {e}"));
                continue;
            }
        };
        let desugared = match desugar_program(program, &Options::default()) {
            Ok(p) => p,
            Err(e) => {
                failures.push(format!("{test_name}: pipeline failed: {e}"));
                continue;
            }
        };

        let json = match serde_json::to_string(&desugared) {
            Ok(j) => j,
            Err(e) => {
                failures.push(format!("{test_name}: output does not serialize: {e}"));
                continue;
            }
        };
        match serde_json::from_str::<Program>(&json) {
            Ok(back) => {
                if back != desugared {
                    failures.push(format!("{test_name}: AST changed across JSON round trip"));
                }
            }
            Err(e) => {
                failures.push(format!("{test_name}: output does not deserialize: {e}"));
            }
        }
    }

    if !failures.is_empty() {
        panic!(
            "\n{} round-trip test(s) failed:\n\n{}",
            failures.len(),
            failures.join("\n\n")
        );
    }
}
