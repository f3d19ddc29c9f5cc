mod common;

use common::{fixture_in_tempdir, read_json};
use nbfix::{NormalizeError, NormalizeOptions, Policy, normalize_file, verify_file};

/// Golden test: the broken fixture repaired with the default policy.
#[test]
fn test_complete_golden_broken() {
    let (dir, input) = fixture_in_tempdir("broken.ipynb");
    let report = normalize_file(&input, &NormalizeOptions::default()).unwrap();

    assert_eq!(
        report.output_path,
        dir.path().join("broken_github_ready.ipynb")
    );
    let written = std::fs::read_to_string(&report.output_path).unwrap();
    let expected = include_str!("fixtures/expected/broken_github_ready.ipynb");
    assert_eq!(written, expected);
}

#[test]
fn test_complete_report_stats() {
    let (_dir, input) = fixture_in_tempdir("broken.ipynb");
    let report = normalize_file(&input, &NormalizeOptions::default()).unwrap();

    assert_eq!(report.cell_count, 5);
    assert!(report.widgets_removed);
    assert!(report.warnings.is_empty());
    assert_eq!(
        report.output_bytes,
        std::fs::metadata(&report.output_path).unwrap().len()
    );

    let verify = report.verification.unwrap().unwrap();
    assert!(verify.is_valid());
    assert_eq!(verify.valid_cells, 5);
}

#[test]
fn test_complete_leaves_input_untouched() {
    let (_dir, input) = fixture_in_tempdir("broken.ipynb");
    let before = std::fs::read(&input).unwrap();
    normalize_file(&input, &NormalizeOptions::default()).unwrap();
    assert_eq!(std::fs::read(&input).unwrap(), before);
}

#[test]
fn test_complete_explicit_output_path() {
    let (dir, input) = fixture_in_tempdir("broken.ipynb");
    let out = dir.path().join("nested-out.ipynb");
    let options = NormalizeOptions {
        output: Some(out.clone()),
        ..Default::default()
    };
    let report = normalize_file(&input, &options).unwrap();
    assert_eq!(report.output_path, out);
    assert!(out.exists());
    assert!(!dir.path().join("broken_github_ready.ipynb").exists());
}

#[test]
fn test_complete_file_idempotent() {
    let (dir, input) = fixture_in_tempdir("broken.ipynb");
    let first = normalize_file(&input, &NormalizeOptions::default()).unwrap();
    let second_out = dir.path().join("again.ipynb");
    let options = NormalizeOptions {
        output: Some(second_out.clone()),
        ..Default::default()
    };
    normalize_file(&first.output_path, &options).unwrap();
    assert_eq!(
        std::fs::read(&first.output_path).unwrap(),
        std::fs::read(&second_out).unwrap()
    );
}

#[test]
fn test_complete_verify_can_be_disabled() {
    let (_dir, input) = fixture_in_tempdir("clean.ipynb");
    let options = NormalizeOptions {
        verify: Some(false),
        ..Default::default()
    };
    let report = normalize_file(&input, &options).unwrap();
    assert!(report.verification.is_none());
}

#[test]
fn test_complete_markdown_cells_have_no_code_fields() {
    let (_dir, input) = fixture_in_tempdir("broken.ipynb");
    let report = normalize_file(&input, &NormalizeOptions::default()).unwrap();
    let nb = read_json(&report.output_path);
    for cell in nb["cells"].as_array().unwrap() {
        if cell["cell_type"] == "markdown" {
            assert!(cell.get("execution_count").is_none());
            assert!(cell.get("outputs").is_none());
        }
    }
}

/// Malformed JSON: error returned, nothing written.
#[test]
fn test_complete_malformed_json_writes_nothing() {
    let (dir, input) = fixture_in_tempdir("malformed.ipynb");
    let err = normalize_file(&input, &NormalizeOptions::default()).unwrap_err();
    assert!(matches!(err, NormalizeError::Json(_)));
    assert!(!dir.path().join("malformed_github_ready.ipynb").exists());
}

#[test]
fn test_complete_missing_input_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.ipynb");
    let err = normalize_file(missing, &NormalizeOptions::default()).unwrap_err();
    assert!(matches!(err, NormalizeError::Io(_)));
}

#[test]
fn test_complete_output_always_verifies() {
    let inputs = [
        r#"{"cells": []}"#,
        r#"{"cells": [{}], "metadata": null}"#,
        r#"{"cells": [{"cell_type": "code", "outputs": 3}, {"cell_type": "raw"}]}"#,
        r#"{"cells": [{"cell_type": "markdown", "outputs": [], "execution_count": 1}]}"#,
    ];
    let dir = tempfile::tempdir().unwrap();
    for (i, text) in inputs.iter().enumerate() {
        let input = dir.path().join(format!("nb{i}.ipynb"));
        std::fs::write(&input, text).unwrap();
        let options = NormalizeOptions {
            policy: Policy::Complete,
            ..Default::default()
        };
        let report = normalize_file(&input, &options).unwrap();
        assert!(
            verify_file(&report.output_path).unwrap().is_valid(),
            "input {i}"
        );
    }
}
