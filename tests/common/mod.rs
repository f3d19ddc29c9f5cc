use std::path::PathBuf;

use tempfile::TempDir;

/// Copy a fixture into a fresh temp dir so derived output paths land there.
pub fn fixture_in_tempdir(name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join(name);
    std::fs::copy(format!("tests/fixtures/{name}"), &dest).unwrap();
    (dir, dest)
}

pub fn read_json(path: &std::path::Path) -> serde_json::Value {
    let text = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&text).unwrap()
}
