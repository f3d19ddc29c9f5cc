use std::path::{Path, PathBuf};

const IPYNB_EXT: &str = ".ipynb";

/// Build the output path for `input` by inserting `suffix` before its
/// `.ipynb` extension.
///
/// `notebooks/a.ipynb` + `_fixed` → `notebooks/a_fixed.ipynb`. A file without
/// the extension gets it appended, so the result never equals the input.
pub fn derive_output_path(input: &Path, suffix: &str) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let split = name.len().checked_sub(IPYNB_EXT.len());
    let new_name = match split.and_then(|at| Some((name.get(..at)?, name.get(at..)?))) {
        Some((stem, ext)) if ext.eq_ignore_ascii_case(IPYNB_EXT) => format!("{stem}{suffix}{ext}"),
        _ => format!("{name}{suffix}{IPYNB_EXT}"),
    };

    input.with_file_name(new_name)
}
