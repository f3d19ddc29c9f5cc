pub mod error;
pub mod normalizer;
pub mod output;
pub mod verify;

pub use error::NormalizeError;
pub use normalizer::{
    Diagnostic, DiagnosticCode, NormalizeSummary, NormalizedNotebook, Normalizer, Policy,
    normalize_bytes, normalize_value,
};
pub use verify::{VerifyReport, verify_bytes, verify_file, verify_value};

use std::path::{Path, PathBuf};

/// Options controlling how a notebook file is repaired.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    pub policy: Policy,
    /// Destination path. Derived from the input path and the policy's
    /// suffix when `None`.
    pub output: Option<PathBuf>,
    /// Re-read and verify the written file. `None` uses the policy default.
    pub verify: Option<bool>,
}

/// The result of repairing a notebook file.
#[derive(Debug)]
pub struct NormalizeReport {
    pub output_path: PathBuf,
    pub cell_count: usize,
    /// Size of the written file in bytes.
    pub output_bytes: u64,
    pub widgets_removed: bool,
    /// Recoverable issues encountered during normalization.
    pub warnings: Vec<Diagnostic>,
    /// Present when verification ran. An `Err` means the written file could
    /// not be read back.
    pub verification: Option<Result<VerifyReport, NormalizeError>>,
}

/// Repair the notebook at `path` and write the result.
///
/// Nothing is written when the input cannot be read or is not a notebook.
pub fn normalize_file(
    path: impl AsRef<Path>,
    options: &NormalizeOptions,
) -> Result<NormalizeReport, NormalizeError> {
    let path = path.as_ref();
    let normalizer = options.policy.normalizer();

    let data = std::fs::read(path)?;
    let normalized = normalize_bytes(&data, options.policy)?;

    let output_path = options
        .output
        .clone()
        .unwrap_or_else(|| output::derive_output_path(path, normalizer.output_suffix()));

    std::fs::write(&output_path, &normalized.json)?;
    let output_bytes = std::fs::metadata(&output_path)?.len();

    let verification = options
        .verify
        .unwrap_or_else(|| normalizer.verifies_by_default())
        .then(|| verify_file(&output_path));

    Ok(NormalizeReport {
        output_path,
        cell_count: normalized.summary.cell_count,
        output_bytes,
        widgets_removed: normalized.summary.widgets_removed,
        warnings: normalized.summary.warnings,
        verification,
    })
}
