use std::path::Path;

use serde_json::Value;

use crate::error::NormalizeError;
use crate::normalizer::{Diagnostic, DiagnosticCode, parse_json};

/// Top-level fields every notebook must carry.
pub const REQUIRED_TOP_LEVEL: [&str; 4] = ["cells", "metadata", "nbformat", "nbformat_minor"];

/// Outcome of checking a notebook against the minimal schema.
#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    pub valid_cells: usize,
    pub total_cells: usize,
    /// One entry per missing top-level field and per failing cell.
    pub issues: Vec<Diagnostic>,
}

impl VerifyReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty() && self.valid_cells == self.total_cells
    }
}

/// Check a parsed notebook.
///
/// Cells are only inspected once all required top-level fields are present.
/// Each failing cell reports its first violation only.
pub fn verify_value(notebook: &Value) -> VerifyReport {
    let mut report = VerifyReport::default();

    for field in REQUIRED_TOP_LEVEL {
        if notebook.get(field).is_none() {
            report.issues.push(Diagnostic {
                code: DiagnosticCode::MissingTopLevel,
                message: format!("missing top-level: {field}"),
                location: None,
            });
        }
    }
    if !report.issues.is_empty() {
        return report;
    }

    let Some(cells) = notebook.get("cells").and_then(Value::as_array) else {
        report.issues.push(Diagnostic {
            code: DiagnosticCode::CellsNotArray,
            message: "\"cells\" is not an array".to_string(),
            location: None,
        });
        return report;
    };

    report.total_cells = cells.len();
    for (i, cell) in cells.iter().enumerate() {
        match check_cell(cell) {
            Some((code, message)) => report.issues.push(Diagnostic::at_cell(code, i, message)),
            None => report.valid_cells += 1,
        }
    }

    report
}

fn check_cell(cell: &Value) -> Option<(DiagnosticCode, &'static str)> {
    let Some(cell_type) = cell.get("cell_type") else {
        return Some((DiagnosticCode::MissingCellType, "missing cell_type"));
    };
    if cell.get("source").is_none() {
        return Some((DiagnosticCode::MissingSource, "missing source"));
    }
    if cell_type == "code" && cell.get("outputs").is_none() {
        return Some((DiagnosticCode::MissingOutputs, "code cell missing outputs"));
    }
    None
}

/// Parse and check a notebook held in memory.
pub fn verify_bytes(data: &[u8]) -> Result<VerifyReport, NormalizeError> {
    let notebook = parse_json(data)?;
    Ok(verify_value(&notebook))
}

/// Read, parse and check a notebook file.
pub fn verify_file(path: impl AsRef<Path>) -> Result<VerifyReport, NormalizeError> {
    let data = std::fs::read(path.as_ref())?;
    verify_bytes(&data)
}
