use serde_json::{Map, Value};

use crate::normalizer::{
    Diagnostic, DiagnosticCode, NormalizeSummary, Normalizer, OtherSource, default_kernelspec,
    default_language_info, normalize_source, with_metadata,
};

/// Rewrites a notebook so that every field GitHub's renderer checks is present
/// with a known-good value. Applying it twice gives the same document.
pub struct CompleteNormalizer;

impl Normalizer for CompleteNormalizer {
    fn output_suffix(&self) -> &str {
        "_github_ready"
    }

    fn verifies_by_default(&self) -> bool {
        true
    }

    fn normalize_top_level(&self, root: &mut Map<String, Value>, summary: &mut NormalizeSummary) {
        root.insert("nbformat".to_string(), Value::from(4));
        root.insert("nbformat_minor".to_string(), Value::from(0));

        with_metadata(root, summary, |metadata| {
            metadata.insert("kernelspec".to_string(), default_kernelspec());
            metadata.insert("language_info".to_string(), default_language_info());
        });
    }

    fn normalize_cell(
        &self,
        index: usize,
        cell: &mut Map<String, Value>,
        warnings: &mut Vec<Diagnostic>,
    ) {
        cell.entry("cell_type")
            .or_insert_with(|| Value::from("code"));

        normalize_source(index, cell, OtherSource::Keep, warnings);

        let cell_type = cell.get("cell_type")
            .and_then(Value::as_str)
            .map(str::to_owned);

        match cell_type.as_deref() {
            Some("code") => {
                let count = cell.entry("execution_count").or_insert(Value::Null);
                if count.is_null() {
                    *count = Value::from(index + 1);
                }

                let outputs = cell.entry("outputs")
                    .or_insert_with(|| Value::Array(Vec::new()));
                if !outputs.is_array() {
                    *outputs = Value::Array(Vec::new());
                }
            }
            Some("markdown") => {
                cell.shift_remove("execution_count");
                cell.shift_remove("outputs");
            }
            Some("raw") => {}
            other => {
                let shown = match other {
                    Some(t) => format!("\"{t}\""),
                    None => cell.get("cell_type").unwrap_or(&Value::Null).to_string(),
                };
                warnings.push(Diagnostic::at_cell(
                    DiagnosticCode::UnknownCellType,
                    index,
                    format!("unknown cell type: {shown}"),
                ));
            }
        }
    }
}
