use serde_json::{Map, Value};

use crate::normalizer::{
    Diagnostic, NormalizeSummary, Normalizer, OtherSource, default_kernelspec,
    default_language_info, normalize_source, with_metadata,
};

/// Fills in missing fields without overwriting anything the notebook already
/// declares. Empty `outputs` are dropped and null execution counts become `0`.
pub struct LenientNormalizer;

impl Normalizer for LenientNormalizer {
    fn output_suffix(&self) -> &str {
        "_fixed"
    }

    // Empty `outputs` are removed, so code cells can legitimately fail the
    // `outputs` check afterwards.
    fn verifies_by_default(&self) -> bool {
        false
    }

    fn normalize_top_level(&self, root: &mut Map<String, Value>, summary: &mut NormalizeSummary) {
        with_metadata(root, summary, |metadata| {
            metadata
                .entry("kernelspec")
                .or_insert_with(default_kernelspec);
            metadata
                .entry("language_info")
                .or_insert_with(default_language_info);
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

        normalize_source(index, cell, OtherSource::Stringify, warnings);

        if cell.get("outputs").is_some_and(is_empty_like) {
            cell.shift_remove("outputs");
        }

        if let Some(count) = cell.get_mut("execution_count")
            && count.is_null()
        {
            *count = Value::from(0);
        }
    }

    fn finish_top_level(&self, root: &mut Map<String, Value>, _summary: &mut NormalizeSummary) {
        root.entry("nbformat").or_insert_with(|| Value::from(4));
        root.entry("nbformat_minor")
            .or_insert_with(|| Value::from(0));
    }
}

/// Null, `false`, zero, and empty strings, arrays or objects.
fn is_empty_like(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
