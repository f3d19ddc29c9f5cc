pub mod complete;
pub mod lenient;

pub use complete::CompleteNormalizer;
pub use lenient::LenientNormalizer;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::NormalizeError;

/// Categories for recoverable issues found while normalizing or verifying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticCode {
    /// `metadata` existed but was not an object and was reset to `{}`.
    ReplacedMetadata,
    /// A cell was not a JSON object and was left untouched.
    SkippedCell,
    /// A cell `source` had a type the policy does not repair.
    UnexpectedSource,
    /// A cell carried a `cell_type` outside `code`, `markdown` and `raw`.
    UnknownCellType,
    MissingTopLevel,
    CellsNotArray,
    MissingCellType,
    MissingSource,
    MissingOutputs,
}

/// A recoverable issue, reported rather than raised.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    pub location: Option<String>,
}

impl Diagnostic {
    pub(crate) fn at_cell(code: DiagnosticCode, index: usize, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            location: Some(format!("cell {index}")),
        }
    }
}

/// The rule set applied to a notebook. The two policies disagree on several
/// fields and are never combined on one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// Overwrite version and kernel metadata, guarantee `outputs` and
    /// `execution_count` on code cells, strip code fields from markdown.
    #[default]
    Complete,
    /// Fill in only what is missing, drop empty `outputs`, turn null
    /// execution counts into `0`.
    Lenient,
}

impl Policy {
    pub fn name(self) -> &'static str {
        match self {
            Policy::Complete => "complete",
            Policy::Lenient => "lenient",
        }
    }

    pub fn normalizer(self) -> &'static dyn Normalizer {
        match self {
            Policy::Complete => &CompleteNormalizer,
            Policy::Lenient => &LenientNormalizer,
        }
    }
}

/// Summary of one in-memory normalization.
#[derive(Debug, Clone, Default)]
pub struct NormalizeSummary {
    pub cell_count: usize,
    /// Whether `metadata.widgets` was present and removed.
    pub widgets_removed: bool,
    pub warnings: Vec<Diagnostic>,
}

/// A normalized notebook serialized with 2-space indentation.
#[derive(Debug, Clone)]
pub struct NormalizedNotebook {
    pub json: String,
    pub summary: NormalizeSummary,
}

/// Trait implemented by each normalization policy.
pub trait Normalizer {
    /// Suffix inserted before `.ipynb` when no output path is given.
    fn output_suffix(&self) -> &str;

    /// Whether the written file is re-read and verified unless told otherwise.
    fn verifies_by_default(&self) -> bool;

    /// Fix top-level fields before the cells are visited.
    fn normalize_top_level(&self, root: &mut Map<String, Value>, summary: &mut NormalizeSummary);

    /// Fix a single cell. `index` is the cell's position in `cells`.
    fn normalize_cell(
        &self,
        index: usize,
        cell: &mut Map<String, Value>,
        warnings: &mut Vec<Diagnostic>,
    );

    /// Fix top-level fields after the cells are visited.
    fn finish_top_level(&self, _root: &mut Map<String, Value>, _summary: &mut NormalizeSummary) {}
}

/// Normalize a parsed notebook in place.
///
/// The document is left untouched when it is not a notebook at all (root not
/// an object, or no `cells` array).
pub fn normalize_value(
    notebook: &mut Value,
    policy: Policy,
) -> Result<NormalizeSummary, NormalizeError> {
    let normalizer = policy.normalizer();

    let root = notebook
        .as_object_mut()
        .ok_or_else(|| NormalizeError::malformed("notebook root is not a JSON object"))?;

    if !root.get("cells").is_some_and(Value::is_array) {
        return Err(NormalizeError::malformed("notebook missing \"cells\" array"));
    }

    let mut summary = NormalizeSummary::default();
    normalizer.normalize_top_level(root, &mut summary);

    if let Some(Value::Array(cells)) = root.get_mut("cells") {
        summary.cell_count = cells.len();
        for (i, cell) in cells.iter_mut().enumerate() {
            match cell.as_object_mut() {
                Some(cell) => normalizer.normalize_cell(i, cell, &mut summary.warnings),
                None => summary.warnings.push(Diagnostic::at_cell(
                    DiagnosticCode::SkippedCell,
                    i,
                    format!("cell is {}, not an object", type_name(cell)),
                )),
            }
        }
    }

    normalizer.finish_top_level(root, &mut summary);

    Ok(summary)
}

/// Parse, normalize and serialize a notebook without touching the filesystem.
pub fn normalize_bytes(data: &[u8], policy: Policy) -> Result<NormalizedNotebook, NormalizeError> {
    let mut notebook = parse_json(data)?;
    let summary = normalize_value(&mut notebook, policy)?;
    let json = serde_json::to_string_pretty(&notebook)?;
    Ok(NormalizedNotebook { json, summary })
}

/// Parse UTF-8 JSON with no nesting limit. Output data can nest deeper than
/// serde_json's default of 128, so the stack is grown on demand instead.
pub(crate) fn parse_json(data: &[u8]) -> Result<Value, NormalizeError> {
    let text = String::from_utf8(data.to_vec())?;
    let mut deserializer = serde_json::Deserializer::from_str(&text);
    deserializer.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}

pub(crate) fn default_kernelspec() -> Value {
    serde_json::json!({
        "display_name": "Python 3",
        "language": "python",
        "name": "python3"
    })
}

pub(crate) fn default_language_info() -> Value {
    serde_json::json!({
        "name": "python",
        "version": "3.8.0"
    })
}

/// Run `fill` on the `metadata` object after removing `widgets` from it.
///
/// A missing `metadata` is created; one that is not an object is replaced
/// with an empty object and reported.
pub(crate) fn with_metadata(
    root: &mut Map<String, Value>,
    summary: &mut NormalizeSummary,
    fill: impl FnOnce(&mut Map<String, Value>),
) {
    let mut metadata = match root.get_mut("metadata").map(Value::take) {
        None => Map::new(),
        Some(Value::Object(map)) => map,
        Some(other) => {
            summary.warnings.push(Diagnostic {
                code: DiagnosticCode::ReplacedMetadata,
                message: format!(
                    "metadata is {}, replaced with an empty object",
                    type_name(&other)
                ),
                location: Some("metadata".to_string()),
            });
            Map::new()
        }
    };

    if metadata.shift_remove("widgets").is_some() {
        summary.widgets_removed = true;
    }
    fill(&mut metadata);

    // Replacing an existing key keeps its position.
    root.insert("metadata".to_string(), Value::Object(metadata));
}

/// How a `source` that is neither a string nor an array is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OtherSource {
    Keep,
    /// Wrap the value's JSON text, e.g. `null` becomes `["null"]`.
    Stringify,
}

/// Make `source` a list of lines: a bare string is wrapped, an absent source
/// becomes `[""]`.
pub(crate) fn normalize_source(
    index: usize,
    cell: &mut Map<String, Value>,
    other: OtherSource,
    warnings: &mut Vec<Diagnostic>,
) {
    let Some(source) = cell.get_mut("source") else {
        cell.insert(
            "source".to_string(),
            Value::Array(vec![Value::String(String::new())]),
        );
        return;
    };

    match source {
        Value::Array(_) => {}
        Value::String(text) => {
            let text = std::mem::take(text);
            *source = Value::Array(vec![Value::String(text)]);
        }
        _ => match other {
            OtherSource::Stringify => {
                let text = source.to_string();
                *source = Value::Array(vec![Value::String(text)]);
            }
            OtherSource::Keep => warnings.push(Diagnostic::at_cell(
                DiagnosticCode::UnexpectedSource,
                index,
                format!("source is {}, left unchanged", type_name(source)),
            )),
        },
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
