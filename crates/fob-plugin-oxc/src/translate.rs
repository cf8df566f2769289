//! Turning compiler output into the bundler's result.

use serde::{Deserialize, Serialize};

use crate::compiler::{CompilerDiagnostic, CompilerOutput};
use crate::dialect::strip_query;
use crate::error::TransformError;
use crate::merge::ResolvedTransformRequest;
use crate::options::JsxOption;

/// Source map in the field layout the bundler consumes (source map v3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMapRecord {
    pub version: u32,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
}

impl SourceMapRecord {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Convert into the source map type Rolldown expects from a transform hook.
    pub fn to_source_map(&self, id: &str) -> Result<oxc_sourcemap::SourceMap, TransformError> {
        let json = self
            .to_json()
            .map_err(|err| TransformError::source_map(id, err))?;
        oxc_sourcemap::SourceMap::from_json_string(&json)
            .map_err(|err| TransformError::source_map(id, format!("{:?}", err)))
    }
}

/// Successful result of transforming one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutcome {
    pub code: String,
    /// `None` when source maps are disabled or the compiler produced none
    pub map: Option<SourceMapRecord>,
    /// The code still contains JSX (`"preserve"`, or the transform was off
    /// for a JSX dialect)
    pub jsx_preserved: bool,
}

/// Decide the outcome for one module from the compiler's output.
///
/// Any diagnostic fails the module, and no code or map is returned with it.
/// On success the map is dropped when the request disabled source maps, and
/// its `file` defaults to the module path.
pub fn translate(
    id: &str,
    output: CompilerOutput,
    request: &ResolvedTransformRequest,
) -> Result<TransformOutcome, TransformError> {
    if !output.diagnostics.is_empty() {
        return Err(aggregate_diagnostics(id, &output.diagnostics));
    }

    let map = if request.sourcemap {
        output.map.map(|mut map| {
            if map.file.is_none() {
                map.file = Some(strip_query(id).to_string());
            }
            map
        })
    } else {
        None
    };

    let jsx_preserved = match &request.jsx {
        Some(JsxOption::Preserve) => true,
        Some(JsxOption::Config(_)) => false,
        None => request.dialect.has_markup(),
    };

    Ok(TransformOutcome {
        code: output.code,
        map,
        jsx_preserved,
    })
}

/// Fold diagnostics into a single error: each message, followed by its code
/// frame on the next line, separated from the next diagnostic by a blank line.
pub fn aggregate_diagnostics(id: &str, diagnostics: &[CompilerDiagnostic]) -> TransformError {
    let message = diagnostics
        .iter()
        .map(|diagnostic| match &diagnostic.codeframe {
            Some(frame) => format!("{}\n{}", diagnostic.message, frame),
            None => diagnostic.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    TransformError::Diagnostics {
        id: id.to_string(),
        message,
        count: diagnostics.len(),
    }
}
