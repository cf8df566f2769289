//! Final JSX configuration for a module.

use crate::context::BuildMode;
use crate::dialect::Dialect;
use crate::options::{JsxConfig, JsxOption, JsxRuntime};

/// Everything JSX resolution depends on.
#[derive(Debug, Clone, Copy)]
pub struct JsxSources<'a> {
    pub dialect: Dialect,
    /// Whether the extension alone may switch the JSX transform on
    pub auto_detect: bool,
    /// `jsx` option passed to the plugin
    pub caller: Option<&'a JsxOption>,
    /// JSX settings derived from tsconfig.json
    pub project: Option<&'a JsxOption>,
    pub mode: BuildMode,
    /// Plugin-level `refresh` switch
    pub refresh: bool,
}

/// Resolve the JSX configuration for one module.
///
/// Returns `None` when the module gets no JSX transform at all: the dialect
/// cannot contain JSX (or auto-detection is off) and neither the caller nor
/// tsconfig.json asked for one.
///
/// Otherwise sources are layered field by field, later winning:
/// build-mode defaults, then tsconfig.json, then the caller. A caller
/// `"preserve"` short-circuits everything; a tsconfig `"preserve"` applies
/// only when the caller passed no `jsx` option.
pub fn resolve_jsx(sources: JsxSources<'_>) -> Option<JsxOption> {
    let capable = sources.auto_detect && sources.dialect.has_markup();
    if !capable && sources.caller.is_none() && sources.project.is_none() {
        return None;
    }

    match (sources.caller, sources.project) {
        (Some(JsxOption::Preserve), _) | (None, Some(JsxOption::Preserve)) => {
            return Some(JsxOption::Preserve);
        }
        _ => {}
    }

    let development = sources.mode.is_development();
    let defaults = JsxConfig {
        runtime: Some(JsxRuntime::Automatic),
        development: Some(development),
        refresh: Some(sources.refresh && development),
        ..JsxConfig::default()
    };

    let empty = JsxConfig::default();
    let project = sources.project.and_then(JsxOption::as_config).unwrap_or(&empty);
    let caller = sources.caller.and_then(JsxOption::as_config).unwrap_or(&empty);

    Some(JsxOption::Config(defaults.overlay(project).overlay(caller)))
}
