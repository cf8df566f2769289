//! Merging caller options and project defaults into one compiler request.

use std::path::PathBuf;

use serde::Serialize;

use crate::context::BuildContext;
use crate::dialect::Dialect;
use crate::options::{CompilerOptions, JsxOption, OxcLoaderOptions, Target};
use crate::project_config::ProjectConfigOptions;

/// Compiler-ready configuration for a single module.
///
/// Holds no adapter-only switches: `refresh`, `autoDetectMarkup`,
/// `useProjectConfig` and `projectConfigPath` are consumed while resolving
/// and have no field here. `sourcemap` survives only as the resolved flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTransformRequest {
    pub dialect: Dialect,
    /// `None` disables the JSX transform entirely
    pub jsx: Option<JsxOption>,
    pub sourcemap: bool,
    /// Working directory of the build
    pub cwd: PathBuf,
    /// Passthrough options after merging with project defaults
    #[serde(flatten)]
    pub options: CompilerOptions,
}

/// Build the request for one module.
///
/// Caller-supplied passthrough fields always win; project-derived values
/// only fill fields the caller left unset.
pub fn resolve_request(
    raw: &OxcLoaderOptions,
    project: &ProjectConfigOptions,
    dialect: Dialect,
    jsx: Option<JsxOption>,
    context: &BuildContext,
) -> ResolvedTransformRequest {
    let mut options = raw.compiler.clone();

    if options.target.is_none() {
        options.target = project.target.clone().map(Target::One);
    }

    let typescript = &mut options.typescript;
    typescript.only_remove_type_imports = typescript
        .only_remove_type_imports
        .or(project.only_remove_type_imports);
    typescript.rewrite_import_extensions = typescript
        .rewrite_import_extensions
        .or(project.rewrite_import_extensions);

    let decorator = &mut options.decorator;
    decorator.legacy = decorator.legacy.or(project.legacy_decorators);
    decorator.emit_decorator_metadata = decorator
        .emit_decorator_metadata
        .or(project.emit_decorator_metadata);

    ResolvedTransformRequest {
        dialect,
        jsx,
        sourcemap: raw.sourcemap_enabled(),
        cwd: context.cwd.clone(),
        options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{JsxConfig, RewriteImportExtensions};
    use serde_json::json;

    fn project() -> ProjectConfigOptions {
        ProjectConfigOptions {
            target: Some("es2019".to_string()),
            rewrite_import_extensions: Some(RewriteImportExtensions::Rewrite),
            only_remove_type_imports: Some(true),
            legacy_decorators: Some(true),
            ..Default::default()
        }
    }

    #[test]
    fn test_project_fills_unset_fields() {
        let request = resolve_request(
            &OxcLoaderOptions::default(),
            &project(),
            Dialect::Ts,
            None,
            &BuildContext::development("/app"),
        );

        assert_eq!(request.options.target, Some(Target::One("es2019".to_string())));
        assert_eq!(request.options.typescript.only_remove_type_imports, Some(true));
        assert_eq!(
            request.options.typescript.rewrite_import_extensions,
            Some(RewriteImportExtensions::Rewrite)
        );
        assert_eq!(request.options.decorator.legacy, Some(true));
        assert_eq!(request.options.decorator.emit_decorator_metadata, None);
    }

    #[test]
    fn test_caller_wins_per_field() {
        let mut raw = OxcLoaderOptions::default().with_target("es2022");
        raw.compiler.typescript.rewrite_import_extensions = Some(RewriteImportExtensions::Remove);
        raw.compiler.decorator.legacy = Some(false);

        let request = resolve_request(
            &raw,
            &project(),
            Dialect::Ts,
            None,
            &BuildContext::development("/app"),
        );

        assert_eq!(request.options.target, Some(Target::One("es2022".to_string())));
        assert_eq!(
            request.options.typescript.rewrite_import_extensions,
            Some(RewriteImportExtensions::Remove)
        );
        assert_eq!(request.options.decorator.legacy, Some(false));
        // Not set by the caller, so the project value survives
        assert_eq!(request.options.typescript.only_remove_type_imports, Some(true));
    }

    #[test]
    fn test_sourcemap_defaults_on() {
        let context = BuildContext::production("/app");
        let on = resolve_request(
            &OxcLoaderOptions::default(),
            &ProjectConfigOptions::default(),
            Dialect::Js,
            None,
            &context,
        );
        assert!(on.sourcemap);

        let off = resolve_request(
            &OxcLoaderOptions::default().with_sourcemap(false),
            &ProjectConfigOptions::default(),
            Dialect::Js,
            None,
            &context,
        );
        assert!(!off.sourcemap);
    }

    #[test]
    fn test_cwd_comes_from_context() {
        let raw = OxcLoaderOptions::default().with_project_config_path("/elsewhere/tsconfig.json");
        let request = resolve_request(
            &raw,
            &ProjectConfigOptions::default(),
            Dialect::Js,
            None,
            &BuildContext::development("/app"),
        );
        assert_eq!(request.cwd, PathBuf::from("/app"));
    }

    #[test]
    fn test_adapter_keys_never_serialized() {
        let raw = OxcLoaderOptions::default()
            .with_refresh(true)
            .with_auto_detect_markup(false)
            .with_project_config(false)
            .with_project_config_path("tsconfig.json")
            .with_define("DEBUG", "false");

        let request = resolve_request(
            &raw,
            &ProjectConfigOptions::default(),
            Dialect::Tsx,
            Some(JsxOption::Config(JsxConfig::automatic())),
            &BuildContext::development("/app"),
        );
        let value = serde_json::to_value(&request).unwrap();

        for key in ["refresh", "autoDetectMarkup", "useProjectConfig", "projectConfigPath"] {
            assert!(value.get(key).is_none(), "{} leaked into the request", key);
        }
        assert_eq!(value["define"], json!({ "DEBUG": "false" }));
        assert_eq!(value["dialect"], "tsx");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let raw = OxcLoaderOptions::default().with_target("es2020");
        let context = BuildContext::development("/app");
        let first = resolve_request(&raw, &project(), Dialect::Tsx, None, &context);
        let second = resolve_request(&raw, &project(), Dialect::Tsx, None, &context);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
