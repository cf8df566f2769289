//! [`Compiler`] implementation backed by the oxc toolchain.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_diagnostics::{GraphicalReportHandler, GraphicalTheme, NamedSource, OxcDiagnostic};
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::{
    EnvOptions, JsxOptions, JsxRuntime as OxcJsxRuntime, ReactRefreshOptions,
    RewriteExtensionsMode, TransformOptions, Transformer,
};
use oxc_transformer_plugins::{ReplaceGlobalDefines, ReplaceGlobalDefinesConfig};
use tokio::task::JoinError;
use tracing::{debug, trace};

use super::{Compiler, CompilerDiagnostic, CompilerOutput};
use crate::error::CompilerError;
use crate::merge::ResolvedTransformRequest;
use crate::options::{
    CompilerOptions, JsxConfig, JsxOption, JsxRuntime, ModuleKind, RewriteImportExtensions,
    Target,
};
use crate::translate::SourceMapRecord;

/// Compiles modules with oxc: parse, semantic analysis, transform, codegen.
///
/// oxc is synchronous and CPU bound, so each module runs on tokio's blocking
/// pool. A panic inside oxc surfaces as [`CompilerError::Panicked`] instead of
/// tearing down the build.
#[derive(Debug, Clone, Copy, Default)]
pub struct OxcCompiler;

impl OxcCompiler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Compiler for OxcCompiler {
    async fn compile(
        &self,
        path: &Path,
        source: &str,
        request: &ResolvedTransformRequest,
    ) -> Result<CompilerOutput, CompilerError> {
        let id = path.display().to_string();
        let path = path.to_path_buf();
        let source = source.to_string();
        let request = request.clone();

        tokio::task::spawn_blocking(move || compile_module(&path, &source, &request))
            .await
            .map_err(|err| join_error(id, err))?
    }
}

pub(crate) fn join_error(id: String, err: JoinError) -> CompilerError {
    if !err.is_panic() {
        return CompilerError::Cancelled { id };
    }

    let payload = err.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    CompilerError::Panicked { id, message }
}

/// Run the full oxc pipeline for one module on the current thread.
pub(crate) fn compile_module(
    path: &Path,
    source: &str,
    request: &ResolvedTransformRequest,
) -> Result<CompilerOutput, CompilerError> {
    let options = transform_options(request)?;
    let frames = CodeFrames::new(path, source);
    let allocator = Allocator::default();

    let parsed = Parser::new(&allocator, source, source_type(request)).parse();
    if parsed.panicked || !parsed.errors.is_empty() {
        debug!(
            "[fob-oxc] {} parse error(s) in {}",
            parsed.errors.len(),
            path.display()
        );
        return Ok(CompilerOutput::failure(frames.render_all(parsed.errors)));
    }
    let mut program = parsed.program;

    let semantic = SemanticBuilder::new().build(&program);
    if !semantic.errors.is_empty() {
        return Ok(CompilerOutput::failure(frames.render_all(semantic.errors)));
    }
    let scoping = semantic.semantic.into_scoping();

    let transformed =
        Transformer::new(&allocator, path, &options).build_with_scoping(scoping, &mut program);
    if !transformed.errors.is_empty() {
        return Ok(CompilerOutput::failure(frames.render_all(transformed.errors)));
    }

    if !request.options.define.is_empty() {
        let config = define_config(&request.options.define)?;
        ReplaceGlobalDefines::new(&allocator, config).build(transformed.scoping, &mut program);
    }

    let generated = Codegen::new()
        .with_options(CodegenOptions {
            source_map_path: request.sourcemap.then(|| path.to_path_buf()),
            ..CodegenOptions::default()
        })
        .build(&program);

    let map = generated
        .map
        .map(|map| SourceMapRecord::from_json(&map.to_json_string()))
        .transpose()
        .map_err(|err| CompilerError::InvalidOutput {
            id: path.display().to_string(),
            reason: err.to_string(),
        })?;

    trace!(
        "[fob-oxc] Compiled {} ({} → {} bytes)",
        path.display(),
        source.len(),
        generated.code.len()
    );
    Ok(CompilerOutput::success(generated.code, map))
}

/// Parser source type for the request.
///
/// Plain JavaScript is parsed with JSX enabled when a JSX configuration was
/// resolved for it, so explicit `jsx` options work on `.js` files too.
fn source_type(request: &ResolvedTransformRequest) -> SourceType {
    let mut source_type = request.dialect.source_type();
    if !request.dialect.is_typescript() && request.jsx.is_some() {
        source_type = source_type.with_jsx(true);
    }

    match request.options.source_type {
        Some(ModuleKind::Script) => source_type.with_script(true),
        Some(ModuleKind::Unambiguous) => source_type.with_unambiguous(true),
        Some(ModuleKind::Module) | None => source_type.with_module(true),
    }
}

/// Translate a resolved request into oxc transformer options.
pub(crate) fn transform_options(
    request: &ResolvedTransformRequest,
) -> Result<TransformOptions, CompilerError> {
    let CompilerOptions {
        target,
        typescript,
        decorator,
        ..
    } = &request.options;

    let mut options = TransformOptions {
        cwd: request.cwd.clone(),
        jsx: jsx_options(request.jsx.as_ref()),
        ..TransformOptions::default()
    };

    if let Some(target) = target {
        options.env = match target {
            Target::One(target) => EnvOptions::from_target(target),
            Target::Many(targets) => EnvOptions::from_target_list(targets.as_slice()),
        }
        .map_err(|err| CompilerError::invalid_option("target", err))?;
    }

    let ts = &mut options.typescript;
    if let Some(pragma) = &typescript.jsx_pragma {
        ts.jsx_pragma = pragma.clone().into();
    }
    if let Some(pragma_frag) = &typescript.jsx_pragma_frag {
        ts.jsx_pragma_frag = pragma_frag.clone().into();
    }
    ts.only_remove_type_imports = typescript
        .only_remove_type_imports
        .unwrap_or(ts.only_remove_type_imports);
    ts.allow_namespaces = typescript.allow_namespaces.unwrap_or(ts.allow_namespaces);
    ts.allow_declare_fields = typescript
        .allow_declare_fields
        .unwrap_or(ts.allow_declare_fields);
    ts.rewrite_import_extensions = typescript.rewrite_import_extensions.map(|mode| match mode {
        RewriteImportExtensions::Rewrite => RewriteExtensionsMode::Rewrite,
        RewriteImportExtensions::Remove => RewriteExtensionsMode::Remove,
    });

    options.decorator.legacy = decorator.legacy.unwrap_or(false);
    options.decorator.emit_decorator_metadata = decorator.emit_decorator_metadata.unwrap_or(false);

    Ok(options)
}

fn jsx_options(jsx: Option<&JsxOption>) -> JsxOptions {
    match jsx {
        Some(JsxOption::Config(config)) => jsx_config_options(config),
        // No transform and "preserve" both leave JSX syntax untouched
        Some(JsxOption::Preserve) | None => JsxOptions {
            jsx_plugin: false,
            display_name_plugin: false,
            jsx_self_plugin: false,
            jsx_source_plugin: false,
            refresh: None,
            ..JsxOptions::default()
        },
    }
}

fn jsx_config_options(config: &JsxConfig) -> JsxOptions {
    let defaults = JsxOptions::default();
    JsxOptions {
        runtime: match config.runtime.unwrap_or_default() {
            JsxRuntime::Classic => OxcJsxRuntime::Classic,
            JsxRuntime::Automatic => OxcJsxRuntime::Automatic,
        },
        development: config.development.unwrap_or(false),
        throw_if_namespace: config
            .throw_if_namespace
            .unwrap_or(defaults.throw_if_namespace),
        pure: config.pure.unwrap_or(defaults.pure),
        pragma: config.pragma.clone(),
        pragma_frag: config.pragma_frag.clone(),
        import_source: config.import_source.clone(),
        refresh: config
            .refresh
            .unwrap_or(false)
            .then(ReactRefreshOptions::default),
        ..defaults
    }
}

fn define_config(
    define: &IndexMap<String, String>,
) -> Result<ReplaceGlobalDefinesConfig, CompilerError> {
    let pairs: Vec<(&str, &str)> = define
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();

    ReplaceGlobalDefinesConfig::new(pairs.as_slice()).map_err(|errors| {
        let reason = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        CompilerError::invalid_option("define", reason)
    })
}

/// Renders oxc diagnostics against the module source.
struct CodeFrames {
    source: Arc<NamedSource<String>>,
    handler: GraphicalReportHandler,
}

impl CodeFrames {
    fn new(path: &Path, source: &str) -> Self {
        Self {
            source: Arc::new(NamedSource::new(
                path.display().to_string(),
                source.to_string(),
            )),
            handler: GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor()),
        }
    }

    fn render_all(&self, errors: Vec<OxcDiagnostic>) -> Vec<CompilerDiagnostic> {
        errors.into_iter().map(|error| self.render(error)).collect()
    }

    fn render(&self, error: OxcDiagnostic) -> CompilerDiagnostic {
        let diagnostic = CompilerDiagnostic::new(error.to_string());
        let report = error.with_source_code(Arc::clone(&self.source));

        let mut frame = String::new();
        match self.handler.render_report(&mut frame, report.as_ref()) {
            Ok(()) if !frame.trim().is_empty() => diagnostic.with_codeframe(frame.trim_end()),
            _ => diagnostic,
        }
    }
}
