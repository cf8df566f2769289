//! Rolldown plugin that compiles JavaScript, TypeScript and JSX with oxc
//!
//! For every script module Rolldown hands to the `transform` hook, the plugin
//! decides how the module should be compiled and lets oxc do the work:
//!
//! ```text
//! module id ─▶ dialect (from extension)
//!           ─▶ tsconfig.json defaults (best effort)
//!           ─▶ JSX configuration (caller > tsconfig > build mode)
//!           ─▶ resolved request (caller options win, adapter keys stripped)
//!           ─▶ oxc (parse, transform, codegen)
//!           ─▶ code + source map, or one aggregated error
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fob_plugin_oxc::{BuildContext, FobOxcPlugin, OxcLoaderOptions};
//! use std::sync::Arc;
//!
//! let options = OxcLoaderOptions::default()
//!     .with_target("es2020")
//!     .with_refresh(true);
//! let plugin = Arc::new(FobOxcPlugin::new(BuildContext::development(".")).with_options(options));
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use rolldown_common::ModuleType;
use rolldown_plugin::{
    HookTransformArgs, HookTransformOutput, HookTransformReturn, HookUsage, Plugin,
    SharedTransformPluginContext,
};
use tracing::debug;

mod compiler;
mod config;
mod context;
mod dialect;
mod error;
mod jsx;
#[cfg(feature = "logging")]
pub mod logging;
mod merge;
mod options;
mod pipeline;
mod project_config;
mod translate;

pub use compiler::{Compiler, CompilerDiagnostic, CompilerOutput, OxcCompiler};
pub use config::{CONFIG_FILE_NAME, CONFIG_SECTION, ENV_PREFIX};
pub use context::{BuildContext, BuildMode};
pub use dialect::Dialect;
pub use error::{
    CompilerError, ConfigError, ProjectConfigError, TRANSFORM_ERROR_BANNER, TransformError,
};
pub use jsx::{JsxSources, resolve_jsx};
pub use merge::{ResolvedTransformRequest, resolve_request};
pub use options::{
    CompilerOptions, DecoratorConfig, JsxConfig, JsxOption, JsxRuntime, ModuleKind,
    OxcLoaderOptions, RewriteImportExtensions, Target, TypeScriptConfig,
};
pub use pipeline::OxcTransformPipeline;
pub use project_config::{
    FsProjectConfigSource, ProjectConfigCache, ProjectConfigOptions, ProjectConfigReader,
    ProjectConfigSource, TSCONFIG_FILE_NAME, target_from_tsconfig,
};
pub use translate::{SourceMapRecord, TransformOutcome, aggregate_diagnostics, translate};

/// Extensions the plugin compiles by default
pub const SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs", "mts", "cts"];

/// Decides which module ids the plugin claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFilter {
    extensions: Vec<String>,
    include_node_modules: bool,
}

impl ModuleFilter {
    pub fn new() -> Self {
        Self {
            extensions: SCRIPT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            include_node_modules: false,
        }
    }

    /// Replace the claimed extensions (without leading dots).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Also compile modules inside `node_modules` (off by default).
    pub fn with_node_modules(mut self, include: bool) -> Self {
        self.include_node_modules = include;
        self
    }

    pub fn matches(&self, id: &str) -> bool {
        // Virtual modules from other plugins
        if id.starts_with('\0') {
            return false;
        }

        let path = dialect::strip_query(id);
        if !self.include_node_modules
            && (path.contains("/node_modules/") || path.contains("\\node_modules\\"))
        {
            return false;
        }

        dialect::extension_of(id)
            .is_some_and(|ext| self.extensions.iter().any(|claimed| claimed == ext))
    }
}

impl Default for ModuleFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Rolldown plugin compiling script modules with oxc
///
/// Construction fixes the build context (cwd and mode) and the caller's
/// options; every module is then resolved and compiled independently.
#[derive(Debug, Clone)]
pub struct FobOxcPlugin {
    pipeline: Arc<OxcTransformPipeline>,
    filter: ModuleFilter,
}

impl FobOxcPlugin {
    /// Create a plugin with default options.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fob_plugin_oxc::{BuildContext, FobOxcPlugin};
    ///
    /// let plugin = FobOxcPlugin::new(BuildContext::production("."));
    /// ```
    pub fn new(context: BuildContext) -> Self {
        Self {
            pipeline: Arc::new(OxcTransformPipeline::new(
                context,
                OxcLoaderOptions::default(),
            )),
            filter: ModuleFilter::default(),
        }
    }

    pub fn with_options(self, options: OxcLoaderOptions) -> Self {
        self.map_pipeline(|pipeline| pipeline.with_options(options))
    }

    /// Use a different compiler backend.
    pub fn with_compiler(self, compiler: Arc<dyn Compiler>) -> Self {
        self.map_pipeline(|pipeline| pipeline.with_compiler(compiler))
    }

    /// Serve tsconfig.json from somewhere other than the local filesystem.
    pub fn with_project_config_source(self, source: Arc<dyn ProjectConfigSource>) -> Self {
        self.map_pipeline(|pipeline| {
            let mut reader = ProjectConfigReader::new(source);
            if let Some(cache) = pipeline.project_config().cache() {
                reader = reader.with_cache(cache.clone());
            }
            pipeline.with_project_config(reader)
        })
    }

    /// Share derived tsconfig.json options across modules (and plugins).
    pub fn with_project_config_cache(self, cache: ProjectConfigCache) -> Self {
        self.map_pipeline(|pipeline| {
            let reader = pipeline.project_config().clone().with_cache(cache);
            pipeline.with_project_config(reader)
        })
    }

    pub fn with_filter(mut self, filter: ModuleFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn pipeline(&self) -> &OxcTransformPipeline {
        &self.pipeline
    }

    pub fn filter(&self) -> &ModuleFilter {
        &self.filter
    }

    /// Compile one module the way the `transform` hook does.
    ///
    /// Returns `Ok(None)` for ids the filter does not claim. The output is
    /// tagged `ModuleType::Jsx` when the markup was preserved, so Rolldown
    /// parses it as JSX.
    pub async fn transform_module(
        &self,
        id: &str,
        code: &str,
    ) -> Result<Option<HookTransformOutput>, TransformError> {
        if !self.filter.matches(id) {
            return Ok(None);
        }

        debug!("[fob-oxc] Transform hook called for: {}", id);
        let outcome = self.pipeline.transform(id, code).await?;
        let map = outcome
            .map
            .as_ref()
            .map(|map| map.to_source_map(id))
            .transpose()?;

        debug!(
            "[fob-oxc] Transformed {} ({} → {} bytes)",
            id,
            code.len(),
            outcome.code.len()
        );

        Ok(Some(HookTransformOutput {
            code: Some(outcome.code),
            map,
            side_effects: None,
            module_type: Some(if outcome.jsx_preserved {
                ModuleType::Jsx
            } else {
                ModuleType::Js
            }),
        }))
    }

    fn map_pipeline(
        self,
        f: impl FnOnce(OxcTransformPipeline) -> OxcTransformPipeline,
    ) -> Self {
        Self {
            pipeline: Arc::new(f(Arc::unwrap_or_clone(self.pipeline))),
            filter: self.filter,
        }
    }
}

impl Plugin for FobOxcPlugin {
    fn name(&self) -> Cow<'static, str> {
        "fob-oxc".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::Transform
    }

    /// Compile a script module.
    ///
    /// - `Ok(Some(output))` - compiled JavaScript (JSX when preserved) and map
    /// - `Ok(None)` - module not claimed by the filter
    /// - `Err(e)` - compiler diagnostics or a failed compiler call
    fn transform(
        &self,
        _ctx: SharedTransformPluginContext,
        args: &HookTransformArgs<'_>,
    ) -> impl std::future::Future<Output = HookTransformReturn> + Send {
        let id = args.id.to_string();
        let code = args.code.to_string();
        let plugin = self.clone();

        async move { Ok(plugin.transform_module(&id, &code).await?) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_name() {
        let plugin = FobOxcPlugin::new(BuildContext::default());
        assert_eq!(plugin.name(), "fob-oxc");
    }

    #[test]
    fn test_filter_claims_script_modules() {
        let filter = ModuleFilter::default();
        for id in [
            "/src/a.js",
            "/src/App.jsx",
            "/src/a.ts",
            "/src/App.tsx?v=2",
            "/src/a.mts",
            "/src/a.cjs",
        ] {
            assert!(filter.matches(id), "{} should be claimed", id);
        }
        assert!(!filter.matches("/src/styles.css"));
        assert!(!filter.matches("/src/data.json"));
        assert!(!filter.matches("\0virtual:entry.js"));
    }

    #[test]
    fn test_filter_node_modules() {
        let id = "/app/node_modules/react/index.js";
        assert!(!ModuleFilter::default().matches(id));
        assert!(ModuleFilter::default().with_node_modules(true).matches(id));
    }

    #[test]
    fn test_filter_custom_extensions() {
        let filter = ModuleFilter::new().with_extensions(["ts"]);
        assert!(filter.matches("/src/a.ts"));
        assert!(!filter.matches("/src/a.js"));
    }

    fn plugin(options: OxcLoaderOptions) -> FobOxcPlugin {
        FobOxcPlugin::new(BuildContext::development("/nonexistent/project"))
            .with_options(options.with_project_config(false))
    }

    #[tokio::test]
    async fn test_transform_module_skips_unclaimed_ids() {
        let plugin = plugin(OxcLoaderOptions::default());
        for id in ["/src/styles.css", "\0virtual:entry.js", "/app/node_modules/x/index.js"] {
            assert!(plugin.transform_module(id, "body {}").await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_transform_module_emits_js_with_map() {
        let output = plugin(OxcLoaderOptions::default())
            .transform_module("/src/a.ts", "const x: number = 1;")
            .await
            .unwrap()
            .unwrap();

        assert!(output.code.as_deref().unwrap().contains("const x = 1"));
        assert!(output.map.is_some());
        assert!(matches!(output.module_type, Some(ModuleType::Js)));
    }

    #[tokio::test]
    async fn test_transform_module_preserved_markup_is_jsx() {
        let options = OxcLoaderOptions::default()
            .with_jsx(JsxOption::Preserve)
            .with_sourcemap(false);
        let output = plugin(options)
            .transform_module("/src/App.tsx", "export const App = () => <div />;")
            .await
            .unwrap()
            .unwrap();

        assert!(output.code.as_deref().unwrap().contains("<div"));
        assert!(output.map.is_none());
        assert!(matches!(output.module_type, Some(ModuleType::Jsx)));
    }

    #[tokio::test]
    async fn test_transform_module_reports_diagnostics() {
        let err = plugin(OxcLoaderOptions::default())
            .transform_module("/src/broken.js", "const = ;")
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::Diagnostics { .. }));
    }

    #[test]
    fn test_builders_keep_context() {
        let cache = ProjectConfigCache::new();
        let plugin = FobOxcPlugin::new(BuildContext::production("/repo"))
            .with_project_config_cache(cache.clone())
            .with_options(OxcLoaderOptions::default().with_sourcemap(false))
            .with_project_config_source(Arc::new(FsProjectConfigSource::new()));

        let pipeline = plugin.pipeline();
        assert_eq!(pipeline.context().mode, BuildMode::Production);
        assert!(!pipeline.options().sourcemap_enabled());
        assert!(pipeline.project_config().cache().is_some());
    }
}
