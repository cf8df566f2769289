//! The per-module transform pipeline.
//!
//! ```text
//! id ─▶ Dialect::detect ─▶ ProjectConfigReader::read ─▶ resolve_jsx
//!    ─▶ resolve_request ─▶ Compiler::compile ─▶ translate ─▶ outcome
//! ```
//!
//! The pipeline holds no per-module state: every call resolves its request
//! from scratch (optionally served from the project-config cache) and
//! returns its result, so concurrent calls may interleave freely.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::compiler::{Compiler, OxcCompiler, join_error};
use crate::context::BuildContext;
use crate::dialect::{Dialect, strip_query};
use crate::error::{CompilerError, TransformError};
use crate::jsx::{JsxSources, resolve_jsx};
use crate::merge::{ResolvedTransformRequest, resolve_request};
use crate::options::OxcLoaderOptions;
use crate::project_config::ProjectConfigReader;
use crate::translate::{TransformOutcome, translate};

#[derive(Debug, Clone)]
pub struct OxcTransformPipeline {
    context: BuildContext,
    options: OxcLoaderOptions,
    compiler: Arc<dyn Compiler>,
    project_config: ProjectConfigReader,
}

impl OxcTransformPipeline {
    pub fn new(context: BuildContext, options: OxcLoaderOptions) -> Self {
        Self {
            context,
            options,
            compiler: Arc::new(OxcCompiler::new()),
            project_config: ProjectConfigReader::default(),
        }
    }

    pub fn with_options(mut self, options: OxcLoaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_compiler(mut self, compiler: Arc<dyn Compiler>) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn with_project_config(mut self, reader: ProjectConfigReader) -> Self {
        self.project_config = reader;
        self
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    pub fn options(&self) -> &OxcLoaderOptions {
        &self.options
    }

    pub fn project_config(&self) -> &ProjectConfigReader {
        &self.project_config
    }

    /// Where the tsconfig.json search starts: `projectConfigPath` resolved
    /// against the build cwd, or the cwd itself.
    pub fn project_config_start(&self) -> PathBuf {
        match &self.options.project_config_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.context.cwd.join(path),
            None => self.context.cwd.clone(),
        }
    }

    /// Resolve the compiler request for a module without compiling it.
    pub fn resolve(&self, id: &str) -> ResolvedTransformRequest {
        let dialect = Dialect::detect(id);
        let project = self
            .project_config
            .read(&self.project_config_start(), self.options.use_project_config());

        let jsx = resolve_jsx(JsxSources {
            dialect,
            auto_detect: self.options.auto_detect_markup(),
            caller: self.options.jsx.as_ref(),
            project: project.jsx.as_ref(),
            mode: self.context.mode,
            refresh: self.options.refresh_requested(),
        });

        let request = resolve_request(&self.options, &project, dialect, jsx, &self.context);
        debug!(
            "[fob-oxc] Resolved {} as {} (jsx: {}, target: {:?})",
            id,
            dialect,
            describe_jsx(&request),
            request.options.target
        );
        request
    }

    /// [`Self::resolve`] on tokio's blocking pool when it may read tsconfig.json.
    async fn resolve_blocking(&self, id: &str) -> Result<ResolvedTransformRequest, CompilerError> {
        if !self.options.use_project_config() {
            return Ok(self.resolve(id));
        }

        let pipeline = self.clone();
        let module = id.to_string();
        tokio::task::spawn_blocking(move || pipeline.resolve(&module))
            .await
            .map_err(|err| join_error(id.to_string(), err))
    }

    /// Transform one module.
    ///
    /// Compiler diagnostics and compiler call failures both come back as
    /// `Err`; tsconfig.json problems never do.
    pub async fn transform(&self, id: &str, source: &str) -> Result<TransformOutcome, TransformError> {
        let request = self.resolve_blocking(id).await?;
        let output = self
            .compiler
            .compile(Path::new(strip_query(id)), source, &request)
            .await?;
        translate(id, output, &request)
    }
}

fn describe_jsx(request: &ResolvedTransformRequest) -> &'static str {
    match &request.jsx {
        None => "off",
        Some(jsx) if jsx.is_preserve() => "preserve",
        Some(_) => "transform",
    }
}
