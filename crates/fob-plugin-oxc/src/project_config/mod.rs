//! Project configuration (tsconfig.json) support.
//!
//! The plugin consults the project's tsconfig.json for defaults the caller did
//! not set explicitly: target syntax level, JSX mode and factories, and a few
//! TypeScript emit flags. Reading is strictly best effort. Any problem is
//! logged as a warning and produces an empty [`ProjectConfigOptions`], so a
//! broken tsconfig.json never fails a build.

mod cache;
mod source;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ProjectConfigError;
use crate::options::{JsxConfig, JsxOption, RewriteImportExtensions};

pub use cache::ProjectConfigCache;
pub use source::{FsProjectConfigSource, ProjectConfigSource, TSCONFIG_FILE_NAME};

/// Compiler defaults derived from the project's tsconfig.json.
///
/// Each field is `Some` only when the corresponding tsconfig setting was
/// present (and, for boolean flags, enabled). Nothing is defaulted here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectConfigOptions {
    /// Target syntax level, e.g. `"es2020"`
    pub target: Option<String>,
    /// JSX mode and factories
    pub jsx: Option<JsxOption>,
    /// From `allowImportingTsExtensions`
    pub rewrite_import_extensions: Option<RewriteImportExtensions>,
    /// From `verbatimModuleSyntax`
    pub only_remove_type_imports: Option<bool>,
    /// From `experimentalDecorators`
    pub legacy_decorators: Option<bool>,
    /// From `emitDecoratorMetadata`
    pub emit_decorator_metadata: Option<bool>,
}

impl ProjectConfigOptions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Extract the relevant settings from a loaded tsconfig.json record.
    ///
    /// Fields are read independently: one with an unexpected JSON type is
    /// logged and skipped without affecting the others. Only a record whose
    /// root or `compilerOptions` is not an object is rejected.
    pub fn from_tsconfig(path: &Path, tsconfig: &Value) -> Result<Self, ProjectConfigError> {
        let invalid = |reason: &str| ProjectConfigError::Invalid {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let Value::Object(root) = tsconfig else {
            return Err(invalid("expected a JSON object at the top level"));
        };
        let options = match root.get("compilerOptions") {
            None | Some(Value::Null) => return Ok(Self::default()),
            Some(Value::Object(options)) => TsCompilerOptions { path, options },
            Some(_) => return Err(invalid("`compilerOptions` must be an object")),
        };

        Ok(Self {
            target: options
                .string("target")
                .as_deref()
                .and_then(target_from_tsconfig)
                .map(str::to_string),
            jsx: jsx_from_tsconfig(&options),
            rewrite_import_extensions: options
                .enabled("allowImportingTsExtensions")
                .map(|_| RewriteImportExtensions::Rewrite),
            only_remove_type_imports: options.enabled("verbatimModuleSyntax"),
            legacy_decorators: options.enabled("experimentalDecorators"),
            emit_decorator_metadata: options.enabled("emitDecoratorMetadata"),
        })
    }
}

/// `compilerOptions` of a tsconfig.json record, read field by field.
struct TsCompilerOptions<'a> {
    path: &'a Path,
    options: &'a Map<String, Value>,
}

impl TsCompilerOptions<'_> {
    fn field(&self, key: &str) -> Option<&Value> {
        self.options.get(key).filter(|value| !value.is_null())
    }

    fn string(&self, key: &str) -> Option<String> {
        let value = self.field(key)?;
        let string = value.as_str().map(str::to_string);
        if string.is_none() {
            self.skip(key, value);
        }
        string
    }

    /// `Some(true)` when the flag is set to `true`, `None` otherwise.
    fn enabled(&self, key: &str) -> Option<bool> {
        let value = self.field(key)?;
        match value.as_bool() {
            Some(true) => Some(true),
            Some(false) => None,
            None => {
                self.skip(key, value);
                None
            }
        }
    }

    fn skip(&self, key: &str, value: &Value) {
        warn!(
            path = %self.path.display(),
            "[fob-oxc] Ignoring compilerOptions.{} with unexpected value {}",
            key,
            value
        );
    }
}

/// Map a tsconfig `target` to the compiler's target query.
///
/// Matching is case-insensitive. Targets the compiler cannot lower to
/// (`ES3`) or does not know are omitted rather than defaulted.
pub fn target_from_tsconfig(target: &str) -> Option<&'static str> {
    let target = match target.to_ascii_lowercase().as_str() {
        "es5" => "es5",
        "es6" | "es2015" => "es2015",
        "es2016" => "es2016",
        "es2017" => "es2017",
        "es2018" => "es2018",
        "es2019" => "es2019",
        "es2020" => "es2020",
        "es2021" => "es2021",
        "es2022" => "es2022",
        "es2023" => "es2023",
        "es2024" => "es2024",
        "esnext" => "esnext",
        _ => return None,
    };
    Some(target)
}

fn jsx_from_tsconfig(options: &TsCompilerOptions) -> Option<JsxOption> {
    let mut config = match options.string("jsx").as_deref() {
        Some("preserve") => return Some(JsxOption::Preserve),
        Some("react") => JsxConfig::classic(),
        Some("react-jsx") => JsxConfig::automatic(),
        Some("react-jsxdev") => JsxConfig::automatic().with_development(true),
        _ => JsxConfig::default(),
    };

    config.pragma = options.string("jsxFactory");
    config.pragma_frag = options.string("jsxFragmentFactory");
    config.import_source = options.string("jsxImportSource");

    (!config.is_empty()).then_some(JsxOption::Config(config))
}

/// Best-effort reader turning a tsconfig.json into [`ProjectConfigOptions`].
#[derive(Debug, Clone)]
pub struct ProjectConfigReader {
    source: Arc<dyn ProjectConfigSource>,
    cache: Option<ProjectConfigCache>,
}

impl ProjectConfigReader {
    pub fn new(source: Arc<dyn ProjectConfigSource>) -> Self {
        Self {
            source,
            cache: None,
        }
    }

    /// Reuse derived options across modules that share a tsconfig.json.
    pub fn with_cache(mut self, cache: ProjectConfigCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&ProjectConfigCache> {
        self.cache.as_ref()
    }

    /// Read project defaults starting from `start`.
    ///
    /// Returns an empty record without touching the filesystem when
    /// `enabled` is false. Never fails: problems are logged and yield an empty
    /// record.
    pub fn read(&self, start: &Path, enabled: bool) -> ProjectConfigOptions {
        if !enabled {
            return ProjectConfigOptions::default();
        }

        let Some(path) = self.source.locate(start) else {
            warn!(
                start = %start.display(),
                "[fob-oxc] No {} found, continuing without project defaults",
                TSCONFIG_FILE_NAME
            );
            return ProjectConfigOptions::default();
        };

        if let Some(cached) = self.cache.as_ref().and_then(|cache| cache.get(&path)) {
            return cached;
        }

        match self.load(&path) {
            Ok(options) => {
                debug!(path = %path.display(), ?options, "[fob-oxc] Loaded project defaults");
                if let Some(cache) = &self.cache {
                    cache.insert(path, options.clone());
                }
                options
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "[fob-oxc] Ignoring unreadable project configuration"
                );
                ProjectConfigOptions::default()
            }
        }
    }

    fn load(&self, path: &Path) -> Result<ProjectConfigOptions, ProjectConfigError> {
        let tsconfig = self.source.load(path)?;
        ProjectConfigOptions::from_tsconfig(path, &tsconfig)
    }
}

impl Default for ProjectConfigReader {
    fn default() -> Self {
        Self::new(Arc::new(FsProjectConfigSource::new()))
    }
}
