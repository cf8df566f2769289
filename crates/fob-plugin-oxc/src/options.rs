//! Caller-supplied plugin options.
//!
//! [`OxcLoaderOptions`] is the option record a host hands to the plugin. It
//! holds two kinds of fields:
//!
//! - compiler passthrough options ([`CompilerOptions`] and the `jsx` option),
//!   which end up in the resolved transform request
//! - adapter-only switches (`sourcemap`, `refresh`, `autoDetectMarkup`,
//!   `useProjectConfig`, `projectConfigPath`), which are consumed while the
//!   request is resolved and never reach the compiler

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Options accepted by the plugin for one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OxcLoaderOptions {
    /// Compiler passthrough options
    #[serde(flatten)]
    pub compiler: CompilerOptions,

    /// JSX transform options (`"preserve"` or a partial record)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsx: Option<JsxOption>,

    /// Emit source maps (default: true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sourcemap: Option<bool>,

    /// Enable React Fast Refresh, effective only in development (default: false)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<bool>,

    /// Configure JSX automatically for `.jsx`/`.tsx` files (default: true)
    #[serde(
        default,
        alias = "autoDetectJsx",
        skip_serializing_if = "Option::is_none"
    )]
    pub auto_detect_markup: Option<bool>,

    /// Read defaults from the project's tsconfig.json (default: true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_project_config: Option<bool>,

    /// Explicit tsconfig file or directory to search from (default: build cwd)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_config_path: Option<PathBuf>,
}

impl OxcLoaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sourcemap_enabled(&self) -> bool {
        self.sourcemap != Some(false)
    }

    pub fn refresh_requested(&self) -> bool {
        self.refresh == Some(true)
    }

    pub fn auto_detect_markup(&self) -> bool {
        self.auto_detect_markup != Some(false)
    }

    pub fn use_project_config(&self) -> bool {
        self.use_project_config != Some(false)
    }

    pub fn with_sourcemap(mut self, enabled: bool) -> Self {
        self.sourcemap = Some(enabled);
        self
    }

    pub fn with_refresh(mut self, enabled: bool) -> Self {
        self.refresh = Some(enabled);
        self
    }

    pub fn with_jsx(mut self, jsx: JsxOption) -> Self {
        self.jsx = Some(jsx);
        self
    }

    pub fn with_auto_detect_markup(mut self, enabled: bool) -> Self {
        self.auto_detect_markup = Some(enabled);
        self
    }

    pub fn with_project_config(mut self, enabled: bool) -> Self {
        self.use_project_config = Some(enabled);
        self
    }

    pub fn with_project_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_config_path = Some(path.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.compiler.target = Some(Target::One(target.into()));
        self
    }

    pub fn with_define(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.compiler.define.insert(key.into(), value.into());
        self
    }
}

/// Options forwarded to the compiler without interpretation by the adapter
/// (other than precedence merging with project configuration).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    /// How to parse the module (default: module)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<ModuleKind>,

    /// Syntax level to lower to, e.g. `"es2020"` or `["es2020", "chrome80"]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,

    #[serde(default, skip_serializing_if = "TypeScriptConfig::is_empty")]
    pub typescript: TypeScriptConfig,

    #[serde(default, skip_serializing_if = "DecoratorConfig::is_empty")]
    pub decorator: DecoratorConfig,

    /// Global identifier replacements, e.g. `process.env.NODE_ENV` → `"\"production\""`
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub define: IndexMap<String, String>,
}

/// Module goal used when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Module,
    Script,
    Unambiguous,
}

/// Compilation target: a single query or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Target {
    One(String),
    Many(Vec<String>),
}

impl Target {
    /// Comma-separated target query understood by the compiler.
    pub fn to_query(&self) -> String {
        match self {
            Target::One(target) => target.clone(),
            Target::Many(targets) => targets.join(","),
        }
    }
}

/// TypeScript-specific passthrough options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeScriptConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsx_pragma: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsx_pragma_frag: Option<String>,

    /// Only remove imports explicitly marked `import type`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_remove_type_imports: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_namespaces: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_declare_fields: Option<bool>,

    /// Rewrite or remove `.ts` extensions in import specifiers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite_import_extensions: Option<RewriteImportExtensions>,
}

impl TypeScriptConfig {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriteImportExtensions {
    /// `./foo.ts` → `./foo.js`
    Rewrite,
    /// `./foo.ts` → `./foo`
    Remove,
}

/// Decorator passthrough options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoratorConfig {
    /// Use TypeScript's legacy (experimental) decorator semantics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emit_decorator_metadata: Option<bool>,
}

impl DecoratorConfig {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// JSX option as written by a user or derived from tsconfig.json.
///
/// Either the literal `"preserve"` (leave JSX untouched) or a partial record
/// whose absent fields fall back to lower-precedence sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsxOption {
    Preserve,
    Config(JsxConfig),
}

impl JsxOption {
    pub fn as_config(&self) -> Option<&JsxConfig> {
        match self {
            JsxOption::Preserve => None,
            JsxOption::Config(config) => Some(config),
        }
    }

    pub fn is_preserve(&self) -> bool {
        matches!(self, JsxOption::Preserve)
    }
}

impl From<JsxConfig> for JsxOption {
    fn from(config: JsxConfig) -> Self {
        JsxOption::Config(config)
    }
}

impl Serialize for JsxOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            JsxOption::Preserve => serializer.serialize_str("preserve"),
            JsxOption::Config(config) => config.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for JsxOption {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Tag(String),
            Config(JsxConfig),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Tag(tag) if tag == "preserve" => Ok(JsxOption::Preserve),
            Raw::Tag(tag) => Err(serde::de::Error::custom(format!(
                "invalid jsx option \"{}\", expected \"preserve\" or an options object",
                tag
            ))),
            Raw::Config(config) => Ok(JsxOption::Config(config)),
        }
    }
}

/// JSX runtime flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsxRuntime {
    /// `React.createElement` style calls to a pragma
    Classic,
    /// Auto-imported `jsx`/`jsxs` helpers
    #[default]
    Automatic,
}

/// Partial JSX transform configuration.
///
/// Every field is optional so that records from different sources can be
/// layered field by field with [`JsxConfig::overlay`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsxConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<JsxRuntime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub development: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<bool>,

    /// Factory for classic runtime (default `React.createElement`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pragma: Option<String>,

    /// Fragment factory for classic runtime (default `React.Fragment`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pragma_frag: Option<String>,

    /// Module the automatic runtime imports helpers from (default `react`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throw_if_namespace: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pure: Option<bool>,
}

impl JsxConfig {
    pub fn classic() -> Self {
        Self {
            runtime: Some(JsxRuntime::Classic),
            ..Self::default()
        }
    }

    pub fn automatic() -> Self {
        Self {
            runtime: Some(JsxRuntime::Automatic),
            ..Self::default()
        }
    }

    pub fn with_pragma(mut self, pragma: impl Into<String>) -> Self {
        self.pragma = Some(pragma.into());
        self
    }

    pub fn with_pragma_frag(mut self, pragma_frag: impl Into<String>) -> Self {
        self.pragma_frag = Some(pragma_frag.into());
        self
    }

    pub fn with_import_source(mut self, import_source: impl Into<String>) -> Self {
        self.import_source = Some(import_source.into());
        self
    }

    pub fn with_development(mut self, development: bool) -> Self {
        self.development = Some(development);
        self
    }

    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = Some(refresh);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Layer `top` over `self`: every field set in `top` wins, every field
    /// `top` leaves unset keeps the value from `self`.
    pub fn overlay(self, top: &JsxConfig) -> JsxConfig {
        JsxConfig {
            runtime: top.runtime.or(self.runtime),
            development: top.development.or(self.development),
            refresh: top.refresh.or(self.refresh),
            pragma: top.pragma.clone().or(self.pragma),
            pragma_frag: top.pragma_frag.clone().or(self.pragma_frag),
            import_source: top.import_source.clone().or(self.import_source),
            throw_if_namespace: top.throw_if_namespace.or(self.throw_if_namespace),
            pure: top.pure.or(self.pure),
        }
    }
}
