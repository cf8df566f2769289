//! Locating and loading tsconfig.json files.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use oxc_resolver::{ResolveOptions, Resolver};
use serde_json::{Value, json};
use tracing::trace;

use crate::error::ProjectConfigError;

/// File name searched for when walking up from a directory
pub const TSCONFIG_FILE_NAME: &str = "tsconfig.json";

/// Source of project type-checker configuration.
///
/// The plugin only needs two capabilities: finding the configuration file
/// that applies to a starting point, and loading it as a JSON record with any
/// inheritance already applied. Implement this trait to serve configuration
/// from somewhere other than the local filesystem.
pub trait ProjectConfigSource: Send + Sync + fmt::Debug {
    /// Find the configuration file for `start`.
    ///
    /// `start` is either an explicit configuration file or a directory to
    /// search upwards from. Returns `None` when nothing applies.
    fn locate(&self, start: &Path) -> Option<PathBuf>;

    /// Load the configuration at `path` as a JSON object.
    fn load(&self, path: &Path) -> Result<Value, ProjectConfigError>;
}

/// Filesystem-backed [`ProjectConfigSource`].
///
/// Parsing and `extends` chains are handled by oxc_resolver, which accepts
/// comments, trailing commas and a leading BOM, resolves bare specifiers such
/// as `@tsconfig/node20/tsconfig.json` from `node_modules`, and rejects
/// circular chains.
///
/// oxc_resolver types its compiler options strictly: a known field with the
/// wrong JSON type (`"jsxFactory": 5`) makes the whole file unreadable.
/// `allowImportingTsExtensions` is not part of that typed set and is read
/// from the located file itself, not from the files it extends.
///
/// Every load builds its own resolver, so edits on disk are picked up by the
/// next read. Use a [`super::ProjectConfigCache`] to share loads instead.
#[derive(Debug, Clone)]
pub struct FsProjectConfigSource {
    options: ResolveOptions,
}

impl FsProjectConfigSource {
    pub fn new() -> Self {
        Self {
            options: ResolveOptions::default(),
        }
    }
}

impl Default for FsProjectConfigSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectConfigSource for FsProjectConfigSource {
    fn locate(&self, start: &Path) -> Option<PathBuf> {
        if start.is_file() {
            return Some(start.to_path_buf());
        }
        // A missing explicit file is not replaced by some other tsconfig.json
        if !start.is_dir() {
            return None;
        }

        let mut current = Some(start);
        while let Some(dir) = current {
            let candidate = dir.join(TSCONFIG_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            current = dir.parent();
        }
        None
    }

    fn load(&self, path: &Path) -> Result<Value, ProjectConfigError> {
        let tsconfig = Resolver::new(self.options.clone())
            .resolve_tsconfig(path)
            .map_err(|source| ProjectConfigError::Resolve {
                path: path.to_path_buf(),
                source,
            })?;
        trace!(path = %tsconfig.path().display(), "[fob-oxc] Resolved tsconfig chain");

        let options = &tsconfig.compiler_options;
        Ok(json!({
            "compilerOptions": {
                "target": options.target,
                "jsx": options.jsx,
                "jsxFactory": options.jsx_factory,
                "jsxFragmentFactory": options.jsx_fragment_factory,
                "jsxImportSource": options.jsx_import_source,
                "verbatimModuleSyntax": options.verbatim_module_syntax,
                "experimentalDecorators": options.experimental_decorators,
                "emitDecoratorMetadata": options.emit_decorator_metadata,
                "allowImportingTsExtensions": allow_importing_ts_extensions(tsconfig.path())?,
            }
        }))
    }
}

fn allow_importing_ts_extensions(path: &Path) -> Result<Option<bool>, ProjectConfigError> {
    let io_error = |source| ProjectConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut content = fs::read_to_string(path).map_err(io_error)?;
    json_strip_comments::strip(&mut content).map_err(io_error)?;
    let value: Value = serde_json::from_str(content.trim_start_matches('\u{feff}')).map_err(
        |source| ProjectConfigError::Parse {
            path: path.to_path_buf(),
            source,
        },
    )?;

    Ok(value
        .pointer("/compilerOptions/allowImportingTsExtensions")
        .and_then(Value::as_bool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn compiler_options(loaded: &Value) -> &Value {
        &loaded["compilerOptions"]
    }

    #[test]
    fn test_locate_walks_up() {
        let dir = TempDir::new().unwrap();
        let config = write(dir.path(), "tsconfig.json", "{}");
        let nested = dir.path().join("packages/app/src");
        fs::create_dir_all(&nested).unwrap();

        let source = FsProjectConfigSource::new();
        assert_eq!(source.locate(&nested), Some(config));
    }

    #[test]
    fn test_locate_explicit_file() {
        let dir = TempDir::new().unwrap();
        let config = write(dir.path(), "tsconfig.app.json", "{}");

        let source = FsProjectConfigSource::new();
        assert_eq!(source.locate(&config), Some(config.clone()));
    }

    #[test]
    fn test_locate_missing_explicit_file_does_not_fall_back() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "tsconfig.json", r#"{"compilerOptions": {"target": "ES2015"}}"#);

        let source = FsProjectConfigSource::new();
        assert_eq!(source.locate(&dir.path().join("tsconfig.app.json")), None);
        assert_eq!(source.locate(&dir.path().join("missing/dir")), None);
    }

    #[test]
    fn test_comments_trailing_commas_and_bom() {
        let dir = TempDir::new().unwrap();
        let config = write(
            dir.path(),
            "tsconfig.json",
            "\u{FEFF}{\n  // build settings\n  \"compilerOptions\": { \"target\": \"ES2015\", },\n}",
        );

        let loaded = FsProjectConfigSource::new().load(&config).unwrap();
        assert_eq!(compiler_options(&loaded)["target"], "ES2015");
    }

    #[test]
    fn test_relative_extends_child_wins() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "configs/base.json",
            r#"{
  // shared settings
  "compilerOptions": { "target": "ES2019", "jsx": "react", "jsxFactory": "h" }
}"#,
        );
        let config = write(
            dir.path(),
            "tsconfig.json",
            r#"{
  "extends": "./configs/base",
  "compilerOptions": { "target": "ES2022", },
}"#,
        );

        let loaded = FsProjectConfigSource::new().load(&config).unwrap();
        let options = compiler_options(&loaded);
        assert_eq!(options["target"], "ES2022");
        assert_eq!(options["jsx"], "react");
        assert_eq!(options["jsxFactory"], "h");
    }

    #[test]
    fn test_package_extends() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "node_modules/@tsconfig/base/tsconfig.json",
            r#"{"compilerOptions": {"verbatimModuleSyntax": true}}"#,
        );
        write(
            dir.path(),
            "node_modules/@tsconfig/base/package.json",
            r#"{"name": "@tsconfig/base", "version": "1.0.0"}"#,
        );
        let config = write(
            dir.path(),
            "tsconfig.json",
            r#"{"extends": "@tsconfig/base/tsconfig.json"}"#,
        );

        let loaded = FsProjectConfigSource::new().load(&config).unwrap();
        assert_eq!(compiler_options(&loaded)["verbatimModuleSyntax"], true);
    }

    #[test]
    fn test_allow_importing_ts_extensions_from_located_file() {
        let dir = TempDir::new().unwrap();
        let config = write(
            dir.path(),
            "tsconfig.json",
            "{\n  /* bundler mode */\n  \"compilerOptions\": { \"allowImportingTsExtensions\": true }\n}",
        );

        let loaded = FsProjectConfigSource::new().load(&config).unwrap();
        assert_eq!(compiler_options(&loaded)["allowImportingTsExtensions"], true);
        assert!(compiler_options(&loaded)["target"].is_null());
    }

    #[test]
    fn test_circular_extends() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.json", r#"{"extends": "./b.json"}"#);
        let config = write(dir.path(), "b.json", r#"{"extends": "./a.json"}"#);

        let err = FsProjectConfigSource::new().load(&config).unwrap_err();
        assert!(matches!(err, ProjectConfigError::Resolve { .. }));
    }

    #[test]
    fn test_missing_extends() {
        let dir = TempDir::new().unwrap();
        let config = write(dir.path(), "tsconfig.json", r#"{"extends": "./missing.json"}"#);

        let err = FsProjectConfigSource::new().load(&config).unwrap_err();
        assert!(matches!(err, ProjectConfigError::Resolve { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let dir = TempDir::new().unwrap();
        let config = write(dir.path(), "tsconfig.json", r#"{"compilerOptions": "#);

        let err = FsProjectConfigSource::new().load(&config).unwrap_err();
        assert!(matches!(err, ProjectConfigError::Resolve { .. }));
    }

    #[test]
    fn test_edits_seen_by_next_load() {
        let dir = TempDir::new().unwrap();
        let config = write(dir.path(), "tsconfig.json", r#"{"compilerOptions": {"target": "ES2017"}}"#);
        let source = FsProjectConfigSource::new();
        assert_eq!(compiler_options(&source.load(&config).unwrap())["target"], "ES2017");

        write(dir.path(), "tsconfig.json", r#"{"compilerOptions": {"target": "ES2020"}}"#);
        assert_eq!(compiler_options(&source.load(&config).unwrap())["target"], "ES2020");
    }
}
