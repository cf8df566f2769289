//! Error types for the oxc transform plugin

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Banner that starts every aggregated compiler-diagnostic message
pub const TRANSFORM_ERROR_BANNER: &str = "Oxc transform errors:";

/// Errors reported to the bundler for a single module
#[derive(Error, Debug, Diagnostic)]
pub enum TransformError {
    /// The compiler rejected the source (syntax or semantic problems)
    #[error("{}\n{message}", TRANSFORM_ERROR_BANNER)]
    #[diagnostic(code(fob::oxc::diagnostics))]
    Diagnostics {
        /// Module the diagnostics belong to
        id: String,
        /// Every diagnostic message with its code frame, separated by blank lines
        message: String,
        /// Number of diagnostics aggregated into `message`
        count: usize,
    },

    /// The compiler invocation itself failed
    #[error(transparent)]
    #[diagnostic(transparent)]
    Transport(#[from] CompilerError),

    /// The compiler produced a source map the bundler cannot consume
    #[error("Invalid source map for {id}: {reason}")]
    #[diagnostic(code(fob::oxc::source_map))]
    SourceMap { id: String, reason: String },
}

impl TransformError {
    pub fn source_map(id: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceMap {
            id: id.into(),
            reason: reason.to_string(),
        }
    }
}

/// Failures of the compiler call itself, distinct from compiler diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum CompilerError {
    /// The compiler panicked while processing the module
    #[error("Oxc compiler panicked while transforming {id}: {message}")]
    #[diagnostic(
        code(fob::oxc::compiler_panicked),
        help("This is a bug in the compiler; please report it with the failing source")
    )]
    Panicked { id: String, message: String },

    /// The compiler task was cancelled before completing
    #[error("Oxc compiler task for {id} was cancelled")]
    #[diagnostic(code(fob::oxc::compiler_cancelled))]
    Cancelled { id: String },

    /// The compiler rejected the resolved configuration
    #[error("Invalid compiler option `{option}`: {reason}")]
    #[diagnostic(
        code(fob::oxc::invalid_option),
        help("Check the `{option}` value passed to the plugin or set in tsconfig.json")
    )]
    InvalidOption { option: String, reason: String },

    /// The compiler returned output the plugin cannot interpret
    #[error("Oxc compiler returned unusable output for {id}: {reason}")]
    #[diagnostic(code(fob::oxc::invalid_output))]
    InvalidOutput { id: String, reason: String },

    /// The compiler could not be reached
    #[error("Oxc compiler unavailable: {0}")]
    #[diagnostic(code(fob::oxc::compiler_unavailable))]
    Unavailable(String),
}

impl CompilerError {
    pub fn invalid_option(option: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.to_string(),
        }
    }
}

/// Problems reading the project's tsconfig.json.
///
/// These never fail a build: the reader logs them and falls back to an empty
/// project configuration.
#[derive(Error, Debug, Diagnostic)]
pub enum ProjectConfigError {
    #[error("Failed to read {path}: {source}")]
    #[diagnostic(code(fob::oxc::tsconfig_io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    #[diagnostic(code(fob::oxc::tsconfig_parse))]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported value in {path}: {reason}")]
    #[diagnostic(code(fob::oxc::tsconfig_invalid))]
    Invalid { path: PathBuf, reason: String },

    #[error("Failed to load {path}: {source}")]
    #[diagnostic(
        code(fob::oxc::tsconfig_resolve),
        help("Check the file and every configuration it `extends`")
    )]
    Resolve {
        path: PathBuf,
        #[source]
        source: oxc_resolver::ResolveError,
    },
}

/// Errors loading plugin options from fob.toml or JSON values
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("invalid oxc plugin options: {0}")]
    #[diagnostic(
        code(fob::oxc::invalid_config),
        help("Check the [oxc] table in fob.toml")
    )]
    InvalidValue(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::InvalidValue(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::InvalidValue(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_message_starts_with_banner() {
        let err = TransformError::Diagnostics {
            id: "/src/a.ts".to_string(),
            message: "Unexpected token".to_string(),
            count: 1,
        };
        assert!(err.to_string().starts_with(TRANSFORM_ERROR_BANNER));
        assert!(err.to_string().ends_with("Unexpected token"));
    }

    #[test]
    fn test_transport_is_transparent() {
        let err = TransformError::from(CompilerError::Unavailable("not loaded".to_string()));
        assert_eq!(err.to_string(), "Oxc compiler unavailable: not loaded");
    }
}
