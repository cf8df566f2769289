//! The compiler seam.
//!
//! The plugin decides how a module should be compiled and hands the actual
//! work to a [`Compiler`]. [`OxcCompiler`] is the production implementation;
//! tests and hosts with their own toolchain can supply another.

mod oxc;

use std::fmt;
use std::path::Path;

use async_trait::async_trait;

use crate::error::CompilerError;
use crate::merge::ResolvedTransformRequest;
use crate::translate::SourceMapRecord;

pub use oxc::OxcCompiler;
pub(crate) use oxc::join_error;

/// One problem reported by the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerDiagnostic {
    pub message: String,
    /// Rendered source excerpt pointing at the problem
    pub codeframe: Option<String>,
}

impl CompilerDiagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            codeframe: None,
        }
    }

    pub fn with_codeframe(mut self, codeframe: impl Into<String>) -> Self {
        self.codeframe = Some(codeframe.into());
        self
    }
}

/// Raw result of compiling one module.
///
/// A non-empty `diagnostics` list means the compilation failed, whatever
/// `code` and `map` contain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerOutput {
    pub code: String,
    pub map: Option<SourceMapRecord>,
    pub diagnostics: Vec<CompilerDiagnostic>,
}

impl CompilerOutput {
    pub fn success(code: impl Into<String>, map: Option<SourceMapRecord>) -> Self {
        Self {
            code: code.into(),
            map,
            diagnostics: Vec::new(),
        }
    }

    pub fn failure(diagnostics: Vec<CompilerDiagnostic>) -> Self {
        Self {
            diagnostics,
            ..Self::default()
        }
    }
}

/// Something that compiles a single module according to a resolved request.
///
/// `Err` is reserved for failures of the call itself (the compiler panicked,
/// could not be started, rejected its configuration). Problems in the source
/// being compiled are reported through [`CompilerOutput::diagnostics`].
#[async_trait]
pub trait Compiler: Send + Sync + fmt::Debug {
    async fn compile(
        &self,
        path: &Path,
        source: &str,
        request: &ResolvedTransformRequest,
    ) -> Result<CompilerOutput, CompilerError>;
}
