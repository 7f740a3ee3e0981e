//! Error types for style module compilation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort compilation of a stylesheet.
///
/// A failed compilation never yields a [`StyleMap`](swatch_carton::StyleMap).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Malformed stylesheet syntax
    #[error("CSS parse error in {filename}:{line}:{column}: {message}")]
    Parse {
        filename: String,
        /// 1-based line
        line: u32,
        /// 1-based column, in characters
        column: u32,
        message: String,
    },

    /// Error minifying the rewritten stylesheet
    #[error("CSS minify error in {filename}: {message}")]
    Minify { filename: String, message: String },

    /// Error printing the rewritten stylesheet
    #[error("CSS print error in {filename}: {message}")]
    Print { filename: String, message: String },
}

impl CompileError {
    /// The file the error belongs to.
    pub fn filename(&self) -> &str {
        match self {
            CompileError::Parse { filename, .. }
            | CompileError::Minify { filename, .. }
            | CompileError::Print { filename, .. } => filename,
        }
    }
}

/// Non-fatal finding recorded during compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileWarning {
    pub message: String,
}

impl std::fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
