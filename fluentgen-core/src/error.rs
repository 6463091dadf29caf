//! Typed error handling for fluentgen.
//!
//! Only the edges return errors: reading input files, parsing documents and
//! type expressions, loading configuration. Problems with the constructors
//! themselves are diagnostics on the compilation unit, never `Err`.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for fluentgen operations.
#[derive(Error, Debug)]
pub enum FluentGenError {
    /// I/O error when reading input files
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Malformed input document
    #[error("Input error in {path}: {message}")]
    Input { path: PathBuf, message: String },

    /// A type expression that does not parse as a type
    #[error("Invalid type expression `{expr}`: {message}")]
    TypeExpr { expr: String, message: String },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl FluentGenError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    pub fn input(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Input {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn type_expr(expr: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TypeExpr {
            expr: expr.into(),
            message: message.into(),
        }
    }

    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this error only affects one input file (the rest can still
    /// be generated).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Input { .. } | Self::TypeExpr { .. })
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } | Self::Input { path, .. } | Self::Config { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }

    /// Attach a file path to an error raised without one.
    pub fn in_file(self, file: impl Into<PathBuf>) -> Self {
        match self {
            Self::TypeExpr { expr, message } => Self::Input {
                path: file.into(),
                message: format!("type `{}`: {}", expr, message),
            },
            other => other,
        }
    }
}

/// Convenience type alias for fluentgen results.
pub type FluentGenResult<T> = Result<T, FluentGenError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> FluentGenResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> FluentGenResult<T> {
        self.map_err(|e| FluentGenError::io(path, e))
    }
}
