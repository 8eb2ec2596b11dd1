//! Unified error types for cache-code-updater.
//!
//! The aligner and rebaser are total over well-formed input and never
//! return these; errors live at the edges (tokenizing source text, reading
//! snapshots, loading config).

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for cache-code-updater operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum UpdaterError {
    /// Errors while tokenizing or decoding an input artifact
    #[error("Failed to parse input: {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseErrorKind,
    },

    /// Errors while retrieving an object from a snapshot
    #[error("Snapshot lookup failed: {context}")]
    Snapshot {
        context: String,
        #[source]
        source: SnapshotErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific parse error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("Missing required directive: {0}")]
    MissingDirective(String),

    #[error("Invalid value for directive '{directive}': {value}")]
    InvalidDirective { directive: String, value: String },

    #[error("Label '{label}' defined twice (body lines {first} and {second})")]
    DuplicateLabel {
        label: String,
        first: usize,
        second: usize,
    },

    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("No ID constants found")]
    NoConstants,
}

/// Specific snapshot error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SnapshotErrorKind {
    #[error("{kind} {id} not present in snapshot")]
    NotFound { kind: &'static str, id: String },

    #[error("Snapshot root does not exist: {0}")]
    MissingRoot(PathBuf),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for cache-code-updater operations
pub type Result<T> = std::result::Result<T, UpdaterError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl UpdaterError {
    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseErrorKind) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create a parse error for a missing header directive
    pub fn missing_directive(directive: impl Into<String>) -> Self {
        Self::parse(
            "script header",
            ParseErrorKind::MissingDirective(directive.into()),
        )
    }

    /// Create a snapshot error with context
    pub fn snapshot(context: impl Into<String>, source: SnapshotErrorKind) -> Self {
        Self::Snapshot {
            context: context.into(),
            source,
        }
    }

    /// Create a snapshot error for an object the snapshot does not carry
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::snapshot(
            "lookup",
            SnapshotErrorKind::NotFound {
                kind,
                id: id.to_string(),
            },
        )
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for UpdaterError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for UpdaterError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(
            "JSON deserialization",
            ParseErrorKind::InvalidJson(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings chain outermost first, so a failure deep inside a batch
/// reads like `rebasing bank.rs2asm: parsing new vanilla: missing directive`.
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<UpdaterError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: UpdaterError, new_ctx: &str) -> UpdaterError {
    match err {
        UpdaterError::Parse {
            context: existing,
            source,
        } => UpdaterError::Parse {
            context: chain_context(new_ctx, &existing),
            source,
        },
        UpdaterError::Snapshot {
            context: existing,
            source,
        } => UpdaterError::Snapshot {
            context: chain_context(new_ctx, &existing),
            source,
        },
        UpdaterError::Io {
            path,
            message,
            source,
        } => UpdaterError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        UpdaterError::Config(msg) => UpdaterError::Config(chain_context(new_ctx, &msg)),
        UpdaterError::Validation(msg) => UpdaterError::Validation(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together as "`new`: `existing`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = UpdaterError::missing_directive(".id");
        let display = err.to_string();
        assert!(display.contains("parse"), "unexpected message: {display}");

        let err = UpdaterError::not_found("script", 42);
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("script 42 not present in snapshot"));
    }

    #[test]
    fn test_io_error_keeps_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = UpdaterError::io("/scripts/bank.rs2asm", io_err);

        assert!(err.to_string().contains("/scripts/bank.rs2asm"));
    }

    #[test]
    fn test_context_chaining_multiple_levels() {
        fn inner() -> Result<()> {
            Err(UpdaterError::missing_directive(".id"))
        }

        fn middle() -> Result<()> {
            inner().context("parsing old vanilla")
        }

        fn outer() -> Result<()> {
            middle().context("rebasing bank.rs2asm")
        }

        match outer() {
            Err(UpdaterError::Parse { context, .. }) => {
                assert_eq!(
                    context,
                    "rebasing bank.rs2asm: parsing old vanilla: script header"
                );
            }
            other => panic!("Expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let mut called = false;

        let ok_result: Result<i32> = Ok(42);
        let _ = ok_result.with_context(|| {
            called = true;
            "should not be called"
        });
        assert!(!called, "Closure should not be called for Ok result");

        let err_result: Result<i32> = Err(UpdaterError::validation("error"));
        let _ = err_result.with_context(|| {
            called = true;
            "should be called"
        });
        assert!(called, "Closure should be called for Err result");
    }

    #[test]
    fn test_chain_context_helper() {
        assert_eq!(chain_context("new", ""), "new");
        assert_eq!(chain_context("new", "existing"), "new: existing");
    }
}
