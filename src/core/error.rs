//! Error types for the logger

use std::path::Path;

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// A parameter failed validation (non-finite level, empty key, bad zone, ...)
    #[error("invalid {argument}: {message}")]
    InvalidArgument { argument: String, message: String },

    /// A color, highlight or attribute name outside the fixed style tables
    #[error("unknown {kind} name '{name}'")]
    UnknownStyleName { kind: &'static str, name: String },

    /// Attempt to add a log type under a key that is already registered
    #[error("log type '{0}' already defined")]
    DuplicateType(String),

    /// A log type key that is not registered
    #[error("log type '{0}' is not defined")]
    UnknownType(String),

    /// Min/max level ordering violation for one sink
    #[error("invalid {sink} threshold: {message}")]
    InvalidThreshold { sink: &'static str, message: String },

    /// IO error with the operation and path that caused it
    #[error("IO error while {operation} '{path}': {source}")]
    Io {
        operation: String,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl LoggerError {
    /// Create an invalid argument error
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// Create an unknown style name error
    pub fn unknown_style(kind: &'static str, name: impl Into<String>) -> Self {
        LoggerError::UnknownStyleName {
            kind,
            name: name.into(),
        }
    }

    /// Create an invalid threshold error
    pub fn invalid_threshold(sink: &'static str, message: impl Into<String>) -> Self {
        LoggerError::InvalidThreshold {
            sink,
            message: message.into(),
        }
    }

    /// Create an IO error with operation context
    pub fn io_operation(
        operation: impl Into<String>,
        path: impl AsRef<Path>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::Io {
            operation: operation.into(),
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
