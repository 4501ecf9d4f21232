use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("adb executable not found: {0}")]
    ToolNotFound(String),

    #[error("adb {command} failed ({status}): {stderr}")]
    InvocationError {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Clipboard error: {0}")]
    ClipboardError(String),

    #[error("Failed to open file: {0}")]
    OpenError(String),
}

/// A listing line that did not have the expected long-format shape.
///
/// Never surfaced to the user; the line is dropped and the anomaly logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unparseable listing line ({tokens} tokens): {line}")]
pub struct ParseAnomaly {
    pub line: String,
    pub tokens: usize,
}

/// Application result type alias
pub type Result<T> = std::result::Result<T, AppError>;
