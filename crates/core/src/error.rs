use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur while resolving a build target
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The build file contains syntax the Starlark parser rejects
    #[error("{}:{line}: parse error: {message}", path.display())]
    ParseError {
        path: PathBuf,
        /// 1-based line of the first syntax error
        line: usize,
        message: String,
    },

    #[error("Failed to read {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),

    #[error("Invalid glob pattern `{pattern}`: {message}")]
    PatternError { pattern: String, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to start `{program}`: {source}")]
    SpawnError {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("`{program}` exited with {status}: {stderr}")]
    ToolFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("Malformed resolver output `{output}`: {reason}")]
    MalformedOutput { output: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::ReadError {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for goto-build operations
pub type Result<T> = std::result::Result<T, Error>;
