/// Error types for the refactor pipeline.
///
/// Errors fall into two groups. Run-level errors (an invalid pattern, a broken
/// configuration file, a thread pool that cannot be built) stop the run before any
/// file is touched. Per-file errors carry the offending path and are folded into the
/// scan aggregate or a [`RewriteOutcome`](crate::results::RewriteOutcome) so that one
/// bad file never aborts its siblings:
/// ```rust,ignore
/// match rewriter.rewrite(path, expected).error {
///     None => // rewritten,
///     Some(RefactorError::PermissionDenied(path)) => // report and move on,
///     Some(e) => // report and move on,
/// }
/// ```
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for refactor operations
pub type RefactorResult<T> = Result<T, RefactorError>;

/// Errors that can occur while listing, scanning or rewriting files
#[derive(Error, Debug)]
pub enum RefactorError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("IO error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Refusing to follow symbolic link: {0}")]
    SymlinkTarget(PathBuf),
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl RefactorError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn invalid_pattern(pattern: impl Into<String>) -> Self {
        Self::InvalidPattern(pattern.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Attaches `path` to an I/O error, keeping the common kinds distinguishable.
    pub fn io_at(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::file_not_found(path),
            io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}
