use std::path::PathBuf;
use thiserror::Error;

/// Error taxonomy for the post-processing pipeline.
///
/// Directory and pattern validation fail fast, before any mutation.
/// Per-file problems inside a batch are recovered into per-item outcomes
/// and never surface as a variant here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input path does not exist or is not a directory. Fatal, checked
    /// before any mutation.
    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// A single tag file could not be parsed. Recovered inside batches.
    #[error("failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// An empty or otherwise invalid fuzzy-delete pattern. Fatal to the
    /// single operation call; nothing has been mutated when this is raised.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// A rename target (or staging name) is occupied by a file outside the
    /// batch. Fatal to the rename stage; earlier renames stay applied.
    #[error("rename target already exists: {0}")]
    RenameConflict(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
