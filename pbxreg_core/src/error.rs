//! Error types for pbxreg_core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using pbxreg_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, editing or saving a project.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred during file operations.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// The project location does not hold a valid project structure.
    #[error("Failed to load project at {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    /// Writing the project back to disk failed.
    #[error("Failed to save project to {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Property list syntax error.
    #[error("Parse error at line {line}, column {column}: {reason}")]
    Parse {
        line: usize,
        column: usize,
        reason: String,
    },

    /// An object is missing or does not have the expected shape.
    #[error("Invalid object {id}: {reason}")]
    InvalidObject { id: String, reason: String },
}

impl Error {
    /// Create a Load error.
    pub fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a Save error.
    pub fn save(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Save {
            path: path.into(),
            source,
        }
    }

    /// Create a Parse error.
    pub fn parse(line: usize, column: usize, reason: impl Into<String>) -> Self {
        Error::Parse {
            line,
            column,
            reason: reason.into(),
        }
    }

    /// Create an InvalidObject error.
    pub fn invalid_object(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidObject {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// True for failures that happen before any mutation (loading).
    pub fn is_load(&self) -> bool {
        matches!(self, Error::Load { .. } | Error::Parse { .. })
    }

    /// True for failures of the final write.
    pub fn is_save(&self) -> bool {
        matches!(self, Error::Save { .. })
    }
}
