use opf_core::SourceError;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while reading or writing an `.opf` directory.
pub enum OpfError {
    #[error("I/O error on '{}': {source}", path.display())]
    /// Filesystem I/O failed.
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    #[error("YAML error in '{}': {source}", path.display())]
    /// YAML parsing or emitting failed.
    Yaml {
        /// File being parsed or written.
        path: PathBuf,
        /// Underlying error.
        source: serde_yaml::Error,
    },

    #[error("YAML emit error: {0}")]
    /// Serializing a layer to YAML failed.
    Emit(#[from] serde_yaml::Error),

    #[error("invalid annotation #{index} in '{}': {message}", path.display())]
    /// An annotation record is malformed (e.g. missing its `span`).
    InvalidAnnotation {
        /// Layer file.
        path: PathBuf,
        /// Position of the record in the file.
        index: usize,
        /// What is wrong with it.
        message: String,
    },

    #[error("invalid layer file '{}': {message}", path.display())]
    /// The layer file itself is malformed.
    InvalidLayer {
        /// Layer file.
        path: PathBuf,
        /// What is wrong with it.
        message: String,
    },

    #[error("layer has {found} annotations but the file has {expected} records")]
    /// Re-based coordinates do not line up with the stored records.
    RecordCountMismatch {
        /// Records in the file.
        expected: usize,
        /// Annotations supplied.
        found: usize,
    },
}

impl OpfError {
    /// The file the error refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. }
            | Self::Yaml { path, .. }
            | Self::InvalidAnnotation { path, .. }
            | Self::InvalidLayer { path, .. } => Some(path),
            Self::Emit(_) | Self::RecordCountMismatch { .. } => None,
        }
    }
}

impl From<OpfError> for SourceError {
    fn from(err: OpfError) -> Self {
        SourceError::Load {
            path: err
                .path()
                .map(|path| path.display().to_string())
                .unwrap_or_default(),
            message: err.to_string(),
        }
    }
}
