use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::image::pfm::PfmError;

/// Errors raised while loading benchmark data or scoring a submission.
///
/// Everything that stems from a single missing or malformed file is
/// recoverable (see [`EvalError::is_recoverable`]): the evaluation pipeline
/// records it and moves on to the next scene. The remaining variants signal
/// inconsistent inputs or misuse and abort the run.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Could not find file '{path}'")]
    DataNotFound { path: PathBuf },

    #[error("Failed to read file '{path}': {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Failed to read PFM file '{path}': {source}")]
    Pfm { path: PathBuf, source: PfmError },

    #[error("Malformed runtime file '{path}': \"{line}\" ({reason})")]
    MalformedRuntime {
        path: PathBuf,
        line: String,
        reason: String,
    },

    #[error("Failed to load image '{path}': {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to process JSON file '{path}': {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid scene parameters in '{path}': {reason}")]
    Parameters { path: PathBuf, reason: String },

    #[error("Shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Metric '{id}' is not computed from disparity maps")]
    NotPixelMetric { id: String },

    #[error("No input algorithms given for meta algorithm '{name}'")]
    NoAlgorithms { name: String },
}

impl EvalError {
    /// Wrap an I/O error, mapping "not found" to [`EvalError::DataNotFound`].
    pub fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            EvalError::DataNotFound {
                path: path.to_path_buf(),
            }
        } else {
            EvalError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Wrap an image decoding error, mapping "not found" to
    /// [`EvalError::DataNotFound`].
    pub fn image(path: &Path, source: image::ImageError) -> Self {
        match source {
            image::ImageError::IoError(err) => Self::io(path, err),
            source => EvalError::Image {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// True for missing data and malformed single files.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EvalError::DataNotFound { .. }
                | EvalError::Io { .. }
                | EvalError::Pfm { .. }
                | EvalError::MalformedRuntime { .. }
                | EvalError::Image { .. }
                | EvalError::Json { .. }
                | EvalError::Parameters { .. }
        )
    }

    /// True if the error means the requested file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, EvalError::DataNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
