//! Custom error types for irvis-fusion.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the irvis-fusion library.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to load an image file.
    #[error("failed to load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to save an image file.
    #[error("failed to save image to {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The requested wavelet basis is not in the catalogue.
    #[error("unsupported wavelet {name:?} (expected one of: haar, db1, db2, db3, db4)")]
    UnsupportedWavelet { name: String },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Transform or coefficient-combination failure.
    #[error("fusion failed: {reason}")]
    Fusion { reason: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn fusion(reason: impl Into<String>) -> Self {
        Self::Fusion {
            reason: reason.into(),
        }
    }
}

/// Result type alias for irvis-fusion operations.
pub type Result<T> = std::result::Result<T, Error>;
