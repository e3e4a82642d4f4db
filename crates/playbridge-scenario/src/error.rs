//! Error types for scenario persistence

use std::path::PathBuf;

/// Errors while loading or saving the scenario document
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying read failed (missing file, permissions, ...)
    #[error("io error reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File contents are not a valid scenario document
    #[error("failed to decode scenario {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Document could not be serialized
    #[error("failed to encode scenario: {0}")]
    Encode(#[source] serde_yaml::Error),

    /// The underlying write failed
    #[error("io error writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Create read error for path
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create decode error for path
    pub fn decode(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Decode {
            path: path.into(),
            source,
        }
    }

    /// Create write error for path
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// True for failures of the storage medium rather than the content
    #[inline]
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Write { .. })
    }
}
