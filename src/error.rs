//! Error types for digest computation.
//!
//! Every variant carries enough context (kind plus originating path or
//! algorithm name) for the front end to render a meaningful message.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Terminal failure of a digest computation.
///
/// I/O sources are held behind `Arc` so the error stays `Clone` and can be
/// passed through message channels.
#[derive(Error, Debug, Clone)]
pub enum HashError {
    /// The target path does not exist.
    #[error("file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    /// The target exists but could not be opened for reading.
    #[error("cannot open '{}' for reading: {source}", .path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },

    /// The algorithm has no implementation in the registry.
    #[error("unsupported hash algorithm: {algorithm}")]
    UnsupportedAlgorithm { algorithm: String },

    /// A read failed after the file was opened.
    #[error("read error in '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },

    /// The scan was stopped before finishing.
    #[error("hashing of '{}' was cancelled", .path.display())]
    Cancelled { path: PathBuf },
}

/// Fieldless discriminant of [`HashError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FileNotFound,
    FileUnreadable,
    UnsupportedAlgorithm,
    Read,
    Cancelled,
}

impl HashError {
    pub(crate) fn unreadable(path: &Path, source: io::Error) -> Self {
        HashError::FileUnreadable {
            path: path.to_path_buf(),
            source: Arc::new(source),
        }
    }

    pub(crate) fn read(path: &Path, source: io::Error) -> Self {
        HashError::Read {
            path: path.to_path_buf(),
            source: Arc::new(source),
        }
    }

    /// Map an error from `File::open` to the matching variant.
    ///
    /// Errors other than not-found/permission-denied (e.g. ENOTDIR when a
    /// parent component is a regular file) are resolved by looking the path
    /// up again: if it does not exist, the target is missing.
    pub(crate) fn from_open(path: &Path, source: io::Error) -> Self {
        let missing = match source.kind() {
            io::ErrorKind::NotFound => true,
            io::ErrorKind::PermissionDenied => false,
            _ => fs::symlink_metadata(path)
                .is_err_and(|e| e.kind() != io::ErrorKind::PermissionDenied),
        };
        if missing {
            HashError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            HashError::unreadable(path, source)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            HashError::FileNotFound { .. } => ErrorKind::FileNotFound,
            HashError::FileUnreadable { .. } => ErrorKind::FileUnreadable,
            HashError::UnsupportedAlgorithm { .. } => ErrorKind::UnsupportedAlgorithm,
            HashError::Read { .. } => ErrorKind::Read,
            HashError::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// True for a program/config mismatch rather than an environmental failure.
    pub fn is_configuration(&self) -> bool {
        matches!(self, HashError::UnsupportedAlgorithm { .. })
    }

    /// Path the failing computation was working on, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            HashError::FileNotFound { path }
            | HashError::FileUnreadable { path, .. }
            | HashError::Read { path, .. }
            | HashError::Cancelled { path } => Some(path),
            HashError::UnsupportedAlgorithm { .. } => None,
        }
    }
}
