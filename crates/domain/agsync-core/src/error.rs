use std::fmt;

use camino::Utf8PathBuf;

use crate::path::PathKind;

/// Remote operation that moved (or tried to move) data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Download,
    Upload,
    Mkdir,
    Import,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Download => "files-download",
            Operation::Upload => "files-upload",
            Operation::Mkdir => "files-mkdir",
            Operation::Import => "files-import",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("path {path} is type {actual}, must be type {expected}")]
    TypeMismatch {
        path: String,
        expected: PathKind,
        actual: PathKind,
    },
    #[error("unable to list files at {url}: {reason}")]
    Listing { url: String, reason: String },
    #[error("malformed listing response from {url}: {detail}")]
    MalformedResponse { url: String, detail: String },
    #[error("local path {0} does not exist")]
    LocalPathNotFound(Utf8PathBuf),
    #[error("malformed lastModified {value:?}: {detail}")]
    MalformedTimestamp { value: String, detail: String },
    #[error("{operation} failed for {target}: {reason}")]
    Transfer {
        operation: Operation,
        target: String,
        reason: String,
    },
    #[error("io error at {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("credentials error: {0}")]
    Credentials(String),
    #[error("usage error: {0}")]
    Usage(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncErrorKind {
    InvalidPath,
    TypeMismatch,
    Listing,
    MalformedResponse,
    LocalPathNotFound,
    MalformedTimestamp,
    Transfer,
    Io,
    Credentials,
    Usage,
}

impl SyncError {
    pub fn kind(&self) -> SyncErrorKind {
        match self {
            SyncError::InvalidPath(_) => SyncErrorKind::InvalidPath,
            SyncError::TypeMismatch { .. } => SyncErrorKind::TypeMismatch,
            SyncError::Listing { .. } => SyncErrorKind::Listing,
            SyncError::MalformedResponse { .. } => SyncErrorKind::MalformedResponse,
            SyncError::LocalPathNotFound(_) => SyncErrorKind::LocalPathNotFound,
            SyncError::MalformedTimestamp { .. } => SyncErrorKind::MalformedTimestamp,
            SyncError::Transfer { .. } => SyncErrorKind::Transfer,
            SyncError::Io { .. } => SyncErrorKind::Io,
            SyncError::Credentials(_) => SyncErrorKind::Credentials,
            SyncError::Usage(_) => SyncErrorKind::Usage,
        }
    }

    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return SyncError::LocalPathNotFound(path);
        }
        SyncError::Io { path, source }
    }

    pub fn transfer(
        operation: Operation,
        target: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SyncError::Transfer {
            operation,
            target: target.into(),
            reason: reason.into(),
        }
    }
}
