//! Error type returned by the resolver.

use crate::archive::ExtractError;
use crate::retry::TransferError;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias for resolver operations.
pub type Result<T> = std::result::Result<T, CachedPathError>;

/// All failures a resolution can end with.
#[derive(Error, Debug)]
pub enum CachedPathError {
    #[error("invalid identifier {identifier:?}: {reason}")]
    InvalidIdentifier { identifier: String, reason: String },

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("download failed: {uri}")]
    DownloadFailed {
        uri: String,
        #[source]
        source: TransferError,
    },

    #[error("extraction failed: {}", archive.display())]
    ExtractionFailed {
        archive: PathBuf,
        #[source]
        source: ExtractError,
    },

    #[error("failed to acquire file lock {}: {reason}", path.display())]
    LockFailed { path: PathBuf, reason: String },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl CachedPathError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn invalid(identifier: &str, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            identifier: identifier.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn extraction(archive: impl Into<PathBuf>, source: ExtractError) -> Self {
        Self::ExtractionFailed {
            archive: archive.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn not_found_display_includes_path() {
        let err = CachedPathError::NotFound(PathBuf::from("/no/such/file"));
        assert_eq!(err.to_string(), "file not found: /no/such/file");
    }

    #[test]
    fn download_failed_keeps_transfer_source() {
        let err = CachedPathError::DownloadFailed {
            uri: "https://example.com/f.bin".to_string(),
            source: TransferError::Http(404),
        };
        assert!(err.to_string().contains("https://example.com/f.bin"));
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("HTTP 404"));
    }

    #[test]
    fn io_helper_sets_context() {
        let err = CachedPathError::io(
            "creating cache root",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "IO error: creating cache root");
    }
}
