//! Transfer error type for retry classification.

use std::fmt;

/// Error returned by a single transport request (curl failure, HTTP status, or sink failure).
/// Kept separate from the resolver error so the retry loop can classify it.
#[derive(Debug)]
pub enum TransferError {
    /// Curl reported an error (timeout, connection, etc.).
    Curl(curl::Error),
    /// Final response had a non-2xx status.
    Http(u32),
    /// The connection failed after `written` body bytes already reached the sink.
    /// The sink cannot be rewound, so this is not retried.
    Interrupted { written: u64, source: curl::Error },
    /// Writing the body to the sink failed (disk full, permission denied). Not retried.
    Sink(std::io::Error),
    /// Failure reported by a non-HTTP transport.
    Other(String),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Curl(e) => write!(f, "{}", e),
            TransferError::Http(code) => write!(f, "HTTP {}", code),
            TransferError::Interrupted { written, source } => {
                write!(f, "transfer interrupted after {} bytes: {}", written, source)
            }
            TransferError::Sink(e) => write!(f, "sink: {}", e),
            TransferError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransferError::Curl(e) => Some(e),
            TransferError::Interrupted { source, .. } => Some(source),
            TransferError::Sink(e) => Some(e),
            TransferError::Http(_) | TransferError::Other(_) => None,
        }
    }
}
