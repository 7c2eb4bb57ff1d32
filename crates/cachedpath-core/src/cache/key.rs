//! Content-addressed cache file names.

use crate::identifier::extension_from_uri;
use sha2::{Digest, Sha256};

/// Cache file name for `uri` at `revision`: hex SHA-256 of both, plus the URL's extension.
///
/// The extension is kept so archives stay recognizable after download
/// (`…/model.tar.gz` → `<hex>.tar.gz`).
pub fn key_for(uri: &str, revision: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(uri.as_bytes());
    hasher.update(revision.as_bytes());
    let mut key = hex::encode(hasher.finalize());
    if let Some(ext) = extension_from_uri(uri) {
        key.push_str(&ext);
    }
    key
}
