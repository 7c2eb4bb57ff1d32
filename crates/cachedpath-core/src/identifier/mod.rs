//! Identifier parsing: `base` or `base!entry`, local path vs. remote URI.
//!
//! All functions are pure; malformed input yields `false`/empty rather than errors,
//! except [`Identifier::parse`] which enforces the entry invariants.

mod path;

pub use path::extension_from_uri;

use crate::error::{CachedPathError, Result};

/// Separator between an archive identifier and the entry inside it.
pub const ENTRY_MARKER: char = '!';

/// A parsed resource identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// Local path or remote URI.
    pub base: String,
    /// Entry inside the archive named by `base`, if requested. Never empty.
    pub entry: Option<String>,
}

impl Identifier {
    /// Parse and validate an identifier.
    pub fn parse(id: &str) -> Result<Self> {
        let (base, entry, has_entry) = split_entry_marker(id);
        if base.is_empty() {
            return Err(CachedPathError::invalid(id, "empty path or URL"));
        }
        if has_entry && entry.is_empty() {
            return Err(CachedPathError::invalid(id, "empty archive entry after marker"));
        }
        Ok(Identifier {
            base: base.to_string(),
            entry: has_entry.then(|| entry.to_string()),
        })
    }

    /// True if `base` is a remote URI.
    pub fn is_remote(&self) -> bool {
        is_remote(&self.base)
    }
}

/// Splits on the first [`ENTRY_MARKER`]. Returns `(base, entry, has_entry)`.
pub fn split_entry_marker(id: &str) -> (&str, &str, bool) {
    match id.split_once(ENTRY_MARKER) {
        Some((base, entry)) => (base, entry, true),
        None => (id, "", false),
    }
}

/// A string is remote iff it parses as a URL with a non-empty scheme and host.
pub fn is_remote(base: &str) -> bool {
    match url::Url::parse(base) {
        Ok(u) => !u.scheme().is_empty() && u.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

/// Lowercase URL scheme, or empty if `base` does not parse.
pub fn scheme(base: &str) -> String {
    url::Url::parse(base)
        .map(|u| u.scheme().to_ascii_lowercase())
        .unwrap_or_default()
}
