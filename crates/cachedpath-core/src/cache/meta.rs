//! `.meta.json` sidecar recording where a cache entry came from.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Sidecar metadata for one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaRecord {
    pub url: String,
    /// Revision token the entry was fetched at (may be empty).
    pub etag: String,
    pub cached_path: PathBuf,
    pub created_at: DateTime<Utc>,
}

impl MetaRecord {
    pub fn new(url: impl Into<String>, etag: impl Into<String>, cached_path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            etag: etag.into(),
            cached_path: cached_path.into(),
            created_at: Utc::now(),
        }
    }

    /// Write to `path` through a temp file in the same directory, then rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let json = serde_json::to_vec_pretty(self).context("serialize cache metadata")?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("create temp metadata in {}", dir.display()))?;
        tmp.write_all(&json).context("write cache metadata")?;
        tmp.persist(path)
            .with_context(|| format!("write cache metadata: {}", path.display()))?;
        Ok(())
    }

    /// Load from `path`. Missing file is `Ok(None)`; unreadable or malformed is an error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("read cache metadata: {}", path.display())),
        };
        let record = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse cache metadata: {}", path.display()))?;
        Ok(Some(record))
    }
}
