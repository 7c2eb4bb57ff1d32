//! Content-addressed cache of downloaded resources.
//!
//! Layout under the cache root:
//! - `<sha256(url ++ revision)><ext>`: the published file
//! - `<…>.lock`: advisory lock serializing check/fetch/publish
//! - `<…>.meta.json`: [`MetaRecord`] sidecar
//! - `extracted/<file name>/`: archive extraction directories

mod key;
mod meta;

pub use key::key_for;
pub use meta::MetaRecord;

use crate::error::{CachedPathError, Result};
use crate::lock::lock_path_for;
use crate::storage::{temp_path, PartialFile};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable overriding the default cache root.
pub const CACHE_ROOT_ENV: &str = "CACHED_PATH_CACHE_ROOT";

/// Suffix of the metadata sidecar.
pub const META_SUFFIX: &str = ".meta.json";

/// Subdirectory of the cache root holding extraction directories.
pub const EXTRACTED_DIR: &str = "extracted";

/// Default cache root: `$CACHED_PATH_CACHE_ROOT`, else `$XDG_CACHE_HOME/cached_path`.
pub fn default_cache_dir() -> std::io::Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::new()?;
    Ok(cache_dir_from(
        std::env::var_os(CACHE_ROOT_ENV),
        xdg_dirs.get_cache_home(),
    ))
}

fn cache_dir_from(env_override: Option<OsString>, cache_home: PathBuf) -> PathBuf {
    match env_override {
        Some(v) if !v.is_empty() => PathBuf::from(v),
        _ => cache_home.join("cached_path"),
    }
}

/// Paths belonging to one cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub cache_path: PathBuf,
    pub lock_path: PathBuf,
    pub meta_path: PathBuf,
}

impl CacheEntry {
    pub fn new(cache_path: PathBuf) -> Self {
        let mut meta = cache_path.as_os_str().to_owned();
        meta.push(META_SUFFIX);
        Self {
            lock_path: lock_path_for(&cache_path),
            meta_path: PathBuf::from(meta),
            cache_path,
        }
    }
}

/// A cache root directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Use `root`, creating it if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            CachedPathError::io(format!("failed to create cache directory: {}", root.display()), e)
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entry for `uri` fetched at `revision`.
    pub fn entry_for(&self, uri: &str, revision: &str) -> CacheEntry {
        CacheEntry::new(self.root.join(key_for(uri, revision)))
    }

    /// Fresh iff the file exists and its metadata parses and records `revision`.
    pub fn is_fresh(&self, entry: &CacheEntry, revision: &str) -> bool {
        if !entry.cache_path.is_file() {
            return false;
        }
        match MetaRecord::load(&entry.meta_path) {
            Ok(Some(meta)) => meta.etag == revision,
            Ok(None) => false,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unreadable cache metadata");
                false
            }
        }
    }

    /// Temp file next to the entry; dropped without publish it is removed.
    pub fn begin_write(&self, entry: &CacheEntry) -> Result<PartialFile> {
        PartialFile::create(&temp_path(&entry.cache_path))
    }

    /// Atomically move a fully written temp file onto the entry's cache path.
    pub fn publish(&self, part: PartialFile, entry: &CacheEntry) -> Result<()> {
        let bytes = part.written();
        part.commit(&entry.cache_path)?;
        tracing::info!(path = %entry.cache_path.display(), bytes, "published cache entry");
        Ok(())
    }

    /// Best-effort sidecar write; failure is only logged.
    pub fn write_metadata(&self, entry: &CacheEntry, record: &MetaRecord) {
        if let Err(e) = record.save(&entry.meta_path) {
            tracing::warn!(path = %entry.meta_path.display(), error = %e, "failed to write cache metadata");
        }
    }

    /// `<root>/extracted/<file name of archive>`.
    pub fn extraction_dir(&self, archive: &Path) -> PathBuf {
        let name = archive
            .file_name()
            .map(|n| n.to_owned())
            .unwrap_or_else(|| OsString::from("archive"));
        self.root.join(EXTRACTED_DIR).join(name)
    }
}
