//! Final step: hand back the file, one archive entry, or an extraction directory.

use crate::archive::{self, ExtractError};
use crate::cache::CacheStore;
use crate::error::{CachedPathError, Result};
use crate::lock::{lock_path_for, with_lock};
use crate::options::ResolveOptions;
use std::fs;
use std::path::{Path, PathBuf};

/// Written into a whole-archive extraction before it is renamed into place.
/// Single-entry extraction shares the directory but never writes it.
pub(crate) const COMPLETE_MARKER: &str = ".extracted";

pub(super) fn finish(
    store: &CacheStore,
    options: &ResolveOptions,
    path: PathBuf,
    entry: Option<&str>,
) -> Result<PathBuf> {
    if let Some(name) = entry {
        if !archive::is_archive(&path) {
            return Err(CachedPathError::extraction(
                &path,
                ExtractError::NotAnArchive(path.clone()),
            ));
        }
        let dir = store.extraction_dir(&path);
        return with_lock(&lock_path_for(&dir), &options.lock, || {
            archive::extract_one(&path, name, &dir).map_err(|e| CachedPathError::extraction(&path, e))
        });
    }

    if options.extract_archive && archive::is_archive(&path) {
        let dir = store.extraction_dir(&path);
        with_lock(&lock_path_for(&dir), &options.lock, || {
            extract_into_dir(&path, &dir, options.force_extract)
        })?;
        return Ok(dir);
    }

    Ok(path)
}

/// Extract into a staging sibling and rename it onto `dir`, so a `dir` holding
/// [`COMPLETE_MARKER`] is always a full extraction.
fn extract_into_dir(archive_path: &Path, dir: &Path, force: bool) -> Result<()> {
    if dir.join(COMPLETE_MARKER).is_file() && !force {
        tracing::debug!(dir = %dir.display(), "reusing extraction directory");
        return Ok(());
    }

    let parent = dir.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)
        .map_err(|e| CachedPathError::io(format!("failed to create {}", parent.display()), e))?;
    let staging = tempfile::Builder::new()
        .prefix(".staging-")
        .tempdir_in(parent)
        .map_err(|e| CachedPathError::io("failed to create staging directory", e))?;

    archive::extract_all(archive_path, staging.path())
        .map_err(|e| CachedPathError::extraction(archive_path, e))?;
    let marker = staging.path().join(COMPLETE_MARKER);
    fs::write(&marker, b"")
        .map_err(|e| CachedPathError::io(format!("failed to write {}", marker.display()), e))?;

    // Forced re-extraction, or entries left by single-entry extraction.
    if dir.exists() {
        tracing::debug!(dir = %dir.display(), "removing previous extraction");
        fs::remove_dir_all(dir)
            .map_err(|e| CachedPathError::io(format!("failed to remove {}", dir.display()), e))?;
    }
    fs::rename(staging.path(), dir).map_err(|e| {
        CachedPathError::io(format!("failed to move extraction into {}", dir.display()), e)
    })?;
    // The staging path is gone now; dropping the guard is a no-op.
    drop(staging);
    Ok(())
}
