//! Safe extraction of ZIP and TAR+GZIP archives.
//!
//! Every stored name is joined to the destination lexically and rejected when it
//! would land outside it; nothing is written for a rejected entry.

mod safe;
mod targz;
mod write;
mod zipfile;

pub use safe::safe_join;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why an extraction failed.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("not a supported archive: {}", .0.display())]
    NotAnArchive(PathBuf),

    #[error("entry escapes the destination: {0}")]
    UnsafePath(String),

    #[error("entry not found in archive: {0}")]
    EntryNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

/// Container formats understood by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
}

impl ArchiveKind {
    /// Detect by file name: `.zip`, `.tar.gz`, `.tgz` (case-insensitive).
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        if name.ends_with(".zip") {
            Some(ArchiveKind::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveKind::TarGz)
        } else {
            None
        }
    }
}

pub fn is_archive(path: &Path) -> bool {
    ArchiveKind::detect(path).is_some()
}

fn kind_of(archive: &Path) -> Result<ArchiveKind, ExtractError> {
    ArchiveKind::detect(archive).ok_or_else(|| ExtractError::NotAnArchive(archive.to_path_buf()))
}

/// Extract every entry of `archive` under `dest` (created if missing).
pub fn extract_all(archive: &Path, dest: &Path) -> Result<(), ExtractError> {
    let kind = kind_of(archive)?;
    std::fs::create_dir_all(dest)?;
    let count = match kind {
        ArchiveKind::Zip => zipfile::extract_all(archive, dest)?,
        ArchiveKind::TarGz => targz::extract_all(archive, dest)?,
    };
    tracing::info!(archive = %archive.display(), dest = %dest.display(), entries = count, "extracted archive");
    Ok(())
}

/// Extract the single entry stored as `name` to `dest/<basename(name)>` and return that path.
pub fn extract_one(archive: &Path, name: &str, dest: &Path) -> Result<PathBuf, ExtractError> {
    let kind = kind_of(archive)?;
    let file_name = Path::new(name)
        .file_name()
        .ok_or_else(|| ExtractError::UnsafePath(name.to_string()))?;
    std::fs::create_dir_all(dest)?;
    let target = dest.join(file_name);
    let found = match kind {
        ArchiveKind::Zip => zipfile::extract_one(archive, name, &target)?,
        ArchiveKind::TarGz => targz::extract_one(archive, name, &target)?,
    };
    if !found {
        return Err(ExtractError::EntryNotFound(name.to_string()));
    }
    tracing::debug!(archive = %archive.display(), entry = name, target = %target.display(), "extracted entry");
    Ok(target)
}
