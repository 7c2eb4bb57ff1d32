//! TAR+GZIP containers.

use super::write::write_entry;
use super::{safe_join, ExtractError};
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::Path;
use tar::{Archive, EntryType};

fn open(archive: &Path) -> Result<Archive<GzDecoder<File>>, ExtractError> {
    Ok(Archive::new(GzDecoder::new(File::open(archive)?)))
}

pub(super) fn extract_all(archive: &Path, dest: &Path) -> Result<usize, ExtractError> {
    let mut tar = open(archive)?;
    let mut count = 0;
    for entry in tar.entries()? {
        let mut entry = entry?;
        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let out = safe_join(dest, &name)?;
        count += 1;
        match entry.header().entry_type() {
            EntryType::Directory => std::fs::create_dir_all(&out)?,
            EntryType::Regular | EntryType::Continuous => {
                let mode = entry.header().mode().ok();
                write_entry(&mut entry, &out, mode)?;
            }
            other => {
                // Links and special files could point outside the destination.
                tracing::warn!(entry = %name, kind = ?other, "skipping non-regular tar entry");
            }
        }
    }
    Ok(count)
}

/// Returns false when no regular file is stored as `name`.
pub(super) fn extract_one(archive: &Path, name: &str, target: &Path) -> Result<bool, ExtractError> {
    let mut tar = open(archive)?;
    for entry in tar.entries()? {
        let mut entry = entry?;
        if entry.path_bytes().as_ref() != name.as_bytes() {
            continue;
        }
        if !matches!(entry.header().entry_type(), EntryType::Regular | EntryType::Continuous) {
            continue;
        }
        let mode = entry.header().mode().ok();
        write_entry(&mut entry, target, mode)?;
        return Ok(true);
    }
    Ok(false)
}
