//! ZIP containers.

use super::write::write_entry;
use super::{safe_join, ExtractError};
use std::fs::File;
use std::path::Path;
use zip::ZipArchive;

fn open(archive: &Path) -> Result<ZipArchive<File>, ExtractError> {
    Ok(ZipArchive::new(File::open(archive)?)?)
}

pub(super) fn extract_all(archive: &Path, dest: &Path) -> Result<usize, ExtractError> {
    let mut zip = open(archive)?;
    for i in 0..zip.len() {
        let mut file = zip.by_index(i)?;
        let name = file.name().to_string();
        let out = safe_join(dest, &name)?;
        if file.is_dir() {
            std::fs::create_dir_all(&out)?;
            continue;
        }
        let mode = file.unix_mode();
        write_entry(&mut file, &out, mode)?;
    }
    Ok(zip.len())
}

/// Returns false when no entry is stored as `name`.
pub(super) fn extract_one(archive: &Path, name: &str, target: &Path) -> Result<bool, ExtractError> {
    let mut zip = open(archive)?;
    for i in 0..zip.len() {
        let mut file = zip.by_index(i)?;
        if file.name() != name || file.is_dir() {
            continue;
        }
        let mode = file.unix_mode();
        write_entry(&mut file, target, mode)?;
        return Ok(true);
    }
    Ok(false)
}
