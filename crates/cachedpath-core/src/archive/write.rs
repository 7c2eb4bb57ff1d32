//! Materialize one entry on disk.

use std::io::{self, Read};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Copy `reader` to `target` via a temp file in the same directory, then apply `mode`.
pub(super) fn write_entry(reader: &mut dyn Read, target: &Path, mode: Option<u32>) -> io::Result<u64> {
    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    let n = io::copy(reader, tmp.as_file_mut())?;
    tmp.persist(target).map_err(|e| e.error)?;

    if let Some(mode) = mode.map(|m| m & 0o7777).filter(|m| *m != 0) {
        std::fs::set_permissions(target, std::fs::Permissions::from_mode(mode))?;
    }
    Ok(n)
}
