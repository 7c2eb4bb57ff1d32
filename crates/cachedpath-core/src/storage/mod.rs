//! Temporary download files and their atomic publish.
//!
//! Downloads land in `<cache path>.part` (preallocated when the size is known) and
//! are renamed onto the cache path only once complete.

mod partial;

pub use partial::PartialFile;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `abc.zip` → `abc.zip.part`).
pub fn temp_path(final_path: &std::path::Path) -> std::path::PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    std::path::PathBuf::from(o)
}
