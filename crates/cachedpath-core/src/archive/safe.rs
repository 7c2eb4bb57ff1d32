//! Lexical containment check for stored entry names.

use super::ExtractError;
use std::path::{Component, Path, PathBuf};

/// Join `name` under `dest`, or fail if the result would leave `dest`.
///
/// Purely lexical: absolute names, drive prefixes and `..` that climbs above the
/// destination are rejected. `a/../b` is allowed and normalized to `dest/b`.
pub fn safe_join(dest: &Path, name: &str) -> Result<PathBuf, ExtractError> {
    let unsafe_path = || ExtractError::UnsafePath(name.to_string());
    if name.starts_with('/') || name.starts_with('\\') {
        return Err(unsafe_path());
    }

    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(p) => parts.push(p),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(unsafe_path());
                }
            }
            Component::RootDir | Component::Prefix(_) => return Err(unsafe_path()),
        }
    }

    let mut out = dest.to_path_buf();
    out.extend(parts);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_nested_names() {
        let d = Path::new("/dest");
        assert_eq!(safe_join(d, "a.txt").unwrap(), PathBuf::from("/dest/a.txt"));
        assert_eq!(safe_join(d, "./x/y/z.bin").unwrap(), PathBuf::from("/dest/x/y/z.bin"));
        assert_eq!(safe_join(d, "x/../y").unwrap(), PathBuf::from("/dest/y"));
        assert_eq!(safe_join(d, "dir/").unwrap(), PathBuf::from("/dest/dir"));
    }

    #[test]
    fn escaping_names_rejected() {
        let d = Path::new("/dest");
        for bad in ["../../etc/passwd", "/etc/passwd", "a/../../b", "..", "\\evil"] {
            assert!(
                matches!(safe_join(d, bad), Err(ExtractError::UnsafePath(_))),
                "{bad} should be rejected"
            );
        }
    }
}
