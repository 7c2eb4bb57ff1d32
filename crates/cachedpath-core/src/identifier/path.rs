//! File extension extraction from a URL path.

/// Compound extensions kept whole so archive detection still works on cache names.
const COMPOUND_EXTENSIONS: &[&str] = &[".tar.gz"];

/// Returns the extension (with leading dot) of the last path segment of `uri`.
///
/// `.tar.gz` is kept as one extension. Query and fragment are ignored.
/// Returns `None` if the URL cannot be parsed or the segment has no extension.
pub fn extension_from_uri(uri: &str) -> Option<String> {
    let parsed = url::Url::parse(uri).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    let lower = segment.to_ascii_lowercase();
    for compound in COMPOUND_EXTENSIONS {
        if lower.len() > compound.len() && lower.ends_with(compound) {
            return Some(segment[segment.len() - compound.len()..].to_string());
        }
    }
    let dot = segment.rfind('.')?;
    if dot == 0 || dot + 1 == segment.len() {
        return None;
    }
    Some(segment[dot..].to_string())
}
