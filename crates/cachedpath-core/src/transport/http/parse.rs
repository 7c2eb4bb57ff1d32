//! Parse HTTP response header lines.

/// Headers of a HEAD response that matter for caching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadResult {
    /// Total size in bytes, if `Content-Length` is present and numeric.
    pub content_length: Option<u64>,
    /// `ETag` value, surrounding quotes removed.
    pub etag: Option<String>,
    /// `Last-Modified` value.
    pub last_modified: Option<String>,
}

impl HeadResult {
    /// Strong validator if present, else the modification time, else empty.
    pub fn revision(&self) -> String {
        self.etag
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.last_modified.as_deref())
            .unwrap_or_default()
            .to_string()
    }
}

/// Status code from a status line such as `HTTP/1.1 200 OK`.
pub(crate) fn status_code(line: &[u8]) -> Option<u32> {
    let line = std::str::from_utf8(line).ok()?;
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Parse header lines of the final response into a HeadResult.
pub(crate) fn parse_headers(lines: &[String]) -> HeadResult {
    let mut out = HeadResult::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                out.content_length = value.parse::<u64>().ok();
            } else if name.eq_ignore_ascii_case("etag") {
                out.etag = Some(unquote(value).to_string());
            } else if name.eq_ignore_ascii_case("last-modified") {
                out.last_modified = Some(value.to_string());
            }
        }
    }

    out
}
