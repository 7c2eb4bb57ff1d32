//! Settings for the underlying libcurl easy handle.

use std::time::Duration;

/// How each curl handle is configured. Supplying one replaces the defaults derived
/// from the resolver's request timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Limit for establishing the connection (capped at `timeout`).
    pub connect_timeout: Duration,
    /// Overall limit for one request, body included.
    pub timeout: Duration,
    pub follow_redirects: bool,
    pub max_redirections: u32,
    /// Abort when throughput stays below `.0` bytes/s for `.1`.
    pub low_speed: Option<(u32, Duration)>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(30),
            follow_redirects: true,
            max_redirections: 10,
            low_speed: None,
        }
    }
}

impl HttpClientConfig {
    /// Defaults with a different overall timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// New easy handle for `uri` with these settings applied.
    pub(crate) fn easy(&self, uri: &str) -> Result<curl::easy::Easy, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.url(uri)?;
        easy.follow_location(self.follow_redirects)?;
        if self.follow_redirects {
            easy.max_redirections(self.max_redirections)?;
        }
        easy.connect_timeout(self.connect_timeout.min(self.timeout))?;
        easy.timeout(self.timeout)?;
        if let Some((limit, window)) = self.low_speed {
            easy.low_speed_limit(limit)?;
            easy.low_speed_time(window)?;
        }
        Ok(easy)
    }
}
