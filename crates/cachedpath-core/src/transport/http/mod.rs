//! HTTP/HTTPS transport over libcurl.
//!
//! GET streams the body into the caller's sink; HEAD probes size and validators.
//! Every request goes through the shared retry policy.

mod client;
mod parse;

pub use client::HttpClientConfig;
pub use parse::HeadResult;

use super::{Headers, Transport};
use crate::retry::{run_with_retry, RetryPolicy, TransferError};
use std::cell::Cell;
use std::io::Write;
use std::str;

/// User-Agent sent when the caller does not provide one.
pub const DEFAULT_USER_AGENT: &str = concat!("cachedpath/", env!("CARGO_PKG_VERSION"));

/// Transport for `http` (and `https` through the registry alias).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: HttpClientConfig,
    retry: RetryPolicy,
    user_agent: String,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(HttpClientConfig::default(), RetryPolicy::default())
    }
}

impl HttpTransport {
    pub fn new(client: HttpClientConfig, retry: RetryPolicy) -> Self {
        Self {
            client,
            retry,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Override the fallback User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn client_config(&self) -> &HttpClientConfig {
        &self.client
    }

    /// HEAD with retry.
    pub fn head(&self, uri: &str, headers: &Headers) -> Result<HeadResult, TransferError> {
        run_with_retry(&self.retry, || self.head_once(uri, headers))
    }

    fn prepare(&self, uri: &str, headers: &Headers) -> Result<curl::easy::Easy, TransferError> {
        let mut easy = self.client.easy(uri).map_err(TransferError::Curl)?;

        // Build curl list for custom headers ("Name: value").
        let mut list = curl::easy::List::new();
        let mut has_user_agent = false;
        for (k, v) in headers {
            has_user_agent |= k.trim().eq_ignore_ascii_case("user-agent");
            list.append(&format!("{}: {}", k.trim(), v.trim()))
                .map_err(TransferError::Curl)?;
        }
        if !headers.is_empty() {
            easy.http_headers(list).map_err(TransferError::Curl)?;
        }
        if !has_user_agent {
            easy.useragent(&self.user_agent).map_err(TransferError::Curl)?;
        }
        Ok(easy)
    }

    fn head_once(&self, uri: &str, headers: &Headers) -> Result<HeadResult, TransferError> {
        let mut easy = self.prepare(uri, headers)?;
        easy.nobody(true).map_err(TransferError::Curl)?;

        let mut lines: Vec<String> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer
                .header_function(|data| {
                    // A new status line starts the headers of the next hop of a redirect.
                    if parse::status_code(data).is_some() {
                        lines.clear();
                    }
                    if let Ok(s) = str::from_utf8(data) {
                        lines.push(s.trim_end().to_string());
                    }
                    true
                })
                .map_err(TransferError::Curl)?;
            transfer.perform().map_err(TransferError::Curl)?;
        }

        let code = easy.response_code().map_err(TransferError::Curl)?;
        if !(200..300).contains(&code) {
            return Err(TransferError::Http(code));
        }
        Ok(parse::parse_headers(&lines))
    }

    fn get_once(&self, uri: &str, sink: &mut dyn Write, headers: &Headers) -> Result<u64, TransferError> {
        let mut easy = self.prepare(uri, headers)?;

        let status = Cell::new(0u32);
        let written = Cell::new(0u64);
        let mut sink_error: Option<std::io::Error> = None;

        let performed = {
            let mut transfer = easy.transfer();
            transfer
                .header_function(|data| {
                    if let Some(code) = parse::status_code(data) {
                        status.set(code);
                    }
                    true
                })
                .map_err(TransferError::Curl)?;
            transfer
                .write_function(|data| {
                    // Error and redirect bodies never reach the sink.
                    if !(200..300).contains(&status.get()) {
                        return Ok(data.len());
                    }
                    match sink.write_all(data) {
                        Ok(()) => {
                            written.set(written.get() + data.len() as u64);
                            Ok(data.len())
                        }
                        Err(e) => {
                            sink_error = Some(e);
                            Ok(0) // abort transfer
                        }
                    }
                })
                .map_err(TransferError::Curl)?;
            transfer.perform()
        };

        if let Err(e) = performed {
            if let Some(io_err) = sink_error.take() {
                return Err(TransferError::Sink(io_err));
            }
            if written.get() > 0 {
                return Err(TransferError::Interrupted {
                    written: written.get(),
                    source: e,
                });
            }
            return Err(TransferError::Curl(e));
        }

        let code = easy.response_code().map_err(TransferError::Curl)?;
        if !(200..300).contains(&code) {
            return Err(TransferError::Http(code));
        }
        Ok(written.get())
    }
}

impl Transport for HttpTransport {
    fn scheme(&self) -> &str {
        "http"
    }

    fn fetch_into(&self, uri: &str, sink: &mut dyn Write, headers: &Headers) -> Result<u64, TransferError> {
        let bytes = run_with_retry(&self.retry, || self.get_once(uri, &mut *sink, headers))?;
        tracing::debug!(uri, bytes, "GET complete");
        Ok(bytes)
    }

    fn probe_size(&self, uri: &str, headers: &Headers) -> Result<u64, TransferError> {
        Ok(self.head(uri, headers)?.content_length.unwrap_or(0))
    }

    fn probe_revision(&self, uri: &str, headers: &Headers) -> Result<String, TransferError> {
        Ok(self.head(uri, headers)?.revision())
    }
}
