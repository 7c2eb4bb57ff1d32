//! Per-call resolution settings.

use crate::cache::default_cache_dir;
use crate::error::{CachedPathError, Result};
use crate::lock::LockPolicy;
use crate::progress::Progress;
use crate::retry::RetryPolicy;
use crate::transport::{Headers, HttpClientConfig};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Options for [`crate::resolve`]. Every field has a default; use [`ResolveOptions::builder`]
/// to set a few.
#[derive(Clone)]
pub struct ResolveOptions {
    /// Cache root; `None` uses [`default_cache_dir`].
    pub cache_dir: Option<PathBuf>,
    /// Extract the resolved file into a directory when it is an archive.
    pub extract_archive: bool,
    /// Recreate an existing extraction directory.
    pub force_extract: bool,
    /// Suppress the default progress reporting.
    pub quiet: bool,
    /// Custom progress sink; `None` uses [`crate::progress::LogProgress`].
    pub progress: Option<Arc<dyn Progress>>,
    /// Headers sent with every request (e.g. `Authorization`).
    pub headers: Headers,
    /// Curl handle settings; replaces the ones derived from `timeout`.
    pub http_client: Option<HttpClientConfig>,
    /// Per-request timeout.
    pub timeout: Duration,
    pub max_retries: u32,
    /// Linear backoff unit: retry `n` waits `retry_delay * n`.
    pub retry_delay: Duration,
    pub lock: LockPolicy,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            cache_dir: None,
            extract_archive: false,
            force_extract: false,
            quiet: false,
            progress: None,
            headers: Headers::new(),
            http_client: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            lock: LockPolicy::default(),
        }
    }
}

impl fmt::Debug for ResolveOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Header values may carry credentials.
        let mut header_names: Vec<&String> = self.headers.keys().collect();
        header_names.sort();
        f.debug_struct("ResolveOptions")
            .field("cache_dir", &self.cache_dir)
            .field("extract_archive", &self.extract_archive)
            .field("force_extract", &self.force_extract)
            .field("quiet", &self.quiet)
            .field("progress", &self.progress.as_ref().map(|_| "custom"))
            .field("headers", &header_names)
            .field("http_client", &self.http_client)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .field("lock", &self.lock)
            .finish()
    }
}

impl ResolveOptions {
    pub fn builder() -> ResolveOptionsBuilder {
        ResolveOptionsBuilder::default()
    }

    /// Explicit cache root, else the environment/XDG default.
    pub fn cache_root(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_cache_dir()
                .map_err(|e| CachedPathError::io("failed to determine default cache directory", e)),
        }
    }

    /// Set one header, replacing any existing header with the same name in any case.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: self.retry_delay,
        }
    }

    /// Curl settings: the explicit client config, else defaults with `timeout`.
    pub fn http_client_config(&self) -> HttpClientConfig {
        self.http_client
            .clone()
            .unwrap_or_else(|| HttpClientConfig::with_timeout(self.timeout))
    }
}

/// Consuming builder for [`ResolveOptions`].
#[derive(Debug, Clone, Default)]
pub struct ResolveOptionsBuilder {
    options: ResolveOptions,
}

impl ResolveOptionsBuilder {
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.cache_dir = Some(dir.into());
        self
    }

    pub fn extract_archive(mut self, yes: bool) -> Self {
        self.options.extract_archive = yes;
        self
    }

    pub fn force_extract(mut self, yes: bool) -> Self {
        self.options.force_extract = yes;
        self
    }

    pub fn quiet(mut self, yes: bool) -> Self {
        self.options.quiet = yes;
        self
    }

    pub fn progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.options.progress = Some(progress);
        self
    }

    /// Replace all headers.
    pub fn headers(mut self, headers: Headers) -> Self {
        self.options.headers = headers;
        self
    }

    /// Add or replace one header (names compare case-insensitively).
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.set_header(name, value);
        self
    }

    pub fn user_agent(self, user_agent: impl Into<String>) -> Self {
        self.header("User-Agent", user_agent)
    }

    /// `Authorization: Bearer <token>`.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        self.header("Authorization", value)
    }

    pub fn http_client(mut self, config: HttpClientConfig) -> Self {
        self.options.http_client = Some(config);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.options.max_retries = n;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.options.retry_delay = delay;
        self
    }

    pub fn lock_policy(mut self, policy: LockPolicy) -> Self {
        self.options.lock = policy;
        self
    }

    pub fn build(self) -> ResolveOptions {
        self.options
    }
}
