//! Optional defaults loaded from `~/.config/cachedpath/config.toml`.

use crate::options::ResolveOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Retry parameters (optional `[retry]` section).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Linear backoff unit in seconds (e.g. 0.5 = 500ms).
    pub base_delay_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_secs: 1.0,
        }
    }
}

/// Configuration file contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedPathConfig {
    /// Cache root; missing means `$CACHED_PATH_CACHE_ROOT` or the XDG cache dir.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Extract archives by default.
    #[serde(default)]
    pub extract_archive: bool,
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for CachedPathConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            timeout_secs: 30,
            extract_archive: false,
            retry: None,
            user_agent: None,
        }
    }
}

impl CachedPathConfig {
    /// Base options for a resolution; callers layer flags on top.
    /// Fails if `base_delay_secs` is negative, NaN, or too large for a `Duration`.
    pub fn to_options(&self) -> Result<ResolveOptions> {
        let retry = self.retry.clone().unwrap_or_default();
        let base_delay = Duration::try_from_secs_f64(retry.base_delay_secs)
            .with_context(|| format!("invalid retry.base_delay_secs: {}", retry.base_delay_secs))?;
        let mut builder = ResolveOptions::builder()
            .extract_archive(self.extract_archive)
            .timeout(Duration::from_secs(self.timeout_secs))
            .max_retries(retry.max_retries)
            .retry_delay(base_delay);
        if let Some(dir) = &self.cache_dir {
            builder = builder.cache_dir(dir.clone());
        }
        if let Some(ua) = &self.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        Ok(builder.build())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("cachedpath")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CachedPathConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = CachedPathConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml).with_context(|| format!("write config: {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: CachedPathConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    cfg.to_options()
        .with_context(|| format!("invalid config: {}", path.display()))?;
    Ok(cfg)
}
