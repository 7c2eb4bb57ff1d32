//! `cachedpath resolve` – print the local path for an identifier.

use anyhow::{Context, Result};
use cachedpath_core::config::{self, CachedPathConfig};
use cachedpath_core::{ResolveOptions, Resolver};
use std::path::PathBuf;
use std::time::Duration;

/// Command-line overrides layered on top of the config file.
#[derive(Debug, Default)]
pub struct ResolveFlags {
    pub cache_dir: Option<PathBuf>,
    pub extract: bool,
    pub force_extract: bool,
    pub quiet: bool,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<u64>,
    pub max_retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

impl ResolveFlags {
    /// Config defaults with these flags applied.
    pub fn apply(self, base: ResolveOptions) -> ResolveOptions {
        let mut opts = base;
        if let Some(dir) = self.cache_dir {
            opts.cache_dir = Some(dir);
        }
        opts.extract_archive |= self.extract || self.force_extract;
        opts.force_extract = self.force_extract;
        opts.quiet = self.quiet;
        for (name, value) in self.headers {
            opts.set_header(name, value);
        }
        if let Some(secs) = self.timeout {
            opts.timeout = Duration::from_secs(secs);
        }
        if let Some(n) = self.max_retries {
            opts.max_retries = n;
        }
        if let Some(ms) = self.retry_delay_ms {
            opts.retry_delay = Duration::from_millis(ms);
        }
        opts
    }
}

pub fn run_resolve(identifier: &str, flags: ResolveFlags) -> Result<()> {
    let cfg = config::load_or_init().unwrap_or_else(|e| {
        tracing::warn!("config unavailable, using defaults: {:#}", e);
        CachedPathConfig::default()
    });
    tracing::debug!("loaded config: {:?}", cfg);

    let options = flags.apply(cfg.to_options().context("invalid config")?);
    let resolver = Resolver::new(options);
    let path = resolver
        .resolve(identifier)
        .with_context(|| format!("resolve {identifier}"))?;
    println!("{}", path.display());
    Ok(())
}
