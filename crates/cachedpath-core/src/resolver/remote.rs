//! Remote identifiers: probe, lock, fetch-if-stale, publish.

use super::Resolver;
use crate::cache::{CacheEntry, CacheStore, MetaRecord};
use crate::error::{CachedPathError, Result};
use crate::lock::with_lock;
use crate::progress::{LogProgress, Progress, ProgressWriter};
use crate::transport::Transport;
use std::path::PathBuf;

/// Make sure `uri` is in the cache at its current revision and return the cache path.
pub(super) fn fetch_cached(
    resolver: &Resolver,
    store: &CacheStore,
    transport: &dyn Transport,
    uri: &str,
) -> Result<PathBuf> {
    let options = &resolver.options;

    let revision = match transport.probe_revision(uri, &options.headers) {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!(uri, error = %e, "revision probe failed, caching without one");
            String::new()
        }
    };

    let entry = store.entry_for(uri, &revision);
    with_lock(&entry.lock_path, &options.lock, || {
        if store.is_fresh(&entry, &revision) {
            tracing::debug!(uri, path = %entry.cache_path.display(), "cache hit");
            return Ok(());
        }
        download(resolver, transport, store, &entry, uri)?;
        // Inside the lock so waiters see the entry as fresh.
        store.write_metadata(&entry, &MetaRecord::new(uri, revision.as_str(), &entry.cache_path));
        Ok(())
    })?;
    Ok(entry.cache_path)
}

fn download(
    resolver: &Resolver,
    transport: &dyn Transport,
    store: &CacheStore,
    entry: &CacheEntry,
    uri: &str,
) -> Result<()> {
    let options = &resolver.options;
    let size = transport.probe_size(uri, &options.headers).unwrap_or_else(|e| {
        tracing::debug!(uri, error = %e, "size probe failed");
        0
    });

    let mut part = store.begin_write(entry)?;
    if size > 0 {
        if let Err(e) = part.preallocate(size) {
            tracing::debug!(error = %e, "preallocation skipped");
        }
    }

    let default_progress;
    let progress: &dyn Progress = match &options.progress {
        Some(p) => p.as_ref(),
        None => {
            default_progress = LogProgress::new(options.quiet);
            &default_progress
        }
    };

    progress.start(size, uri);
    let fetched = {
        let mut writer = ProgressWriter::new(&mut part, progress);
        transport.fetch_into(uri, &mut writer, &options.headers)
    };
    progress.finish();

    fetched.map_err(|source| CachedPathError::DownloadFailed {
        uri: uri.to_string(),
        source,
    })?;
    store.publish(part, entry)
}
