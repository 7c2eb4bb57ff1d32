//! Cross-process advisory locks on `<cache path>.lock` files.
//!
//! Backed by `flock(2)`: the lock belongs to the open file description, so it
//! excludes other threads (each opens its own descriptor) as well as other processes.

mod sys;

use crate::error::{CachedPathError, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Suffix appended to a cache path to name its lock file.
pub const LOCK_SUFFIX: &str = ".lock";

/// Path of the lock guarding `target` (`target` + `.lock`).
pub fn lock_path_for(target: &Path) -> PathBuf {
    let mut o = target.as_os_str().to_owned();
    o.push(LOCK_SUFFIX);
    PathBuf::from(o)
}

/// Bounded polling wait for a contended lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockPolicy {
    /// Sleep between non-blocking attempts.
    pub poll_interval: Duration,
    /// Attempts before giving up with `LockFailed`.
    pub max_attempts: u32,
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_attempts: 60,
        }
    }
}

/// An acquired exclusive lock. Released by [`FileLock::release`] or on drop.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Open/create `path` and take the exclusive lock, polling per `policy`.
    pub fn acquire(path: &Path, policy: &LockPolicy) -> Result<Self> {
        let failed = |reason: String| CachedPathError::LockFailed {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| failed(e.to_string()))?;
        }
        let file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| failed(e.to_string()))?;

        let attempts = policy.max_attempts.max(1);
        for attempt in 1..=attempts {
            match sys::try_lock_exclusive(&file) {
                Ok(true) => {
                    tracing::debug!(path = %path.display(), attempt, "lock acquired");
                    return Ok(FileLock {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Ok(false) => {
                    if attempt == 1 {
                        tracing::debug!(path = %path.display(), "lock busy, waiting");
                    }
                    if attempt < attempts {
                        std::thread::sleep(policy.poll_interval);
                    }
                }
                Err(e) => return Err(failed(e.to_string())),
            }
        }
        Err(failed(format!("still held after {} attempts", attempts)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unlock and close. Consuming, so it can run only once.
    pub fn release(self) {
        // Drop does the work.
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = sys::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to unlock");
        }
    }
}

/// Run `body` while holding the lock at `path`; released on every exit path.
pub fn with_lock<T>(path: &Path, policy: &LockPolicy, body: impl FnOnce() -> Result<T>) -> Result<T> {
    let lock = FileLock::acquire(path, policy)?;
    let out = body();
    lock.release();
    out
}
