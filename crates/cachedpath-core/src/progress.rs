//! Download progress reporting (bytes done, rate, ETA).
//!
//! The resolver feeds a [`Progress`] sink through [`ProgressWriter`], which wraps the
//! temporary file. [`LogProgress`] is the default sink and reports through `tracing`.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Receives progress for one download at a time.
pub trait Progress: Send + Sync {
    /// A transfer of `total` bytes (0 if unknown) is starting.
    fn start(&self, total: u64, description: &str);
    /// `written` bytes have reached the sink so far.
    fn update(&self, written: u64);
    fn finish(&self);
}

/// Snapshot of download progress.
#[derive(Debug, Clone)]
pub struct ProgressStats {
    pub bytes_done: u64,
    /// Total size in bytes (0 if the server did not declare one).
    pub total_bytes: u64,
    pub elapsed_secs: f64,
}

impl ProgressStats {
    /// Rate in bytes per second (0 if elapsed is 0).
    pub fn bytes_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.bytes_done as f64 / self.elapsed_secs
    }

    /// Estimated seconds remaining (None if the total or the rate is unknown).
    pub fn eta_secs(&self) -> Option<f64> {
        if self.total_bytes == 0 {
            return None;
        }
        let remaining = self.total_bytes.saturating_sub(self.bytes_done);
        if remaining == 0 {
            return Some(0.0);
        }
        let rate = self.bytes_per_sec();
        if rate <= 0.0 {
            return None;
        }
        Some(remaining as f64 / rate)
    }

    /// Fraction complete in [0.0, 1.0]; 0 when the total is unknown.
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        (self.bytes_done as f64 / self.total_bytes as f64).min(1.0)
    }
}

struct LogState {
    started: Instant,
    total: u64,
    done: u64,
    description: String,
    /// Last reported tenth (0..=10).
    last_decile: u64,
}

/// Logs start, every 10% and completion. `quiet` silences everything.
pub struct LogProgress {
    quiet: bool,
    state: Mutex<Option<LogState>>,
}

impl LogProgress {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            state: Mutex::new(None),
        }
    }

    /// Current snapshot, if a transfer has started.
    pub fn stats(&self) -> Option<ProgressStats> {
        let guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().map(|s| ProgressStats {
            bytes_done: s.done,
            total_bytes: s.total,
            elapsed_secs: s.started.elapsed().as_secs_f64(),
        })
    }
}

impl Progress for LogProgress {
    fn start(&self, total: u64, description: &str) {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(LogState {
            started: Instant::now(),
            total,
            done: 0,
            description: description.to_string(),
            last_decile: 0,
        });
        if !self.quiet {
            tracing::info!(total_bytes = total, "downloading {}", description);
        }
    }

    fn update(&self, written: u64) {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(state) = guard.as_mut() else {
            return;
        };
        state.done = written;
        if self.quiet || state.total == 0 {
            return;
        }
        let decile = (written.min(state.total) * 10) / state.total;
        if decile > state.last_decile {
            state.last_decile = decile;
            let stats = ProgressStats {
                bytes_done: written,
                total_bytes: state.total,
                elapsed_secs: state.started.elapsed().as_secs_f64(),
            };
            tracing::debug!(
                percent = decile * 10,
                bytes_per_sec = stats.bytes_per_sec() as u64,
                eta_secs = stats.eta_secs().unwrap_or(0.0),
                "{}",
                state.description
            );
        }
    }

    fn finish(&self) {
        let guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if self.quiet {
            return;
        }
        if let Some(state) = guard.as_ref() {
            tracing::info!(
                bytes = state.done,
                elapsed_secs = state.started.elapsed().as_secs_f64(),
                "downloaded {}",
                state.description
            );
        }
    }
}

/// Forwards writes to `inner` and reports the running byte count.
pub struct ProgressWriter<'a, W: Write> {
    inner: W,
    progress: &'a dyn Progress,
    written: u64,
}

impl<'a, W: Write> ProgressWriter<'a, W> {
    pub fn new(inner: W, progress: &'a dyn Progress) -> Self {
        Self {
            inner,
            progress,
            written: 0,
        }
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for ProgressWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        self.progress.update(self.written);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
