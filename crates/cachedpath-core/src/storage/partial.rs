//! Sequential writer for one in-flight download.

use crate::error::{CachedPathError, Result};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
#[cfg(unix)]
use std::os::unix::io::AsRawFd;

/// A temp file that is either committed onto its final path or removed on drop.
#[derive(Debug)]
pub struct PartialFile {
    file: Option<File>,
    temp_path: PathBuf,
    written: u64,
}

impl PartialFile {
    /// Create (or truncate) the temp file at `temp_path`.
    pub fn create(temp_path: &Path) -> Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)
            .map_err(|e| {
                CachedPathError::io(format!("failed to create temp file: {}", temp_path.display()), e)
            })?;
        Ok(PartialFile {
            file: Some(file),
            temp_path: temp_path.to_path_buf(),
            written: 0,
        })
    }

    /// Reserve `size` bytes. On Unix tries `posix_fallocate`; falls back to `set_len`.
    /// The file is trimmed back to the bytes actually written on commit.
    pub fn preallocate(&mut self, size: u64) -> Result<()> {
        let file = self.file_mut()?;
        #[cfg(unix)]
        {
            let fd = file.as_raw_fd();
            let r = unsafe { libc::posix_fallocate(fd, 0, size as libc::off_t) };
            if r == 0 {
                return Ok(());
            }
            tracing::debug!(errno = r, "posix_fallocate failed, falling back to set_len");
        }
        file.set_len(size)
            .map_err(|e| CachedPathError::io("failed to preallocate temp file", e))
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Truncate to the written length, sync, and rename onto `final_path`.
    pub fn commit(mut self, final_path: &Path) -> Result<()> {
        let file = self.file.take().ok_or_else(closed)?;
        file.set_len(self.written)
            .and_then(|_| file.sync_all())
            .map_err(|e| CachedPathError::io(format!("failed to sync {}", self.temp_path.display()), e))?;
        drop(file);

        std::fs::rename(&self.temp_path, final_path).map_err(|e| {
            CachedPathError::io(
                format!(
                    "failed to rename {} to {}",
                    self.temp_path.display(),
                    final_path.display()
                ),
                e,
            )
        })?;
        // Nothing left to clean up.
        self.temp_path = PathBuf::new();
        Ok(())
    }

    fn file_mut(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or_else(closed)
    }
}

fn closed() -> CachedPathError {
    CachedPathError::io(
        "temp file already closed",
        io::Error::new(io::ErrorKind::Other, "closed"),
    )
}

impl Write for PartialFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "temp file already closed"))?;
        let n = file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(f) => f.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.temp_path.as_os_str().is_empty() {
            return;
        }
        drop(self.file.take());
        if let Err(e) = std::fs::remove_file(&self.temp_path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %self.temp_path.display(), error = %e, "failed to remove temp file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::temp_path;

    #[test]
    fn preallocate_write_commit_trims_to_written() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("output.bin");
        let tp = temp_path(&final_path);

        let mut part = PartialFile::create(&tp).unwrap();
        part.preallocate(100).unwrap();
        part.write_all(b"hello ").unwrap();
        part.write_all(b"world").unwrap();
        assert_eq!(part.written(), 11);
        part.commit(&final_path).unwrap();

        assert!(!tp.exists());
        assert_eq!(std::fs::read(&final_path).unwrap(), b"hello world");
    }

    #[test]
    fn dropped_without_commit_removes_temp() {
        let dir = tempfile::tempdir().unwrap();
        let tp = dir.path().join("x.part");
        {
            let mut part = PartialFile::create(&tp).unwrap();
            part.write_all(b"partial").unwrap();
            assert!(tp.exists());
        }
        assert!(!tp.exists());
    }

    #[test]
    fn create_truncates_stale_temp() {
        let dir = tempfile::tempdir().unwrap();
        let tp = dir.path().join("y.part");
        std::fs::write(&tp, b"stale leftovers").unwrap();
        let mut part = PartialFile::create(&tp).unwrap();
        part.write_all(b"new").unwrap();
        let final_path = dir.path().join("y");
        part.commit(&final_path).unwrap();
        assert_eq!(std::fs::read(&final_path).unwrap(), b"new");
    }
}
