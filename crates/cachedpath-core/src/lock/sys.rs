//! Thin `flock(2)` wrappers.

use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;

/// Non-blocking exclusive lock. `Ok(false)` means another holder has it.
pub(super) fn try_lock_exclusive(file: &File) -> io::Result<bool> {
    let r = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if r == 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    if err.kind() == io::ErrorKind::WouldBlock {
        Ok(false)
    } else {
        Err(err)
    }
}

pub(super) fn unlock(file: &File) -> io::Result<()> {
    let r = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_UN) };
    if r == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}
