//! Cross-process lock around history rewrites.
//!
//! The history file is read, modified and written back whole, so two
//! `tubelens` processes finishing at once would lose an entry. Writers
//! take an exclusive `flock()` on `tubelens.lock` in the data directory
//! first. On non-unix targets the lock is a no-op.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

const LOCK_FILE_NAME: &str = "tubelens.lock";

/// Held by whoever is rewriting the history; `None` when the backend has
/// no other process to coordinate with.
pub type LockGuard = Option<FileLock>;

#[derive(Clone, Copy, Debug)]
enum Wait {
    Block,
    #[cfg(test)]
    Fail,
}

/// Exclusive lock on the data directory, released on drop.
#[derive(Debug)]
pub struct FileLock {
    file: File,
}

impl FileLock {
    /// Waits until no other process holds the lock.
    pub fn acquire_blocking(data_dir: &Path) -> io::Result<Self> {
        Self::acquire(data_dir, Wait::Block)
    }

    /// Fails with `WouldBlock` instead of waiting.
    #[cfg(test)]
    pub fn try_acquire(data_dir: &Path) -> io::Result<Self> {
        Self::acquire(data_dir, Wait::Fail)
    }

    fn acquire(data_dir: &Path, wait: Wait) -> io::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(data_dir.join(LOCK_FILE_NAME))?;

        sys::lock(&file, wait).map_err(|err| match err.kind() {
            io::ErrorKind::WouldBlock => io::Error::new(
                io::ErrorKind::WouldBlock,
                "history is being updated by another tubelens process",
            ),
            _ => err,
        })?;

        log::debug!("acquired history lock in {}", data_dir.display());
        Ok(FileLock { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(err) = sys::unlock(&self.file) {
            log::warn!("failed to release history lock: {err}");
        }
    }
}

#[cfg(unix)]
mod sys {
    use std::fs::File;
    use std::io;
    use std::os::unix::io::AsRawFd;

    use super::Wait;

    fn flock(file: &File, operation: libc::c_int) -> io::Result<()> {
        match unsafe { libc::flock(file.as_raw_fd(), operation) } {
            0 => Ok(()),
            _ => Err(io::Error::last_os_error()),
        }
    }

    pub fn lock(file: &File, wait: Wait) -> io::Result<()> {
        let operation = match wait {
            Wait::Block => libc::LOCK_EX,
            #[cfg(test)]
            Wait::Fail => libc::LOCK_EX | libc::LOCK_NB,
        };
        flock(file, operation)
    }

    pub fn unlock(file: &File) -> io::Result<()> {
        flock(file, libc::LOCK_UN)
    }
}

#[cfg(not(unix))]
mod sys {
    use std::fs::File;
    use std::io;

    use super::Wait;

    pub fn lock(_file: &File, _wait: Wait) -> io::Result<()> {
        Ok(())
    }

    pub fn unlock(_file: &File) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_second_holder_is_refused_until_release() {
        let dir = tempfile::tempdir().unwrap();

        let first = FileLock::try_acquire(dir.path()).unwrap();

        // flock is per open file description, so a second open conflicts
        let err = FileLock::try_acquire(dir.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
        assert!(err.to_string().contains("another tubelens process"));

        drop(first);
        assert!(FileLock::try_acquire(dir.path()).is_ok());
    }

    #[test]
    fn test_blocking_acquire_creates_lock_file() {
        let dir = tempfile::tempdir().unwrap();

        let held = FileLock::acquire_blocking(dir.path()).unwrap();
        assert!(dir.path().join(LOCK_FILE_NAME).exists());
        drop(held);

        assert!(FileLock::acquire_blocking(dir.path()).is_ok());
    }
}
