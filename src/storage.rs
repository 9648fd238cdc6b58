use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::lock::{FileLock, LockGuard};

/// Key-value backend the history store persists through.
pub trait StorageManager: Send + Sync {
    fn write(&self, ident: &str, data: &[u8]) -> std::io::Result<()>;
    fn read(&self, ident: &str) -> std::io::Result<Vec<u8>>;
    fn exists(&self, ident: &str) -> bool;

    /// Exclusive lock held across a read-modify-write cycle.
    /// Backends without cross-process visibility skip it.
    fn lock_exclusive(&self) -> std::io::Result<LockGuard> {
        Ok(None)
    }
}

#[derive(Clone, Debug)]
pub struct BackendLocal {
    pub base_dir: PathBuf,
}

impl BackendLocal {
    pub fn new(storage_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&path)?;
        Ok(BackendLocal { base_dir: path })
    }

    fn path(&self, ident: &str) -> PathBuf {
        self.base_dir.join(ident)
    }
}

impl StorageManager for BackendLocal {
    fn exists(&self, ident: &str) -> bool {
        std::fs::metadata(self.path(ident)).is_ok()
    }

    fn read(&self, ident: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.path(ident))
    }

    fn write(&self, ident: &str, data: &[u8]) -> std::io::Result<()> {
        let temp_path = self.path(&format!(
            "{}-{ident}",
            rusty_ulid::generate_ulid_string()
        ));

        std::fs::write(&temp_path, data)?;

        std::fs::rename(&temp_path, self.path(ident))
    }

    fn lock_exclusive(&self) -> std::io::Result<LockGuard> {
        FileLock::acquire_blocking(&self.base_dir).map(Some)
    }
}

/// Process-local backend, used by tests and anywhere persistence is unwanted.
#[derive(Default)]
pub struct BackendMemory {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl BackendMemory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageManager for BackendMemory {
    fn write(&self, ident: &str, data: &[u8]) -> std::io::Result<()> {
        self.entries
            .lock()
            .map_err(|_| std::io::Error::other("memory backend poisoned"))?
            .insert(ident.to_string(), data.to_vec());
        Ok(())
    }

    fn read(&self, ident: &str) -> std::io::Result<Vec<u8>> {
        self.entries
            .lock()
            .map_err(|_| std::io::Error::other("memory backend poisoned"))?
            .get(ident)
            .cloned()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, ident.to_string()))
    }

    fn exists(&self, ident: &str) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.contains_key(ident))
            .unwrap_or(false)
    }
}
