use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{StoreError, StoreResult};
use crate::path::validate_path;
use crate::transport::{BlobTransport, Versioned};
use crate::version::content_version;

/// In-memory, map-based blob transport.
///
/// Intended for tests and embedding. All blobs are held in memory behind a
/// `RwLock` for safe concurrent access. Blobs are cloned on read/write.
pub struct InMemoryBlobStore {
    blobs: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read_guard()?.len())
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read_guard()?.is_empty())
    }

    /// Total bytes across all stored blobs.
    pub fn total_bytes(&self) -> StoreResult<u64> {
        Ok(self
            .read_guard()?
            .values()
            .map(|b| b.len() as u64)
            .sum())
    }

    /// Raw bytes at `path`, bypassing version tagging. Handy in tests that
    /// inspect what a decorator chain actually wrote.
    pub fn raw(&self, path: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.read_guard()?.get(path).cloned())
    }

    fn read_guard(&self) -> StoreResult<RwLockReadGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.blobs
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write_guard(&self) -> StoreResult<RwLockWriteGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.blobs
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobTransport for InMemoryBlobStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn read(&self, path: &str) -> StoreResult<Option<Versioned<Vec<u8>>>> {
        validate_path(path)?;
        let map = self.read_guard()?;
        Ok(map.get(path).map(|data| {
            let version = content_version(data);
            Versioned::new(data.clone(), Some(version))
        }))
    }

    fn write(&self, path: &str, data: &[u8]) -> StoreResult<()> {
        validate_path(path)?;
        self.write_guard()?.insert(path.to_string(), data.to_vec());
        Ok(())
    }

    fn delete(&self, path: &str) -> StoreResult<bool> {
        validate_path(path)?;
        Ok(self.write_guard()?.remove(path).is_some())
    }

    fn exists(&self, path: &str) -> StoreResult<bool> {
        validate_path(path)?;
        Ok(self.read_guard()?.contains_key(path))
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let map = self.read_guard()?;
        // BTreeMap iteration is already sorted.
        Ok(map
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len().unwrap_or_default();
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &count)
            .finish()
    }
}
