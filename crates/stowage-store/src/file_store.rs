use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::StoreResult;
use crate::transport::{BlobTransport, Versioned};

/// File-shaped backing store over any blob transport.
///
/// Appends the configured file extension to every path on the way down and
/// strips it again when listing, so callers never see the extension.
/// Entries without the extension are invisible to `list`.
pub struct FileStore {
    root: PathBuf,
    extension: String,
    transport: Arc<dyn BlobTransport>,
}

impl FileStore {
    /// `extension` may be given with or without the leading dot; an empty
    /// extension leaves paths untouched.
    pub fn new(
        root: impl Into<PathBuf>,
        extension: &str,
        transport: Arc<dyn BlobTransport>,
    ) -> Self {
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
            transport,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The extension without its leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Where `path` lives, relative to the root this store was given.
    pub fn location(&self, path: &str) -> PathBuf {
        self.root.join(self.physical(path))
    }

    fn physical(&self, path: &str) -> String {
        if self.extension.is_empty() {
            path.to_string()
        } else {
            format!("{path}.{}", self.extension)
        }
    }

    fn logical<'a>(&self, physical: &'a str) -> Option<&'a str> {
        if self.extension.is_empty() {
            return Some(physical);
        }
        physical
            .strip_suffix(self.extension.as_str())
            .and_then(|p| p.strip_suffix('.'))
            .filter(|p| !p.is_empty())
    }
}

impl BlobTransport for FileStore {
    fn name(&self) -> &str {
        "file-store"
    }

    fn read(&self, path: &str) -> StoreResult<Option<Versioned<Vec<u8>>>> {
        self.transport.read(&self.physical(path))
    }

    fn write(&self, path: &str, data: &[u8]) -> StoreResult<()> {
        self.transport.write(&self.physical(path), data)
    }

    fn delete(&self, path: &str) -> StoreResult<bool> {
        self.transport.delete(&self.physical(path))
    }

    fn exists(&self, path: &str) -> StoreResult<bool> {
        self.transport.exists(&self.physical(path))
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .transport
            .list(prefix)?
            .iter()
            .filter_map(|p| self.logical(p))
            .filter(|p| p.starts_with(prefix))
            .map(str::to_string)
            .collect())
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("root", &self.root)
            .field("extension", &self.extension)
            .field("transport", &self.transport.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBlobStore;

    fn store(ext: &str) -> (Arc<InMemoryBlobStore>, FileStore) {
        let mem = Arc::new(InMemoryBlobStore::new());
        let fs = FileStore::new("/data", ext, mem.clone());
        (mem, fs)
    }

    #[test]
    fn extension_is_applied_and_hidden() {
        let (mem, fs) = store(".json");
        assert_eq!(fs.extension(), "json");
        fs.write("users/1", b"{}").unwrap();
        assert!(mem.raw("users/1.json").unwrap().is_some());
        assert!(fs.exists("users/1").unwrap());
        assert_eq!(fs.list("users/").unwrap(), vec!["users/1"]);
        assert_eq!(fs.location("users/1"), PathBuf::from("/data/users/1.json"));
    }

    #[test]
    fn foreign_files_are_not_listed() {
        let (mem, fs) = store("json");
        mem.write("notes.txt", b"").unwrap();
        mem.write(".json", b"").unwrap();
        fs.write("a", b"").unwrap();
        assert_eq!(fs.list("").unwrap(), vec!["a"]);
    }

    #[test]
    fn empty_extension_is_passthrough() {
        let (mem, fs) = store("");
        fs.write("a", b"x").unwrap();
        assert_eq!(mem.raw("a").unwrap().unwrap(), b"x");
        assert!(fs.delete("a").unwrap());
    }
}
