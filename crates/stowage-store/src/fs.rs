use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::path::{validate_path, TEMP_PREFIX};
use crate::transport::{BlobTransport, Versioned};
use crate::version::content_version;

/// Blob transport over a directory on the local filesystem.
///
/// The root directory is created lazily on the first write, so building a
/// transport never touches the disk. Writes go to a temporary file in the
/// target directory which is then renamed into place.
#[derive(Debug)]
pub struct LocalFsTransport {
    root: PathBuf,
}

impl LocalFsTransport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a store path.
    pub fn full_path(&self, path: &str) -> StoreResult<PathBuf> {
        validate_path(path)?;
        Ok(path.split('/').fold(self.root.clone(), |acc, seg| acc.join(seg)))
    }
}

impl BlobTransport for LocalFsTransport {
    fn name(&self) -> &str {
        "local-fs"
    }

    fn read(&self, path: &str) -> StoreResult<Option<Versioned<Vec<u8>>>> {
        let full = self.full_path(path)?;
        match fs::read(&full) {
            Ok(data) => {
                let version = content_version(&data);
                Ok(Some(Versioned::new(data, Some(version))))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn write(&self, path: &str, data: &[u8]) -> StoreResult<()> {
        let full = self.full_path(path)?;
        let dir = full.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir).map_err(|e| StoreError::io(path, e))?;

        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(dir)
            .map_err(|e| StoreError::io(path, e))?;
        tmp.write_all(data).map_err(|e| StoreError::io(path, e))?;
        tmp.persist(&full)
            .map_err(|e| StoreError::io(path, e.error))?;

        debug!(path, bytes = data.len(), root = %self.root.display(), "wrote blob");
        Ok(())
    }

    fn delete(&self, path: &str) -> StoreResult<bool> {
        let full = self.full_path(path)?;
        match fs::remove_file(&full) {
            Ok(()) => {
                debug!(path, root = %self.root.display(), "deleted blob");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn exists(&self, path: &str) -> StoreResult<bool> {
        Ok(self.full_path(path)?.is_file())
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1) {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                StoreError::io(path, io::Error::other(e))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let rel = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            // In-flight writes of concurrent writers.
            if rel.rsplit('/').next().is_some_and(|name| name.starts_with(TEMP_PREFIX)) {
                continue;
            }
            if rel.starts_with(prefix) {
                paths.push(rel);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_created_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested/root");
        let fs = LocalFsTransport::new(&root);
        assert!(!root.exists());
        assert!(fs.read("a").unwrap().is_none());
        assert!(fs.list("").unwrap().is_empty());

        fs.write("a", b"x").unwrap();
        assert!(root.join("a").is_file());
    }

    #[test]
    fn write_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFsTransport::new(dir.path());
        fs.write("users/1", b"{\"name\":\"x\"}").unwrap();
        assert_eq!(
            std::fs::read(dir.path().join("users").join("1")).unwrap(),
            b"{\"name\":\"x\"}"
        );

        let read = fs.read("users/1").unwrap().unwrap();
        assert_eq!(read.value, b"{\"name\":\"x\"}");
        assert!(read.version.is_some());
        assert!(fs.exists("users/1").unwrap());

        assert!(fs.delete("users/1").unwrap());
        assert!(!fs.delete("users/1").unwrap());
        assert!(!fs.exists("users/1").unwrap());
    }

    #[test]
    fn list_walks_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFsTransport::new(dir.path());
        for p in ["b", "a/2", "a/1", "c/d/e"] {
            fs.write(p, b"").unwrap();
        }
        assert_eq!(fs.list("").unwrap(), vec!["a/1", "a/2", "b", "c/d/e"]);
        assert_eq!(fs.list("a/").unwrap(), vec!["a/1", "a/2"]);
    }

    #[test]
    fn dot_tmp_keys_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFsTransport::new(dir.path());
        fs.write(".tmprc", b"a").unwrap();
        fs.write("notes/.tmp-list", b"b").unwrap();
        assert!(fs.exists(".tmprc").unwrap());
        assert_eq!(fs.list("").unwrap(), vec![".tmprc", "notes/.tmp-list"]);
    }

    #[test]
    fn temp_files_are_hidden_and_unaddressable() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFsTransport::new(dir.path());
        fs.write("a", b"x").unwrap();
        std::fs::write(dir.path().join(format!("{TEMP_PREFIX}abc")), b"partial").unwrap();
        assert_eq!(fs.list("").unwrap(), vec!["a"]);
        assert!(matches!(
            fs.write(&format!("{TEMP_PREFIX}abc"), b"x").unwrap_err(),
            StoreError::InvalidPath { .. }
        ));
    }

    #[test]
    fn rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFsTransport::new(dir.path());
        assert!(matches!(
            fs.write("../outside", b"x").unwrap_err(),
            StoreError::InvalidPath { .. }
        ));
    }
}
