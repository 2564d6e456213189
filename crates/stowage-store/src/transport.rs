use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::StoreResult;

/// A value read from a store together with its version tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Versioned<T> {
    pub value: T,
    /// Opaque version tag (ETag); `None` when the backend has none.
    pub version: Option<String>,
}

impl<T> Versioned<T> {
    pub fn new(value: T, version: Option<String>) -> Self {
        Self { value, version }
    }

    /// Transform the value, keeping the version tag.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Versioned<U> {
        Versioned {
            value: f(self.value),
            version: self.version,
        }
    }
}

/// Byte-level store transport.
///
/// All implementations must satisfy these invariants:
/// - Paths are relative, `/`-separated and validated with
///   [`validate_path`](crate::path::validate_path).
/// - `read` of a missing path is `Ok(None)`, never an error.
/// - `write` replaces the previous content atomically where the backend
///   allows it.
/// - All I/O errors are propagated, never silently ignored.
pub trait BlobTransport: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Read the bytes stored at `path`.
    fn read(&self, path: &str) -> StoreResult<Option<Versioned<Vec<u8>>>>;

    /// Write `data` to `path`, replacing any previous content.
    fn write(&self, path: &str, data: &[u8]) -> StoreResult<()>;

    /// Delete `path`. Returns `true` if it existed.
    fn delete(&self, path: &str) -> StoreResult<bool>;

    /// Check whether `path` exists.
    ///
    /// Default implementation reads the content. Backends may override
    /// with a cheaper metadata check.
    fn exists(&self, path: &str) -> StoreResult<bool> {
        Ok(self.read(path)?.is_some())
    }

    /// List all paths starting with `prefix`, sorted.
    fn list(&self, prefix: &str) -> StoreResult<Vec<String>>;
}

/// One column value in a table row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Text(String),
    Binary(Vec<u8>),
}

impl Cell {
    /// Store bytes as text when they are valid UTF-8.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(s) => Cell::Text(s),
            Err(e) => Cell::Binary(e.into_bytes()),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Cell::Text(s) => s.into_bytes(),
            Cell::Binary(b) => b,
        }
    }
}

/// A table row: column name to cell.
pub type Row = BTreeMap<String, Cell>;

/// Row-level store transport for table stores.
pub trait TableTransport: Send + Sync {
    /// Table name used in logs.
    fn name(&self) -> &str;

    fn read_row(&self, key: &str) -> StoreResult<Option<Versioned<Row>>>;

    fn write_row(&self, key: &str, row: &Row) -> StoreResult<()>;

    /// Delete a row. Returns `true` if it existed.
    fn delete_row(&self, key: &str) -> StoreResult<bool>;

    fn row_exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.read_row(key)?.is_some())
    }

    /// List row keys starting with `prefix`, sorted.
    fn list_rows(&self, prefix: &str) -> StoreResult<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_keeps_binary_data() {
        assert_eq!(Cell::from_bytes(b"abc".to_vec()), Cell::Text("abc".into()));
        let raw = vec![0xff, 0x00, 0x9f];
        assert_eq!(Cell::from_bytes(raw.clone()), Cell::Binary(raw.clone()));
        assert_eq!(Cell::Binary(raw.clone()).into_bytes(), raw);
    }

    #[test]
    fn versioned_map_keeps_tag() {
        let v = Versioned::new(2, Some("t".into())).map(|x| x * 2);
        assert_eq!(v.value, 4);
        assert_eq!(v.version.as_deref(), Some("t"));
    }
}
