use std::sync::Arc;

use crate::error::{StoreError, StoreResult};
use crate::transport::{BlobTransport, Cell, Row, TableTransport, Versioned};

/// Backing store that keeps each blob in one column of one table row.
///
/// Lets the byte-level decorator chain run unchanged over a table
/// transport: the path becomes the row key.
pub struct TableStore {
    column: String,
    transport: Arc<dyn TableTransport>,
}

impl TableStore {
    pub fn new(column: impl Into<String>, transport: Arc<dyn TableTransport>) -> Self {
        Self {
            column: column.into(),
            transport,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

impl BlobTransport for TableStore {
    fn name(&self) -> &str {
        "table-store"
    }

    fn read(&self, path: &str) -> StoreResult<Option<Versioned<Vec<u8>>>> {
        let Some(row) = self.transport.read_row(path)? else {
            return Ok(None);
        };
        let version = row.version;
        let mut cells = row.value;
        let cell = cells.remove(&self.column).ok_or_else(|| StoreError::Corrupt {
            path: path.to_string(),
            reason: format!(
                "row in table {} has no column {:?}",
                self.transport.name(),
                self.column
            ),
        })?;
        Ok(Some(Versioned::new(cell.into_bytes(), version)))
    }

    fn write(&self, path: &str, data: &[u8]) -> StoreResult<()> {
        let mut row = Row::new();
        row.insert(self.column.clone(), Cell::from_bytes(data.to_vec()));
        self.transport.write_row(path, &row)
    }

    fn delete(&self, path: &str) -> StoreResult<bool> {
        self.transport.delete_row(path)
    }

    fn exists(&self, path: &str) -> StoreResult<bool> {
        self.transport.row_exists(path)
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        self.transport.list_rows(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::InMemoryTable;

    #[test]
    fn blobs_land_in_the_configured_column() {
        let table = Arc::new(InMemoryTable::new("users"));
        let store = TableStore::new("payload", table.clone());
        store.write("1", b"{\"a\":1}").unwrap();

        let row = table.read_row("1").unwrap().unwrap().value;
        assert_eq!(row.get("payload"), Some(&Cell::Text("{\"a\":1}".into())));
        assert_eq!(store.read("1").unwrap().unwrap().value, b"{\"a\":1}");
        assert_eq!(store.list("").unwrap(), vec!["1"]);
    }

    #[test]
    fn binary_payload_roundtrips() {
        let table = Arc::new(InMemoryTable::new("t"));
        let store = TableStore::new("value", table);
        let data = vec![0u8, 0xff, 0x80];
        store.write("k", &data).unwrap();
        assert_eq!(store.read("k").unwrap().unwrap().value, data);
    }

    #[test]
    fn missing_column_is_corrupt() {
        let table = Arc::new(InMemoryTable::new("t"));
        let mut row = Row::new();
        row.insert("other".into(), Cell::Text("x".into()));
        table.write_row("k", &row).unwrap();
        let store = TableStore::new("value", table);
        assert!(matches!(
            store.read("k").unwrap_err(),
            StoreError::Corrupt { .. }
        ));
    }
}
