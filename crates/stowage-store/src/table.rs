use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::transport::{Row, TableTransport, Versioned};
use crate::version::row_version;

/// In-memory table transport.
#[derive(Debug)]
pub struct InMemoryTable {
    name: String,
    rows: RwLock<BTreeMap<String, Row>>,
}

impl InMemoryTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: RwLock::new(BTreeMap::new()),
        }
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Poisoned(e.to_string())
}

fn check_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidPath {
            path: String::new(),
            reason: "empty row key",
        });
    }
    Ok(())
}

impl TableTransport for InMemoryTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_row(&self, key: &str) -> StoreResult<Option<Versioned<Row>>> {
        check_key(key)?;
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows
            .get(key)
            .map(|row| Versioned::new(row.clone(), Some(row_version(row)))))
    }

    fn write_row(&self, key: &str, row: &Row) -> StoreResult<()> {
        check_key(key)?;
        let mut rows = self.rows.write().map_err(poisoned)?;
        rows.insert(key.to_string(), row.clone());
        Ok(())
    }

    fn delete_row(&self, key: &str) -> StoreResult<bool> {
        check_key(key)?;
        let mut rows = self.rows.write().map_err(poisoned)?;
        Ok(rows.remove(key).is_some())
    }

    fn row_exists(&self, key: &str) -> StoreResult<bool> {
        check_key(key)?;
        Ok(self.rows.read().map_err(poisoned)?.contains_key(key))
    }

    fn list_rows(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
