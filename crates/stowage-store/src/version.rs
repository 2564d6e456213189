use crate::transport::{Cell, Row};

/// Version tag (ETag) of a stored blob: hex BLAKE3 of its bytes.
pub fn content_version(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Version tag of a row, covering column names and values in order.
pub fn row_version(row: &Row) -> String {
    let mut hasher = blake3::Hasher::new();
    for (column, cell) in row {
        hasher.update(&(column.len() as u64).to_le_bytes());
        hasher.update(column.as_bytes());
        let (tag, bytes): (u8, &[u8]) = match cell {
            Cell::Text(s) => (0, s.as_bytes()),
            Cell::Binary(b) => (1, b),
        };
        hasher.update(&[tag]);
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    hex::encode(hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_version_tracks_bytes() {
        assert_eq!(content_version(b"a"), content_version(b"a"));
        assert_ne!(content_version(b"a"), content_version(b"b"));
        assert_eq!(content_version(b"a").len(), 64);
    }

    #[test]
    fn row_version_distinguishes_cell_kind() {
        let mut text = Row::new();
        text.insert("v".into(), Cell::Text("x".into()));
        let mut bin = Row::new();
        bin.insert("v".into(), Cell::Binary(b"x".to_vec()));
        assert_ne!(row_version(&text), row_version(&bin));
    }
}
