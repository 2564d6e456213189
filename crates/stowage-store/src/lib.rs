//! Store-transport capability for stowage.
//!
//! Everything the engine composes sits on top of a byte-level
//! [`BlobTransport`]. Table backends implement [`TableTransport`] instead
//! and are adapted to blobs by [`TableStore`].
//!
//! # Storage Backends
//!
//! - [`InMemoryBlobStore`] -- map-based store for tests and embedding
//! - [`LocalFsTransport`] -- a directory on the local filesystem
//! - [`InMemoryTable`] -- map-based table of rows
//!
//! # Backing Stores
//!
//! - [`FileStore`] -- file-shaped view (root path, file extension) over a transport
//! - [`TableStore`] -- one row per path, one column per blob
//!
//! # Design Rules
//!
//! 1. A missing path reads as `Ok(None)`; only I/O failures are errors.
//! 2. Every read carries a version tag derived from the stored content.
//! 3. Errors say whether a retry could help ([`StoreError::is_retryable`]);
//!    nothing in this crate retries on its own.
//! 4. Building a transport never touches the backend; setup happens on the
//!    first operation.

pub mod error;
pub mod file_store;
pub mod fs;
pub mod memory;
pub mod path;
pub mod table;
pub mod table_store;
pub mod transport;
pub mod version;

pub use error::{BoxError, StoreError, StoreResult};
pub use file_store::FileStore;
pub use fs::LocalFsTransport;
pub use memory::InMemoryBlobStore;
pub use path::{validate_path, TEMP_PREFIX};
pub use table::InMemoryTable;
pub use table_store::TableStore;
pub use transport::{BlobTransport, Cell, Row, TableTransport, Versioned};
pub use version::{content_version, row_version};
