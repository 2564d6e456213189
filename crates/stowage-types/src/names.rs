//! Names of the built-in components and of the parameters they accept.

use crate::component::ComponentRef;

/// Root node of every chain plan; its arguments are the per-role sub-plans.
pub const STORE_CHAIN: ComponentRef = ComponentRef::from_static("store-chain");

// Transports.
pub const MEMORY: ComponentRef = ComponentRef::from_static("memory");
pub const LOCAL_FS: ComponentRef = ComponentRef::from_static("local-fs");
pub const MEMORY_TABLE: ComponentRef = ComponentRef::from_static("memory-table");

// Backing stores.
pub const FILE_STORE: ComponentRef = ComponentRef::from_static("file-store");
pub const TABLE_STORE: ComponentRef = ComponentRef::from_static("table-store");

// Codecs.
pub const JSON: ComponentRef = ComponentRef::from_static("json");
pub const BINCODE: ComponentRef = ComponentRef::from_static("bincode");
pub const YAML: ComponentRef = ComponentRef::from_static("yaml");
pub const BYTES: ComponentRef = ComponentRef::from_static("bytes");

// Compressors.
pub const GZIP: ComponentRef = ComponentRef::from_static("gzip");
pub const ZSTD: ComponentRef = ComponentRef::from_static("zstd");

// Key mappers.
pub const PATH_KEY: ComponentRef = ComponentRef::from_static("path-key");
pub const HASHED_KEY: ComponentRef = ComponentRef::from_static("hashed-key");

// Hooks.
pub const IDENTITY: ComponentRef = ComponentRef::from_static("identity");
pub const NOOP: ComponentRef = ComponentRef::from_static("noop");
pub const ACCEPT_ALL: ComponentRef = ComponentRef::from_static("accept-all");
pub const TRACING: ComponentRef = ComponentRef::from_static("tracing");

/// Parameter names.
pub mod params {
    pub const ROOT_PATH: &str = "rootPath";
    pub const EXTENSION: &str = "extension";
    pub const TRANSPORT: &str = "transport";
    pub const TABLE: &str = "table";
    pub const COLUMN: &str = "column";
    pub const PRETTY: &str = "pretty";
    pub const LEVEL: &str = "level";
    pub const PREFIX: &str = "prefix";
    pub const FANOUT: &str = "fanout";
}
