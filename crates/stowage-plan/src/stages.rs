//! Type-state builder for store plans.
//!
//! Each stage is a marker type; a method is only callable on the stage
//! where it is legal and returns the builder in the next stage:
//!
//! ```text
//! NeedsIntegration -> NeedsSerialization -> NeedsCompression -> NeedsFileExtension -> Buildable
//! ```
//!
//! Table-backed stores skip compression and file extension: their
//! serialization step goes straight to [`Buildable`].
//!
//! ```
//! use stowage_plan::StoreBuilder;
//! use stowage_types::Role;
//!
//! let plan = StoreBuilder::new()
//!     .local_fs("/var/lib/orders")
//!     .json()
//!     .gzip()
//!     .file_extension("json.gz")
//!     .build();
//! assert_eq!(plan.role(Role::Compressor).unwrap().component().as_str(), "gzip");
//! ```
//!
//! A table store has no compression stage:
//!
//! ```compile_fail
//! use stowage_plan::StoreBuilder;
//!
//! let plan = StoreBuilder::new().memory_table("orders").json().gzip();
//! ```

use std::fmt;
use std::marker::PhantomData;

use stowage_types::names::{self, params};
use stowage_types::{ComponentRef, Literal, Role};

use crate::plan::ConstructionPlan;

// ---------------------------------------------------------------------------
// Stage markers
// ---------------------------------------------------------------------------

/// No backing store chosen yet.
pub enum NeedsIntegration {}

/// Backing store chosen; a codec is next.
pub struct NeedsSerialization<F>(PhantomData<F>);

/// Codec chosen; a compressor (or none) is next.
pub enum NeedsCompression {}

/// Compression settled; a file extension (or none) is next.
pub enum NeedsFileExtension {}

/// Every mandatory step is done.
pub enum Buildable {}

/// Blob-shaped backing stores (file store over a blob transport).
pub enum BlobFamily {}

/// Row-shaped backing stores (table store over a table transport).
pub enum TableFamily {}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::BlobFamily {}
    impl Sealed for super::TableFamily {}
}

/// A backing-store family, which decides the stage after serialization.
pub trait Family: sealed::Sealed {
    type AfterSerialization;
}

impl Family for BlobFamily {
    type AfterSerialization = NeedsCompression;
}

impl Family for TableFamily {
    type AfterSerialization = Buildable;
}

// ---------------------------------------------------------------------------
// StoreBuilder
// ---------------------------------------------------------------------------

/// Builds a store chain [`ConstructionPlan`] one stage at a time.
pub struct StoreBuilder<S> {
    plan: ConstructionPlan,
    _stage: PhantomData<fn() -> S>,
}

impl<S> StoreBuilder<S> {
    fn advance<T>(plan: ConstructionPlan) -> StoreBuilder<T> {
        StoreBuilder {
            plan,
            _stage: PhantomData,
        }
    }

    /// The plan built so far.
    pub fn plan(&self) -> &ConstructionPlan {
        &self.plan
    }
}

impl<S> Clone for StoreBuilder<S> {
    fn clone(&self) -> Self {
        Self::advance(self.plan.clone())
    }
}

impl<S> fmt::Debug for StoreBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreBuilder")
            .field("stage", &std::any::type_name::<S>())
            .field("plan", &self.plan.to_string())
            .finish()
    }
}

impl Default for StoreBuilder<NeedsIntegration> {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreBuilder<NeedsIntegration> {
    pub fn new() -> Self {
        Self::advance(ConstructionPlan::chain())
    }

    /// Files under `root` on the local filesystem.
    pub fn local_fs(self, root: impl Into<String>) -> StoreBuilder<NeedsSerialization<BlobFamily>> {
        let root = Literal::Str(root.into());
        let transport =
            ConstructionPlan::new(names::LOCAL_FS).with_argument(params::ROOT_PATH, root.clone());
        let store = ConstructionPlan::new(names::FILE_STORE)
            .with_argument(params::ROOT_PATH, root)
            .with_nested(params::TRANSPORT, transport);
        Self::advance(self.plan.with_nested(Role::BackingStore.as_str(), store))
    }

    /// Files on the local filesystem; the root path comes from facets.
    pub fn local_fs_configured(self) -> StoreBuilder<NeedsSerialization<BlobFamily>> {
        self.blob_store(names::LOCAL_FS)
    }

    /// Files held in process memory.
    pub fn in_memory(self) -> StoreBuilder<NeedsSerialization<BlobFamily>> {
        self.blob_store(names::MEMORY)
    }

    /// A file store over any registered blob transport.
    pub fn blob_store(self, transport: ComponentRef) -> StoreBuilder<NeedsSerialization<BlobFamily>> {
        let store = ConstructionPlan::new(names::FILE_STORE)
            .with_nested_component(params::TRANSPORT, transport);
        Self::advance(self.plan.with_nested(Role::BackingStore.as_str(), store))
    }

    /// Rows of an in-memory table.
    pub fn memory_table(self, table: impl Into<String>) -> StoreBuilder<NeedsSerialization<TableFamily>> {
        let transport = ConstructionPlan::new(names::MEMORY_TABLE)
            .with_argument(params::TABLE, Literal::Str(table.into()));
        let store =
            ConstructionPlan::new(names::TABLE_STORE).with_nested(params::TRANSPORT, transport);
        Self::advance(self.plan.with_nested(Role::BackingStore.as_str(), store))
    }

    /// A table store over any registered table transport.
    pub fn table_store(self, transport: ComponentRef) -> StoreBuilder<NeedsSerialization<TableFamily>> {
        let store = ConstructionPlan::new(names::TABLE_STORE)
            .with_nested_component(params::TRANSPORT, transport);
        Self::advance(self.plan.with_nested(Role::BackingStore.as_str(), store))
    }
}

impl<F: Family> StoreBuilder<NeedsSerialization<F>> {
    pub fn json(self) -> StoreBuilder<F::AfterSerialization> {
        self.serializer(names::JSON)
    }

    /// JSON with indentation.
    pub fn json_pretty(self) -> StoreBuilder<F::AfterSerialization> {
        let plan = self
            .plan
            .with_component(Role::Serializer, names::JSON)
            .with_role_argument(Role::Serializer, params::PRETTY, true);
        Self::advance(plan)
    }

    pub fn bincode(self) -> StoreBuilder<F::AfterSerialization> {
        self.serializer(names::BINCODE)
    }

    pub fn yaml(self) -> StoreBuilder<F::AfterSerialization> {
        self.serializer(names::YAML)
    }

    /// Values stored verbatim; only byte and string values resolve.
    pub fn raw_bytes(self) -> StoreBuilder<F::AfterSerialization> {
        self.serializer(names::BYTES)
    }

    /// Any codec registered for the contract.
    pub fn serializer(self, codec: ComponentRef) -> StoreBuilder<F::AfterSerialization> {
        Self::advance(self.plan.with_component(Role::Serializer, codec))
    }
}

impl StoreBuilder<NeedsCompression> {
    pub fn gzip(self) -> StoreBuilder<NeedsFileExtension> {
        self.compressor(names::GZIP)
    }

    pub fn gzip_level(self, level: i64) -> StoreBuilder<NeedsFileExtension> {
        self.compressor_level(names::GZIP, level)
    }

    pub fn zstd(self) -> StoreBuilder<NeedsFileExtension> {
        self.compressor(names::ZSTD)
    }

    pub fn zstd_level(self, level: i64) -> StoreBuilder<NeedsFileExtension> {
        self.compressor_level(names::ZSTD, level)
    }

    pub fn compressor(self, compressor: ComponentRef) -> StoreBuilder<NeedsFileExtension> {
        Self::advance(self.plan.with_component(Role::Compressor, compressor))
    }

    /// Store serializer output as is.
    pub fn without_compression(self) -> StoreBuilder<NeedsFileExtension> {
        Self::advance(self.plan)
    }

    fn compressor_level(self, compressor: ComponentRef, level: i64) -> StoreBuilder<NeedsFileExtension> {
        let plan = self
            .plan
            .with_component(Role::Compressor, compressor)
            .with_role_argument(Role::Compressor, params::LEVEL, level);
        Self::advance(plan)
    }
}

impl StoreBuilder<NeedsFileExtension> {
    /// Append `.extension` to every stored path.
    pub fn file_extension(self, extension: impl Into<String>) -> StoreBuilder<Buildable> {
        let plan = self
            .plan
            .with_role_argument(Role::BackingStore, params::EXTENSION, Literal::Str(extension.into()));
        Self::advance(plan)
    }

    pub fn no_file_extension(self) -> StoreBuilder<Buildable> {
        Self::advance(self.plan)
    }
}

impl StoreBuilder<Buildable> {
    /// Map keys to paths with a registered key mapper.
    pub fn key_mapper(self, mapper: ComponentRef) -> Self {
        Self::advance(self.plan.with_component(Role::KeyMapper, mapper))
    }

    /// Store each key under the hex BLAKE3 hash of its path.
    pub fn hashed_keys(self) -> Self {
        self.key_mapper(names::HASHED_KEY)
    }

    /// Store each key under `prefix`.
    pub fn prefixed_keys(self, prefix: impl Into<String>) -> Self {
        let plan = self
            .plan
            .with_component(Role::KeyMapper, names::PATH_KEY)
            .with_role_argument(Role::KeyMapper, params::PREFIX, Literal::Str(prefix.into()));
        Self::advance(plan)
    }

    pub fn build(self) -> ConstructionPlan {
        self.plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_family_walks_every_stage() {
        let plan = StoreBuilder::new()
            .local_fs("/tmp/x")
            .bincode()
            .zstd_level(19)
            .file_extension("bin")
            .hashed_keys()
            .build();

        let store = plan.role(Role::BackingStore).unwrap();
        assert_eq!(store.component(), &names::FILE_STORE);
        assert_eq!(store.literal("rootPath"), Some(&Literal::from("/tmp/x")));
        assert_eq!(store.literal("extension"), Some(&Literal::from("bin")));
        assert_eq!(
            store.nested("transport").unwrap().literal("rootPath"),
            Some(&Literal::from("/tmp/x"))
        );
        assert_eq!(plan.role(Role::Serializer).unwrap().component(), &names::BINCODE);
        assert_eq!(
            plan.role(Role::Compressor).unwrap().literal("level"),
            Some(&Literal::Int(19))
        );
        assert_eq!(plan.role(Role::KeyMapper).unwrap().component(), &names::HASHED_KEY);
    }

    #[test]
    fn skipping_compression_leaves_no_compressor() {
        let plan = StoreBuilder::new()
            .in_memory()
            .json()
            .without_compression()
            .no_file_extension()
            .build();
        assert!(plan.role(Role::Compressor).is_none());
        assert!(plan.role(Role::KeyMapper).is_none());
        assert_eq!(plan.to_string(), "store-chain(store=file-store(transport=memory), serializer=json)");
    }

    #[test]
    fn table_family_is_buildable_after_serialization() {
        let plan = StoreBuilder::new()
            .memory_table("orders")
            .yaml()
            .prefixed_keys("tenant-a")
            .build();
        let store = plan.role(Role::BackingStore).unwrap();
        assert_eq!(store.component(), &names::TABLE_STORE);
        assert_eq!(
            store.nested("transport").unwrap().literal("table"),
            Some(&Literal::from("orders"))
        );
        assert_eq!(
            plan.role(Role::KeyMapper).unwrap().literal("prefix"),
            Some(&Literal::from("tenant-a"))
        );
    }

    #[test]
    fn earlier_stage_is_unaffected_by_later_steps() {
        let stage = StoreBuilder::new().in_memory();
        let snapshot = stage.plan().clone();
        let _json = stage.clone().json();
        let _yaml = stage.clone().yaml();
        assert_eq!(stage.plan(), &snapshot);
    }

    #[test]
    fn pretty_json_sets_argument() {
        let plan = StoreBuilder::new()
            .in_memory()
            .json_pretty()
            .without_compression()
            .no_file_extension()
            .build();
        assert_eq!(
            plan.role(Role::Serializer).unwrap().literal("pretty"),
            Some(&Literal::Bool(true))
        );
    }
}
