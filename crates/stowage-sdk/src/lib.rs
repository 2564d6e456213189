//! Declarative typed storage.
//!
//! Declare a [`StoreContract`] for each kind of value you persist: its key
//! and value types, and facets saying where and how values are stored. A
//! [`Resolver`] turns the contract into a [`DataStore`] the first time it
//! is asked for and hands out the same instance afterwards.
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use stowage_sdk::prelude::*;
//!
//! #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
//! struct Person {
//!     name: String,
//! }
//!
//! struct People;
//!
//! impl StoreContract for People {
//!     type Key = String;
//!     type Value = Person;
//!
//!     fn declare(decl: &mut ContractDecl<Self>) {
//!         decl.add(facets::in_memory()).add(facets::json());
//!     }
//! }
//!
//! let resolver = Resolver::new(MapConfig::new());
//! let people = resolver.resolve::<People>()?;
//! people.put(&"ada".to_string(), &Person { name: "Ada".into() })?;
//! assert!(people.exists(&"ada".to_string())?);
//! # Ok::<(), stowage_sdk::StowageError>(())
//! ```
//!
//! # Crates
//!
//! - `stowage-types` -- component names, roles, literals
//! - `stowage-store` -- blob and table transports, backing stores
//! - `stowage-codec` -- serializers
//! - `stowage-compress` -- compressors
//! - `stowage-plan` -- construction plans and the type-state builder
//! - `stowage-facet` -- facets, facet registry, configuration
//! - `stowage-resolver` -- merging, activation, caching

pub mod error;
pub mod global;

pub use error::{StowageError, StowageResult};
pub use global::{global, install, resolve};

pub use stowage_codec::{BincodeCodec, Codec, JsonCodec, RawBytesCodec, ValueCodec, YamlCodec};
pub use stowage_compress::{Compressor, GzipCompressor, ZstdCompressor};
pub use stowage_facet::{
    facets, ConfigProvider, EngineConfig, Facet, FacetBundle, FacetDecl, FacetSource, MapConfig,
};
pub use stowage_plan::{ConstructionPlan, StoreBuilder};
pub use stowage_resolver::{
    Capability, ComponentRegistry, ComponentSpec, ContractDecl, ContractStore, DataStore,
    KeyMapper, MutateFn, MutationHook, ObservationHook, ObserveFn, ParamSpec, ResolveError,
    ResolveResult, Resolver, StoreContract, StoreEvent, StoreKey, StoreValue, ValidateFn,
    ValidationHook,
};
pub use stowage_store::{BlobTransport, StoreError, StoreResult, TableTransport, Versioned};
pub use stowage_types::{names, ComponentRef, Literal, Role};

/// Everything needed to declare and use contracts.
pub mod prelude {
    pub use crate::{
        facets, ComponentRef, ConfigProvider, ContractDecl, DataStore, EngineConfig, FacetDecl,
        FacetSource, MapConfig, Resolver, Role, StoreBuilder, StoreContract,
    };
}
