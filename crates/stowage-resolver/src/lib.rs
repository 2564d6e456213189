//! Contract resolution for stowage.
//!
//! A [`StoreContract`] names a key type, a value type and, through its
//! facets and optional plan, the components of its store. The [`Resolver`]
//! turns a contract into a live store:
//!
//! 1. scan the contract's facets, its bases' facets included
//! 2. merge them into the plan ([`merge`] documents the precedence rules)
//! 3. activate components in [`DECORATOR_ORDER`], wrapping each layer
//!    around the previous one
//! 4. wrap the chain in the hook layer and cache the result
//!
//! Non-generic components (transports, backing stores, compressors) come
//! from a [`ComponentRegistry`] shared by all contracts. Serializers, key
//! mappers and hooks depend on the contract's types and come from a
//! [`GenericCatalog`] built per contract.

pub mod args;
pub mod cache;
pub mod catalog;
pub mod chain;
pub mod contract;
pub mod error;
pub mod hooks;
pub mod keys;
pub mod merge;
pub mod registry;
pub mod resolver;

pub use args::{ActivateError, ArgError, BoundArgs};
pub use cache::InstanceCache;
pub use catalog::{GenericCatalog, GenericFactory};
pub use chain::{
    ByteStore, CompressedStore, DataStore, DirectKeyStore, HookedStore, KeyMappedStore,
    SerializedStore,
};
pub use contract::{ContractDecl, ContractStore, StoreContract, StoreValue};
pub use error::{ResolveError, ResolveResult, SharedError};
pub use hooks::{
    AcceptAll, IdentityHook, MutateFn, MutationHook, NoopObserver, ObservationHook, ObserveFn,
    StoreEvent, TracingObserver, ValidateFn, ValidationHook,
};
pub use keys::{HashedKeyMapper, KeyMapper, PathKeyMapper, StoreKey};
pub use merge::DEFAULT_HOOKS;
pub use registry::{
    Activated, Capability, ComponentRegistry, ComponentSpec, Factory, ParamKind, ParamSpec,
};
pub use resolver::{Resolver, DECORATOR_ORDER};
