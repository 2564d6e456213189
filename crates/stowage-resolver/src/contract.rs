use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use stowage_codec::ValueCodec;
use stowage_facet::{facets, FacetBundle, FacetDecl, FacetSource};
use stowage_plan::ConstructionPlan;
use stowage_store::{StoreResult, Versioned};
use stowage_types::{ComponentRef, Role};

use crate::catalog::GenericCatalog;
use crate::chain::DataStore;
use crate::hooks::{MutationHook, ObservationHook, ValidationHook};
use crate::keys::{KeyMapper, StoreKey};

/// A value type a store contract can hold.
pub trait StoreValue: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> StoreValue for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// A typed store declaration.
///
/// The contract names its key and value types, optionally a plan from
/// [`StoreBuilder`](stowage_plan::StoreBuilder), and declares facets that
/// fill in whatever the plan leaves open.
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use stowage_facet::facets;
/// use stowage_resolver::{ContractDecl, StoreContract};
///
/// #[derive(Clone, Serialize, Deserialize)]
/// struct Person {
///     name: String,
/// }
///
/// struct People;
///
/// impl StoreContract for People {
///     type Key = String;
///     type Value = Person;
///
///     fn declare(decl: &mut ContractDecl<Self>) {
///         decl.add(facets::local_fs("/tmp/people")).add(facets::json());
///     }
/// }
/// ```
pub trait StoreContract: Sized + 'static {
    type Key: StoreKey;
    type Value: StoreValue;

    /// Plan fixed in code. Its choices take precedence over facets.
    fn plan() -> Option<ConstructionPlan> {
        None
    }

    fn declare(decl: &mut ContractDecl<Self>);
}

/// Everything a contract declares: facets, base contracts and
/// contract-specific generic components.
pub struct ContractDecl<C: StoreContract> {
    facets: FacetDecl,
    catalog: GenericCatalog<C::Key, C::Value>,
}

impl<C: StoreContract> ContractDecl<C> {
    pub(crate) fn new() -> Self {
        Self {
            facets: FacetDecl::new(),
            catalog: GenericCatalog::with_builtins(),
        }
    }

    pub fn add(&mut self, facets: impl Into<FacetBundle>) -> &mut Self {
        self.facets.add(facets);
        self
    }

    /// Inherit the facets of a base contract.
    pub fn extends<B: FacetSource>(&mut self) -> &mut Self {
        self.facets.extends::<B>();
        self
    }

    /// Register `codec` under `name` and use it as the serializer.
    pub fn codec(
        &mut self,
        name: ComponentRef,
        codec: impl ValueCodec<C::Value> + 'static,
    ) -> &mut Self {
        self.catalog.insert_codec(name.clone(), Arc::new(codec));
        self.add(facets::component(Role::Serializer, name))
    }

    /// Register `mapper` under `name` and use it as the key mapper.
    pub fn key_mapper(
        &mut self,
        name: ComponentRef,
        mapper: impl KeyMapper<C::Key> + 'static,
    ) -> &mut Self {
        self.catalog.insert_key_mapper(name.clone(), Arc::new(mapper));
        self.add(facets::component(Role::KeyMapper, name))
    }

    pub fn mutation_hook(
        &mut self,
        name: ComponentRef,
        hook: impl MutationHook<C::Value> + 'static,
    ) -> &mut Self {
        self.catalog.insert_mutation_hook(name.clone(), Arc::new(hook));
        self.add(facets::component(Role::MutationHook, name))
    }

    pub fn observation_hook(
        &mut self,
        name: ComponentRef,
        hook: impl ObservationHook<C::Key, C::Value> + 'static,
    ) -> &mut Self {
        self.catalog.insert_observation_hook(name.clone(), Arc::new(hook));
        self.add(facets::component(Role::ObservationHook, name))
    }

    pub fn validation_hook(
        &mut self,
        name: ComponentRef,
        hook: impl ValidationHook<C::Value> + 'static,
    ) -> &mut Self {
        self.catalog.insert_validation_hook(name.clone(), Arc::new(hook));
        self.add(facets::component(Role::ValidationHook, name))
    }

    /// The contract's generic catalog, for registering parameterized
    /// factories without selecting them.
    pub fn catalog_mut(&mut self) -> &mut GenericCatalog<C::Key, C::Value> {
        &mut self.catalog
    }

    pub(crate) fn into_parts(self) -> (FacetDecl, GenericCatalog<C::Key, C::Value>) {
        (self.facets, self.catalog)
    }
}

/// The resolved store of contract `C`.
pub struct ContractStore<C: StoreContract> {
    store: Arc<dyn DataStore<C::Key, C::Value>>,
    plan: ConstructionPlan,
    _contract: PhantomData<fn() -> C>,
}

impl<C: StoreContract> ContractStore<C> {
    pub(crate) fn new(store: Arc<dyn DataStore<C::Key, C::Value>>, plan: ConstructionPlan) -> Self {
        Self {
            store,
            plan,
            _contract: PhantomData,
        }
    }

    /// The fully bound plan the store was activated from.
    pub fn plan(&self) -> &ConstructionPlan {
        &self.plan
    }

    pub fn store(&self) -> &Arc<dyn DataStore<C::Key, C::Value>> {
        &self.store
    }
}

impl<C: StoreContract> DataStore<C::Key, C::Value> for ContractStore<C> {
    fn get(&self, key: &C::Key) -> StoreResult<Option<C::Value>> {
        self.store.get(key)
    }

    fn get_versioned(&self, key: &C::Key) -> StoreResult<Option<Versioned<C::Value>>> {
        self.store.get_versioned(key)
    }

    fn put(&self, key: &C::Key, value: &C::Value) -> StoreResult<()> {
        self.store.put(key, value)
    }

    fn delete(&self, key: &C::Key) -> StoreResult<bool> {
        self.store.delete(key)
    }

    fn exists(&self, key: &C::Key) -> StoreResult<bool> {
        self.store.exists(key)
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        self.store.list(prefix)
    }
}

impl<C: StoreContract> fmt::Debug for ContractStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractStore")
            .field("contract", &std::any::type_name::<C>())
            .field("plan", &self.plan.to_string())
            .finish()
    }
}
