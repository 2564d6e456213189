use std::any::{type_name, TypeId};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use stowage_codec::ValueCodec;
use stowage_compress::Compressor;
use stowage_facet::{ConfigProvider, FacetRegistry};
use stowage_plan::{ConstructionPlan, PlanArg};
use stowage_store::BlobTransport;
use stowage_types::{names, ComponentRef, Role};
use tracing::{debug, info};

use crate::args::{ActivateError, BoundArgs};
use crate::cache::InstanceCache;
use crate::catalog::{GenericCatalog, GenericFactory, Make};
use crate::chain::{
    ByteStore, CompressedStore, DataStore, DirectKeyStore, HookedStore, KeyMappedStore,
    SerializedStore,
};
use crate::contract::{ContractDecl, ContractStore, StoreContract};
use crate::error::{ResolveError, ResolveResult};
use crate::keys::StoreKey;
use crate::merge::{merge, Specs};
use crate::registry::{Activated, ComponentRegistry};

/// Order in which decorators wrap the backing store, innermost first.
///
/// Hooks are not listed: the hook layer always wraps the finished chain.
pub const DECORATOR_ORDER: [Role; 4] = [
    Role::BackingStore,
    Role::KeyMapper,
    Role::Serializer,
    Role::Compressor,
];

/// Partially built chain while walking [`DECORATOR_ORDER`].
enum ChainElement<K, V> {
    Empty,
    Blobs(Arc<dyn BlobTransport>),
    Keyed(Arc<dyn ByteStore<K>>),
    Serialized(SerializedStore<K, V>),
    Typed(Arc<dyn DataStore<K, V>>),
}

impl<K, V> ChainElement<K, V> {
    fn stage(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Blobs(_) => "blobs",
            Self::Keyed(_) => "keyed",
            Self::Serialized(_) => "serialized",
            Self::Typed(_) => "typed",
        }
    }
}

/// Turns store contracts into live, cached stores.
///
/// `resolve` scans the contract's facets, merges them into its plan,
/// activates every component and caches the result. Later calls for the
/// same contract return the same instance.
pub struct Resolver {
    components: ComponentRegistry,
    facets: RwLock<FacetRegistry>,
    config: Arc<dyn ConfigProvider>,
    cache: InstanceCache,
}

impl Resolver {
    /// A resolver with the built-in components.
    pub fn new(config: impl ConfigProvider + 'static) -> Self {
        Self::with_components(ComponentRegistry::with_builtins(), config)
    }

    pub fn with_components(components: ComponentRegistry, config: impl ConfigProvider + 'static) -> Self {
        Self {
            components,
            facets: RwLock::new(FacetRegistry::new()),
            config: Arc::new(config),
            cache: InstanceCache::new(),
        }
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// The store for contract `C`, built on first use.
    pub fn resolve<C: StoreContract>(&self) -> ResolveResult<Arc<ContractStore<C>>> {
        self.cache
            .get_or_try_init(TypeId::of::<C>(), type_name::<C>(), || self.build::<C>())
    }

    /// The fully bound plan `C` would be activated from, without activating
    /// anything or touching the cache.
    pub fn explain<C: StoreContract>(&self) -> ResolveResult<ConstructionPlan> {
        self.prepare::<C>().map(|(plan, _)| plan)
    }

    pub fn is_cached<C: StoreContract>(&self) -> bool {
        self.cache.contains::<ContractStore<C>>(TypeId::of::<C>())
    }

    /// Number of stores built so far.
    pub fn activation_count(&self) -> usize {
        self.cache.activation_count()
    }

    fn build<C: StoreContract>(&self) -> ResolveResult<ContractStore<C>> {
        let started = Instant::now();
        let (plan, catalog) = self.prepare::<C>()?;
        let store = self.activate(&plan, &catalog)?;
        info!(
            contract = type_name::<C>(),
            plan = %plan,
            elapsed_us = started.elapsed().as_micros() as u64,
            "store resolved"
        );
        Ok(ContractStore::new(store, plan))
    }

    fn prepare<C: StoreContract>(
        &self,
    ) -> ResolveResult<(ConstructionPlan, GenericCatalog<C::Key, C::Value>)> {
        let mut decl = ContractDecl::<C>::new();
        C::declare(&mut decl);
        let (facet_decl, catalog) = decl.into_parts();

        let id = TypeId::of::<C>();
        let scanned = {
            let mut facets = self
                .facets
                .write()
                .map_err(|_| ResolveError::Poisoned("facet registry"))?;
            facets.register_decl(id, type_name::<C>(), facet_decl);
            facets.scan(id).map_err(|_| ResolveError::UnregisteredContract {
                contract: type_name::<C>().to_string(),
            })?
        };

        let base = match C::plan() {
            Some(plan) if plan.is_chain() => plan,
            Some(store) => ConstructionPlan::chain().with_nested(Role::BackingStore.as_str(), store),
            None => ConstructionPlan::chain(),
        };
        let specs = Specs {
            components: &self.components,
            catalog: &catalog,
        };
        let plan = merge(&base, &scanned, &specs, self.config.as_ref())?;
        Ok((plan, catalog))
    }

    // -----------------------------------------------------------------------
    // Activation
    // -----------------------------------------------------------------------

    fn activate<K, V>(
        &self,
        plan: &ConstructionPlan,
        catalog: &GenericCatalog<K, V>,
    ) -> ResolveResult<Arc<dyn DataStore<K, V>>>
    where
        K: StoreKey,
        V: Clone + 'static,
    {
        let mut element = ChainElement::Empty;
        for role in DECORATOR_ORDER {
            element = self.decorate(role, element, plan, catalog)?;
        }
        let ChainElement::Typed(store) = element else {
            return Err(ResolveError::UnresolvableGenericArgument {
                role: Role::Serializer,
                argument: type_name::<V>().to_string(),
            });
        };

        let role = Role::MutationHook;
        let mutation = activate_generic(self, catalog, role, hook_plan(plan, role)?, |f| match f {
            GenericFactory::MutationHook(make) => Some(make),
            _ => None,
        })?;
        let role = Role::ObservationHook;
        let observation = activate_generic(self, catalog, role, hook_plan(plan, role)?, |f| match f {
            GenericFactory::ObservationHook(make) => Some(make),
            _ => None,
        })?;
        let role = Role::ValidationHook;
        let validation = activate_generic(self, catalog, role, hook_plan(plan, role)?, |f| match f {
            GenericFactory::ValidationHook(make) => Some(make),
            _ => None,
        })?;
        Ok(Arc::new(HookedStore::new(store, mutation, observation, validation)))
    }

    fn decorate<K, V>(
        &self,
        role: Role,
        element: ChainElement<K, V>,
        plan: &ConstructionPlan,
        catalog: &GenericCatalog<K, V>,
    ) -> ResolveResult<ChainElement<K, V>>
    where
        K: StoreKey,
        V: 'static,
    {
        let node = plan.role(role);
        let next = match (role, element, node) {
            (Role::BackingStore, ChainElement::Empty, Some(node)) => {
                match self.activate_component(role, node)? {
                    Activated::Blob(blobs) => ChainElement::Blobs(blobs),
                    _ => return Err(unknown(role, node.component())),
                }
            }
            (Role::BackingStore, ChainElement::Empty, None) => {
                return Err(ResolveError::MissingBackingStore)
            }
            (Role::KeyMapper, ChainElement::Blobs(blobs), Some(node)) => {
                let mapper = activate_generic(self, catalog, role, node, |f| match f {
                    GenericFactory::KeyMapper(make) => Some(make),
                    _ => None,
                })?;
                ChainElement::Keyed(Arc::new(KeyMappedStore::new(mapper, blobs)))
            }
            (Role::KeyMapper, ChainElement::Blobs(blobs), None) => {
                ChainElement::Keyed(Arc::new(DirectKeyStore::new(blobs)))
            }
            (Role::Serializer, ChainElement::Keyed(bytes), Some(node)) => {
                let codec: Arc<dyn ValueCodec<V>> = activate_generic(self, catalog, role, node, |f| match f {
                    GenericFactory::Serializer(make) => Some(make),
                    _ => None,
                })?;
                ChainElement::Serialized(SerializedStore::new(codec, bytes))
            }
            (Role::Serializer, ChainElement::Keyed(_), None) => {
                return Err(ResolveError::UnresolvableGenericArgument {
                    role,
                    argument: type_name::<V>().to_string(),
                })
            }
            (Role::Compressor, ChainElement::Serialized(serialized), Some(node)) => {
                let compressor: Arc<dyn Compressor> = match self.activate_component(role, node)? {
                    Activated::Compressor(c) => c,
                    _ => return Err(unknown(role, node.component())),
                };
                ChainElement::Typed(Arc::new(CompressedStore::new(serialized, compressor)))
            }
            (Role::Compressor, ChainElement::Serialized(serialized), None) => {
                ChainElement::Typed(Arc::new(serialized))
            }
            (role, element, _) => {
                return Err(ResolveError::InvalidArgument {
                    component: names::STORE_CHAIN,
                    parameter: role.as_str().to_string(),
                    reason: format!("cannot decorate a {} chain", element.stage()),
                })
            }
        };
        if let Some(node) = node {
            debug!(%role, component = %node.component(), "activated");
        }
        Ok(next)
    }

    /// Activate a non-generic component and, recursively, its nested
    /// components.
    fn activate_component(&self, role: Role, node: &ConstructionPlan) -> ResolveResult<Activated> {
        let registered = self
            .components
            .get(node.component())
            .ok_or_else(|| unknown(role, node.component()))?;
        let args = self.bind_args(role, node)?;
        (registered.factory)(&args).map_err(|e| activation_error(role, node.component(), e))
    }

    fn bind_args(&self, role: Role, node: &ConstructionPlan) -> ResolveResult<BoundArgs> {
        let mut args = BoundArgs::new();
        for (name, arg) in node.arguments() {
            match arg {
                PlanArg::Literal(lit) => args.insert_value(name, lit.clone()),
                PlanArg::Plan(nested) => match self.activate_component(role, nested)? {
                    Activated::Blob(blobs) => args.insert_blob(name, blobs),
                    Activated::Table(table) => args.insert_table(name, table),
                    Activated::Compressor(_) => {
                        return Err(ResolveError::InvalidArgument {
                            component: node.component().clone(),
                            parameter: name.to_string(),
                            reason: format!("{} is a compressor, not a transport", nested.component()),
                        })
                    }
                },
            }
        }
        Ok(args)
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("components", &self.components)
            .field("cache", &self.cache)
            .finish()
    }
}

fn hook_plan(plan: &ConstructionPlan, role: Role) -> ResolveResult<&ConstructionPlan> {
    plan.role(role).ok_or_else(|| ResolveError::MissingRequiredParameter {
        component: names::STORE_CHAIN,
        parameter: role.as_str().to_string(),
    })
}

fn activate_generic<K, V, T, P>(
    resolver: &Resolver,
    catalog: &GenericCatalog<K, V>,
    role: Role,
    node: &ConstructionPlan,
    pick: P,
) -> ResolveResult<T>
where
    P: FnOnce(&GenericFactory<K, V>) -> Option<&Make<T>>,
{
    let entry = catalog
        .get(role, node.component())
        .ok_or_else(|| unknown(role, node.component()))?;
    let make = pick(&entry.factory).ok_or_else(|| unknown(role, node.component()))?;
    let args = resolver.bind_args(role, node)?;
    let built = make(&args).map_err(|e| activation_error(role, node.component(), e))?;
    if role.is_hook() {
        debug!(%role, component = %node.component(), "activated");
    }
    Ok(built)
}

fn unknown(role: Role, component: &ComponentRef) -> ResolveError {
    ResolveError::UnknownComponent {
        role,
        component: component.clone(),
    }
}

fn activation_error(role: Role, component: &ComponentRef, err: ActivateError) -> ResolveError {
    match err {
        ActivateError::Argument(e) => ResolveError::InvalidArgument {
            component: component.clone(),
            parameter: e.parameter().to_string(),
            reason: e.to_string(),
        },
        ActivateError::Unsupported { type_name } => ResolveError::UnresolvableGenericArgument {
            role,
            argument: type_name.to_string(),
        },
        ActivateError::Failed(source) => ResolveError::ActivationFailure {
            role,
            component: component.clone(),
            source: Arc::from(source),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    use serde::{Deserialize, Serialize};
    use stowage_facet::{facets, MapConfig};
    use stowage_plan::StoreBuilder;
    use stowage_store::{InMemoryBlobStore, StoreError};
    use stowage_types::names::params;
    use stowage_types::Literal;

    use crate::hooks::{MutateFn, ValidateFn};
    use crate::registry::{Capability, ComponentSpec};

    const SHARED: ComponentRef = ComponentRef::from_static("shared-memory");
    const BROKEN: ComponentRef = ComponentRef::from_static("broken");

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Person {
        name: String,
    }

    fn person(name: &str) -> Person {
        Person { name: name.to_string() }
    }

    fn key(k: &str) -> String {
        k.to_string()
    }

    /// A resolver whose `shared-memory` transport is `mem`.
    fn shared_resolver(mem: &Arc<InMemoryBlobStore>) -> Resolver {
        let mut components = ComponentRegistry::with_builtins();
        let mem = Arc::clone(mem);
        components.register_blob(ComponentSpec::new(SHARED), move |_| Ok(Arc::clone(&mem)));
        Resolver::with_components(components, MapConfig::new())
    }

    struct People;

    impl StoreContract for People {
        type Key = String;
        type Value = Person;

        fn declare(decl: &mut ContractDecl<Self>) {
            decl.add(facets::local_fs_from_config("people.root"))
                .add(facets::json());
        }
    }

    struct MemoryPeople;

    impl StoreContract for MemoryPeople {
        type Key = String;
        type Value = Person;

        fn declare(decl: &mut ContractDecl<Self>) {
            decl.add(facets::in_memory()).add(facets::json());
        }
    }

    #[test]
    fn json_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        let resolver = Resolver::new(MapConfig::new().with("people.root", root));

        let store = resolver.resolve::<People>().unwrap();
        store.put(&key("a"), &person("x")).unwrap();

        let on_disk = std::fs::read_to_string(dir.path().join("a")).unwrap();
        assert_eq!(on_disk, r#"{"name":"x"}"#);
        assert_eq!(store.get(&key("a")).unwrap(), Some(person("x")));
        assert_eq!(store.get(&key("missing")).unwrap(), None);
    }

    #[test]
    fn missing_config_value_fails_resolution() {
        let resolver = Resolver::new(MapConfig::new());
        let err = resolver.resolve::<People>().unwrap_err();
        assert!(matches!(
            err,
            ResolveError::MissingRequiredParameter { ref parameter, .. } if parameter == params::ROOT_PATH
        ));
        assert!(err.is_configuration());
        assert!(!resolver.is_cached::<People>());
    }

    #[test]
    fn resolution_is_cached() {
        let resolver = Resolver::new(MapConfig::new());
        let first = resolver.resolve::<MemoryPeople>().unwrap();
        first.put(&key("k"), &person("v")).unwrap();
        let second = resolver.resolve::<MemoryPeople>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.get(&key("k")).unwrap(), Some(person("v")));
        assert!(resolver.is_cached::<MemoryPeople>());
        assert_eq!(resolver.activation_count(), 1);
    }

    #[test]
    fn concurrent_resolution_activates_once() {
        let resolver = Arc::new(Resolver::new(MapConfig::new()));
        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    resolver.resolve::<MemoryPeople>().unwrap()
                })
            })
            .collect();
        let stores: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(stores.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(resolver.activation_count(), 1);
    }

    struct Plain;

    impl StoreContract for Plain {
        type Key = String;
        type Value = Person;

        fn declare(decl: &mut ContractDecl<Self>) {
            decl.add(facets::blob_store(SHARED)).add(facets::json());
        }
    }

    #[test]
    fn without_compressor_stored_bytes_are_serializer_output() {
        let mem = Arc::new(InMemoryBlobStore::new());
        let resolver = shared_resolver(&mem);
        let store = resolver.resolve::<Plain>().unwrap();
        store.put(&key("a"), &person("x")).unwrap();

        let raw = mem.read("a").unwrap().unwrap().value;
        assert_eq!(raw, serde_json::to_vec(&person("x")).unwrap());
    }

    struct Gzipped;

    impl StoreContract for Gzipped {
        type Key = String;
        type Value = Person;

        fn declare(decl: &mut ContractDecl<Self>) {
            decl.add(facets::blob_store(SHARED))
                .add(facets::bincode())
                .add(facets::gzip());
        }
    }

    #[test]
    fn gzip_bincode_round_trip() {
        let mem = Arc::new(InMemoryBlobStore::new());
        let resolver = shared_resolver(&mem);
        let store = resolver.resolve::<Gzipped>().unwrap();
        store.put(&key("p/1"), &person("ada")).unwrap();

        let raw = mem.read("p/1").unwrap().unwrap().value;
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);
        assert_eq!(store.get(&key("p/1")).unwrap(), Some(person("ada")));
        assert_eq!(store.list("p/").unwrap(), vec!["p/1"]);
    }

    struct Zstandard;

    impl StoreContract for Zstandard {
        type Key = u64;
        type Value = Person;

        fn declare(decl: &mut ContractDecl<Self>) {
            decl.add(facets::in_memory())
                .add(facets::yaml())
                .add(facets::zstd())
                .add(facets::compression_level(9));
        }
    }

    #[test]
    fn zstd_yaml_round_trip_with_level() {
        let resolver = Resolver::new(MapConfig::new());
        let plan = resolver.explain::<Zstandard>().unwrap();
        assert_eq!(
            plan.role(Role::Compressor).unwrap().literal(params::LEVEL),
            Some(&Literal::Int(9))
        );

        let store = resolver.resolve::<Zstandard>().unwrap();
        store.put(&7, &person("grace")).unwrap();
        assert_eq!(store.get(&7).unwrap(), Some(person("grace")));
        assert!(store.delete(&7).unwrap());
        assert!(!store.exists(&7).unwrap());
    }

    struct RawPeople;

    impl StoreContract for RawPeople {
        type Key = String;
        type Value = Person;

        fn declare(decl: &mut ContractDecl<Self>) {
            decl.add(facets::in_memory()).add(facets::raw_bytes());
        }
    }

    struct RawBlobs;

    impl StoreContract for RawBlobs {
        type Key = String;
        type Value = Vec<u8>;

        fn declare(decl: &mut ContractDecl<Self>) {
            decl.add(facets::blob_store(SHARED)).add(facets::raw_bytes());
        }
    }

    #[test]
    fn raw_bytes_codec_only_binds_to_byte_values() {
        let resolver = Resolver::new(MapConfig::new());
        let err = resolver.resolve::<RawPeople>().unwrap_err();
        assert!(matches!(
            err,
            ResolveError::UnresolvableGenericArgument { role: Role::Serializer, ref argument }
                if argument.ends_with("Person")
        ));

        let mem = Arc::new(InMemoryBlobStore::new());
        let store = shared_resolver(&mem).resolve::<RawBlobs>().unwrap();
        store.put(&key("img"), &vec![0, 159, 146, 150]).unwrap();
        assert_eq!(mem.read("img").unwrap().unwrap().value, vec![0, 159, 146, 150]);
    }

    struct NoSerializer;

    impl StoreContract for NoSerializer {
        type Key = String;
        type Value = Person;

        fn declare(decl: &mut ContractDecl<Self>) {
            decl.add(facets::in_memory());
        }
    }

    #[test]
    fn missing_serializer_is_unresolvable() {
        let err = Resolver::new(MapConfig::new())
            .resolve::<NoSerializer>()
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::UnresolvableGenericArgument { role: Role::Serializer, .. }
        ));
    }

    struct Validated;

    impl StoreContract for Validated {
        type Key = String;
        type Value = Person;

        fn declare(decl: &mut ContractDecl<Self>) {
            decl.add(facets::in_memory())
                .add(facets::json())
                .mutation_hook(
                    ComponentRef::from_static("trim-name"),
                    MutateFn(|p: &Person| {
                        let trimmed = p.name.trim();
                        (trimmed != p.name).then(|| person(trimmed))
                    }),
                )
                .validation_hook(
                    ComponentRef::from_static("non-empty"),
                    ValidateFn(|p: &Person| {
                        if p.name.is_empty() {
                            vec!["name is empty".to_string()]
                        } else {
                            Vec::new()
                        }
                    }),
                );
        }
    }

    #[test]
    fn hooks_mutate_then_validate() {
        let resolver = Resolver::new(MapConfig::new());
        let store = resolver.resolve::<Validated>().unwrap();

        store.put(&key("a"), &person("  lin ")).unwrap();
        assert_eq!(store.get(&key("a")).unwrap(), Some(person("lin")));

        let err = store.put(&key("b"), &person("   ")).unwrap_err();
        assert!(matches!(err, StoreError::Validation { ref errors } if errors == &["name is empty"]));
        assert!(!store.exists(&key("b")).unwrap());
    }

    struct Orders;

    impl StoreContract for Orders {
        type Key = u64;
        type Value = Person;

        fn plan() -> Option<ConstructionPlan> {
            Some(
                StoreBuilder::new()
                    .memory_table("orders")
                    .bincode()
                    .prefixed_keys("orders")
                    .build(),
            )
        }

        fn declare(decl: &mut ContractDecl<Self>) {
            decl.add(facets::json()).add(facets::local_fs("/ignored"));
        }
    }

    #[test]
    fn code_plan_takes_precedence_over_facets() {
        let resolver = Resolver::new(MapConfig::new());
        let plan = resolver.explain::<Orders>().unwrap();
        assert_eq!(plan.role(Role::Serializer).unwrap().component(), &names::BINCODE);
        assert_eq!(plan.role(Role::BackingStore).unwrap().component(), &names::TABLE_STORE);

        let store = resolver.resolve::<Orders>().unwrap();
        store.put(&7, &person("order seven")).unwrap();
        assert_eq!(store.get(&7).unwrap(), Some(person("order seven")));
        assert_eq!(store.list("orders/").unwrap(), vec!["orders/7"]);
    }

    struct BareStore;

    impl StoreContract for BareStore {
        type Key = String;
        type Value = Person;

        fn plan() -> Option<ConstructionPlan> {
            Some(ConstructionPlan::new(names::MEMORY))
        }

        fn declare(decl: &mut ContractDecl<Self>) {
            decl.add(facets::json()).add(facets::hashed_keys());
        }
    }

    #[test]
    fn store_plan_is_wrapped_in_chain() {
        let resolver = Resolver::new(MapConfig::new());
        let store = resolver.resolve::<BareStore>().unwrap();
        assert!(store.plan().is_chain());
        assert_eq!(store.plan().role(Role::BackingStore).unwrap().component(), &names::MEMORY);

        store.put(&key("a"), &person("hashed")).unwrap();
        let paths = store.list("").unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 2 + 1 + 64);
    }

    struct Broken;

    impl StoreContract for Broken {
        type Key = String;
        type Value = Person;

        fn declare(decl: &mut ContractDecl<Self>) {
            decl.add(facets::component(Role::BackingStore, BROKEN))
                .add(facets::json());
        }
    }

    #[test]
    fn activation_failure_is_not_cached() {
        let mut components = ComponentRegistry::with_builtins();
        components.register(ComponentSpec::new(BROKEN), Capability::BlobTransport, |_| {
            Err(ActivateError::failed(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "mount is read-only",
            )))
        });
        let resolver = Resolver::with_components(components, MapConfig::new());

        let err = resolver.resolve::<Broken>().unwrap_err();
        assert!(matches!(err, ResolveError::ActivationFailure { role: Role::BackingStore, .. }));
        assert!(!err.is_configuration());
        assert!(err.to_string().contains("mount is read-only"));
        assert!(!resolver.is_cached::<Broken>());
        assert_eq!(resolver.activation_count(), 0);
    }

    #[test]
    fn concurrent_first_resolutions_share_one_failed_activation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut components = ComponentRegistry::with_builtins();
        let counter = Arc::clone(&calls);
        components.register(ComponentSpec::new(BROKEN), Capability::BlobTransport, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(100));
            Err(ActivateError::failed(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "backend unreachable",
            )))
        });
        let resolver = Arc::new(Resolver::with_components(components, MapConfig::new()));
        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    resolver.resolve::<Broken>().map(|_| ())
                })
            })
            .collect();
        for h in handles {
            let err = h.join().unwrap().unwrap_err();
            assert!(matches!(err, ResolveError::ActivationFailure { role: Role::BackingStore, .. }));
            assert!(err.to_string().contains("backend unreachable"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!resolver.is_cached::<Broken>());

        resolver.resolve::<Broken>().unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
