use std::any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use stowage_codec::{BincodeCodec, JsonCodec, RawBytesCodec, ValueCodec, YamlCodec};
use stowage_types::names::{self, params};
use stowage_types::{ComponentRef, Role};

use crate::args::{ActivateError, ArgError, BoundArgs};
use crate::contract::StoreValue;
use crate::hooks::{
    AcceptAll, IdentityHook, MutationHook, NoopObserver, ObservationHook, TracingObserver,
    ValidationHook,
};
use crate::keys::{HashedKeyMapper, KeyMapper, PathKeyMapper, StoreKey};
use crate::registry::{ComponentSpec, ParamSpec};

pub(crate) type Make<T> = Arc<dyn Fn(&BoundArgs) -> Result<T, ActivateError> + Send + Sync>;

/// Factory of one generic role, bound to key type `K` and value type `V`.
pub enum GenericFactory<K, V> {
    Serializer(Make<Arc<dyn ValueCodec<V>>>),
    KeyMapper(Make<Arc<dyn KeyMapper<K>>>),
    MutationHook(Make<Arc<dyn MutationHook<V>>>),
    ObservationHook(Make<Arc<dyn ObservationHook<K, V>>>),
    ValidationHook(Make<Arc<dyn ValidationHook<V>>>),
}

impl<K, V> GenericFactory<K, V> {
    pub fn serializer<F>(make: F) -> Self
    where
        F: Fn(&BoundArgs) -> Result<Arc<dyn ValueCodec<V>>, ActivateError> + Send + Sync + 'static,
    {
        Self::Serializer(Arc::new(make))
    }

    pub fn key_mapper<F>(make: F) -> Self
    where
        F: Fn(&BoundArgs) -> Result<Arc<dyn KeyMapper<K>>, ActivateError> + Send + Sync + 'static,
    {
        Self::KeyMapper(Arc::new(make))
    }

    pub fn mutation_hook<F>(make: F) -> Self
    where
        F: Fn(&BoundArgs) -> Result<Arc<dyn MutationHook<V>>, ActivateError> + Send + Sync + 'static,
    {
        Self::MutationHook(Arc::new(make))
    }

    pub fn observation_hook<F>(make: F) -> Self
    where
        F: Fn(&BoundArgs) -> Result<Arc<dyn ObservationHook<K, V>>, ActivateError>
            + Send
            + Sync
            + 'static,
    {
        Self::ObservationHook(Arc::new(make))
    }

    pub fn validation_hook<F>(make: F) -> Self
    where
        F: Fn(&BoundArgs) -> Result<Arc<dyn ValidationHook<V>>, ActivateError> + Send + Sync + 'static,
    {
        Self::ValidationHook(Arc::new(make))
    }

    pub fn role(&self) -> Role {
        match self {
            Self::Serializer(_) => Role::Serializer,
            Self::KeyMapper(_) => Role::KeyMapper,
            Self::MutationHook(_) => Role::MutationHook,
            Self::ObservationHook(_) => Role::ObservationHook,
            Self::ValidationHook(_) => Role::ValidationHook,
        }
    }
}

impl<K, V> Clone for GenericFactory<K, V> {
    fn clone(&self) -> Self {
        match self {
            Self::Serializer(f) => Self::Serializer(Arc::clone(f)),
            Self::KeyMapper(f) => Self::KeyMapper(Arc::clone(f)),
            Self::MutationHook(f) => Self::MutationHook(Arc::clone(f)),
            Self::ObservationHook(f) => Self::ObservationHook(Arc::clone(f)),
            Self::ValidationHook(f) => Self::ValidationHook(Arc::clone(f)),
        }
    }
}

pub(crate) struct GenericEntry<K, V> {
    pub(crate) spec: ComponentSpec,
    pub(crate) factory: GenericFactory<K, V>,
}

/// Factories for the roles that depend on a contract's key and value type:
/// serializer, key mapper and the three hooks.
///
/// A catalog is instantiated per contract, which is where the generic
/// arguments get bound: `GenericCatalog<C::Key, C::Value>` can only hold
/// codecs that work for `C::Value`.
pub struct GenericCatalog<K, V> {
    entries: HashMap<(Role, ComponentRef), GenericEntry<K, V>>,
}

impl<K: StoreKey, V: StoreValue> GenericCatalog<K, V> {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Catalog with the built-in codecs, key mappers and hooks.
    pub fn with_builtins() -> Self {
        let mut c = Self::empty();

        c.insert(
            ComponentSpec::new(names::JSON).param(ParamSpec::with_default(params::PRETTY, false)),
            GenericFactory::serializer(|args| {
                let codec = if args.bool(params::PRETTY)? {
                    JsonCodec::pretty()
                } else {
                    JsonCodec::new()
                };
                Ok(Arc::new(codec))
            }),
        );
        c.insert(
            ComponentSpec::new(names::BINCODE),
            GenericFactory::serializer(|_| Ok(Arc::new(BincodeCodec))),
        );
        c.insert(
            ComponentSpec::new(names::YAML),
            GenericFactory::serializer(|_| Ok(Arc::new(YamlCodec))),
        );
        c.insert(
            ComponentSpec::new(names::BYTES),
            GenericFactory::serializer(|_| {
                if !RawBytesCodec::supports::<V>() {
                    return Err(ActivateError::Unsupported {
                        type_name: any::type_name::<V>(),
                    });
                }
                Ok(Arc::new(RawBytesCodec))
            }),
        );

        c.insert(
            ComponentSpec::new(names::PATH_KEY).param(ParamSpec::with_default(params::PREFIX, "")),
            GenericFactory::key_mapper(|args| {
                Ok(Arc::new(PathKeyMapper::new(args.str(params::PREFIX)?)))
            }),
        );
        c.insert(
            ComponentSpec::new(names::HASHED_KEY).param(ParamSpec::with_default(
                params::FANOUT,
                HashedKeyMapper::DEFAULT_FANOUT,
            )),
            GenericFactory::key_mapper(|args| {
                let requested = args.int(params::FANOUT)?;
                let fanout = usize::try_from(requested)
                    .ok()
                    .filter(|f| *f <= HashedKeyMapper::MAX_FANOUT)
                    .ok_or_else(|| {
                        ArgError::invalid(
                            params::FANOUT,
                            format!("expected 0..={}, got {requested}", HashedKeyMapper::MAX_FANOUT),
                        )
                    })?;
                Ok(Arc::new(HashedKeyMapper::new(fanout)))
            }),
        );

        c.insert(
            ComponentSpec::new(names::IDENTITY),
            GenericFactory::mutation_hook(|_| Ok(Arc::new(IdentityHook))),
        );
        c.insert(
            ComponentSpec::new(names::NOOP),
            GenericFactory::observation_hook(|_| Ok(Arc::new(NoopObserver))),
        );
        c.insert(
            ComponentSpec::new(names::TRACING),
            GenericFactory::observation_hook(|_| Ok(Arc::new(TracingObserver))),
        );
        c.insert(
            ComponentSpec::new(names::ACCEPT_ALL),
            GenericFactory::validation_hook(|_| Ok(Arc::new(AcceptAll))),
        );

        c
    }

    /// Add a factory; the role is taken from the factory. Replaces any
    /// previous entry with the same role and name.
    pub fn insert(&mut self, spec: ComponentSpec, factory: GenericFactory<K, V>) {
        let key = (factory.role(), spec.component.clone());
        self.entries.insert(key, GenericEntry { spec, factory });
    }

    /// Add a ready-made codec instance with no parameters.
    pub fn insert_codec(&mut self, name: ComponentRef, codec: Arc<dyn ValueCodec<V>>) {
        self.insert(
            ComponentSpec::new(name),
            GenericFactory::serializer(move |_| Ok(Arc::clone(&codec))),
        );
    }

    pub fn insert_key_mapper(&mut self, name: ComponentRef, mapper: Arc<dyn KeyMapper<K>>) {
        self.insert(
            ComponentSpec::new(name),
            GenericFactory::key_mapper(move |_| Ok(Arc::clone(&mapper))),
        );
    }

    pub fn insert_mutation_hook(&mut self, name: ComponentRef, hook: Arc<dyn MutationHook<V>>) {
        self.insert(
            ComponentSpec::new(name),
            GenericFactory::mutation_hook(move |_| Ok(Arc::clone(&hook))),
        );
    }

    pub fn insert_observation_hook(
        &mut self,
        name: ComponentRef,
        hook: Arc<dyn ObservationHook<K, V>>,
    ) {
        self.insert(
            ComponentSpec::new(name),
            GenericFactory::observation_hook(move |_| Ok(Arc::clone(&hook))),
        );
    }

    pub fn insert_validation_hook(&mut self, name: ComponentRef, hook: Arc<dyn ValidationHook<V>>) {
        self.insert(
            ComponentSpec::new(name),
            GenericFactory::validation_hook(move |_| Ok(Arc::clone(&hook))),
        );
    }
}

impl<K, V> GenericCatalog<K, V> {
    pub fn contains(&self, role: Role, component: &ComponentRef) -> bool {
        self.entries.contains_key(&(role, component.clone()))
    }

    pub fn spec(&self, role: Role, component: &ComponentRef) -> Option<&ComponentSpec> {
        self.entries.get(&(role, component.clone())).map(|e| &e.spec)
    }

    /// Specs of every entry named `component`, whatever the role.
    pub fn specs_named<'a>(
        &'a self,
        component: &'a ComponentRef,
    ) -> impl Iterator<Item = &'a ComponentSpec> + 'a {
        self.entries
            .iter()
            .filter(move |((_, name), _)| name == component)
            .map(|(_, e)| &e.spec)
    }

    pub(crate) fn get(&self, role: Role, component: &ComponentRef) -> Option<&GenericEntry<K, V>> {
        self.entries.get(&(role, component.clone()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> fmt::Debug for GenericCatalog<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self
            .entries
            .keys()
            .map(|(role, name)| format!("{role}:{name}"))
            .collect();
        names.sort_unstable();
        f.debug_struct("GenericCatalog")
            .field("key", &any::type_name::<K>())
            .field("value", &any::type_name::<V>())
            .field("entries", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
    }

    fn serializer<K, V>(c: &GenericCatalog<K, V>, name: &ComponentRef, args: &BoundArgs) -> Result<Arc<dyn ValueCodec<V>>, ActivateError> {
        match &c.get(Role::Serializer, name).unwrap().factory {
            GenericFactory::Serializer(make) => make(args),
            _ => panic!("not a serializer"),
        }
    }

    #[test]
    fn builtins_cover_every_generic_role() {
        let c = GenericCatalog::<String, Doc>::with_builtins();
        assert!(c.contains(Role::Serializer, &names::JSON));
        assert!(c.contains(Role::KeyMapper, &names::HASHED_KEY));
        assert!(c.contains(Role::MutationHook, &names::IDENTITY));
        assert!(c.contains(Role::ObservationHook, &names::TRACING));
        assert!(c.contains(Role::ValidationHook, &names::ACCEPT_ALL));
        assert!(!c.contains(Role::Serializer, &names::IDENTITY));
    }

    #[test]
    fn bytes_codec_binds_only_byte_values() {
        let docs = GenericCatalog::<String, Doc>::with_builtins();
        let err = serializer(&docs, &names::BYTES, &BoundArgs::new()).err().unwrap();
        assert!(matches!(err, ActivateError::Unsupported { type_name } if type_name.ends_with("Doc")));

        let blobs = GenericCatalog::<String, Vec<u8>>::with_builtins();
        assert!(serializer(&blobs, &names::BYTES, &BoundArgs::new()).is_ok());
    }

    #[test]
    fn pretty_json_argument() {
        let c = GenericCatalog::<String, Doc>::with_builtins();
        let codec = serializer(&c, &names::JSON, &BoundArgs::new().with_value("pretty", true)).unwrap();
        let out = codec.encode(&Doc { name: "x".into() }).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\n  \"name\": \"x\"\n}");
    }

    #[test]
    fn custom_codec_replaces_by_name() {
        let mut c = GenericCatalog::<String, Doc>::empty();
        c.insert_codec(names::JSON, Arc::new(YamlCodec));
        let codec = serializer(&c, &names::JSON, &BoundArgs::new()).unwrap();
        assert_eq!(codec.name(), "yaml");
        assert!(c.spec(Role::Serializer, &names::JSON).unwrap().params.is_empty());
    }
}
