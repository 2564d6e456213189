use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use stowage_compress::{Compressor, GzipCompressor, ZstdCompressor};
use stowage_store::{
    BlobTransport, FileStore, InMemoryBlobStore, InMemoryTable, LocalFsTransport, TableStore,
    TableTransport,
};
use stowage_types::names::{self, params};
use stowage_types::{ComponentRef, Literal, Role};

use crate::args::{ActivateError, ArgError, BoundArgs};

// ---------------------------------------------------------------------------
// Component specs
// ---------------------------------------------------------------------------

/// What a non-generic component provides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Byte-level transport, usable as a nested transport or directly as a
    /// backing store.
    BlobTransport,
    /// Row-level transport.
    TableTransport,
    /// A blob store that wraps a transport.
    BackingStore,
    Compressor,
}

impl Capability {
    /// Whether a component with this capability can fill `role`.
    pub fn fills(&self, role: Role) -> bool {
        match role {
            Role::BackingStore => {
                matches!(self, Capability::BackingStore | Capability::BlobTransport)
            }
            Role::Compressor => matches!(self, Capability::Compressor),
            _ => false,
        }
    }
}

/// How a parameter is supplied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamKind {
    /// A literal; `None` means the parameter is required.
    Value { default: Option<Literal> },
    /// A nested component with the given capability.
    Component { capability: Capability },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
}

impl ParamSpec {
    pub fn required(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Value { default: None },
        }
    }

    pub fn with_default(name: &'static str, default: impl Into<Literal>) -> Self {
        Self {
            name,
            kind: ParamKind::Value {
                default: Some(default.into()),
            },
        }
    }

    pub fn component(name: &'static str, capability: Capability) -> Self {
        Self {
            name,
            kind: ParamKind::Component { capability },
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self.kind, ParamKind::Value { .. })
    }
}

/// The constructor signature of a component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentSpec {
    pub component: ComponentRef,
    pub params: Vec<ParamSpec>,
}

impl ComponentSpec {
    pub fn new(component: ComponentRef) -> Self {
        Self {
            component,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Whether `name` is a literal-valued parameter.
    pub fn accepts_value(&self, name: &str) -> bool {
        self.get(name).is_some_and(ParamSpec::is_value)
    }
}

// ---------------------------------------------------------------------------
// ComponentRegistry
// ---------------------------------------------------------------------------

/// A constructed non-generic component.
pub enum Activated {
    Blob(Arc<dyn BlobTransport>),
    Table(Arc<dyn TableTransport>),
    Compressor(Arc<dyn Compressor>),
}

impl fmt::Debug for Activated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activated::Blob(b) => f.debug_tuple("Blob").field(&b.name()).finish(),
            Activated::Table(t) => f.debug_tuple("Table").field(&t.name()).finish(),
            Activated::Compressor(c) => f.debug_tuple("Compressor").field(&c.name()).finish(),
        }
    }
}

pub type Factory = Arc<dyn Fn(&BoundArgs) -> Result<Activated, ActivateError> + Send + Sync>;

#[derive(Clone)]
pub(crate) struct Registered {
    pub(crate) spec: ComponentSpec,
    pub(crate) capability: Capability,
    pub(crate) factory: Factory,
}

/// Factories for transports, backing stores and compressors.
///
/// These do not depend on the contract's key or value type, so one registry
/// serves every contract. Generic roles live in
/// [`GenericCatalog`](crate::GenericCatalog).
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    components: HashMap<ComponentRef, Registered>,
}

impl ComponentRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in component.
    pub fn with_builtins() -> Self {
        let mut r = Self::new();

        r.register_blob(ComponentSpec::new(names::MEMORY), |_| {
            Ok(Arc::new(InMemoryBlobStore::new()))
        });
        r.register_blob(
            ComponentSpec::new(names::LOCAL_FS).param(ParamSpec::required(params::ROOT_PATH)),
            |args| {
                let root = args.str(params::ROOT_PATH)?;
                if root.is_empty() {
                    return Err(ArgError::invalid(params::ROOT_PATH, "must not be empty").into());
                }
                Ok(Arc::new(LocalFsTransport::new(root)))
            },
        );
        r.register_table(
            ComponentSpec::new(names::MEMORY_TABLE).param(ParamSpec::required(params::TABLE)),
            |args| Ok(Arc::new(InMemoryTable::new(args.str(params::TABLE)?))),
        );

        r.register(
            ComponentSpec::new(names::FILE_STORE)
                .param(ParamSpec::with_default(params::ROOT_PATH, ""))
                .param(ParamSpec::with_default(params::EXTENSION, ""))
                .param(ParamSpec::component(params::TRANSPORT, Capability::BlobTransport)),
            Capability::BackingStore,
            |args| {
                let store = FileStore::new(
                    args.str(params::ROOT_PATH)?,
                    &args.str(params::EXTENSION)?,
                    args.blob(params::TRANSPORT)?,
                );
                Ok(Activated::Blob(Arc::new(store)))
            },
        );
        r.register(
            ComponentSpec::new(names::TABLE_STORE)
                .param(ParamSpec::with_default(params::COLUMN, "value"))
                .param(ParamSpec::component(params::TRANSPORT, Capability::TableTransport)),
            Capability::BackingStore,
            |args| {
                let store = TableStore::new(args.str(params::COLUMN)?, args.table(params::TRANSPORT)?);
                Ok(Activated::Blob(Arc::new(store)))
            },
        );

        r.register(
            ComponentSpec::new(names::GZIP).param(ParamSpec::with_default(
                params::LEVEL,
                GzipCompressor::DEFAULT_LEVEL,
            )),
            Capability::Compressor,
            |args| {
                let gzip = GzipCompressor::new(args.int(params::LEVEL)?)
                    .map_err(|e| ArgError::invalid(params::LEVEL, e))?;
                Ok(Activated::Compressor(Arc::new(gzip)))
            },
        );
        r.register(
            ComponentSpec::new(names::ZSTD).param(ParamSpec::with_default(
                params::LEVEL,
                ZstdCompressor::DEFAULT_LEVEL,
            )),
            Capability::Compressor,
            |args| {
                let zstd = ZstdCompressor::new(args.int(params::LEVEL)?)
                    .map_err(|e| ArgError::invalid(params::LEVEL, e))?;
                Ok(Activated::Compressor(Arc::new(zstd)))
            },
        );

        r
    }

    /// Register a component, replacing any previous one of the same name.
    pub fn register<F>(&mut self, spec: ComponentSpec, capability: Capability, factory: F)
    where
        F: Fn(&BoundArgs) -> Result<Activated, ActivateError> + Send + Sync + 'static,
    {
        self.components.insert(
            spec.component.clone(),
            Registered {
                spec,
                capability,
                factory: Arc::new(factory),
            },
        );
    }

    /// Register a blob transport.
    pub fn register_blob<F, T>(&mut self, spec: ComponentSpec, factory: F)
    where
        F: Fn(&BoundArgs) -> Result<Arc<T>, ActivateError> + Send + Sync + 'static,
        T: BlobTransport + 'static,
    {
        self.register(spec, Capability::BlobTransport, move |args| {
            let transport: Arc<dyn BlobTransport> = factory(args)?;
            Ok(Activated::Blob(transport))
        });
    }

    /// Register a table transport.
    pub fn register_table<F, T>(&mut self, spec: ComponentSpec, factory: F)
    where
        F: Fn(&BoundArgs) -> Result<Arc<T>, ActivateError> + Send + Sync + 'static,
        T: TableTransport + 'static,
    {
        self.register(spec, Capability::TableTransport, move |args| {
            let transport: Arc<dyn TableTransport> = factory(args)?;
            Ok(Activated::Table(transport))
        });
    }

    pub fn contains(&self, component: &ComponentRef) -> bool {
        self.components.contains_key(component)
    }

    pub fn spec(&self, component: &ComponentRef) -> Option<&ComponentSpec> {
        self.components.get(component).map(|r| &r.spec)
    }

    pub fn capability(&self, component: &ComponentRef) -> Option<Capability> {
        self.components.get(component).map(|r| r.capability)
    }

    pub(crate) fn get(&self, component: &ComponentRef) -> Option<&Registered> {
        self.components.get(component)
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.components.keys().map(ComponentRef::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ComponentRegistry")
            .field("components", &names)
            .finish()
    }
}
