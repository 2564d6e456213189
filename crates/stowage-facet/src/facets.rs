//! Ready-made facets for the built-in components.
//!
//! Each function returns a [`FacetBundle`] to pass to
//! [`FacetDecl::add`](crate::FacetDecl::add).

use stowage_plan::ConstructionPlan;
use stowage_types::names::{self, params};
use stowage_types::{ComponentRef, Literal, Role};

use crate::decl::FacetBundle;
use crate::facet::{ComponentFacet, ParameterFacet, ValueSource};

fn file_store_over(transport: ComponentRef) -> ComponentFacet {
    let plan = ConstructionPlan::new(names::FILE_STORE)
        .with_nested_component(params::TRANSPORT, transport);
    ComponentFacet::with_plan(Role::BackingStore, plan)
}

fn root_path(source: ValueSource) -> ParameterFacet {
    ParameterFacet::new(names::LOCAL_FS, params::ROOT_PATH, source).implies(names::FILE_STORE)
}

/// Files under `root` on the local filesystem.
///
/// The root path configures both the filesystem transport and the file
/// store wrapping it.
pub fn local_fs(root: impl Into<String>) -> FacetBundle {
    FacetBundle::new()
        .with(file_store_over(names::LOCAL_FS))
        .with(root_path(ValueSource::Literal(Literal::Str(root.into()))))
}

/// Files on the local filesystem, root path read from configuration `key`.
pub fn local_fs_from_config(key: impl Into<String>) -> FacetBundle {
    FacetBundle::new()
        .with(file_store_over(names::LOCAL_FS))
        .with(root_path(ValueSource::ConfigKey(key.into())))
}

/// The filesystem root alone, for contracts that pick the store elsewhere.
pub fn root_path_literal(root: impl Into<String>) -> FacetBundle {
    root_path(ValueSource::Literal(Literal::Str(root.into()))).into()
}

/// Files held in process memory.
pub fn in_memory() -> FacetBundle {
    file_store_over(names::MEMORY).into()
}

/// A file store over any registered blob transport.
pub fn blob_store(transport: ComponentRef) -> FacetBundle {
    file_store_over(transport).into()
}

/// Rows of the in-memory table `table`.
pub fn memory_table(table: impl Into<String>) -> FacetBundle {
    let plan = ConstructionPlan::new(names::TABLE_STORE)
        .with_nested_component(params::TRANSPORT, names::MEMORY_TABLE);
    FacetBundle::new()
        .with(ComponentFacet::with_plan(Role::BackingStore, plan))
        .with(ParameterFacet::literal(
            names::MEMORY_TABLE,
            params::TABLE,
            Literal::Str(table.into()),
        ))
}

/// Use `component` for `role`.
pub fn component(role: Role, component: ComponentRef) -> FacetBundle {
    ComponentFacet::new(role, component).into()
}

pub fn json() -> FacetBundle {
    component(Role::Serializer, names::JSON)
}

pub fn json_pretty() -> FacetBundle {
    FacetBundle::new()
        .with(ComponentFacet::new(Role::Serializer, names::JSON))
        .with(ParameterFacet::literal(names::JSON, params::PRETTY, true))
}

pub fn bincode() -> FacetBundle {
    component(Role::Serializer, names::BINCODE)
}

pub fn yaml() -> FacetBundle {
    component(Role::Serializer, names::YAML)
}

pub fn raw_bytes() -> FacetBundle {
    component(Role::Serializer, names::BYTES)
}

pub fn gzip() -> FacetBundle {
    component(Role::Compressor, names::GZIP)
}

pub fn zstd() -> FacetBundle {
    component(Role::Compressor, names::ZSTD)
}

/// Compression level for whichever built-in compressor is in use.
pub fn compression_level(level: i64) -> FacetBundle {
    ParameterFacet::literal(names::GZIP, params::LEVEL, level)
        .also_target(names::ZSTD)
        .into()
}

/// Append `.extension` to every stored path.
pub fn file_extension(extension: impl Into<String>) -> FacetBundle {
    ParameterFacet::literal(
        names::FILE_STORE,
        params::EXTENSION,
        Literal::Str(extension.into()),
    )
    .into()
}

/// Store each key under the hex BLAKE3 hash of its path.
pub fn hashed_keys() -> FacetBundle {
    component(Role::KeyMapper, names::HASHED_KEY)
}

/// Hashed keys with `fanout` leading hash characters as a directory.
pub fn hashed_keys_with_fanout(fanout: i64) -> FacetBundle {
    FacetBundle::new()
        .with(ComponentFacet::new(Role::KeyMapper, names::HASHED_KEY))
        .with(ParameterFacet::literal(names::HASHED_KEY, params::FANOUT, fanout))
}

/// Store each key under `prefix`.
pub fn key_prefix(prefix: impl Into<String>) -> FacetBundle {
    FacetBundle::new()
        .with(ComponentFacet::new(Role::KeyMapper, names::PATH_KEY))
        .with(ParameterFacet::literal(
            names::PATH_KEY,
            params::PREFIX,
            Literal::Str(prefix.into()),
        ))
}

/// Log every store operation through `tracing`.
pub fn traced() -> FacetBundle {
    component(Role::ObservationHook, names::TRACING)
}

/// Bind `parameter` on `target` to a literal.
pub fn parameter(target: ComponentRef, parameter: &str, value: impl Into<Literal>) -> FacetBundle {
    ParameterFacet::literal(target, parameter, value).into()
}

/// Bind `parameter` on `target` to configuration `key`.
pub fn from_config(target: ComponentRef, parameter: &str, key: impl Into<String>) -> FacetBundle {
    ParameterFacet::config(target, parameter, key).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facet::Facet;

    #[test]
    fn local_fs_implies_file_store_root() {
        let bundle = local_fs("/tmp/x");
        let [Facet::Component(store), Facet::Parameter(root)] = bundle.facets() else {
            panic!("unexpected bundle shape: {bundle:?}");
        };
        assert_eq!(store.role, Role::BackingStore);
        assert_eq!(store.plan.nested("transport").unwrap().component(), &names::LOCAL_FS);
        assert_eq!(root.parameter, "rootPath");
        assert_eq!(root.implied[0].component, names::FILE_STORE);
        assert_eq!(root.source, ValueSource::Literal(Literal::from("/tmp/x")));
    }

    #[test]
    fn compression_level_targets_both_compressors() {
        let bundle = compression_level(9);
        let [Facet::Parameter(level)] = bundle.facets() else {
            panic!("unexpected bundle shape: {bundle:?}");
        };
        assert!(level.targets.contains(&names::GZIP));
        assert!(level.targets.contains(&names::ZSTD));
    }
}
