use std::any::{self, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::decl::{FacetDecl, FacetSource};
use crate::facet::Facet;

#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) name: &'static str,
    pub(crate) facets: Vec<Arc<Facet>>,
    pub(crate) bases: Vec<TypeId>,
}

/// Facets of every registered contract, keyed by contract type.
///
/// Registration runs a contract's declaration once and records the result
/// together with the contract's bases; base contracts are registered on
/// the way. Scanning is then a lookup, see [`FacetRegistry::scan`].
#[derive(Debug, Default)]
pub struct FacetRegistry {
    entries: HashMap<TypeId, Entry>,
}

impl FacetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `S` and its bases. Returns `false` if `S` was already
    /// registered.
    pub fn register<S: FacetSource>(&mut self) -> bool {
        self.register_decl(TypeId::of::<S>(), any::type_name::<S>(), FacetDecl::of::<S>())
    }

    /// Register an already-run declaration under `id`.
    pub fn register_decl(&mut self, id: TypeId, name: &'static str, decl: FacetDecl) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        let mut pending = vec![(id, name, decl)];
        while let Some((id, name, decl)) = pending.pop() {
            if self.entries.contains_key(&id) {
                continue;
            }
            let (facets, bases) = decl.into_parts();
            for link in &bases {
                if !self.entries.contains_key(&link.id) {
                    pending.push((link.id, link.name, link.declare()));
                }
            }
            debug!(
                contract = name,
                facets = facets.len(),
                bases = bases.len(),
                "registered facets"
            );
            self.entries.insert(
                id,
                Entry {
                    name,
                    facets: facets.into_iter().map(Arc::new).collect(),
                    bases: bases.iter().map(|b| b.id).collect(),
                },
            );
        }
        true
    }

    pub fn contains(&self, id: TypeId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Type name a contract was registered under.
    pub fn name(&self, id: TypeId) -> Option<&'static str> {
        self.entries.get(&id).map(|e| e.name)
    }

    pub(crate) fn entry(&self, id: TypeId) -> Option<&Entry> {
        self.entries.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets;

    struct Root;
    struct Left;
    struct Right;
    struct Shared;

    impl FacetSource for Shared {
        fn facets(decl: &mut FacetDecl) {
            decl.add(facets::json());
        }
    }

    impl FacetSource for Left {
        fn facets(decl: &mut FacetDecl) {
            decl.extends::<Shared>().add(facets::gzip());
        }
    }

    impl FacetSource for Right {
        fn facets(decl: &mut FacetDecl) {
            decl.extends::<Shared>();
        }
    }

    impl FacetSource for Root {
        fn facets(decl: &mut FacetDecl) {
            decl.extends::<Left>().extends::<Right>().add(facets::in_memory());
        }
    }

    #[test]
    fn registering_a_contract_registers_its_bases_once() {
        let mut registry = FacetRegistry::new();
        assert!(registry.register::<Root>());
        assert_eq!(registry.len(), 4);
        assert!(registry.contains(TypeId::of::<Shared>()));
        assert!(!registry.register::<Root>());
        assert!(!registry.register::<Left>());
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn names_are_type_names() {
        let mut registry = FacetRegistry::new();
        registry.register::<Shared>();
        assert!(registry.name(TypeId::of::<Shared>()).unwrap().ends_with("Shared"));
        assert!(registry.name(TypeId::of::<Root>()).is_none());
    }
}
