use std::any::TypeId;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;

use stowage_types::{ComponentRef, Role};

use crate::error::{FacetError, FacetResult};
use crate::facet::Facet;
use crate::registry::FacetRegistry;

/// A facet found while scanning a contract.
#[derive(Clone, Debug)]
pub struct ScannedFacet {
    pub facet: Arc<Facet>,
    /// 0 for facets declared on the contract itself, 1 for its direct
    /// bases, and so on.
    pub depth: usize,
    /// Type name of the contract that declared the facet.
    pub origin: &'static str,
}

impl FacetRegistry {
    /// All facets of `contract` and, transitively, of its bases.
    ///
    /// Bases are visited breadth-first, so facets come out ordered by
    /// depth. A base reachable along several paths is visited once, at its
    /// smallest depth.
    pub fn scan(&self, contract: TypeId) -> FacetResult<Vec<ScannedFacet>> {
        if !self.contains(contract) {
            return Err(FacetError::Unregistered {
                contract: format!("{contract:?}"),
            });
        }

        let mut out = Vec::new();
        let mut visited = HashSet::from([contract]);
        let mut queue = VecDeque::from([(contract, 0usize)]);

        while let Some((id, depth)) = queue.pop_front() {
            let Some(entry) = self.entry(id) else {
                continue;
            };
            out.extend(entry.facets.iter().map(|facet| ScannedFacet {
                facet: Arc::clone(facet),
                depth,
                origin: entry.name,
            }));
            for base in &entry.bases {
                if visited.insert(*base) {
                    queue.push_back((*base, depth + 1));
                }
            }
        }
        Ok(out)
    }
}

/// Indices of parameter facets per bound (component, parameter) pair,
/// implied targets included.
pub fn parameter_bindings(scanned: &[ScannedFacet]) -> BTreeMap<(ComponentRef, String), Vec<usize>> {
    let mut map: BTreeMap<(ComponentRef, String), Vec<usize>> = BTreeMap::new();
    for (index, s) in scanned.iter().enumerate() {
        if let Facet::Parameter(p) = s.facet.as_ref() {
            for (component, parameter) in p.bindings() {
                let slot = map.entry((component.clone(), parameter.to_string())).or_default();
                if !slot.contains(&index) {
                    slot.push(index);
                }
            }
        }
    }
    map
}

/// Indices of component facets per role.
pub fn component_bindings(scanned: &[ScannedFacet]) -> BTreeMap<Role, Vec<usize>> {
    let mut map: BTreeMap<Role, Vec<usize>> = BTreeMap::new();
    for (index, s) in scanned.iter().enumerate() {
        if let Facet::Component(c) = s.facet.as_ref() {
            map.entry(c.role).or_default().push(index);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{FacetDecl, FacetSource};
    use crate::facets;
    use stowage_types::names;

    struct Contract;
    struct Mid;
    struct Top;

    impl FacetSource for Top {
        fn facets(decl: &mut FacetDecl) {
            decl.add(facets::zstd());
        }
    }

    impl FacetSource for Mid {
        fn facets(decl: &mut FacetDecl) {
            decl.extends::<Top>().add(facets::local_fs_from_config("data.root"));
        }
    }

    impl FacetSource for Contract {
        fn facets(decl: &mut FacetDecl) {
            decl.extends::<Mid>()
                .extends::<Top>()
                .add(facets::json())
                .add(facets::root_path_literal("/override"));
        }
    }

    fn scanned() -> Vec<ScannedFacet> {
        let mut registry = FacetRegistry::new();
        registry.register::<Contract>();
        registry.scan(TypeId::of::<Contract>()).unwrap()
    }

    #[test]
    fn scan_orders_by_depth_and_visits_each_base_once() {
        let facets = scanned();
        let depths: Vec<_> = facets.iter().map(|s| s.depth).collect();
        // Top is a direct base as well as a base of Mid.
        assert_eq!(depths, vec![0, 0, 1, 1, 1]);
        assert!(facets[0].origin.ends_with("Contract"));
    }

    #[test]
    fn bindings_group_by_target() {
        let facets = scanned();
        let params = parameter_bindings(&facets);
        let roots = &params[&(names::LOCAL_FS, "rootPath".to_string())];
        assert_eq!(roots.len(), 2);
        assert_eq!(params[&(names::FILE_STORE, "rootPath".to_string())].len(), 2);

        let components = component_bindings(&facets);
        assert_eq!(components[&Role::Serializer].len(), 1);
        assert_eq!(components[&Role::Compressor].len(), 1);
        assert_eq!(components[&Role::BackingStore].len(), 1);
    }

    #[test]
    fn unregistered_contract_fails() {
        let registry = FacetRegistry::new();
        assert!(matches!(
            registry.scan(TypeId::of::<Contract>()),
            Err(FacetError::Unregistered { .. })
        ));
    }
}
