use std::any::{self, TypeId};
use std::fmt;

use crate::facet::{ComponentFacet, Facet, ParameterFacet};

/// A type that carries facets: a store contract or a base contract that
/// store contracts extend.
///
/// ```
/// use stowage_facet::{facets, FacetDecl, FacetSource};
///
/// struct Compressed;
///
/// impl FacetSource for Compressed {
///     fn facets(decl: &mut FacetDecl) {
///         decl.add(facets::zstd()).add(facets::compression_level(9));
///     }
/// }
///
/// let decl = FacetDecl::of::<Compressed>();
/// assert_eq!(decl.facets().len(), 2);
/// ```
pub trait FacetSource: 'static {
    fn facets(decl: &mut FacetDecl);
}

/// One or more facets added in a single declaration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FacetBundle(Vec<Facet>);

impl FacetBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, facet: impl Into<Facet>) -> Self {
        self.0.push(facet.into());
        self
    }

    pub fn facets(&self) -> &[Facet] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Facet> {
        self.0
    }
}

impl From<Facet> for FacetBundle {
    fn from(facet: Facet) -> Self {
        Self(vec![facet])
    }
}

impl From<ComponentFacet> for FacetBundle {
    fn from(facet: ComponentFacet) -> Self {
        Self(vec![facet.into()])
    }
}

impl From<ParameterFacet> for FacetBundle {
    fn from(facet: ParameterFacet) -> Self {
        Self(vec![facet.into()])
    }
}

impl From<Vec<Facet>> for FacetBundle {
    fn from(facets: Vec<Facet>) -> Self {
        Self(facets)
    }
}

/// Link from a contract to a base contract whose facets it inherits.
#[derive(Clone, Copy)]
pub struct BaseLink {
    pub id: TypeId,
    pub name: &'static str,
    declare: fn(&mut FacetDecl),
}

impl BaseLink {
    pub fn of<B: FacetSource>() -> Self {
        Self {
            id: TypeId::of::<B>(),
            name: any::type_name::<B>(),
            declare: B::facets,
        }
    }

    /// Run the base's declaration.
    pub fn declare(&self) -> FacetDecl {
        let mut decl = FacetDecl::new();
        (self.declare)(&mut decl);
        decl
    }
}

impl fmt::Debug for BaseLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BaseLink").field(&self.name).finish()
    }
}

/// Facets declared directly on one contract, plus links to its bases.
#[derive(Debug, Default)]
pub struct FacetDecl {
    facets: Vec<Facet>,
    bases: Vec<BaseLink>,
}

impl FacetDecl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the declaration of `S`.
    pub fn of<S: FacetSource>() -> Self {
        let mut decl = Self::new();
        S::facets(&mut decl);
        decl
    }

    pub fn add(&mut self, facets: impl Into<FacetBundle>) -> &mut Self {
        self.facets.extend(facets.into().into_vec());
        self
    }

    /// Inherit the facets of `B`. Facets declared here take precedence over
    /// inherited ones.
    pub fn extends<B: FacetSource>(&mut self) -> &mut Self {
        let link = BaseLink::of::<B>();
        if !self.bases.iter().any(|b| b.id == link.id) {
            self.bases.push(link);
        }
        self
    }

    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    pub fn bases(&self) -> &[BaseLink] {
        &self.bases
    }

    pub fn into_parts(self) -> (Vec<Facet>, Vec<BaseLink>) {
        (self.facets, self.bases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets;

    struct Base;

    impl FacetSource for Base {
        fn facets(decl: &mut FacetDecl) {
            decl.add(facets::json());
        }
    }

    #[test]
    fn bundles_flatten_into_decl() {
        let mut decl = FacetDecl::new();
        decl.add(facets::local_fs("/data")).add(facets::gzip());
        assert_eq!(decl.facets().len(), 3);
    }

    #[test]
    fn extends_is_idempotent() {
        let mut decl = FacetDecl::new();
        decl.extends::<Base>().extends::<Base>();
        assert_eq!(decl.bases().len(), 1);
        assert_eq!(decl.bases()[0].declare().facets().len(), 1);
    }
}
