//! Facet metadata for stowage.
//!
//! A facet is a declarative piece of store configuration attached to a
//! contract: either "use this component for this role" ([`ComponentFacet`])
//! or "set this constructor argument on these components"
//! ([`ParameterFacet`]). Contracts declare facets through [`FacetSource`];
//! the [`FacetRegistry`] records each declaration once and answers scans.
//!
//! Parameter facets may read their value from a [`ConfigProvider`].

pub mod config;
pub mod decl;
pub mod error;
pub mod facet;
pub mod facets;
pub mod registry;
pub mod scanner;

pub use config::{ConfigProvider, EngineConfig, MapConfig};
pub use decl::{BaseLink, FacetBundle, FacetDecl, FacetSource};
pub use error::{FacetError, FacetResult};
pub use facet::{ComponentFacet, Facet, ImpliedTarget, ParameterFacet, ValueSource};
pub use registry::FacetRegistry;
pub use scanner::{component_bindings, parameter_bindings, ScannedFacet};
