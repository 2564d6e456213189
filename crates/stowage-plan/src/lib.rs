//! Construction plans for stowage.
//!
//! A [`ConstructionPlan`] records what to build without building it. The
//! [`StoreBuilder`] produces store plans and uses marker types so that only
//! legal configuration sequences compile.

pub mod plan;
pub mod stages;

pub use plan::{ConstructionPlan, PlanArg};
pub use stages::{
    BlobFamily, Buildable, Family, NeedsCompression, NeedsFileExtension, NeedsIntegration,
    NeedsSerialization, StoreBuilder, TableFamily,
};
