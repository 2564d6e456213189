//! Foundation types for stowage.
//!
//! This crate provides the vocabulary shared by every other stowage crate:
//! how components are named, which roles a component can play in the
//! decorator chain, and the literal values that flow into constructors.
//!
//! # Key Types
//!
//! - [`ComponentRef`]: the name of a constructible component (`"local-fs"`, `"json"`)
//! - [`Role`]: one position in the decorator chain
//! - [`Literal`]: a constructor argument value
//! - [`names`]: names of the built-in components and their parameters

pub mod component;
pub mod error;
pub mod literal;
pub mod names;
pub mod role;

pub use component::ComponentRef;
pub use error::TypeError;
pub use literal::Literal;
pub use role::Role;
