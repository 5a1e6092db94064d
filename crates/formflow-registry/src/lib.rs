//! Formflow Registry - component catalog lookups for the form builder
//!
//! The registry is the read-only catalog that maps a component type tag
//! (e.g. `"input"`, `"dropdown"`) to its default shape and metadata. The
//! element store consumes it through the [`ComponentRegistry`] trait and must
//! tolerate a `None` answer for unknown tags.
//!
//! This crate provides:
//!
//! - `ComponentMeta`: defaults and metadata for one component type
//! - `ComponentRegistry`: the `by_type` lookup contract
//! - `BuiltinRegistry`: the shipped catalog of field, static, structure and
//!   template components
//! - `ComponentProps`: a tagged union with one typed property record per
//!   catalog kind, validated at construction
//!
//! # Example
//!
//! ```ignore
//! use formflow_registry::{BuiltinRegistry, ComponentRegistry};
//!
//! let registry = BuiltinRegistry::with_builtins();
//! let input = registry.by_type("input").unwrap();
//! assert_eq!(input.default_grid_props.w, 6);
//! ```

pub mod catalog;
pub mod descriptor;
pub mod error;
pub mod props;
pub mod registry;

pub use descriptor::{ComponentCategory, ComponentMeta, DefaultGridSize, PropertyMap};
pub use error::PropsError;
pub use props::ComponentProps;
pub use registry::{BuiltinRegistry, ComponentRegistry};
