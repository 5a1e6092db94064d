//! Component registry for type-tag resolution
//!
//! The element store never reads the catalog directly. It goes through the
//! [`ComponentRegistry`] trait so hosts can supply their own catalog (or
//! extend the built-in one) without the store caring where metadata lives.
//!
//! # Usage
//!
//! ```ignore
//! use formflow_registry::{BuiltinRegistry, ComponentRegistry};
//!
//! let mut registry = BuiltinRegistry::with_builtins();
//! registry.register(my_plugin_component());
//!
//! match registry.by_type("signature") {
//!     Some(meta) => println!("{} is {}x{}", meta.name, meta.default_grid_props.w, meta.default_grid_props.h),
//!     None => println!("unknown component, rendering placeholder"),
//! }
//! ```

use std::collections::HashMap;

use crate::catalog::builtin_components;
use crate::descriptor::{ComponentCategory, ComponentMeta};

/// Read-only lookup from type tag to component metadata
///
/// Implementations must be total: an unknown tag yields `None`, never a
/// panic. Callers fall back to a placeholder shape in that case.
pub trait ComponentRegistry: Send + Sync {
    /// Look up metadata for a type tag
    fn by_type(&self, component_type: &str) -> Option<&ComponentMeta>;

    /// All registered components, in registration order
    fn all(&self) -> Vec<&ComponentMeta>;

    /// Components listed under one palette category
    fn by_category(&self, category: ComponentCategory) -> Vec<&ComponentMeta> {
        self.all()
            .into_iter()
            .filter(|meta| meta.category == category)
            .collect()
    }

    /// Check if a type tag is registered
    fn has_type(&self, component_type: &str) -> bool {
        self.by_type(component_type).is_some()
    }
}

/// In-memory registry seeded from the built-in catalog
///
/// Registration order is preserved so palette listings are stable.
#[derive(Debug, Clone, Default)]
pub struct BuiltinRegistry {
    entries: HashMap<String, ComponentMeta>,
    order: Vec<String>,
}

impl BuiltinRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in component
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for meta in builtin_components() {
            registry.register(meta);
        }
        registry
    }

    /// Register a component, replacing any previous entry with the same tag
    pub fn register(&mut self, meta: ComponentMeta) {
        if !self.entries.contains_key(&meta.component_type) {
            self.order.push(meta.component_type.clone());
        }
        self.entries.insert(meta.component_type.clone(), meta);
    }

    /// Merge another registry into this one
    ///
    /// Entries from `other` override entries in `self` if they share a tag.
    pub fn merge(&mut self, other: BuiltinRegistry) {
        let BuiltinRegistry { mut entries, order } = other;
        for tag in order {
            if let Some(meta) = entries.remove(&tag) {
                self.register(meta);
            }
        }
    }

    /// List all registered type tags
    pub fn component_types(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }

    /// Number of registered components
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl ComponentRegistry for BuiltinRegistry {
    fn by_type(&self, component_type: &str) -> Option<&ComponentMeta> {
        self.entries.get(component_type)
    }

    fn all(&self) -> Vec<&ComponentMeta> {
        self.order
            .iter()
            .filter_map(|tag| self.entries.get(tag))
            .collect()
    }
}
