//! Component metadata types
//!
//! A `ComponentMeta` is the single description of a component type: the
//! category it is listed under, the defaults a freshly dropped element is
//! seeded with, and the property/action names the panels expose.

use serde::{Deserialize, Serialize};

/// Open key→value bag used for properties, styles and rules
pub type PropertyMap = serde_json::Map<String, serde_json::Value>;

/// Palette category a component is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentCategory {
    /// Input fields that carry a value
    #[default]
    Fields,
    /// Static display content
    Static,
    /// Layout containers
    Structure,
    /// Template slots
    Templates,
}

impl ComponentCategory {
    /// All categories in palette order
    pub const ALL: [ComponentCategory; 4] = [
        ComponentCategory::Fields,
        ComponentCategory::Static,
        ComponentCategory::Structure,
        ComponentCategory::Templates,
    ];

    /// Get a human-readable label for this category
    pub fn label(&self) -> &'static str {
        match self {
            ComponentCategory::Fields => "Fields",
            ComponentCategory::Static => "Static",
            ComponentCategory::Structure => "Structure",
            ComponentCategory::Templates => "Templates",
        }
    }
}

/// Default footprint of a component on the grid, in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultGridSize {
    pub w: u32,
    pub h: u32,
}

/// Complete metadata for a component type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMeta {
    /// Unique type tag (e.g., "input")
    #[serde(rename = "type")]
    pub component_type: String,
    /// Category for palette grouping
    pub category: ComponentCategory,
    /// Human-readable name
    pub name: String,
    /// Palette icon
    pub icon: String,
    /// Properties a new element starts with
    pub default_props: PropertyMap,
    /// Style a new element starts with
    pub default_style: PropertyMap,
    /// Grid footprint a new element starts with
    pub default_grid_props: DefaultGridSize,
    /// Property names shown in the advanced section of the panel
    #[serde(default, rename = "advancedProps")]
    pub advanced_property_names: Vec<String>,
    /// Event names the actions tab offers
    #[serde(default, rename = "availableActions")]
    pub available_action_names: Vec<String>,
}

impl ComponentMeta {
    /// Check whether the given event name is one this component can raise
    pub fn supports_action(&self, action: &str) -> bool {
        self.available_action_names.iter().any(|a| a == action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_serializes_in_catalog_shape() {
        let meta = ComponentMeta {
            component_type: "toggle".to_string(),
            category: ComponentCategory::Fields,
            name: "Toggle".to_string(),
            icon: "🔄".to_string(),
            default_props: PropertyMap::new(),
            default_style: PropertyMap::new(),
            default_grid_props: DefaultGridSize { w: 6, h: 1 },
            advanced_property_names: vec!["size".to_string()],
            available_action_names: vec!["onChange".to_string()],
        };

        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["type"], "toggle");
        assert_eq!(json["category"], "fields");
        assert_eq!(json["defaultGridProps"]["w"], 6);
        assert_eq!(json["advancedProps"][0], "size");
        assert!(meta.supports_action("onChange"));
        assert!(!meta.supports_action("onClick"));
    }
}
