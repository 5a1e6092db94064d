//! Form side of the builder: element store and grid layout engine

pub mod grid;
mod store;
mod types;

pub use grid::{cell_to_pixel, drifted_elements, layout_in_sync, layout_items, overflows, pixel_to_cell};
pub use store::FormStore;
pub use types::{
    clamp_width, Condition, ConditionOperator, Conditions, ElementPatch, FormDocument,
    FormElement, FormSettings, GridProps, GridPropsPatch, InfoPatch, LayoutItem, Notifications,
    SubmitMethod, Theme, ValidationKind, ValidationRule,
};
