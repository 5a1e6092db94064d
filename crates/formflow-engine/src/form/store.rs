//! Element store
//!
//! Owns the canonical [`FormDocument`] plus the builder's form-side UI state
//! (selected element, preview toggle). Every operation validates first and
//! mutates second, so an `Err` leaves the store untouched.

use std::collections::HashSet;

use formflow_registry::{ComponentCategory, ComponentProps, ComponentRegistry, PropertyMap};

use super::grid::pixel_to_cell;
use super::types::{
    clamp_width, ElementPatch, FormDocument, FormElement, FormSettings, GridProps, InfoPatch,
    LayoutItem,
};
use crate::config::GridConfig;
use crate::constants::fallback;
use crate::error::{FormflowError, Result};
use crate::ids::IdSource;
use crate::types::{ElementId, Position};

/// Canonical store for the form being edited
#[derive(Debug, Clone)]
pub struct FormStore {
    document: FormDocument,
    selected_element: Option<ElementId>,
    preview_mode: bool,
    grid: GridConfig,
}

impl FormStore {
    /// Create a store around an existing (usually empty) document
    pub fn new(document: FormDocument, grid: GridConfig) -> Self {
        Self {
            document,
            selected_element: None,
            preview_mode: false,
            grid,
        }
    }

    pub fn document(&self) -> &FormDocument {
        &self.document
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn selected_element(&self) -> Option<&str> {
        self.selected_element.as_deref()
    }

    /// The selected element, if the selection still points at one
    pub fn selected(&self) -> Option<&FormElement> {
        self.selected_element
            .as_deref()
            .and_then(|id| self.document.find_element(id))
    }

    pub fn preview_mode(&self) -> bool {
        self.preview_mode
    }

    /// Replace the whole document
    ///
    /// Rejects documents with duplicate element ids. Widths are clamped and
    /// the selection is cleared.
    pub fn load_document(&mut self, mut document: FormDocument) -> Result<()> {
        let mut seen = HashSet::new();
        for element in &document.elements {
            if !seen.insert(element.id.as_str()) {
                return Err(FormflowError::invariant(format!(
                    "Duplicate element id '{}'",
                    element.id
                )));
            }
        }
        for element in &mut document.elements {
            element.grid_props.w = clamp_width(element.grid_props.w);
        }

        log::info!("Loaded form '{}' ({} elements)", document.id, document.elements.len());
        self.document = document;
        self.selected_element = None;
        Ok(())
    }

    /// Swap in a document from history
    ///
    /// The selection survives if its element still exists.
    pub(crate) fn restore_document(&mut self, document: FormDocument) {
        if let Some(id) = &self.selected_element {
            if !document.contains(id) {
                self.selected_element = None;
            }
        }
        self.document = document;
    }

    /// Build a new element for `component_type` at a cell position
    ///
    /// Unknown types get a placeholder shape so they still occupy the grid.
    pub fn build_element(
        registry: &dyn ComponentRegistry,
        id: ElementId,
        component_type: &str,
        x: u32,
        y: u32,
    ) -> Result<FormElement> {
        if component_type.trim().is_empty() {
            return Err(FormflowError::validation("Element type is empty"));
        }

        let element = match registry.by_type(component_type) {
            Some(meta) => FormElement {
                id,
                component_type: component_type.to_string(),
                category: meta.category,
                properties: meta.default_props.clone(),
                style: meta.default_style.clone(),
                actions: Default::default(),
                rules: PropertyMap::new(),
                conditions: Default::default(),
                validations: Vec::new(),
                children: None,
                grid_props: GridProps::new(
                    x,
                    y,
                    meta.default_grid_props.w,
                    meta.default_grid_props.h,
                ),
            },
            None => {
                log::debug!("Unknown component type '{}', using placeholder", component_type);
                FormElement {
                    id,
                    component_type: component_type.to_string(),
                    category: ComponentCategory::Fields,
                    properties: PropertyMap::new(),
                    style: PropertyMap::new(),
                    actions: Default::default(),
                    rules: PropertyMap::new(),
                    conditions: Default::default(),
                    validations: Vec::new(),
                    children: None,
                    grid_props: GridProps::new(x, y, fallback::W, fallback::H),
                }
            }
        };

        ComponentProps::from_parts(&element.component_type, &element.properties)?;
        Ok(element)
    }

    /// Add an element dropped at a canvas-relative pixel and select it
    pub fn add_element(
        &mut self,
        registry: &dyn ComponentRegistry,
        ids: &mut dyn IdSource,
        component_type: &str,
        drop: Position,
    ) -> Result<ElementId> {
        let x = pixel_to_cell(drop.x, self.grid.cell_size);
        let y = pixel_to_cell(drop.y, self.grid.cell_size);
        let element = Self::build_element(registry, ids.element_id(), component_type, x, y)?;

        if self.document.contains(&element.id) {
            return Err(FormflowError::invariant(format!(
                "Duplicate element id '{}'",
                element.id
            )));
        }

        let id = element.id.clone();
        self.document.elements.push(element);
        self.selected_element = Some(id.clone());
        Ok(id)
    }

    /// Merge a patch into an element
    ///
    /// Property changes are checked against the kind's typed record and a
    /// mismatch rejects the whole patch.
    pub fn update_element(&mut self, id: &str, patch: &ElementPatch) -> Result<()> {
        let index = self
            .document
            .index_of(id)
            .ok_or_else(|| FormflowError::unknown_element(id))?;

        let mut updated = self.document.elements[index].clone();
        patch.apply(&mut updated);
        if patch.touches_properties() {
            updated.props()?;
        }

        self.document.elements[index] = updated;
        self.refresh_layout_entry(index);
        Ok(())
    }

    /// Remove an element, clearing the selection if it pointed at it
    pub fn remove_element(&mut self, id: &str) -> Result<FormElement> {
        let index = self
            .document
            .index_of(id)
            .ok_or_else(|| FormflowError::unknown_element(id))?;

        let removed = self.document.elements.remove(index);
        self.document.layout.retain(|item| item.id != removed.id);
        if self.selected_element.as_deref() == Some(id) {
            self.selected_element = None;
        }
        Ok(removed)
    }

    /// Copy an element one cell down and right, and select the copy
    pub fn duplicate_element(&mut self, ids: &mut dyn IdSource, id: &str) -> Result<ElementId> {
        let original = self
            .document
            .find_element(id)
            .ok_or_else(|| FormflowError::unknown_element(id))?;

        let mut copy = original.clone();
        copy.id = ids.element_id();
        if self.document.contains(&copy.id) {
            return Err(FormflowError::invariant(format!(
                "Duplicate element id '{}'",
                copy.id
            )));
        }
        copy.grid_props.x = copy.grid_props.x.saturating_add(1);
        copy.grid_props.y = copy.grid_props.y.saturating_add(1);

        let new_id = copy.id.clone();
        self.document.elements.push(copy);
        self.selected_element = Some(new_id.clone());
        Ok(new_id)
    }

    /// Write a committed grid layout back into the elements
    ///
    /// Each matching element gets its `x/y/w/h` overwritten; other grid keys
    /// survive. Entries naming unknown ids are kept in the stored layout but
    /// touch nothing. Returns the ids of the elements that matched.
    pub fn update_layout(&mut self, items: Vec<LayoutItem>) -> Vec<ElementId> {
        let mut matched = Vec::new();
        let mut stored = Vec::with_capacity(items.len());

        for mut item in items {
            item.w = clamp_width(item.w);
            if let Some(index) = self.document.index_of(&item.id) {
                let grid = &mut self.document.elements[index].grid_props;
                grid.x = item.x;
                grid.y = item.y;
                grid.w = item.w;
                grid.h = item.h;
                matched.push(item.id.clone());
            }
            stored.push(item);
        }

        self.document.layout = stored;
        matched
    }

    /// Select an element, or clear the selection with `None`
    pub fn select_element(&mut self, id: Option<&str>) -> Result<()> {
        match id {
            Some(id) if !self.document.contains(id) => Err(FormflowError::unknown_element(id)),
            _ => {
                self.selected_element = id.map(str::to_string);
                Ok(())
            }
        }
    }

    /// Shallow-merge a settings patch (notifications are merged one level
    /// deeper)
    pub fn update_form_settings(&mut self, patch: &PropertyMap) -> Result<()> {
        let mut current = match serde_json::to_value(&self.document.settings)? {
            serde_json::Value::Object(map) => map,
            _ => PropertyMap::new(),
        };

        for (key, value) in patch {
            if key == "notifications" {
                if let (Some(serde_json::Value::Object(existing)), serde_json::Value::Object(incoming)) =
                    (current.get_mut(key), value)
                {
                    for (k, v) in incoming {
                        existing.insert(k.clone(), v.clone());
                    }
                    continue;
                }
            }
            current.insert(key.clone(), value.clone());
        }

        let settings: FormSettings = serde_json::from_value(serde_json::Value::Object(current))
            .map_err(|e| FormflowError::validation(format!("Invalid form settings: {}", e)))?;
        self.document.settings = settings;
        Ok(())
    }

    pub fn update_form_info(&mut self, patch: &InfoPatch) {
        if let Some(name) = &patch.name {
            self.document.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.document.description = description.clone();
        }
    }

    /// Flip preview mode and return the new value
    pub fn toggle_preview_mode(&mut self) -> bool {
        self.preview_mode = !self.preview_mode;
        self.preview_mode
    }

    /// Keep a committed layout entry in step with a direct grid edit
    fn refresh_layout_entry(&mut self, index: usize) {
        let element = &self.document.elements[index];
        if let Some(item) = self.document.layout.iter_mut().find(|i| i.id == element.id) {
            let g = &element.grid_props;
            item.x = g.x;
            item.y = g.y;
            item.w = g.w;
            item.h = g.h;
        }
    }
}
