//! Form document types
//!
//! These mirror the shape the grid surface and property panels exchange,
//! so everything serializes in camelCase.

use std::collections::BTreeMap;

use formflow_registry::{ComponentCategory, ComponentProps, PropertyMap, PropsError};
use serde::{Deserialize, Serialize};

use crate::constants::{form, grid};
use crate::types::{ElementId, FormId};

/// Placement of an element on the layout grid, in cells
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridProps {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_h: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_h: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_resizable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_draggable: Option<bool>,
    #[serde(default, rename = "static", skip_serializing_if = "Option::is_none")]
    pub is_static: Option<bool>,
}

impl GridProps {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            x,
            y,
            w: clamp_width(w),
            h,
            ..Default::default()
        }
    }
}

/// Clamp a width into the columns an element may span
pub fn clamp_width(w: u32) -> u32 {
    w.clamp(grid::MIN_W, grid::MAX_W)
}

/// Partial update of [`GridProps`]; only present keys are written
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridPropsPatch {
    pub x: Option<u32>,
    pub y: Option<u32>,
    pub w: Option<u32>,
    pub h: Option<u32>,
    pub min_w: Option<u32>,
    pub min_h: Option<u32>,
    pub max_w: Option<u32>,
    pub max_h: Option<u32>,
    pub is_resizable: Option<bool>,
    pub is_draggable: Option<bool>,
    #[serde(rename = "static")]
    pub is_static: Option<bool>,
}

impl GridPropsPatch {
    /// Merge the present keys into `target`, clamping the width
    pub fn apply(&self, target: &mut GridProps) {
        fn set<T: Copy>(slot: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *slot = v;
            }
        }
        fn set_opt<T: Copy>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        set(&mut target.x, self.x);
        set(&mut target.y, self.y);
        set(&mut target.w, self.w.map(clamp_width));
        set(&mut target.h, self.h);
        set_opt(&mut target.min_w, self.min_w);
        set_opt(&mut target.min_h, self.min_h);
        set_opt(&mut target.max_w, self.max_w);
        set_opt(&mut target.max_h, self.max_h);
        set_opt(&mut target.is_resizable, self.is_resizable);
        set_opt(&mut target.is_draggable, self.is_draggable);
        set_opt(&mut target.is_static, self.is_static);
    }
}

/// Comparison a visibility condition applies; stored, never evaluated here
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Show/hide rules of an element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conditions {
    pub show: Vec<Condition>,
    pub hide: Vec<Condition>,
}

impl Conditions {
    pub fn is_empty(&self) -> bool {
        self.show.is_empty() && self.hide.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    Required,
    Email,
    Number,
    MinLength,
    MaxLength,
    Pattern,
    Min,
    Max,
}

/// A validation rule attached to a field; stored, never evaluated here
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ValidationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub message: String,
}

/// One element placed on the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormElement {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub category: ComponentCategory,
    #[serde(default)]
    pub properties: PropertyMap,
    #[serde(default)]
    pub style: PropertyMap,
    /// Event name to handler text; never executed by the builder
    #[serde(default)]
    pub actions: BTreeMap<String, String>,
    #[serde(default)]
    pub rules: PropertyMap,
    #[serde(default, skip_serializing_if = "Conditions::is_empty")]
    pub conditions: Conditions,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validations: Vec<ValidationRule>,
    /// Nested elements. Carried as data only; no operation fills or walks it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FormElement>>,
    pub grid_props: GridProps,
}

impl FormElement {
    /// Parse the properties into the typed record of this element's kind
    pub fn props(&self) -> std::result::Result<ComponentProps, PropsError> {
        ComponentProps::from_parts(&self.component_type, &self.properties)
    }
}

/// Partial update of a [`FormElement`]
///
/// Maps are merged key by key; lists and the category are replaced when
/// present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementPatch {
    pub category: Option<ComponentCategory>,
    pub properties: Option<PropertyMap>,
    pub style: Option<PropertyMap>,
    pub actions: Option<BTreeMap<String, String>>,
    pub rules: Option<PropertyMap>,
    pub conditions: Option<Conditions>,
    pub validations: Option<Vec<ValidationRule>>,
    pub children: Option<Vec<FormElement>>,
    pub grid_props: Option<GridPropsPatch>,
}

impl ElementPatch {
    pub fn properties(properties: PropertyMap) -> Self {
        Self {
            properties: Some(properties),
            ..Default::default()
        }
    }

    pub fn style(style: PropertyMap) -> Self {
        Self {
            style: Some(style),
            ..Default::default()
        }
    }

    pub fn grid(grid_props: GridPropsPatch) -> Self {
        Self {
            grid_props: Some(grid_props),
            ..Default::default()
        }
    }

    pub(crate) fn touches_properties(&self) -> bool {
        self.properties.is_some()
    }

    pub(crate) fn apply(&self, element: &mut FormElement) {
        if let Some(category) = self.category {
            element.category = category;
        }
        if let Some(properties) = &self.properties {
            merge_map(&mut element.properties, properties);
        }
        if let Some(style) = &self.style {
            merge_map(&mut element.style, style);
        }
        if let Some(actions) = &self.actions {
            for (event, handler) in actions {
                element.actions.insert(event.clone(), handler.clone());
            }
        }
        if let Some(rules) = &self.rules {
            merge_map(&mut element.rules, rules);
        }
        if let Some(conditions) = &self.conditions {
            element.conditions = conditions.clone();
        }
        if let Some(validations) = &self.validations {
            element.validations = validations.clone();
        }
        if let Some(children) = &self.children {
            element.children = Some(children.clone());
        }
        if let Some(grid_props) = &self.grid_props {
            grid_props.apply(&mut element.grid_props);
        }
    }
}

pub(crate) fn merge_map(target: &mut PropertyMap, patch: &PropertyMap) {
    for (key, value) in patch {
        target.insert(key.clone(), value.clone());
    }
}

/// One entry of the layout array the grid surface reports
///
/// The grid library names the id `i`; both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutItem {
    #[serde(alias = "i")]
    pub id: ElementId,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl LayoutItem {
    pub fn new(id: impl Into<String>, x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            w,
            h,
        }
    }

    /// Whether this entry agrees with an element's placement
    pub fn matches(&self, grid_props: &GridProps) -> bool {
        self.x == grid_props.x
            && self.y == grid_props.y
            && self.w == grid_props.w
            && self.h == grid_props.h
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubmitMethod {
    #[default]
    Post,
    Get,
    Put,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notifications {
    pub success: String,
    pub error: String,
}

impl Default for Notifications {
    fn default() -> Self {
        Self {
            success: form::SUCCESS_MESSAGE.to_string(),
            error: form::ERROR_MESSAGE.to_string(),
        }
    }
}

/// Submission and behaviour settings of a form
///
/// Keys the builder does not know are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormSettings {
    pub theme: Theme,
    pub submit_url: String,
    pub method: SubmitMethod,
    pub show_progress_bar: bool,
    pub enable_validation: bool,
    pub allow_save: bool,
    pub auto_save: bool,
    pub confirm_before_submit: bool,
    pub redirect_after_submit: String,
    #[serde(rename = "customCSS")]
    pub custom_css: String,
    pub notifications: Notifications,
    #[serde(flatten)]
    pub extra: PropertyMap,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            submit_url: String::new(),
            method: SubmitMethod::Post,
            show_progress_bar: false,
            enable_validation: true,
            allow_save: true,
            auto_save: false,
            confirm_before_submit: false,
            redirect_after_submit: String::new(),
            custom_css: String::new(),
            notifications: Notifications::default(),
            extra: PropertyMap::new(),
        }
    }
}

/// Name/description update; absent fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfoPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// The canonical form being edited
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDocument {
    pub id: FormId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub elements: Vec<FormElement>,
    #[serde(default)]
    pub settings: FormSettings,
    /// Last layout committed by the grid surface
    #[serde(default)]
    pub layout: Vec<LayoutItem>,
}

impl FormDocument {
    /// Create an empty document
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: form::DEFAULT_NAME.to_string(),
            description: String::new(),
            elements: Vec::new(),
            settings: FormSettings::default(),
            layout: Vec::new(),
        }
    }

    pub fn find_element(&self, id: &str) -> Option<&FormElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find_element(id).is_some()
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }
}
