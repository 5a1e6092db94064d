//! Built-in component catalog
//!
//! The palette the builder ships with. Every entry carries its default
//! properties, an empty default style and a default grid footprint.

use serde_json::{json, Value};

use crate::descriptor::{ComponentCategory, ComponentMeta, DefaultGridSize, PropertyMap};

fn into_map(value: Value) -> PropertyMap {
    match value {
        Value::Object(map) => map,
        _ => PropertyMap::new(),
    }
}

#[allow(clippy::too_many_arguments)]
fn component(
    component_type: &str,
    category: ComponentCategory,
    name: &str,
    icon: &str,
    default_props: Value,
    (w, h): (u32, u32),
    advanced: &[&str],
    actions: &[&str],
) -> ComponentMeta {
    ComponentMeta {
        component_type: component_type.to_string(),
        category,
        name: name.to_string(),
        icon: icon.to_string(),
        default_props: into_map(default_props),
        default_style: PropertyMap::new(),
        default_grid_props: DefaultGridSize { w, h },
        advanced_property_names: advanced.iter().map(|s| s.to_string()).collect(),
        available_action_names: actions.iter().map(|s| s.to_string()).collect(),
    }
}

/// Every component the builder ships with, in palette order
pub fn builtin_components() -> Vec<ComponentMeta> {
    use ComponentCategory::{Fields, Static, Structure, Templates};

    vec![
        // Fields
        component(
            "autocomplete", Fields, "Autocomplete", "🔍",
            json!({"label": "Autocomplete", "options": [], "placeholder": "Type to search...", "multiple": false}),
            (6, 2),
            &["multiple", "minChars", "maxResults", "apiUrl"],
            &["onChange", "onSelect", "onSearch"],
        ),
        component(
            "calendar", Fields, "Calendar", "📅",
            json!({"label": "Calendar", "format": "YYYY-MM-DD", "minDate": "", "maxDate": ""}),
            (6, 4),
            &["format", "minDate", "maxDate", "disabledDates"],
            &["onChange", "onDateSelect"],
        ),
        component(
            "datepicker", Fields, "Date Picker", "📆",
            json!({"label": "Date Picker", "format": "YYYY-MM-DD", "placeholder": "Select date"}),
            (6, 2),
            &["format", "minDate", "maxDate", "showTime"],
            &["onChange", "onOpen", "onClose"],
        ),
        component(
            "checkbox", Fields, "Checkbox", "☑️",
            json!({"label": "Checkbox", "checked": false, "value": "true"}),
            (6, 1),
            &["value", "indeterminate"],
            &["onChange", "onClick"],
        ),
        component(
            "dropdown", Fields, "Dropdown", "⬇️",
            json!({
                "label": "Dropdown",
                "options": [
                    {"label": "Option 1", "value": "option1"},
                    {"label": "Option 2", "value": "option2"}
                ],
                "placeholder": "Select an option",
                "multiple": false,
                "searchable": false,
                "optionSource": "static"
            }),
            (6, 2),
            &["multiple", "searchable", "clearable", "optionSource", "apiUrl", "labelField", "valueField"],
            &["onChange", "onOpen", "onClose", "onSearch"],
        ),
        component(
            "googlemap", Fields, "Google Map", "🗺️",
            json!({"label": "Map", "zoom": 10, "center": {"lat": 0, "lng": 0}, "markers": []}),
            (12, 6),
            &["zoom", "center", "markers", "mapType", "controls"],
            &["onMapClick", "onMarkerClick", "onZoomChange"],
        ),
        component(
            "input", Fields, "Input", "📝",
            json!({"label": "Input", "placeholder": "Enter text", "type": "text", "maxLength": ""}),
            (6, 2),
            &["type", "maxLength", "minLength", "pattern", "autocomplete"],
            &["onChange", "onFocus", "onBlur", "onKeyPress"],
        ),
        component(
            "numberformat", Fields, "Number Format", "🔢",
            json!({"label": "Number", "format": "#,##0.00", "prefix": "", "suffix": "", "min": "", "max": ""}),
            (6, 2),
            &["format", "prefix", "suffix", "min", "max", "step", "decimalScale"],
            &["onChange", "onFocus", "onBlur"],
        ),
        component(
            "patternformat", Fields, "Pattern Format", "🎭",
            json!({"label": "Pattern", "format": "###-###-####", "mask": "_", "placeholder": "Enter pattern"}),
            (6, 2),
            &["format", "mask", "allowEmptyFormatting"],
            &["onChange", "onFocus", "onBlur"],
        ),
        component(
            "radiogroup", Fields, "Radio Group", "⭕",
            json!({
                "label": "Radio Group",
                "options": [
                    {"label": "Option 1", "value": "option1"},
                    {"label": "Option 2", "value": "option2"}
                ],
                "layout": "vertical"
            }),
            (6, 3),
            &["layout", "optionSource", "apiUrl"],
            &["onChange"],
        ),
        component(
            "richtexteditor", Fields, "Rich Text Editor", "📄",
            json!({"label": "Rich Text", "toolbar": "basic", "height": 200}),
            (12, 6),
            &["toolbar", "height", "plugins", "formats"],
            &["onChange", "onFocus", "onBlur"],
        ),
        component(
            "search", Fields, "Search", "🔍",
            json!({"label": "Search", "placeholder": "Search...", "debounce": 300}),
            (6, 2),
            &["debounce", "minChars", "searchUrl"],
            &["onSearch", "onChange", "onClear"],
        ),
        component(
            "signature", Fields, "Signature", "✍️",
            json!({"label": "Signature", "width": 400, "height": 200, "penColor": "#000000"}),
            (8, 4),
            &["width", "height", "penColor", "backgroundColor"],
            &["onChange", "onClear", "onEnd"],
        ),
        component(
            "tagpicker", Fields, "Tag Picker", "🏷️",
            json!({"label": "Tags", "options": [], "allowCustom": true, "maxTags": 0}),
            (6, 2),
            &["allowCustom", "maxTags", "separator", "apiUrl"],
            &["onChange", "onAdd", "onRemove"],
        ),
        component(
            "textarea", Fields, "Textarea", "📃",
            json!({"label": "Textarea", "placeholder": "Enter text", "rows": 4, "maxLength": ""}),
            (6, 3),
            &["rows", "maxLength", "minLength", "resize"],
            &["onChange", "onFocus", "onBlur"],
        ),
        component(
            "timepicker", Fields, "Time Picker", "⏰",
            json!({"label": "Time", "format": "HH:mm", "step": 15}),
            (6, 2),
            &["format", "step", "minTime", "maxTime"],
            &["onChange", "onOpen", "onClose"],
        ),
        component(
            "toggle", Fields, "Toggle", "🔄",
            json!({"label": "Toggle", "checked": false, "size": "medium"}),
            (6, 1),
            &["size", "color", "disabled"],
            &["onChange", "onClick"],
        ),
        component(
            "uploader", Fields, "Uploader", "📤",
            json!({"label": "Upload File", "accept": "*", "multiple": false, "maxSize": 10}),
            (6, 3),
            &["accept", "multiple", "maxSize", "uploadUrl", "dragDrop"],
            &["onChange", "onUpload", "onError", "onProgress"],
        ),
        // Static
        component(
            "button", Static, "Button", "🔘",
            json!({"text": "Button", "variant": "primary", "size": "medium", "disabled": false}),
            (3, 1),
            &["variant", "size", "disabled", "loading", "icon"],
            &["onClick", "onMouseEnter", "onMouseLeave"],
        ),
        component(
            "divider", Static, "Divider", "➖",
            json!({"orientation": "horizontal", "thickness": 1, "color": "#e5e7eb"}),
            (12, 1),
            &["orientation", "thickness", "color", "dashed"],
            &[],
        ),
        component(
            "errormessage", Static, "Error Message", "❌",
            json!({"message": "Error message", "type": "error", "dismissible": false}),
            (6, 1),
            &["type", "dismissible", "autoHide", "duration"],
            &["onDismiss"],
        ),
        component(
            "header", Static, "Header", "📋",
            json!({"text": "Header", "level": 1, "align": "left"}),
            (12, 2),
            &["level", "align", "underline", "color"],
            &["onClick"],
        ),
        component(
            "image", Static, "Image", "🖼️",
            json!({"src": "", "alt": "Image", "fit": "cover", "lazy": true}),
            (6, 4),
            &["fit", "lazy", "fallback", "preview"],
            &["onClick", "onLoad", "onError"],
        ),
        component(
            "label", Static, "Label", "🏷️",
            json!({"text": "Label", "size": "medium", "weight": "normal"}),
            (3, 1),
            &["size", "weight", "color", "italic"],
            &["onClick"],
        ),
        component(
            "link", Static, "Link", "🔗",
            json!({"text": "Link", "href": "#", "target": "_self", "underline": true}),
            (3, 1),
            &["target", "underline", "color", "visited"],
            &["onClick", "onMouseEnter", "onMouseLeave"],
        ),
        component(
            "menu", Static, "Menu", "📋",
            json!({
                "items": [
                    {"label": "Item 1", "value": "item1"},
                    {"label": "Item 2", "value": "item2"}
                ],
                "orientation": "vertical"
            }),
            (6, 3),
            &["orientation", "selectable", "multiple"],
            &["onSelect", "onItemClick"],
        ),
        component(
            "message", Static, "Message", "💬",
            json!({"text": "Message", "type": "info", "closable": false}),
            (6, 2),
            &["type", "closable", "showIcon", "banner"],
            &["onClose"],
        ),
        component(
            "placeholdergraph", Static, "Placeholder Graph", "📊",
            json!({"type": "bar", "animated": true}),
            (8, 4),
            &["type", "animated", "color", "showGrid"],
            &[],
        ),
        component(
            "placeholdergrid", Static, "Placeholder Grid", "🔲",
            json!({"rows": 3, "columns": 3, "animated": true}),
            (8, 4),
            &["rows", "columns", "animated", "spacing"],
            &[],
        ),
        component(
            "progressline", Static, "Progress Line", "📶",
            json!({"value": 50, "max": 100, "showText": true, "color": "#3b82f6"}),
            (6, 1),
            &["max", "showText", "color", "striped", "animated"],
            &["onChange"],
        ),
        component(
            "progresscircle", Static, "Progress Circle", "⭕",
            json!({"value": 50, "max": 100, "size": 120, "strokeWidth": 8}),
            (4, 4),
            &["max", "size", "strokeWidth", "color", "showText"],
            &["onChange"],
        ),
        component(
            "qrcode", Static, "QR Code", "📱",
            json!({"value": "QR Code", "size": 128, "level": "M"}),
            (4, 4),
            &["size", "level", "includeMargin", "fgColor", "bgColor"],
            &["onClick"],
        ),
        component(
            "staticcontent", Static, "Static Content", "📄",
            json!({"content": "Static content", "format": "text"}),
            (6, 2),
            &["format", "sanitize", "linkify"],
            &["onClick"],
        ),
        // Structure
        component(
            "breadcrumb", Structure, "Breadcrumb", "🍞",
            json!({
                "items": [
                    {"label": "Home", "href": "/"},
                    {"label": "Current Page", "href": "#"}
                ],
                "separator": "/"
            }),
            (12, 1),
            &["separator", "maxItems"],
            &["onItemClick"],
        ),
        component(
            "card", Structure, "Card", "🃏",
            json!({"title": "Card Title", "bordered": true, "hoverable": false}),
            (6, 4),
            &["bordered", "hoverable", "loading", "size"],
            &["onClick", "onMouseEnter", "onMouseLeave"],
        ),
        component(
            "container", Structure, "Container", "📦",
            json!({"fluid": false, "centered": true}),
            (12, 6),
            &["fluid", "centered", "maxWidth"],
            &[],
        ),
        component(
            "repeater", Structure, "Repeater", "🔄",
            json!({"dataSource": "static", "minItems": 1, "maxItems": 10}),
            (12, 6),
            &["dataSource", "minItems", "maxItems", "addButton", "removeButton"],
            &["onAdd", "onRemove", "onChange"],
        ),
        component(
            "tab", Structure, "Tab", "📑",
            json!({
                "tabs": [
                    {"key": "tab1", "label": "Tab 1", "content": "Content 1"},
                    {"key": "tab2", "label": "Tab 2", "content": "Content 2"}
                ],
                "position": "top"
            }),
            (12, 6),
            &["position", "type", "size", "closable"],
            &["onChange", "onTabClick", "onEdit"],
        ),
        component(
            "wizard", Structure, "Wizard", "🧙",
            json!({
                "steps": [
                    {"title": "Step 1", "description": "First step"},
                    {"title": "Step 2", "description": "Second step"}
                ],
                "current": 0
            }),
            (12, 8),
            &["direction", "size", "status", "progressDot"],
            &["onChange", "onNext", "onPrev", "onFinish"],
        ),
        component(
            "wizardstep", Structure, "Wizard Step", "👣",
            json!({"title": "Step", "description": "Step description", "status": "wait"}),
            (12, 6),
            &["status", "icon", "disabled"],
            &["onClick"],
        ),
        // Templates
        component(
            "slot", Templates, "Slot", "🎰",
            json!({"name": "default", "fallback": "No content"}),
            (6, 4),
            &["name", "fallback"],
            &[],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_type_tags_are_unique() {
        let components = builtin_components();
        let tags: HashSet<&str> = components.iter().map(|c| c.component_type.as_str()).collect();
        assert_eq!(tags.len(), components.len());
    }

    #[test]
    fn test_default_widths_fit_the_grid() {
        for meta in builtin_components() {
            let w = meta.default_grid_props.w;
            assert!((1..=12).contains(&w), "{} has width {}", meta.component_type, w);
            assert!(meta.default_grid_props.h >= 1);
        }
    }
}
