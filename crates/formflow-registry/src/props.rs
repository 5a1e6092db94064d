//! Typed property records per component kind
//!
//! Elements store their properties as an open map so renderers may carry
//! extra keys, but every known kind also has a strongly-typed record here.
//! [`ComponentProps::from_parts`] parses an element's map into its record
//! and fails when a known key has the wrong shape (e.g. `rows: "four"`).
//! Missing keys take the record's default; unknown keys are ignored.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::descriptor::PropertyMap;
use crate::error::PropsError;

/// Numeric limit that the catalog seeds as an empty string
///
/// `maxLength: ""` means "no limit"; once set it is a number. Both shapes
/// are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

impl Default for LooseNumber {
    fn default() -> Self {
        LooseNumber::Text(String::new())
    }
}

impl LooseNumber {
    /// The numeric value, if one is set
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LooseNumber::Number(n) => Some(*n),
            LooseNumber::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// One entry of an option list (dropdown, radio group, menu, tags)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoiceOption {
    pub label: String,
    pub value: serde_json::Value,
    pub disabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreadcrumbItem {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabItem {
    pub key: String,
    pub label: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepItem {
    pub title: String,
    pub description: String,
}

// =========================================================================
// Fields
// =========================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutocompleteProps {
    pub label: String,
    pub options: Vec<ChoiceOption>,
    pub placeholder: String,
    pub multiple: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalendarProps {
    pub label: String,
    pub format: String,
    pub min_date: String,
    pub max_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DatePickerProps {
    pub label: String,
    pub format: String,
    pub placeholder: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckboxProps {
    pub label: String,
    pub checked: bool,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DropdownProps {
    pub label: String,
    pub options: Vec<ChoiceOption>,
    pub placeholder: String,
    pub multiple: bool,
    pub searchable: bool,
    pub option_source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GoogleMapProps {
    pub label: String,
    pub zoom: f64,
    pub center: LatLng,
    pub markers: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputProps {
    pub label: String,
    pub placeholder: String,
    #[serde(rename = "type")]
    pub input_type: String,
    pub max_length: LooseNumber,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NumberFormatProps {
    pub label: String,
    pub format: String,
    pub prefix: String,
    pub suffix: String,
    pub min: LooseNumber,
    pub max: LooseNumber,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PatternFormatProps {
    pub label: String,
    pub format: String,
    pub mask: String,
    pub placeholder: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadioGroupProps {
    pub label: String,
    pub options: Vec<ChoiceOption>,
    pub layout: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RichTextEditorProps {
    pub label: String,
    pub toolbar: String,
    pub height: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchProps {
    pub label: String,
    pub placeholder: String,
    pub debounce: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignatureProps {
    pub label: String,
    pub width: f64,
    pub height: f64,
    pub pen_color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TagPickerProps {
    pub label: String,
    pub options: Vec<ChoiceOption>,
    pub allow_custom: bool,
    pub max_tags: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextareaProps {
    pub label: String,
    pub placeholder: String,
    pub rows: u32,
    pub max_length: LooseNumber,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimePickerProps {
    pub label: String,
    pub format: String,
    pub step: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToggleProps {
    pub label: String,
    pub checked: bool,
    pub size: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UploaderProps {
    pub label: String,
    pub accept: String,
    pub multiple: bool,
    pub max_size: f64,
}

// =========================================================================
// Static
// =========================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ButtonProps {
    pub text: String,
    pub variant: String,
    pub size: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DividerProps {
    pub orientation: String,
    pub thickness: f64,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ErrorMessageProps {
    pub message: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub dismissible: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderProps {
    pub text: String,
    pub level: u8,
    pub align: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageProps {
    pub src: String,
    pub alt: String,
    pub fit: String,
    pub lazy: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelProps {
    pub text: String,
    pub size: String,
    pub weight: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinkProps {
    pub text: String,
    pub href: String,
    pub target: String,
    pub underline: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MenuProps {
    pub items: Vec<ChoiceOption>,
    pub orientation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MessageProps {
    pub text: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub closable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaceholderGraphProps {
    #[serde(rename = "type")]
    pub graph_type: String,
    pub animated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaceholderGridProps {
    pub rows: u32,
    pub columns: u32,
    pub animated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressLineProps {
    pub value: f64,
    pub max: f64,
    pub show_text: bool,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressCircleProps {
    pub value: f64,
    pub max: f64,
    pub size: f64,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QrCodeProps {
    pub value: String,
    pub size: f64,
    pub level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StaticContentProps {
    pub content: String,
    pub format: String,
}

// =========================================================================
// Structure and templates
// =========================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BreadcrumbProps {
    pub items: Vec<BreadcrumbItem>,
    pub separator: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CardProps {
    pub title: String,
    pub bordered: bool,
    pub hoverable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContainerProps {
    pub fluid: bool,
    pub centered: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RepeaterProps {
    pub data_source: String,
    pub min_items: u32,
    pub max_items: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TabProps {
    pub tabs: Vec<TabItem>,
    pub position: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WizardProps {
    pub steps: Vec<StepItem>,
    pub current: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WizardStepProps {
    pub title: String,
    pub description: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SlotProps {
    pub name: String,
    pub fallback: String,
}

/// Properties of an element, typed by its component kind
///
/// Unknown kinds keep their raw map so they can still be rendered by the
/// generic fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentProps {
    Autocomplete(AutocompleteProps),
    Calendar(CalendarProps),
    DatePicker(DatePickerProps),
    Checkbox(CheckboxProps),
    Dropdown(DropdownProps),
    GoogleMap(GoogleMapProps),
    Input(InputProps),
    NumberFormat(NumberFormatProps),
    PatternFormat(PatternFormatProps),
    RadioGroup(RadioGroupProps),
    RichTextEditor(RichTextEditorProps),
    Search(SearchProps),
    Signature(SignatureProps),
    TagPicker(TagPickerProps),
    Textarea(TextareaProps),
    TimePicker(TimePickerProps),
    Toggle(ToggleProps),
    Uploader(UploaderProps),
    Button(ButtonProps),
    Divider(DividerProps),
    ErrorMessage(ErrorMessageProps),
    Header(HeaderProps),
    Image(ImageProps),
    Label(LabelProps),
    Link(LinkProps),
    Menu(MenuProps),
    Message(MessageProps),
    PlaceholderGraph(PlaceholderGraphProps),
    PlaceholderGrid(PlaceholderGridProps),
    ProgressLine(ProgressLineProps),
    ProgressCircle(ProgressCircleProps),
    QrCode(QrCodeProps),
    StaticContent(StaticContentProps),
    Breadcrumb(BreadcrumbProps),
    Card(CardProps),
    Container(ContainerProps),
    Repeater(RepeaterProps),
    Tab(TabProps),
    Wizard(WizardProps),
    WizardStep(WizardStepProps),
    Slot(SlotProps),
    Unknown {
        component_type: String,
        properties: PropertyMap,
    },
}

fn parse<T: DeserializeOwned>(component_type: &str, properties: &PropertyMap) -> Result<T, PropsError> {
    serde_json::from_value(serde_json::Value::Object(properties.clone()))
        .map_err(|e| PropsError::new(component_type, e))
}

impl ComponentProps {
    /// Parse an element's property map into the record of its kind
    pub fn from_parts(component_type: &str, properties: &PropertyMap) -> Result<Self, PropsError> {
        let t = component_type;
        let p = properties;
        let props = match t {
            "autocomplete" => Self::Autocomplete(parse(t, p)?),
            "calendar" => Self::Calendar(parse(t, p)?),
            "datepicker" => Self::DatePicker(parse(t, p)?),
            "checkbox" => Self::Checkbox(parse(t, p)?),
            "dropdown" => Self::Dropdown(parse(t, p)?),
            "googlemap" => Self::GoogleMap(parse(t, p)?),
            "input" => Self::Input(parse(t, p)?),
            "numberformat" => Self::NumberFormat(parse(t, p)?),
            "patternformat" => Self::PatternFormat(parse(t, p)?),
            "radiogroup" => Self::RadioGroup(parse(t, p)?),
            "richtexteditor" => Self::RichTextEditor(parse(t, p)?),
            "search" => Self::Search(parse(t, p)?),
            "signature" => Self::Signature(parse(t, p)?),
            "tagpicker" => Self::TagPicker(parse(t, p)?),
            "textarea" => Self::Textarea(parse(t, p)?),
            "timepicker" => Self::TimePicker(parse(t, p)?),
            "toggle" => Self::Toggle(parse(t, p)?),
            "uploader" => Self::Uploader(parse(t, p)?),
            "button" => Self::Button(parse(t, p)?),
            "divider" => Self::Divider(parse(t, p)?),
            "errormessage" => Self::ErrorMessage(parse(t, p)?),
            "header" => Self::Header(parse(t, p)?),
            "image" => Self::Image(parse(t, p)?),
            "label" => Self::Label(parse(t, p)?),
            "link" => Self::Link(parse(t, p)?),
            "menu" => Self::Menu(parse(t, p)?),
            "message" => Self::Message(parse(t, p)?),
            "placeholdergraph" => Self::PlaceholderGraph(parse(t, p)?),
            "placeholdergrid" => Self::PlaceholderGrid(parse(t, p)?),
            "progressline" => Self::ProgressLine(parse(t, p)?),
            "progresscircle" => Self::ProgressCircle(parse(t, p)?),
            "qrcode" => Self::QrCode(parse(t, p)?),
            "staticcontent" => Self::StaticContent(parse(t, p)?),
            "breadcrumb" => Self::Breadcrumb(parse(t, p)?),
            "card" => Self::Card(parse(t, p)?),
            "container" => Self::Container(parse(t, p)?),
            "repeater" => Self::Repeater(parse(t, p)?),
            "tab" => Self::Tab(parse(t, p)?),
            "wizard" => Self::Wizard(parse(t, p)?),
            "wizardstep" => Self::WizardStep(parse(t, p)?),
            "slot" => Self::Slot(parse(t, p)?),
            _ => Self::Unknown {
                component_type: t.to_string(),
                properties: p.clone(),
            },
        };
        Ok(props)
    }

    /// Whether the kind is one the catalog knows
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown { .. })
    }

    /// The caption a tree or panel shows for this element
    ///
    /// Fields use their `label`, static content its `text`/`message`,
    /// containers their `title`. Kinds with no caption return `None`.
    pub fn caption(&self) -> Option<&str> {
        let caption = match self {
            Self::Autocomplete(p) => &p.label,
            Self::Calendar(p) => &p.label,
            Self::DatePicker(p) => &p.label,
            Self::Checkbox(p) => &p.label,
            Self::Dropdown(p) => &p.label,
            Self::GoogleMap(p) => &p.label,
            Self::Input(p) => &p.label,
            Self::NumberFormat(p) => &p.label,
            Self::PatternFormat(p) => &p.label,
            Self::RadioGroup(p) => &p.label,
            Self::RichTextEditor(p) => &p.label,
            Self::Search(p) => &p.label,
            Self::Signature(p) => &p.label,
            Self::TagPicker(p) => &p.label,
            Self::Textarea(p) => &p.label,
            Self::TimePicker(p) => &p.label,
            Self::Toggle(p) => &p.label,
            Self::Uploader(p) => &p.label,
            Self::Button(p) => &p.text,
            Self::ErrorMessage(p) => &p.message,
            Self::Header(p) => &p.text,
            Self::Label(p) => &p.text,
            Self::Link(p) => &p.text,
            Self::Message(p) => &p.text,
            Self::Card(p) => &p.title,
            Self::WizardStep(p) => &p.title,
            Self::Slot(p) => &p.name,
            Self::Unknown { properties, .. } => {
                return properties.get("label").and_then(|v| v.as_str());
            }
            _ => return None,
        };
        if caption.is_empty() {
            None
        } else {
            Some(caption.as_str())
        }
    }
}
