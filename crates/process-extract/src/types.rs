//! Core types for process extraction
//!
//! These types describe element classification, diagram geometry and the
//! result contract returned by the extractor.

use serde::{Deserialize, Serialize};

/// Unique identifier for an element (node or flow)
pub type ElementId = String;

/// Classification of an element by its type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementCategory {
    /// Tasks and any tag that is not otherwise recognized
    Task,
    /// Start, end, intermediate and boundary events
    Event,
    /// Exclusive, parallel, inclusive and event-based gateways
    Gateway,
    /// Subprocesses, which own nested elements
    Container,
    /// Sequence flows connecting two sibling nodes
    Flow,
    /// Cosmetic label pseudo-elements
    Label,
}

impl ElementCategory {
    /// Classify a raw type tag such as `bpmn:UserTask`
    ///
    /// Matching ignores the namespace prefix and ASCII case, since tag
    /// casing is inconsistent across stored documents.
    pub fn from_type_tag(type_tag: &str) -> Self {
        let local = local_name(type_tag).to_ascii_lowercase();
        match local.as_str() {
            "subprocess" | "adhocsubprocess" | "transaction" => Self::Container,
            "sequenceflow" => Self::Flow,
            "label" => Self::Label,
            l if l.ends_with("event") => Self::Event,
            l if l.ends_with("gateway") => Self::Gateway,
            _ => Self::Task,
        }
    }

    /// Whether this category is drawn as a shape (not a flow or label)
    pub fn is_node(&self) -> bool {
        !matches!(self, Self::Flow | Self::Label)
    }

    /// Element name used when a tag cannot be written as-is
    pub fn default_xml_name(&self) -> &'static str {
        match self {
            Self::Task | Self::Label => "bpmn:task",
            Self::Event => "bpmn:intermediateThrowEvent",
            Self::Gateway => "bpmn:exclusiveGateway",
            Self::Container => "bpmn:subProcess",
            Self::Flow => "bpmn:sequenceFlow",
        }
    }
}

/// Strip an optional `prefix:` from a type tag
pub fn local_name(type_tag: &str) -> &str {
    type_tag.rsplit(':').next().unwrap_or(type_tag)
}

/// XML element name for a type tag: `bpmn:UserTask` becomes `bpmn:userTask`
///
/// Tags whose local name is not a valid XML name fall back to the default
/// element of their category.
pub fn xml_element_name(type_tag: &str) -> String {
    let local = local_name(type_tag);
    if !is_ncname(local) {
        return ElementCategory::from_type_tag(type_tag).default_xml_name().to_string();
    }
    let mut chars = local.chars();
    match chars.next() {
        Some(first) => format!("bpmn:{}{}", first.to_ascii_lowercase(), chars.as_str()),
        None => ElementCategory::Task.default_xml_name().to_string(),
    }
}

/// ASCII subset of an XML NCName: letters, digits, `-`, `_`, `.`, not
/// starting with a digit, `-` or `.`
fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Position and size of a shape in diagram space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Midpoint of the right edge
    pub fn right_middle(&self) -> Waypoint {
        Waypoint::new(self.x + self.width, self.y + self.height / 2.0)
    }

    /// Midpoint of the left edge
    pub fn left_middle(&self) -> Waypoint {
        Waypoint::new(self.x, self.y + self.height / 2.0)
    }

    /// Translate by the given delta
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}

/// A single point on a routed flow
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
}

impl Waypoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height of a shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeSize {
    pub width: f64,
    pub height: f64,
}

/// Layout record stored on an element itself
///
/// Older documents may carry a position without a size; the collector fills
/// the size in from the configured default in that case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoredLayout {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl StoredLayout {
    /// Resolve to full bounds using a fallback size
    pub fn to_bounds(&self, default_size: ShapeSize) -> Bounds {
        Bounds {
            x: self.x,
            y: self.y,
            width: self.width.unwrap_or(default_size.width),
            height: self.height.unwrap_or(default_size.height),
        }
    }
}

/// Reference from a flow to one of its endpoint nodes
///
/// Stored documents carry either a bare id or an inline object with an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementRef {
    Id(ElementId),
    Inline { id: ElementId },
}

impl ElementRef {
    /// The referenced id, if non-empty
    pub fn id(&self) -> Option<&str> {
        let id = match self {
            Self::Id(id) => id,
            Self::Inline { id } => id,
        };
        if id.is_empty() {
            None
        } else {
            Some(id.as_str())
        }
    }
}

impl From<&str> for ElementRef {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

/// Per-call extraction options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractOptions {
    /// Pass the composed document through the auto-layout service
    #[serde(default)]
    pub use_auto_layout: bool,
    /// Overrides the configured padding for this call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
}

impl ExtractOptions {
    /// Options requesting auto-layout
    pub fn auto_layout() -> Self {
        Self {
            use_auto_layout: true,
            padding: None,
        }
    }

    /// Set the padding for this call
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = Some(padding);
        self
    }
}

/// Output of a successful extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// The standalone process document
    pub xml: String,
    /// Name of the extracted process
    pub name: String,
    /// Whether the container directly holds another container
    pub has_nested_sub_processes: bool,
    /// Number of direct children, labels excluded
    pub element_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_type_tag() {
        assert_eq!(ElementCategory::from_type_tag("bpmn:SubProcess"), ElementCategory::Container);
        assert_eq!(ElementCategory::from_type_tag("bpmn:subProcess"), ElementCategory::Container);
        assert_eq!(ElementCategory::from_type_tag("SUBPROCESS"), ElementCategory::Container);
        assert_eq!(ElementCategory::from_type_tag("bpmn:SequenceFlow"), ElementCategory::Flow);
        assert_eq!(ElementCategory::from_type_tag("bpmn:StartEvent"), ElementCategory::Event);
        assert_eq!(ElementCategory::from_type_tag("bpmn:ExclusiveGateway"), ElementCategory::Gateway);
        assert_eq!(ElementCategory::from_type_tag("label"), ElementCategory::Label);
        assert_eq!(ElementCategory::from_type_tag("bpmn:UserTask"), ElementCategory::Task);
        assert_eq!(ElementCategory::from_type_tag("bpmn:DataObjectReference"), ElementCategory::Task);
    }

    #[test]
    fn test_xml_element_name() {
        assert_eq!(xml_element_name("bpmn:UserTask"), "bpmn:userTask");
        assert_eq!(xml_element_name("SubProcess"), "bpmn:subProcess");
        assert_eq!(xml_element_name("bpmn:startEvent"), "bpmn:startEvent");
        assert_eq!(xml_element_name("bpmn:Send_Task-2.v1"), "bpmn:send_Task-2.v1");
    }

    #[test]
    fn test_xml_element_name_falls_back_for_invalid_tags() {
        assert_eq!(xml_element_name("bpmn:My Task"), "bpmn:task");
        assert_eq!(xml_element_name("bpmn:1stEvent"), "bpmn:intermediateThrowEvent");
        assert_eq!(xml_element_name("bpmn:Odd<Gateway"), "bpmn:exclusiveGateway");
        assert_eq!(xml_element_name("bpmn:Sub\"Process"), "bpmn:task");
        assert_eq!(xml_element_name("bpmn:"), "bpmn:task");
        assert_eq!(xml_element_name("ns:Übung"), "bpmn:task");
    }

    #[test]
    fn test_bounds_midpoints() {
        let b = Bounds::new(100.0, 100.0, 100.0, 80.0);
        assert_eq!(b.right_middle(), Waypoint::new(200.0, 140.0));
        assert_eq!(b.left_middle(), Waypoint::new(100.0, 140.0));
    }

    #[test]
    fn test_element_ref_forms() {
        let bare: ElementRef = serde_json::from_str("\"t1\"").unwrap();
        let inline: ElementRef = serde_json::from_str(r#"{"id":"t1"}"#).unwrap();
        assert_eq!(bare.id(), Some("t1"));
        assert_eq!(inline.id(), Some("t1"));
        assert_eq!(ElementRef::from("").id(), None);
    }

    #[test]
    fn test_stored_layout_default_size() {
        let stored = StoredLayout { x: 10.0, y: 20.0, width: None, height: Some(40.0) };
        let b = stored.to_bounds(ShapeSize { width: 100.0, height: 80.0 });
        assert_eq!(b, Bounds::new(10.0, 20.0, 100.0, 40.0));
    }
}
