//! Engine-wide constants
//!
//! Single source of truth for the policy defaults used by extraction.
//! Every value here can be overridden through [`crate::config::ExtractorConfig`].

/// Default values for extraction
pub mod defaults {
    /// Distance between the origin and the extracted diagram's top-left corner
    pub const PADDING: f64 = 100.0;
    /// Width used when a stored layout record has no size
    pub const SHAPE_WIDTH: f64 = 100.0;
    /// Height used when a stored layout record has no size
    pub const SHAPE_HEIGHT: f64 = 80.0;
    /// Route drawn for a flow whose endpoints have no geometry
    pub const STUB_WAYPOINTS: [(f64, f64); 2] = [(0.0, 0.0), (100.0, 0.0)];
    /// Process name used when the container has none
    pub const PLACEHOLDER_NAME: &str = "Extracted Subprocess";
    /// Time allowed for the auto-layout service
    pub const LAYOUT_TIMEOUT_MS: u64 = 30_000;
    /// Indentation unit for emitted XML
    pub const INDENT: &str = "  ";
}

/// Namespaces used by the emitted document
pub mod namespaces {
    pub const BPMN_MODEL: &str = "http://www.omg.org/spec/BPMN/20100524/MODEL";
    pub const BPMN_DI: &str = "http://www.omg.org/spec/BPMN/20100524/DI";
    pub const DC: &str = "http://www.omg.org/spec/DD/20100524/DC";
    pub const DI: &str = "http://www.omg.org/spec/DD/20100524/DI";
    pub const TARGET: &str = "http://bpmn.io/schema/bpmn";
}
