//! Extractor configuration
//!
//! Policy values (padding, fallback sizes, stub routes) are defaults rather
//! than invariants, so hosts may tune them. The configuration deserializes
//! from JSON with every field optional.

use serde::{Deserialize, Serialize};

use crate::constants::defaults;
use crate::error::Result;
use crate::types::{ShapeSize, Waypoint};

/// How live positions relate across nested containers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSpace {
    /// A container's children are positioned relative to the container
    #[default]
    ContainerRelative,
    /// All shapes share one global coordinate space
    Absolute,
}

/// Configuration for [`crate::extractor::SubprocessExtractor`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractorConfig {
    /// Minimum x/y of the extracted diagram after normalization
    pub padding: f64,
    /// Size used when a stored layout record carries only a position
    pub default_shape_size: ShapeSize,
    /// Route drawn when a flow's endpoints have no geometry
    pub stub_waypoints: [Waypoint; 2],
    /// Process name used when the container has none
    pub placeholder_name: String,
    /// Coordinate convention of the geometry provider
    pub coordinate_space: CoordinateSpace,
    /// Time allowed for the auto-layout service, in milliseconds
    pub layout_timeout_ms: u64,
    /// Indentation unit for emitted XML
    pub indent: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        let [(ax, ay), (bx, by)] = defaults::STUB_WAYPOINTS;
        Self {
            padding: defaults::PADDING,
            default_shape_size: ShapeSize {
                width: defaults::SHAPE_WIDTH,
                height: defaults::SHAPE_HEIGHT,
            },
            stub_waypoints: [Waypoint::new(ax, ay), Waypoint::new(bx, by)],
            placeholder_name: defaults::PLACEHOLDER_NAME.to_string(),
            coordinate_space: CoordinateSpace::default(),
            layout_timeout_ms: defaults::LAYOUT_TIMEOUT_MS,
            indent: defaults::INDENT.to_string(),
        }
    }
}

impl ExtractorConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_coordinate_space(mut self, space: CoordinateSpace) -> Self {
        self.coordinate_space = space;
        self
    }

    pub fn with_layout_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.layout_timeout_ms = timeout_ms;
        self
    }

    /// Padding for a call, with the per-call override applied
    ///
    /// Negative or non-finite values are clamped to zero.
    pub fn effective_padding(&self, requested: Option<f64>) -> f64 {
        let padding = requested.unwrap_or(self.padding);
        if padding.is_finite() && padding > 0.0 {
            padding
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractorConfig::default();
        assert_eq!(config.padding, 100.0);
        assert_eq!(config.default_shape_size.width, 100.0);
        assert_eq!(config.default_shape_size.height, 80.0);
        assert_eq!(config.stub_waypoints[1], Waypoint::new(100.0, 0.0));
        assert_eq!(config.coordinate_space, CoordinateSpace::ContainerRelative);
    }

    #[test]
    fn test_partial_json() {
        let config = ExtractorConfig::from_json(r#"{"padding": 40, "coordinateSpace": "absolute"}"#).unwrap();
        assert_eq!(config.padding, 40.0);
        assert_eq!(config.coordinate_space, CoordinateSpace::Absolute);
        assert_eq!(config.placeholder_name, "Extracted Subprocess");
    }

    #[test]
    fn test_effective_padding() {
        let config = ExtractorConfig::default();
        assert_eq!(config.effective_padding(None), 100.0);
        assert_eq!(config.effective_padding(Some(20.0)), 20.0);
        assert_eq!(config.effective_padding(Some(-5.0)), 0.0);
        assert_eq!(config.effective_padding(Some(f64::NAN)), 0.0);
    }
}
