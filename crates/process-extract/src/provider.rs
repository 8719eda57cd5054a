//! Live diagram geometry
//!
//! The extractor never talks to a rendering engine directly. Hosts expose
//! the editor's element registry through [`GeometryProvider`], which answers
//! two questions: where is this shape, and how is this flow routed.
//!
//! [`ElementRegistry`] is a plain in-memory implementation, used for tests
//! and for offline extraction from a [`DiagramSnapshot`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{ElementDef, ProcessModel};
use crate::types::{Bounds, ElementId, Waypoint};

/// Source of current shape positions and flow routes
pub trait GeometryProvider: Send + Sync {
    /// Current bounds of a shape, if the diagram has one for this id
    fn bounds(&self, id: &str) -> Option<Bounds>;

    /// Current route of a flow, if the diagram has one for this id
    fn waypoints(&self, id: &str) -> Option<Vec<Waypoint>>;
}

/// In-memory registry of shapes and connections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementRegistry {
    #[serde(default)]
    shapes: HashMap<ElementId, Bounds>,
    #[serde(default)]
    connections: HashMap<ElementId, Vec<Waypoint>>,
}

impl ElementRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a shape
    pub fn set_shape(&mut self, id: impl Into<String>, bounds: Bounds) {
        self.shapes.insert(id.into(), bounds);
    }

    /// Register or replace a connection route
    pub fn set_connection(&mut self, id: impl Into<String>, waypoints: Vec<Waypoint>) {
        self.connections.insert(id.into(), waypoints);
    }

    /// Builder form of [`set_shape`](Self::set_shape)
    pub fn with_shape(mut self, id: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.set_shape(id, Bounds::new(x, y, width, height));
        self
    }

    /// Builder form of [`set_connection`](Self::set_connection)
    pub fn with_connection(mut self, id: impl Into<String>, points: &[(f64, f64)]) -> Self {
        self.set_connection(id, points.iter().map(|&(x, y)| Waypoint::new(x, y)).collect());
        self
    }
}

impl GeometryProvider for ElementRegistry {
    fn bounds(&self, id: &str) -> Option<Bounds> {
        self.shapes.get(id).copied()
    }

    fn waypoints(&self, id: &str) -> Option<Vec<Waypoint>> {
        // An empty route is the same as no route.
        self.connections.get(id).filter(|w| !w.is_empty()).cloned()
    }
}

/// A process tree together with its live geometry, as saved by an editor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagramSnapshot {
    pub elements: Vec<ElementDef>,
    #[serde(default)]
    pub registry: ElementRegistry,
}

impl DiagramSnapshot {
    /// Parse a snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Split into a process model and its geometry provider
    pub fn into_parts(self) -> Result<(ProcessModel, ElementRegistry)> {
        let model = ProcessModel::from_definitions(self.elements)?;
        Ok((model, self.registry))
    }
}
