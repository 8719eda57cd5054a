//! Geometry collection and coordinate normalization
//!
//! The collector walks a container's subtree and records where each node is
//! drawn and how each flow is routed, preferring the live diagram and
//! falling back to the layout stored on the element. Geometry is never
//! guessed: a node with neither source is left out of the maps.
//!
//! The normalizer then shifts everything so the extracted diagram's
//! top-left corner sits at a fixed padding from the origin, however deep
//! the subprocess was nested in its parent diagram.

use std::collections::HashMap;

use crate::config::CoordinateSpace;
use crate::events::{emit, EventSink, ExtractionEvent};
use crate::model::{Element, ElementIdx, ProcessModel};
use crate::provider::GeometryProvider;
use crate::types::{Bounds, ElementId, ShapeSize, Waypoint};

/// Collected shape bounds and flow routes, keyed by element id
#[derive(Debug, Clone, Default)]
pub struct GeometryMaps {
    pub bounds: HashMap<ElementId, Bounds>,
    pub waypoints: HashMap<ElementId, Vec<Waypoint>>,
}

impl GeometryMaps {
    /// Smallest x and y over all bounds and waypoints
    pub fn min_corner(&self) -> Option<(f64, f64)> {
        let points = self
            .bounds
            .values()
            .map(|b| (b.x, b.y))
            .chain(self.waypoints.values().flatten().map(|w| (w.x, w.y)));

        points.fold(None, |acc, (x, y)| match acc {
            None => Some((x, y)),
            Some((mx, my)) => Some((mx.min(x), my.min(y))),
        })
    }

    /// Shift every bounds and waypoint by the given delta
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for bounds in self.bounds.values_mut() {
            bounds.translate(dx, dy);
        }
        for point in self.waypoints.values_mut().flatten() {
            point.x += dx;
            point.y += dy;
        }
    }
}

/// Walks a container subtree and records its geometry
pub struct GeometryCollector<'a> {
    model: &'a ProcessModel,
    provider: &'a dyn GeometryProvider,
    default_size: ShapeSize,
    space: CoordinateSpace,
}

impl<'a> GeometryCollector<'a> {
    pub fn new(
        model: &'a ProcessModel,
        provider: &'a dyn GeometryProvider,
        default_size: ShapeSize,
        space: CoordinateSpace,
    ) -> Self {
        Self {
            model,
            provider,
            default_size,
            space,
        }
    }

    /// Raw position of a node: live shape first, then stored layout
    pub fn raw_bounds(&self, element: &Element) -> Option<Bounds> {
        self.provider
            .bounds(&element.id)
            .or_else(|| element.layout.map(|l| l.to_bounds(self.default_size)))
    }

    /// Collect geometry for every descendant of `container`
    ///
    /// Coordinates are recorded relative to `origin`, which is normally the
    /// container's own position.
    pub fn collect(&self, container: ElementIdx, origin: Waypoint, event_sink: &dyn EventSink) -> GeometryMaps {
        let mut maps = GeometryMaps::default();
        self.visit(container, origin, &mut maps, event_sink);
        maps
    }

    fn visit(&self, container: ElementIdx, offset: Waypoint, maps: &mut GeometryMaps, event_sink: &dyn EventSink) {
        for &child_idx in &self.model.get(container).children {
            let child = self.model.get(child_idx);

            if child.is_label() {
                continue;
            }

            if child.is_flow() {
                if let Some(points) = self.provider.waypoints(&child.id) {
                    let shifted = points
                        .into_iter()
                        .map(|p| Waypoint::new(p.x - offset.x, p.y - offset.y))
                        .collect();
                    maps.waypoints.insert(child.id.clone(), shifted);
                }
                continue;
            }

            let raw = self.raw_bounds(child);
            match raw {
                Some(b) => {
                    maps.bounds.insert(
                        child.id.clone(),
                        Bounds::new(b.x - offset.x, b.y - offset.y, b.width, b.height),
                    );
                }
                None => {
                    log::warn!("No geometry for '{}'; it will not be drawn", child.id);
                    emit(
                        event_sink,
                        ExtractionEvent::ShapeOmitted {
                            element_id: child.id.clone(),
                        },
                    );
                }
            }

            if child.is_container() && !child.children.is_empty() {
                let nested_offset = match (self.space, raw) {
                    (CoordinateSpace::ContainerRelative, Some(b)) => Waypoint::new(offset.x - b.x, offset.y - b.y),
                    _ => offset,
                };
                self.visit(child_idx, nested_offset, maps, event_sink);
            }
        }
    }
}

/// Translate all geometry so its minimum x and y both equal `padding`
///
/// Leaves the maps untouched when they hold no coordinates.
pub fn normalize(maps: &mut GeometryMaps, padding: f64) {
    let Some((min_x, min_y)) = maps.min_corner() else {
        return;
    };
    maps.translate(padding - min_x, padding - min_y);
}
