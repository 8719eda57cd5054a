//! Diagram interchange emitter
//!
//! Writes one shape record per node that has bounds and one edge record per
//! resolved flow. Nodes without bounds stay in the process body but are not
//! drawn. A flow always gets an edge record, since the process body still
//! references it: collected waypoints first, then a route synthesized from
//! its endpoints' bounds, then the configured stub route.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use super::XmlBuffer;
use crate::events::{emit, EventSink, ExtractionEvent};
use crate::geometry::GeometryMaps;
use crate::model::{Element, ElementIdx, ProcessModel};
use crate::resolve::{FlowIndex, FlowRefs};
use crate::types::{ElementId, Waypoint};

const SHAPE: &str = "bpmndi:BPMNShape";
const EDGE: &str = "bpmndi:BPMNEdge";
const DC_BOUNDS: &str = "dc:Bounds";
const DI_WAYPOINT: &str = "di:waypoint";

/// Serializes collected geometry into shape and edge records
pub struct DiagramEmitter<'a> {
    model: &'a ProcessModel,
    flows: &'a FlowIndex,
    geometry: &'a GeometryMaps,
    stub: [Waypoint; 2],
    indent_unit: &'a str,
    di_ids: HashMap<ElementId, String>,
}

impl<'a> DiagramEmitter<'a> {
    pub fn new(
        model: &'a ProcessModel,
        flows: &'a FlowIndex,
        geometry: &'a GeometryMaps,
        stub: [Waypoint; 2],
        indent_unit: &'a str,
    ) -> Self {
        Self {
            model,
            flows,
            geometry,
            stub,
            indent_unit,
            di_ids: assign_di_ids(model),
        }
    }

    /// Emit shape records for every drawable node under `container`
    pub fn emit_shapes(&self, container: ElementIdx, depth: usize) -> String {
        let mut buf = XmlBuffer::new(self.indent_unit);
        self.shapes_into(&mut buf, container, depth);
        buf.finish()
    }

    /// Emit edge records for every resolved flow under `container`
    pub fn emit_edges(&self, container: ElementIdx, depth: usize, event_sink: &dyn EventSink) -> String {
        let mut buf = XmlBuffer::new(self.indent_unit);
        self.edges_into(&mut buf, container, depth, event_sink);
        buf.finish()
    }

    fn shapes_into(&self, buf: &mut XmlBuffer<'_>, container: ElementIdx, depth: usize) {
        for &child_idx in &self.model.get(container).children {
            let child = self.model.get(child_idx);
            if !child.category.is_node() {
                continue;
            }

            if let Some(bounds) = self.geometry.bounds.get(&child.id) {
                let di_id = self.di_id(&child.id);
                let mut attrs = vec![("id", &*di_id), ("bpmnElement", child.id.as_str())];
                if child.is_container() && !child.children.is_empty() {
                    attrs.push(("isExpanded", "true"));
                }

                let (x, y, w, h) = (
                    fmt_num(bounds.x),
                    fmt_num(bounds.y),
                    fmt_num(bounds.width),
                    fmt_num(bounds.height),
                );
                buf.open(depth, SHAPE, &attrs);
                buf.empty(
                    depth + 1,
                    DC_BOUNDS,
                    &[("x", x.as_str()), ("y", y.as_str()), ("width", w.as_str()), ("height", h.as_str())],
                );
                buf.close(depth, SHAPE);
            }

            if child.is_container() {
                self.shapes_into(buf, child_idx, depth);
            }
        }
    }

    fn edges_into(&self, buf: &mut XmlBuffer<'_>, container: ElementIdx, depth: usize, event_sink: &dyn EventSink) {
        for &child_idx in &self.model.get(container).children {
            let child = self.model.get(child_idx);

            if child.is_container() {
                self.edges_into(buf, child_idx, depth, event_sink);
                continue;
            }
            if !child.is_flow() {
                continue;
            }
            let Some(refs) = self.flows.get(&child.id) else {
                continue;
            };

            let points = self.route(child, refs, event_sink);
            let di_id = self.di_id(&child.id);
            buf.open(depth, EDGE, &[("id", &*di_id), ("bpmnElement", child.id.as_str())]);
            for point in points {
                let (x, y) = (fmt_num(point.x), fmt_num(point.y));
                buf.empty(depth + 1, DI_WAYPOINT, &[("x", x.as_str()), ("y", y.as_str())]);
            }
            buf.close(depth, EDGE);
        }
    }

    fn di_id(&self, element_id: &str) -> Cow<'_, str> {
        match self.di_ids.get(element_id) {
            Some(id) => Cow::Borrowed(id.as_str()),
            None => Cow::Owned(format!("{}_di", element_id)),
        }
    }

    /// Waypoints for a flow: collected, synthesized, or stub
    fn route(&self, flow: &Element, refs: &FlowRefs, event_sink: &dyn EventSink) -> Vec<Waypoint> {
        if let Some(points) = self.geometry.waypoints.get(&flow.id) {
            return points.clone();
        }

        let source = self.geometry.bounds.get(&refs.source_ref);
        let target = self.geometry.bounds.get(&refs.target_ref);
        match (source, target) {
            (Some(s), Some(t)) => vec![s.right_middle(), t.left_middle()],
            _ => {
                log::warn!(
                    "Flow '{}' has no route and an endpoint has no bounds; drawing a stub",
                    flow.id
                );
                emit(
                    event_sink,
                    ExtractionEvent::StubWaypoints {
                        flow_id: flow.id.clone(),
                    },
                );
                self.stub.to_vec()
            }
        }
    }
}

/// Interchange record id for every element in the model
///
/// The id is `<element id>_di` unless that names an element or an earlier
/// record, in which case a numeric suffix is appended until it is free.
fn assign_di_ids(model: &ProcessModel) -> HashMap<ElementId, String> {
    let mut ids = HashMap::with_capacity(model.len());
    let mut taken = HashSet::with_capacity(model.len());

    let mut stack: Vec<&Element> = model.roots().collect();
    stack.reverse();
    while let Some(element) = stack.pop() {
        let base = format!("{}_di", element.id);
        let mut candidate = base.clone();
        let mut suffix = 2;
        while model.index_of(&candidate).is_some() || taken.contains(&candidate) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        taken.insert(candidate.clone());
        ids.insert(element.id.clone(), candidate);
        stack.extend(element.children.iter().rev().map(|&c| model.get(c)));
    }
    ids
}

/// Format a coordinate without a trailing `.0` for whole numbers
fn fmt_num(value: f64) -> String {
    if value.is_finite() {
        format!("{}", value)
    } else {
        "0".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{NullEventSink, VecEventSink};
    use crate::model::ElementDef;
    use crate::resolve::ReferenceResolver;
    use crate::types::Bounds;

    const STUB: [Waypoint; 2] = [Waypoint { x: 0.0, y: 0.0 }, Waypoint { x: 100.0, y: 0.0 }];

    fn fixture() -> (ProcessModel, FlowIndex) {
        let model = ProcessModel::from_definitions(vec![ElementDef::sub_process("SP1", "S").with_children(vec![
            ElementDef::task("t1", "A"),
            ElementDef::task("t2", "B"),
            ElementDef::task("t3", "Undrawn"),
            ElementDef::flow("f1", "t1", "t2"),
            ElementDef::flow("f2", "t2", "t3"),
            ElementDef::sub_process("SP2", "Inner").with_children(vec![ElementDef::task("t4", "D")]),
        ])])
        .unwrap();
        let flows = FlowIndex::build(
            &model,
            model.index_of("SP1").unwrap(),
            &ReferenceResolver::default(),
            &NullEventSink,
        );
        (model, flows)
    }

    fn geometry() -> GeometryMaps {
        let mut maps = GeometryMaps::default();
        maps.bounds.insert("t1".into(), Bounds::new(100.0, 100.0, 100.0, 80.0));
        maps.bounds.insert("t2".into(), Bounds::new(300.0, 100.0, 100.0, 80.0));
        maps.bounds.insert("SP2".into(), Bounds::new(100.0, 300.0, 350.0, 200.0));
        maps.bounds.insert("t4".into(), Bounds::new(150.0, 350.0, 100.0, 80.0));
        maps
    }

    #[test]
    fn test_shapes_skip_nodes_without_bounds() {
        let (model, flows) = fixture();
        let geometry = geometry();
        let emitter = DiagramEmitter::new(&model, &flows, &geometry, STUB, "  ");
        let xml = emitter.emit_shapes(model.index_of("SP1").unwrap(), 0);

        assert!(xml.contains("<bpmndi:BPMNShape id=\"t1_di\" bpmnElement=\"t1\">"));
        assert!(xml.contains("<dc:Bounds x=\"300\" y=\"100\" width=\"100\" height=\"80\" />"));
        assert!(xml.contains("bpmnElement=\"SP2\" isExpanded=\"true\""));
        assert!(xml.contains("bpmnElement=\"t4\""));
        assert!(!xml.contains("t3"));
        assert_eq!(xml.matches("<bpmndi:BPMNShape ").count(), 4);
    }

    #[test]
    fn test_edges_synthesized_and_stubbed() {
        let (model, flows) = fixture();
        let geometry = geometry();
        let emitter = DiagramEmitter::new(&model, &flows, &geometry, STUB, "  ");
        let sink = VecEventSink::new();
        let xml = emitter.emit_edges(model.index_of("SP1").unwrap(), 0, &sink);

        let expected = "\
<bpmndi:BPMNEdge id=\"f1_di\" bpmnElement=\"f1\">
  <di:waypoint x=\"200\" y=\"140\" />
  <di:waypoint x=\"300\" y=\"140\" />
</bpmndi:BPMNEdge>
<bpmndi:BPMNEdge id=\"f2_di\" bpmnElement=\"f2\">
  <di:waypoint x=\"0\" y=\"0\" />
  <di:waypoint x=\"100\" y=\"0\" />
</bpmndi:BPMNEdge>
";
        assert_eq!(xml, expected);
        assert_eq!(
            sink.events(),
            vec![ExtractionEvent::StubWaypoints {
                flow_id: "f2".to_string()
            }]
        );
    }

    #[test]
    fn test_di_ids_avoid_element_ids() {
        let model = ProcessModel::from_definitions(vec![ElementDef::sub_process("SP1", "S").with_children(vec![
            ElementDef::task("t1", "A"),
            ElementDef::task("t1_di", "Shadow"),
            ElementDef::task("t1_di_di", "Shadow of shadow"),
        ])])
        .unwrap();
        let flows = FlowIndex::build(
            &model,
            model.index_of("SP1").unwrap(),
            &ReferenceResolver::default(),
            &NullEventSink,
        );
        let mut geometry = GeometryMaps::default();
        for (i, id) in ["t1", "t1_di", "t1_di_di"].into_iter().enumerate() {
            geometry
                .bounds
                .insert(id.into(), Bounds::new(100.0 * i as f64, 0.0, 100.0, 80.0));
        }
        let emitter = DiagramEmitter::new(&model, &flows, &geometry, STUB, "  ");
        let xml = emitter.emit_shapes(model.index_of("SP1").unwrap(), 0);

        assert!(xml.contains("id=\"t1_di_2\" bpmnElement=\"t1\""));
        assert!(xml.contains("id=\"t1_di_di_2\" bpmnElement=\"t1_di\""));
        assert!(xml.contains("id=\"t1_di_di_di\" bpmnElement=\"t1_di_di\""));
        for id in ["t1_di_2", "t1_di_di_2", "t1_di_di_di"] {
            assert_eq!(xml.matches(&format!("id=\"{}\"", id)).count(), 1);
        }
    }

    #[test]
    fn test_collected_waypoints_preferred() {
        let (model, flows) = fixture();
        let mut geometry = geometry();
        geometry.waypoints.insert(
            "f1".into(),
            vec![Waypoint::new(200.0, 140.0), Waypoint::new(250.0, 140.5), Waypoint::new(300.0, 140.0)],
        );
        let emitter = DiagramEmitter::new(&model, &flows, &geometry, STUB, "  ");
        let xml = emitter.emit_edges(model.index_of("SP1").unwrap(), 0, &NullEventSink);

        assert!(xml.contains("<di:waypoint x=\"250\" y=\"140.5\" />"));
    }
}
