//! Process body emitter
//!
//! Writes the children of a container as process elements. Nodes carry
//! their incoming/outgoing flow ids as child elements; flows carry their
//! resolved endpoints; nested subprocesses are written recursively.

use super::XmlBuffer;
use crate::model::{Element, ElementIdx, ProcessModel};
use crate::resolve::FlowIndex;
use crate::types::xml_element_name;

const SEQUENCE_FLOW: &str = "bpmn:sequenceFlow";
const INCOMING: &str = "bpmn:incoming";
const OUTGOING: &str = "bpmn:outgoing";

/// Serializes a container's subtree into process XML
pub struct ProcessEmitter<'a> {
    model: &'a ProcessModel,
    flows: &'a FlowIndex,
    indent_unit: &'a str,
}

impl<'a> ProcessEmitter<'a> {
    pub fn new(model: &'a ProcessModel, flows: &'a FlowIndex, indent_unit: &'a str) -> Self {
        Self {
            model,
            flows,
            indent_unit,
        }
    }

    /// Emit every child of `container`, starting at indentation `depth`
    pub fn emit_body(&self, container: ElementIdx, depth: usize) -> String {
        let mut buf = XmlBuffer::new(self.indent_unit);
        self.emit_children(&mut buf, container, depth);
        buf.finish()
    }

    fn emit_children(&self, buf: &mut XmlBuffer<'_>, container: ElementIdx, depth: usize) {
        for &child_idx in &self.model.get(container).children {
            let child = self.model.get(child_idx);

            if child.is_label() {
                continue;
            }

            if child.is_flow() {
                self.emit_flow(buf, child, depth);
                continue;
            }

            let tag = xml_element_name(&child.type_tag);
            let attrs = node_attrs(child);
            let incoming = self.known_flows(&child.incoming);
            let outgoing = self.known_flows(&child.outgoing);
            let nested = child.is_container() && !child.children.is_empty();

            if !nested && incoming.is_empty() && outgoing.is_empty() {
                buf.empty(depth, &tag, &attrs);
                continue;
            }

            buf.open(depth, &tag, &attrs);
            for id in incoming {
                buf.text(depth + 1, INCOMING, id);
            }
            for id in outgoing {
                buf.text(depth + 1, OUTGOING, id);
            }
            if nested {
                self.emit_children(buf, child_idx, depth + 1);
            }
            buf.close(depth, &tag);
        }
    }

    fn emit_flow(&self, buf: &mut XmlBuffer<'_>, flow: &Element, depth: usize) {
        // Unresolved flows were already reported when the index was built.
        let Some(refs) = self.flows.get(&flow.id) else {
            return;
        };

        let mut attrs: Vec<(&str, &str)> = vec![("id", flow.id.as_str())];
        if let Some(name) = flow.name.as_deref() {
            attrs.push(("name", name));
        }
        attrs.push(("sourceRef", refs.source_ref.as_str()));
        attrs.push(("targetRef", refs.target_ref.as_str()));
        buf.empty(depth, SEQUENCE_FLOW, &attrs);
    }

    /// Recorded flow ids that survive into the output; dropped flows would
    /// otherwise leave dangling references.
    fn known_flows<'e>(&self, ids: &'e [String]) -> Vec<&'e str> {
        ids.iter()
            .filter(|id| self.flows.get(id).is_some())
            .map(String::as_str)
            .collect()
    }
}

fn node_attrs(element: &Element) -> Vec<(&str, &str)> {
    let mut attrs = vec![("id", element.id.as_str())];
    if let Some(name) = element.name.as_deref() {
        attrs.push(("name", name));
    }
    attrs
}
