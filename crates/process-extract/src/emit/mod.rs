//! XML emission
//!
//! The document is written by hand rather than through a DOM: the shape of
//! the output is fixed and small, and it has to stay well-formed even when
//! the input model is not. Two emitters share the same walk over the tree:
//!
//! - [`process`]: the semantic process body (nodes, flows, nested subprocesses)
//! - [`diagram`]: the interchange layer (one shape per node, one edge per flow)

pub mod diagram;
pub mod process;

pub use diagram::DiagramEmitter;
pub use process::ProcessEmitter;

use std::borrow::Cow;
use std::fmt::Write;

use crate::constants::namespaces;

/// Pre-rendered sections of an extracted document
#[derive(Debug, Clone, Copy)]
pub struct DocumentParts<'a> {
    pub name: &'a str,
    /// Process body rendered at depth 2
    pub process_body: &'a str,
    /// Shape records rendered at depth 3
    pub shapes: &'a str,
    /// Edge records rendered at depth 3
    pub edges: &'a str,
}

/// Generate a fresh envelope identifier such as `Process_3f2a...`
pub fn fresh_id(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Wrap the rendered sections in the definitions/process/diagram envelope
pub fn write_document(parts: &DocumentParts<'_>, indent_unit: &str) -> String {
    let definitions_id = fresh_id("Definitions");
    let process_id = fresh_id("Process");
    let diagram_id = fresh_id("BPMNDiagram");
    let plane_id = fresh_id("BPMNPlane");

    let mut buf = XmlBuffer::new(indent_unit);
    buf.raw("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    buf.open(
        0,
        "bpmn:definitions",
        &[
            ("xmlns:bpmn", namespaces::BPMN_MODEL),
            ("xmlns:bpmndi", namespaces::BPMN_DI),
            ("xmlns:dc", namespaces::DC),
            ("xmlns:di", namespaces::DI),
            ("id", definitions_id.as_str()),
            ("targetNamespace", namespaces::TARGET),
        ],
    );
    buf.open(
        1,
        "bpmn:process",
        &[("id", process_id.as_str()), ("name", parts.name), ("isExecutable", "true")],
    );
    buf.raw(parts.process_body);
    buf.close(1, "bpmn:process");
    buf.open(1, "bpmndi:BPMNDiagram", &[("id", diagram_id.as_str())]);
    buf.open(
        2,
        "bpmndi:BPMNPlane",
        &[("id", plane_id.as_str()), ("bpmnElement", process_id.as_str())],
    );
    buf.raw(parts.shapes);
    buf.raw(parts.edges);
    buf.close(2, "bpmndi:BPMNPlane");
    buf.close(1, "bpmndi:BPMNDiagram");
    buf.close(0, "bpmn:definitions");
    buf.finish()
}

/// Escape a value for use inside a double-quoted XML attribute or text node
///
/// Characters XML 1.0 does not allow at all (most C0 controls, U+FFFE and
/// U+FFFF) are dropped.
pub fn escape(value: &str) -> Cow<'_, str> {
    if !value.chars().any(|c| matches!(c, '&' | '<' | '>' | '"' | '\'') || !is_xml_char(c)) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if !is_xml_char(c) => {}
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn is_xml_char(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' => true,
        '\u{0}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}' => false,
        _ => true,
    }
}

/// Line-oriented XML text buffer with fixed-unit indentation
pub(crate) struct XmlBuffer<'a> {
    out: String,
    indent_unit: &'a str,
}

impl<'a> XmlBuffer<'a> {
    pub(crate) fn new(indent_unit: &'a str) -> Self {
        Self {
            out: String::new(),
            indent_unit,
        }
    }

    /// Write `<name attrs />`
    pub(crate) fn empty(&mut self, depth: usize, name: &str, attrs: &[(&str, &str)]) {
        self.start_line(depth);
        self.tag_open(name, attrs);
        self.out.push_str(" />\n");
    }

    /// Write `<name attrs>`
    pub(crate) fn open(&mut self, depth: usize, name: &str, attrs: &[(&str, &str)]) {
        self.start_line(depth);
        self.tag_open(name, attrs);
        self.out.push_str(">\n");
    }

    /// Write `</name>`
    pub(crate) fn close(&mut self, depth: usize, name: &str) {
        self.start_line(depth);
        let _ = writeln!(self.out, "</{}>", name);
    }

    /// Write `<name>text</name>`
    pub(crate) fn text(&mut self, depth: usize, name: &str, text: &str) {
        self.start_line(depth);
        let _ = writeln!(self.out, "<{}>{}</{}>", name, escape(text), name);
    }

    /// Append pre-rendered lines verbatim
    pub(crate) fn raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }

    fn start_line(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str(self.indent_unit);
        }
    }

    fn tag_open(&mut self, name: &str, attrs: &[(&str, &str)]) {
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in attrs {
            let _ = write!(self.out, " {}=\"{}\"", key, escape(value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert!(matches!(escape("plain"), Cow::Borrowed(_)));
        assert_eq!(escape(r#"A & "B" <c> 'd'"#), "A &amp; &quot;B&quot; &lt;c&gt; &apos;d&apos;");
    }

    #[test]
    fn test_escape_drops_forbidden_controls() {
        assert_eq!(escape("bad\u{1}name"), "badname");
        assert_eq!(escape("\u{0}a\u{1F}&\u{FFFF}"), "a&amp;");
        assert_eq!(escape("tab\there\nline"), "tab\there\nline");
        assert!(matches!(escape("tab\there"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_document_envelope() {
        let parts = DocumentParts {
            name: "Order <Review>",
            process_body: "    <bpmn:task id=\"t1\" />\n",
            shapes: "",
            edges: "",
        };
        let xml = write_document(&parts, "  ");

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<bpmn:definitions "));
        assert!(xml.contains("name=\"Order &lt;Review&gt;\" isExecutable=\"true\">\n    <bpmn:task id=\"t1\" />\n  </bpmn:process>"));
        assert!(xml.trim_end().ends_with("</bpmn:definitions>"));
    }

    #[test]
    fn test_fresh_ids_differ() {
        assert_ne!(fresh_id("Process"), fresh_id("Process"));
        assert!(fresh_id("Process").starts_with("Process_"));
    }

    #[test]
    fn test_buffer_layout() {
        let mut buf = XmlBuffer::new("  ");
        buf.open(0, "a", &[("id", "x")]);
        buf.empty(1, "b", &[("name", "R&D")]);
        buf.text(1, "c", "f1");
        buf.close(0, "a");

        assert_eq!(
            buf.finish(),
            "<a id=\"x\">\n  <b name=\"R&amp;D\" />\n  <c>f1</c>\n</a>\n"
        );
    }
}
