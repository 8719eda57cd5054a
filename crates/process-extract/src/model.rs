//! Process model - arena-backed tree of nodes, flows and subprocesses
//!
//! Stored diagrams describe containment as nested element lists. The model
//! flattens that nesting into an arena: every element lives in one `Vec`,
//! and a container records the indices of its children. Because the arena
//! is built from an owned tree, no container can be its own ancestor.
//!
//! # Example
//!
//! ```ignore
//! let model = ProcessModel::from_definitions(vec![
//!     ElementDef::sub_process("SP1", "Review")
//!         .with_children(vec![
//!             ElementDef::task("t1", "Task A").with_outgoing(["f1"]),
//!             ElementDef::task("t2", "Task B").with_incoming(["f1"]),
//!             ElementDef::flow("f1", "t1", "t2"),
//!         ]),
//! ])?;
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, Result};
use crate::types::{ElementCategory, ElementId, ElementRef, StoredLayout};

/// Index of an element inside a [`ProcessModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementIdx(usize);

/// Serializable element definition with nested children
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDef {
    pub id: ElementId,
    /// Raw type tag, e.g. `bpmn:Task`
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub incoming: Vec<ElementId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outgoing: Vec<ElementId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<ElementRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_ref: Option<ElementRef>,
    /// Static layout record kept with the element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<StoredLayout>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementDef>,
}

impl ElementDef {
    /// Create a definition with an arbitrary type tag
    pub fn new(id: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_tag: type_tag.into(),
            name: None,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            source_ref: None,
            target_ref: None,
            layout: None,
            children: Vec::new(),
        }
    }

    pub fn task(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, "bpmn:Task").with_name(name)
    }

    pub fn event(id: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self::new(id, type_tag)
    }

    pub fn gateway(id: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self::new(id, type_tag)
    }

    pub fn sub_process(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, "bpmn:SubProcess").with_name(name)
    }

    /// Create a sequence flow with direct source/target references
    pub fn flow(id: impl Into<String>, source: &str, target: &str) -> Self {
        let mut def = Self::new(id, "bpmn:SequenceFlow");
        def.source_ref = Some(ElementRef::from(source));
        def.target_ref = Some(ElementRef::from(target));
        def
    }

    /// Create a sequence flow without any recorded references
    pub fn detached_flow(id: impl Into<String>) -> Self {
        Self::new(id, "bpmn:SequenceFlow")
    }

    pub fn label(id: impl Into<String>) -> Self {
        Self::new(id, "label")
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_incoming<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.incoming = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_outgoing<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outgoing = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_layout(mut self, layout: StoredLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_children(mut self, children: Vec<ElementDef>) -> Self {
        self.children = children;
        self
    }
}

/// An element stored in the arena
#[derive(Debug, Clone)]
pub struct Element {
    pub id: ElementId,
    pub type_tag: String,
    pub category: ElementCategory,
    pub name: Option<String>,
    pub incoming: Vec<ElementId>,
    pub outgoing: Vec<ElementId>,
    pub source_ref: Option<ElementRef>,
    pub target_ref: Option<ElementRef>,
    pub layout: Option<StoredLayout>,
    pub parent: Option<ElementIdx>,
    pub children: Vec<ElementIdx>,
}

impl Element {
    pub fn is_flow(&self) -> bool {
        self.category == ElementCategory::Flow
    }

    pub fn is_container(&self) -> bool {
        self.category == ElementCategory::Container
    }

    pub fn is_label(&self) -> bool {
        self.category == ElementCategory::Label
    }
}

/// Read-only process tree
#[derive(Debug, Clone, Default)]
pub struct ProcessModel {
    elements: Vec<Element>,
    index: HashMap<ElementId, ElementIdx>,
    roots: Vec<ElementIdx>,
}

impl ProcessModel {
    /// Build a model from top-level element definitions
    pub fn from_definitions(defs: Vec<ElementDef>) -> Result<Self> {
        let mut model = Self::default();
        for def in defs {
            let idx = model.insert(def, None)?;
            model.roots.push(idx);
        }
        Ok(model)
    }

    fn insert(&mut self, def: ElementDef, parent: Option<ElementIdx>) -> Result<ElementIdx> {
        if self.index.contains_key(&def.id) {
            return Err(ExtractError::DuplicateElement(def.id));
        }

        let category = ElementCategory::from_type_tag(&def.type_tag);
        if !def.children.is_empty() && matches!(category, ElementCategory::Flow | ElementCategory::Label) {
            return Err(ExtractError::invalid(format!(
                "'{}' of type '{}' cannot own children",
                def.id, def.type_tag
            )));
        }

        let idx = ElementIdx(self.elements.len());
        self.index.insert(def.id.clone(), idx);
        self.elements.push(Element {
            id: def.id,
            type_tag: def.type_tag,
            category,
            name: def.name,
            incoming: def.incoming,
            outgoing: def.outgoing,
            source_ref: def.source_ref,
            target_ref: def.target_ref,
            layout: def.layout,
            parent,
            children: Vec::new(),
        });

        let mut children = Vec::with_capacity(def.children.len());
        for child in def.children {
            children.push(self.insert(child, Some(idx))?);
        }
        self.elements[idx.0].children = children;

        Ok(idx)
    }

    /// Look up an element by index
    pub fn get(&self, idx: ElementIdx) -> &Element {
        &self.elements[idx.0]
    }

    /// Look up an element by id
    pub fn find(&self, id: &str) -> Option<&Element> {
        self.index.get(id).map(|idx| self.get(*idx))
    }

    /// Index of an element by id
    pub fn index_of(&self, id: &str) -> Option<ElementIdx> {
        self.index.get(id).copied()
    }

    /// Direct children of an element, in document order
    pub fn children(&self, idx: ElementIdx) -> impl Iterator<Item = &Element> + '_ {
        self.get(idx).children.iter().map(move |c| self.get(*c))
    }

    /// Top-level elements
    pub fn roots(&self) -> impl Iterator<Item = &Element> + '_ {
        self.roots.iter().map(move |r| self.get(*r))
    }

    /// Total number of elements in the model
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
