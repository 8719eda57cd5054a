//! Flow reference resolution
//!
//! Editors can leave flows half-connected (for example mid-drag), so a
//! flow's own `sourceRef`/`targetRef` is not always trustworthy. Resolution
//! runs an ordered list of strategies per endpoint; the first one that
//! produces an id wins.
//!
//! - [`DirectReference`]: the flow's own reference, if it names a sibling node
//! - [`SiblingInference`]: a sibling node listing the flow in its
//!   `outgoing` (source) or `incoming` (target) edges
//!
//! A flow that is still missing an endpoint after all strategies is
//! dropped from the output.

use std::collections::HashMap;

use crate::events::{emit, EventSink, ExtractionEvent};
use crate::model::{Element, ElementIdx, ProcessModel};
use crate::types::ElementId;

/// Which end of a flow is being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Target,
}

/// One way of finding a flow endpoint
pub trait ResolveStrategy: Send + Sync {
    /// Short name used in debug logs
    fn name(&self) -> &'static str;

    /// Try to find the endpoint among the flow's sibling nodes
    fn resolve(&self, flow: &Element, endpoint: Endpoint, siblings: &[&Element]) -> Option<ElementId>;
}

/// Uses the reference recorded on the flow itself
///
/// A reference to an id that is not a sibling node is treated as stale.
pub struct DirectReference;

impl ResolveStrategy for DirectReference {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn resolve(&self, flow: &Element, endpoint: Endpoint, siblings: &[&Element]) -> Option<ElementId> {
        let reference = match endpoint {
            Endpoint::Source => flow.source_ref.as_ref(),
            Endpoint::Target => flow.target_ref.as_ref(),
        }?;
        let id = reference.id()?;
        siblings
            .iter()
            .find(|s| s.id == id && s.category.is_node())
            .map(|s| s.id.clone())
    }
}

/// Infers the endpoint from sibling nodes' incoming/outgoing lists
pub struct SiblingInference;

impl ResolveStrategy for SiblingInference {
    fn name(&self) -> &'static str {
        "sibling"
    }

    fn resolve(&self, flow: &Element, endpoint: Endpoint, siblings: &[&Element]) -> Option<ElementId> {
        siblings
            .iter()
            .filter(|s| s.category.is_node())
            .find(|s| {
                let edges = match endpoint {
                    Endpoint::Source => &s.outgoing,
                    Endpoint::Target => &s.incoming,
                };
                edges.iter().any(|e| *e == flow.id)
            })
            .map(|s| s.id.clone())
    }
}

/// Resolved endpoints of a flow; an empty string means unresolved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowRefs {
    pub source_ref: ElementId,
    pub target_ref: ElementId,
}

impl FlowRefs {
    /// Both endpoints are known
    pub fn is_resolved(&self) -> bool {
        !self.source_ref.is_empty() && !self.target_ref.is_empty()
    }
}

/// Ordered chain of resolution strategies
pub struct ReferenceResolver {
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl Default for ReferenceResolver {
    fn default() -> Self {
        Self::new(vec![Box::new(DirectReference), Box::new(SiblingInference)])
    }
}

impl ReferenceResolver {
    pub fn new(strategies: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self { strategies }
    }

    /// Resolve both endpoints of a flow
    pub fn resolve(&self, flow: &Element, siblings: &[&Element]) -> FlowRefs {
        FlowRefs {
            source_ref: self.resolve_endpoint(flow, Endpoint::Source, siblings),
            target_ref: self.resolve_endpoint(flow, Endpoint::Target, siblings),
        }
    }

    fn resolve_endpoint(&self, flow: &Element, endpoint: Endpoint, siblings: &[&Element]) -> ElementId {
        for strategy in &self.strategies {
            if let Some(id) = strategy.resolve(flow, endpoint, siblings) {
                log::trace!("Flow '{}' {:?} resolved by {} strategy", flow.id, endpoint, strategy.name());
                return id;
            }
        }
        String::new()
    }
}

/// Resolution results for every flow under one container, computed once
/// and shared by both emitters
#[derive(Debug, Default)]
pub struct FlowIndex {
    resolved: HashMap<ElementId, FlowRefs>,
    skipped: Vec<ElementId>,
}

impl FlowIndex {
    /// Resolve all flows below `root`, recursing into nested containers
    pub fn build(
        model: &ProcessModel,
        root: ElementIdx,
        resolver: &ReferenceResolver,
        event_sink: &dyn EventSink,
    ) -> Self {
        let mut index = Self::default();
        index.visit(model, root, resolver, event_sink);
        index
    }

    fn visit(
        &mut self,
        model: &ProcessModel,
        container: ElementIdx,
        resolver: &ReferenceResolver,
        event_sink: &dyn EventSink,
    ) {
        let siblings: Vec<&Element> = model.children(container).collect();

        for &child_idx in &model.get(container).children {
            let child = model.get(child_idx);
            if child.is_flow() {
                let refs = resolver.resolve(child, &siblings);
                if refs.is_resolved() {
                    self.resolved.insert(child.id.clone(), refs);
                } else {
                    log::warn!(
                        "Skipping flow '{}': unresolved {}",
                        child.id,
                        match (refs.source_ref.is_empty(), refs.target_ref.is_empty()) {
                            (true, true) => "source and target",
                            (true, false) => "source",
                            _ => "target",
                        }
                    );
                    emit(
                        event_sink,
                        ExtractionEvent::FlowSkipped {
                            flow_id: child.id.clone(),
                            missing_source: refs.source_ref.is_empty(),
                            missing_target: refs.target_ref.is_empty(),
                        },
                    );
                    self.skipped.push(child.id.clone());
                }
            } else if child.is_container() {
                self.visit(model, child_idx, resolver, event_sink);
            }
        }
    }

    /// Endpoints of a flow, if it resolved
    pub fn get(&self, flow_id: &str) -> Option<&FlowRefs> {
        self.resolved.get(flow_id)
    }

    /// Ids of flows that were dropped, in document order
    pub fn skipped(&self) -> &[ElementId] {
        &self.skipped
    }

    /// Number of flows that resolved
    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }
}
