//! Subprocess extraction
//!
//! [`SubprocessExtractor`] is the public entry point. Given the id of a
//! subprocess inside a larger diagram it produces a standalone process
//! document: the subprocess's nodes, flows and nested subprocesses, drawn
//! at their current positions, moved to a fixed padding from the origin.
//!
//! # Pipeline
//!
//! 1. Resolve the container and its name
//! 2. Detect nested subprocesses and count children
//! 3. Resolve every flow once ([`FlowIndex`])
//! 4. Collect geometry relative to the container, then normalize it
//! 5. Emit process body, shapes and edges inside the document envelope
//! 6. Optionally pass the document through an [`AutoLayoutService`]
//!
//! Only step 1 can fail. Everything after it degrades: unresolvable flows
//! are dropped, undrawable nodes are left out of the diagram layer, and a
//! failed layout call keeps the document from step 5.
//!
//! # Example
//!
//! ```ignore
//! let extractor = SubprocessExtractor::new(&model, &registry)
//!     .with_layout_service(Arc::new(HttpLayoutService::new(url)));
//!
//! let result = extractor.extract("SP1", &ExtractOptions::default()).await?;
//! std::fs::write("sp1.bpmn", result.xml)?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::config::ExtractorConfig;
use crate::detect;
use crate::emit::{write_document, DiagramEmitter, DocumentParts, ProcessEmitter};
use crate::error::{ExtractError, LayoutError, Result};
use crate::events::{emit, EventSink, ExtractionEvent, NullEventSink};
use crate::geometry::{normalize, GeometryCollector};
use crate::layout::{validate_layout_output, AutoLayoutService};
use crate::model::{ElementIdx, ProcessModel};
use crate::provider::GeometryProvider;
use crate::resolve::{FlowIndex, ReferenceResolver};
use crate::types::{ExtractOptions, ExtractionResult, Waypoint};

/// Depth of the process body inside `definitions > process`
const PROCESS_BODY_DEPTH: usize = 2;
/// Depth of shape/edge records inside `definitions > diagram > plane`
const PLANE_DEPTH: usize = 3;

/// Extracts subprocesses from a process model into standalone documents
pub struct SubprocessExtractor<'a> {
    model: &'a ProcessModel,
    geometry: &'a dyn GeometryProvider,
    config: ExtractorConfig,
    resolver: ReferenceResolver,
    layout_service: Option<Arc<dyn AutoLayoutService>>,
    event_sink: Arc<dyn EventSink>,
}

impl<'a> SubprocessExtractor<'a> {
    /// Create an extractor over a model and its live geometry
    pub fn new(model: &'a ProcessModel, geometry: &'a dyn GeometryProvider) -> Self {
        Self {
            model,
            geometry,
            config: ExtractorConfig::default(),
            resolver: ReferenceResolver::default(),
            layout_service: None,
            event_sink: Arc::new(NullEventSink),
        }
    }

    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the flow resolution strategy chain
    pub fn with_resolver(mut self, resolver: ReferenceResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_layout_service(mut self, service: Arc<dyn AutoLayoutService>) -> Self {
        self.layout_service = Some(service);
        self
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Whether the container directly holds another subprocess
    ///
    /// Returns `false` for unknown ids.
    pub fn has_nested(&self, container_id: &str) -> bool {
        detect::has_nested(self.model, container_id)
    }

    /// Number of direct children of the container, labels excluded
    ///
    /// Returns zero for unknown ids.
    pub fn count_elements(&self, container_id: &str) -> usize {
        detect::count_elements(self.model, container_id)
    }

    /// Extract a subprocess, optionally re-laid-out by the layout service
    pub async fn extract(&self, container_id: &str, options: &ExtractOptions) -> Result<ExtractionResult> {
        let result = self.compose(container_id, options)?;
        if !options.use_auto_layout {
            return Ok(result);
        }

        match self.run_layout(&result.xml).await {
            Ok(xml) => {
                log::info!("Applied auto-layout to extracted subprocess '{}'", container_id);
                Ok(ExtractionResult { xml, ..result })
            }
            Err(e) => {
                log::warn!(
                    "Auto-layout failed for '{}', keeping original geometry: {}",
                    container_id,
                    e
                );
                emit(
                    self.event_sink.as_ref(),
                    ExtractionEvent::LayoutFailed { error: e.to_string() },
                );
                Ok(result)
            }
        }
    }

    /// [`extract`](Self::extract) with auto-layout forced on
    pub async fn extract_with_auto_layout(&self, container_id: &str) -> Result<ExtractionResult> {
        self.extract(container_id, &ExtractOptions::auto_layout()).await
    }

    /// Build the document from collected geometry, without auto-layout
    pub fn compose(&self, container_id: &str, options: &ExtractOptions) -> Result<ExtractionResult> {
        let root = self.resolve_container(container_id)?;
        let container = self.model.get(root);
        let sink = self.event_sink.as_ref();

        let name = container
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(self.config.placeholder_name.as_str())
            .to_string();
        let has_nested_sub_processes = self.has_nested(container_id);
        let element_count = self.count_elements(container_id);

        log::debug!(
            "Extracting '{}' ({} elements, nested: {})",
            container_id,
            element_count,
            has_nested_sub_processes
        );
        emit(
            sink,
            ExtractionEvent::ExtractionStarted {
                container_id: container_id.to_string(),
            },
        );

        let flows = FlowIndex::build(self.model, root, &self.resolver, sink);

        let collector = GeometryCollector::new(
            self.model,
            self.geometry,
            self.config.default_shape_size,
            self.config.coordinate_space,
        );
        let origin = collector
            .raw_bounds(container)
            .map(|b| Waypoint::new(b.x, b.y))
            .unwrap_or(Waypoint::new(0.0, 0.0));
        let mut geometry = collector.collect(root, origin, sink);
        let padding = self.config.effective_padding(options.padding);
        normalize(&mut geometry, padding);
        // Stub routes sit in normalized space like everything else
        let stub = self
            .config
            .stub_waypoints
            .map(|p| Waypoint::new(p.x + padding, p.y + padding));

        let indent = self.config.indent.as_str();
        let process_body = ProcessEmitter::new(self.model, &flows, indent).emit_body(root, PROCESS_BODY_DEPTH);
        let diagram = DiagramEmitter::new(self.model, &flows, &geometry, stub, indent);
        let shapes = diagram.emit_shapes(root, PLANE_DEPTH);
        let edges = diagram.emit_edges(root, PLANE_DEPTH, sink);

        let xml = write_document(
            &DocumentParts {
                name: &name,
                process_body: &process_body,
                shapes: &shapes,
                edges: &edges,
            },
            indent,
        );

        emit(
            sink,
            ExtractionEvent::ExtractionCompleted {
                container_id: container_id.to_string(),
                element_count,
                skipped_flows: flows.skipped().len(),
            },
        );

        Ok(ExtractionResult {
            xml,
            name,
            has_nested_sub_processes,
            element_count,
        })
    }

    fn resolve_container(&self, container_id: &str) -> Result<ElementIdx> {
        let idx = self
            .model
            .index_of(container_id)
            .ok_or_else(|| ExtractError::not_found(container_id))?;
        let element = self.model.get(idx);
        if element.is_flow() || element.is_label() {
            return Err(ExtractError::NotAContainer(container_id.to_string()));
        }
        Ok(idx)
    }

    async fn run_layout(&self, xml: &str) -> std::result::Result<String, LayoutError> {
        let service = self
            .layout_service
            .as_ref()
            .ok_or_else(|| LayoutError::Unavailable("no auto-layout service configured".to_string()))?;

        let timeout_ms = self.config.layout_timeout_ms;
        let laid_out = tokio::time::timeout(Duration::from_millis(timeout_ms), service.layout(xml))
            .await
            .map_err(|_| LayoutError::Timeout(timeout_ms))??;

        validate_layout_output(&laid_out)?;
        Ok(laid_out)
    }
}
