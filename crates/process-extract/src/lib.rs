//! Process Extract - Standalone documents from embedded subprocesses
//!
//! This crate takes one subprocess out of a larger process diagram and
//! produces a complete, self-contained process document for it:
//!
//! - Process semantics: nodes, sequence flows and nested subprocesses
//! - Diagram geometry: shapes and routed edges, moved to a fixed padding
//! - Reference repair: flows with stale endpoints are re-inferred from
//!   sibling incoming/outgoing lists, or dropped if they cannot be
//! - Optional auto-layout through an external service, with fallback
//!
//! # Architecture
//!
//! - `ProcessModel`: Arena of elements built from nested definitions
//! - `GeometryProvider`: Live shape bounds and connection routes
//! - `FlowIndex`: Resolved flow endpoints, shared by both emitters
//! - `SubprocessExtractor`: Orchestrates collection, normalization and emission
//! - `EventSink`: Diagnostics for skipped flows and omitted shapes
//!
//! # Example
//!
//! ```ignore
//! use process_extract::{DiagramSnapshot, ExtractOptions, SubprocessExtractor};
//!
//! let (model, registry) = DiagramSnapshot::from_json(&json)?.into_parts()?;
//! let extractor = SubprocessExtractor::new(&model, &registry);
//! let result = extractor.compose("SubProcess_1", &ExtractOptions::default())?;
//! ```

pub mod config;
pub mod constants;
pub mod detect;
pub mod emit;
pub mod error;
pub mod events;
pub mod extractor;
pub mod geometry;
pub mod layout;
pub mod model;
pub mod provider;
pub mod resolve;
pub mod types;

// Re-export key types
pub use config::{CoordinateSpace, ExtractorConfig};
pub use error::{ExtractError, LayoutError, Result};
pub use events::{EventSink, ExtractionEvent, NullEventSink, VecEventSink};
pub use extractor::SubprocessExtractor;
pub use layout::{AutoLayoutService, HttpLayoutService};
pub use model::{Element, ElementDef, ElementIdx, ProcessModel};
pub use provider::{DiagramSnapshot, ElementRegistry, GeometryProvider};
pub use resolve::{ReferenceResolver, ResolveStrategy};
pub use types::{Bounds, ElementCategory, ExtractOptions, ExtractionResult, StoredLayout, Waypoint};
