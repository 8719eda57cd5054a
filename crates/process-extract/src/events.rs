//! Diagnostic events for extraction runs
//!
//! The extractor degrades instead of failing: flows it cannot resolve are
//! dropped, shapes without geometry are left undrawn, and a failed layout
//! call falls back to the original document. Each of these is reported
//! here so hosts can surface it.

use serde::{Deserialize, Serialize};

/// Trait for receiving extraction events
///
/// This abstracts over the transport mechanism (UI channel, mpsc, etc.)
/// so the engine can be used in different contexts.
pub trait EventSink: Send + Sync {
    /// Send an event
    ///
    /// Returns an error if the event could not be delivered (e.g., channel closed)
    fn send(&self, event: ExtractionEvent) -> Result<(), EventError>;
}

/// Error when sending events fails
#[derive(Debug, Clone)]
pub struct EventError {
    pub message: String,
}

impl std::fmt::Display for EventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event error: {}", self.message)
    }
}

impl std::error::Error for EventError {}

/// Events emitted during an extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExtractionEvent {
    /// Extraction of a container started
    #[serde(rename_all = "camelCase")]
    ExtractionStarted { container_id: String },

    /// A flow had no resolvable source or target and was dropped
    #[serde(rename_all = "camelCase")]
    FlowSkipped {
        flow_id: String,
        missing_source: bool,
        missing_target: bool,
    },

    /// A node had no live or stored geometry and is not drawn
    #[serde(rename_all = "camelCase")]
    ShapeOmitted { element_id: String },

    /// A flow endpoint had no geometry; a stub route was drawn instead
    #[serde(rename_all = "camelCase")]
    StubWaypoints { flow_id: String },

    /// The auto-layout service failed; the original layout was kept
    #[serde(rename_all = "camelCase")]
    LayoutFailed { error: String },

    /// Extraction finished
    #[serde(rename_all = "camelCase")]
    ExtractionCompleted {
        container_id: String,
        element_count: usize,
        skipped_flows: usize,
    },
}

/// A no-op event sink that discards all events
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: ExtractionEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// A vector-based event sink that collects events
///
/// Useful for testing to verify events were emitted correctly.
pub struct VecEventSink {
    events: std::sync::Mutex<Vec<ExtractionEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Get all collected events
    pub fn events(&self) -> Vec<ExtractionEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Clear all collected events
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl Default for VecEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: ExtractionEvent) -> Result<(), EventError> {
        self.events
            .lock()
            .map_err(|_| EventError {
                message: "Event buffer poisoned".to_string(),
            })?
            .push(event);
        Ok(())
    }
}

/// Send an event, logging instead of failing if the sink rejects it
pub(crate) fn emit(sink: &dyn EventSink, event: ExtractionEvent) {
    if let Err(e) = sink.send(event) {
        log::debug!("Dropped extraction event: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_event_sink() {
        let sink = VecEventSink::new();

        sink.send(ExtractionEvent::StubWaypoints {
            flow_id: "f1".to_string(),
        })
        .unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 1);

        match &events[0] {
            ExtractionEvent::StubWaypoints { flow_id } => assert_eq!(flow_id, "f1"),
            _ => panic!("Expected StubWaypoints event"),
        }

        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_event_serialization_tag() {
        let event = ExtractionEvent::ShapeOmitted {
            element_id: "t9".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "shapeOmitted");
        assert_eq!(json["elementId"], "t9");
    }

    #[test]
    fn test_null_event_sink() {
        let sink = NullEventSink;
        sink.send(ExtractionEvent::LayoutFailed {
            error: "down".to_string(),
        })
        .unwrap();
    }
}
