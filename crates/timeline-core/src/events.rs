//! Change-notification events and the broadcast event bus.
//!
//! Every store mutation and every classification step is published as a
//! [`TimelineEvent`] wrapped in an [`EventEnvelope`]. Consumers (the CLI,
//! tests, any future UI) subscribe independently; the store never depends on
//! who is listening.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

// ============================================================================
// Event Envelope
// ============================================================================

/// Self-describing wrapper around a [`TimelineEvent`].
///
/// `event_type` uses dot-namespaced names (e.g. `"entry.added"`,
/// `"classification.failed"`). `revision` is set for store mutations and
/// carries the store revision reached by that mutation.
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    /// Unique event identifier (UUIDv7 for temporal ordering).
    pub event_id: Uuid,
    /// Namespaced event type.
    pub event_type: String,
    /// When the event occurred (UTC).
    pub occurred_at: DateTime<Utc>,
    /// Store revision after the mutation, if the event came from the store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<u64>,
    /// Domain-specific event data.
    pub payload: TimelineEvent,
}

impl EventEnvelope {
    /// Wrap an event that did not come from a store mutation.
    pub fn new(event: TimelineEvent) -> Self {
        Self::build(event, None)
    }

    /// Wrap a store mutation event.
    pub fn at_revision(event: TimelineEvent, revision: u64) -> Self {
        Self::build(event, Some(revision))
    }

    fn build(event: TimelineEvent, revision: Option<u64>) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            event_type: event.namespaced_event_type().to_string(),
            occurred_at: Utc::now(),
            revision,
            payload: event,
        }
    }
}

// ============================================================================
// Timeline Event (domain payloads)
// ============================================================================

/// Domain event payloads, serialized with a `type` tag field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum TimelineEvent {
    /// A new entry was captured.
    EntryAdded { entry_id: Uuid },
    /// An entry was replaced (text, tags, or both).
    EntryUpdated { entry_id: Uuid },
    /// An entry's tags were assigned (manually or by classification).
    EntryTagsUpdated { entry_id: Uuid, tag_count: usize },
    /// One or more entries were removed.
    EntriesDeleted { entry_ids: Vec<Uuid> },
    /// A tag joined the registry.
    TagAdded { tag_id: Uuid, name: String },
    /// A tag was renamed or recoloured everywhere.
    TagUpdated {
        tag_id: Uuid,
        name: String,
        entries_touched: usize,
    },
    /// A tag was removed from the registry.
    TagDeleted { tag_id: Uuid, cascade: bool },
    /// All entries were removed and the registry reset to the built-ins.
    StoreCleared { entries_removed: usize },
    /// A background classification request was dispatched.
    ClassificationStarted { entry_id: Uuid },
    /// The classifier returned suggestions.
    ClassificationCompleted {
        entry_id: Uuid,
        suggestions: Vec<String>,
        duration_ms: u64,
    },
    /// The classification attempt was abandoned.
    ClassificationFailed { entry_id: Uuid, error: String },
}

impl TimelineEvent {
    /// Returns the namespaced event type for the envelope.
    pub fn namespaced_event_type(&self) -> &'static str {
        match self {
            TimelineEvent::EntryAdded { .. } => "entry.added",
            TimelineEvent::EntryUpdated { .. } => "entry.updated",
            TimelineEvent::EntryTagsUpdated { .. } => "entry.tags_updated",
            TimelineEvent::EntriesDeleted { .. } => "entry.deleted",
            TimelineEvent::TagAdded { .. } => "tag.added",
            TimelineEvent::TagUpdated { .. } => "tag.updated",
            TimelineEvent::TagDeleted { .. } => "tag.deleted",
            TimelineEvent::StoreCleared { .. } => "store.cleared",
            TimelineEvent::ClassificationStarted { .. } => "classification.started",
            TimelineEvent::ClassificationCompleted { .. } => "classification.completed",
            TimelineEvent::ClassificationFailed { .. } => "classification.failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast-based event bus.
///
/// Uses `tokio::sync::broadcast` with a fixed buffer. Receivers that fall
/// behind get a `Lagged` error and miss events.
#[derive(Debug)]
pub struct EventBus {
    tx: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Emit a non-store event. Dropped silently when nobody listens.
    pub fn emit(&self, event: TimelineEvent) {
        self.send(EventEnvelope::new(event));
    }

    /// Emit a store mutation event tagged with the new revision.
    pub fn emit_at_revision(&self, event: TimelineEvent, revision: u64) {
        self.send(EventEnvelope::at_revision(event, revision));
    }

    fn send(&self, envelope: EventEnvelope) {
        tracing::debug!(
            subsystem = "events",
            event_type = %envelope.event_type,
            event_id = %envelope.event_id,
            subscriber_count = self.tx.receiver_count(),
            "EventBus emit"
        );
        let _ = self.tx.send(envelope);
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(crate::defaults::EVENT_BUS_CAPACITY)
    }
}
