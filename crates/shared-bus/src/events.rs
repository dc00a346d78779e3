//! # Workflow Events
//!
//! Defines all event types that flow through the shared bus: sealing tasks
//! consumed by the background worker, and lifecycle notifications consumed
//! fire-and-forget by external delivery collaborators.

use serde::{Deserialize, Serialize};
use shared_types::{EnvelopeId, RecipientId};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorkflowEvent {
    // =========================================================================
    // LIFECYCLE NOTIFICATIONS (fire-and-forget)
    // =========================================================================
    /// An envelope left Draft and recipients were invited.
    EnvelopeSent {
        /// The envelope that was sent.
        envelope_id: EnvelopeId,
        /// Recipients to notify.
        recipients: Vec<RecipientId>,
    },

    /// A recipient finished signing their part.
    RecipientSigned {
        /// The envelope being signed.
        envelope_id: EnvelopeId,
        /// The recipient who signed.
        recipient_id: RecipientId,
    },

    /// A recipient rejected the envelope.
    RecipientRejected {
        /// The envelope that was rejected.
        envelope_id: EnvelopeId,
        /// The recipient who rejected.
        recipient_id: RecipientId,
        /// Optional free-form reason supplied by the recipient.
        reason: Option<String>,
    },

    /// Sealing finished and the envelope is Completed.
    EnvelopeCompleted {
        /// The completed envelope.
        envelope_id: EnvelopeId,
    },

    /// The envelope transitioned to Rejected.
    EnvelopeRejected {
        /// The rejected envelope.
        envelope_id: EnvelopeId,
    },

    // =========================================================================
    // SEALING TASKS (at-least-once; deduped by the lease store)
    // =========================================================================
    /// The last required recipient signed; the envelope is ready to seal.
    SealRequested {
        /// The envelope to seal.
        envelope_id: EnvelopeId,
    },
}

impl WorkflowEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::EnvelopeSent { .. }
            | Self::RecipientSigned { .. }
            | Self::RecipientRejected { .. }
            | Self::EnvelopeCompleted { .. }
            | Self::EnvelopeRejected { .. } => EventTopic::Notification,
            Self::SealRequested { .. } => EventTopic::Sealing,
        }
    }

    /// The envelope this event concerns.
    #[must_use]
    pub fn envelope_id(&self) -> EnvelopeId {
        match self {
            Self::EnvelopeSent { envelope_id, .. }
            | Self::RecipientSigned { envelope_id, .. }
            | Self::RecipientRejected { envelope_id, .. }
            | Self::EnvelopeCompleted { envelope_id }
            | Self::EnvelopeRejected { envelope_id }
            | Self::SealRequested { envelope_id } => *envelope_id,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Lifecycle notifications for external delivery collaborators.
    Notification,
    /// Seal tasks for the background worker.
    Sealing,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &WorkflowEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}
