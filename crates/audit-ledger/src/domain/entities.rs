//! Audit event kinds and the immutable log entry.

use serde::{Deserialize, Serialize};
use shared_types::{Actor, EnvelopeId, Timestamp};

/// Every state-affecting workflow action that lands in the ledger.
///
/// Closed enum with exhaustive matching: a new workflow action forces every
/// consumer (certificate projection included) to decide how to render it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditEventKind {
    /// Envelope created in Draft.
    EnvelopeCreated,
    /// Envelope left Draft; recipients invited.
    EnvelopeSent,
    /// A recipient first opened the envelope.
    RecipientOpened,
    /// A field value was inserted.
    FieldInserted,
    /// A field value was explicitly removed.
    FieldUninserted,
    /// A recipient finished signing their part.
    RecipientSigned,
    /// A recipient rejected the envelope.
    RecipientRejected,
    /// The envelope transitioned to Rejected.
    EnvelopeRejected,
    /// Sealing finished; the envelope is Completed.
    EnvelopeSealed,
    /// The envelope was soft-deleted.
    EnvelopeDeleted,
    /// The envelope was restored from soft-delete.
    EnvelopeRestored,
}

impl AuditEventKind {
    /// Human-readable label used in certificate rendering.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::EnvelopeCreated => "Envelope created",
            Self::EnvelopeSent => "Envelope sent",
            Self::RecipientOpened => "Recipient opened",
            Self::FieldInserted => "Field inserted",
            Self::FieldUninserted => "Field removed",
            Self::RecipientSigned => "Recipient signed",
            Self::RecipientRejected => "Recipient rejected",
            Self::EnvelopeRejected => "Envelope rejected",
            Self::EnvelopeSealed => "Envelope sealed",
            Self::EnvelopeDeleted => "Envelope deleted",
            Self::EnvelopeRestored => "Envelope restored",
        }
    }
}

/// One immutable ledger row.
///
/// `sequence` is assigned by the ledger, strictly increasing and gap-free per
/// envelope; it defines the total order of the trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// The envelope this entry belongs to.
    pub envelope_id: EnvelopeId,
    /// Per-envelope monotonically increasing sequence number, starting at 1.
    pub sequence: u64,
    /// What happened.
    pub kind: AuditEventKind,
    /// Who did it.
    pub actor: Actor,
    /// When it happened (unix millis).
    pub timestamp: Timestamp,
    /// Structured event details (field ids, reasons, hashes).
    pub metadata: serde_json::Value,
}

/// Paging window for `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Entries to skip (in sequence order).
    pub offset: usize,
    /// Maximum entries to return.
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 100,
        }
    }
}
