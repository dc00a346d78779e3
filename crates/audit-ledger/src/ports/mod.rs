//! Inbound port: the ledger API.

use crate::domain::entities::{AuditEventKind, AuditLogEntry, Page};
use shared_types::{Actor, EnvelopeId, WorkflowError};

/// Append-only audit ledger.
///
/// There is deliberately no update or delete: the trail is immutable by
/// construction. Implementations must assign sequence numbers atomically
/// relative to concurrent appends for the same envelope.
pub trait AuditLedger: Send + Sync {
    /// Appends an entry, assigning the envelope's next sequence number.
    ///
    /// # Errors
    ///
    /// `Internal` on storage faults only; appends have no preconditions.
    fn append(
        &self,
        envelope_id: EnvelopeId,
        kind: AuditEventKind,
        actor: Actor,
        metadata: serde_json::Value,
    ) -> Result<AuditLogEntry, WorkflowError>;

    /// Lists a page of entries ascending by sequence.
    ///
    /// # Errors
    ///
    /// `Internal` on storage faults.
    fn list(&self, envelope_id: EnvelopeId, page: Page) -> Result<Vec<AuditLogEntry>, WorkflowError>;

    /// Full trail for an envelope, ascending by sequence.
    ///
    /// # Errors
    ///
    /// `Internal` on storage faults.
    fn entries(&self, envelope_id: EnvelopeId) -> Result<Vec<AuditLogEntry>, WorkflowError>;
}
