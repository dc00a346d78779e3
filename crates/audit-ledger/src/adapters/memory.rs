//! In-memory ledger adapter.
//!
//! Per-envelope vectors behind one mutex: the sequence read and the push are
//! a single critical section, so concurrent appends for the same envelope
//! serialize and the sequence stays contiguous.

use crate::domain::entities::{AuditEventKind, AuditLogEntry, Page};
use crate::ports::AuditLedger;
use shared_types::{Actor, EnvelopeId, TimeSource, WorkflowError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Mutex-guarded in-memory ledger.
pub struct InMemoryAuditLedger {
    entries: Mutex<HashMap<EnvelopeId, Vec<AuditLogEntry>>>,
    time: Arc<dyn TimeSource>,
}

impl InMemoryAuditLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new(time: Arc<dyn TimeSource>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            time,
        }
    }
}

impl AuditLedger for InMemoryAuditLedger {
    fn append(
        &self,
        envelope_id: EnvelopeId,
        kind: AuditEventKind,
        actor: Actor,
        metadata: serde_json::Value,
    ) -> Result<AuditLogEntry, WorkflowError> {
        let timestamp = self.time.now();
        let mut entries = lock_unpoisoned(&self.entries);
        let trail = entries.entry(envelope_id).or_default();

        let entry = AuditLogEntry {
            envelope_id,
            sequence: trail.len() as u64 + 1,
            kind,
            actor,
            timestamp,
            metadata,
        };
        trail.push(entry.clone());

        debug!(
            envelope = %envelope_id,
            sequence = entry.sequence,
            kind = ?kind,
            "Audit entry appended"
        );
        Ok(entry)
    }

    fn list(
        &self,
        envelope_id: EnvelopeId,
        page: Page,
    ) -> Result<Vec<AuditLogEntry>, WorkflowError> {
        let entries = lock_unpoisoned(&self.entries);
        Ok(entries
            .get(&envelope_id)
            .map(|trail| {
                trail
                    .iter()
                    .skip(page.offset)
                    .take(page.limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn entries(&self, envelope_id: EnvelopeId) -> Result<Vec<AuditLogEntry>, WorkflowError> {
        let entries = lock_unpoisoned(&self.entries);
        Ok(entries.get(&envelope_id).cloned().unwrap_or_default())
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
