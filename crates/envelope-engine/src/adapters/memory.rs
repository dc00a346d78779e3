//! In-memory envelope store.
//!
//! One mutex over the whole map. `update` clones the stored envelope, runs
//! the mutation against the clone, and writes the clone back only on `Ok`;
//! the stored envelope is never observed mid-mutation.

use crate::domain::entities::Envelope;
use crate::ports::EnvelopeStore;
use shared_types::{EnvelopeId, WorkflowError};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// Mutex-guarded in-memory store.
#[derive(Default)]
pub struct InMemoryEnvelopeStore {
    envelopes: Mutex<HashMap<EnvelopeId, Envelope>>,
}

impl InMemoryEnvelopeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EnvelopeStore for InMemoryEnvelopeStore {
    fn insert(&self, envelope: Envelope) -> Result<(), WorkflowError> {
        let mut envelopes = lock_unpoisoned(&self.envelopes);
        if envelopes.contains_key(&envelope.id) {
            return Err(WorkflowError::Internal(format!(
                "envelope id collision: {}",
                envelope.id
            )));
        }
        debug!(envelope = %envelope.id, "Envelope stored");
        envelopes.insert(envelope.id, envelope);
        Ok(())
    }

    fn load(&self, id: EnvelopeId) -> Result<Envelope, WorkflowError> {
        let envelopes = lock_unpoisoned(&self.envelopes);
        envelopes.get(&id).cloned().ok_or(WorkflowError::NotFound)
    }

    fn update(
        &self,
        id: EnvelopeId,
        mutate: &mut dyn FnMut(&mut Envelope) -> Result<(), WorkflowError>,
    ) -> Result<Envelope, WorkflowError> {
        let mut envelopes = lock_unpoisoned(&self.envelopes);
        let stored = envelopes.get(&id).ok_or(WorkflowError::NotFound)?;

        let mut working = stored.clone();
        mutate(&mut working)?;

        envelopes.insert(id, working.clone());
        Ok(working)
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
