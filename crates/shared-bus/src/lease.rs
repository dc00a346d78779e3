//! # Seal Lease Store
//!
//! Per-envelope execution lease approximating at-most-once sealing on top of
//! the bus's at-least-once delivery.
//!
//! ## Design
//!
//! - A worker must `acquire` the envelope's lease before running the pipeline
//! - A second worker acquiring the same envelope while the lease is live gets
//!   `LeaseError::Held`, so duplicate `SealRequested` events drop harmlessly
//! - Leases carry an expiry so a crashed worker cannot wedge an envelope;
//!   expiry is checked lazily at acquisition time, no sweeper task

use shared_types::{EnvelopeId, TimeSource, Timestamp};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Default lease window: generous enough for a slow remote signer.
pub const DEFAULT_LEASE_MS: u64 = 5 * 60 * 1000;

/// Errors from lease operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LeaseError {
    /// Another worker holds a live lease for this envelope.
    #[error("Seal lease for envelope {envelope_id} is held until {expires_at}")]
    Held {
        /// The contested envelope.
        envelope_id: EnvelopeId,
        /// When the current lease lapses.
        expires_at: Timestamp,
    },

    /// Release was attempted with a token that does not hold the lease.
    #[error("Lease token mismatch for envelope {envelope_id}")]
    NotHolder {
        /// The envelope whose lease was released.
        envelope_id: EnvelopeId,
    },
}

/// Opaque proof of lease ownership, returned by `acquire`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseToken {
    envelope_id: EnvelopeId,
    holder: Uuid,
}

impl LeaseToken {
    /// The envelope this token leases.
    #[must_use]
    pub fn envelope_id(&self) -> EnvelopeId {
        self.envelope_id
    }
}

struct LeaseEntry {
    holder: Uuid,
    expires_at: Timestamp,
}

/// In-memory per-envelope lease store.
pub struct SealLeaseStore {
    leases: Mutex<HashMap<EnvelopeId, LeaseEntry>>,
    lease_ms: u64,
    time: Arc<dyn TimeSource>,
}

impl SealLeaseStore {
    /// Creates a store with the default lease window.
    #[must_use]
    pub fn new(time: Arc<dyn TimeSource>) -> Self {
        Self::with_lease_ms(time, DEFAULT_LEASE_MS)
    }

    /// Creates a store with a custom lease window.
    #[must_use]
    pub fn with_lease_ms(time: Arc<dyn TimeSource>, lease_ms: u64) -> Self {
        Self {
            leases: Mutex::new(HashMap::new()),
            lease_ms,
            time,
        }
    }

    /// Acquire the seal lease for an envelope.
    ///
    /// # Errors
    ///
    /// `LeaseError::Held` if another holder's lease has not lapsed yet.
    pub fn acquire(&self, envelope_id: EnvelopeId) -> Result<LeaseToken, LeaseError> {
        let now = self.time.now();
        let mut leases = lock_unpoisoned(&self.leases);

        if let Some(entry) = leases.get(&envelope_id) {
            if entry.expires_at > now {
                return Err(LeaseError::Held {
                    envelope_id,
                    expires_at: entry.expires_at,
                });
            }
            // Lapsed lease: fall through and take over.
        }

        let holder = Uuid::new_v4();
        leases.insert(
            envelope_id,
            LeaseEntry {
                holder,
                expires_at: now + self.lease_ms,
            },
        );
        debug!(envelope = %envelope_id, "Seal lease acquired");

        Ok(LeaseToken {
            envelope_id,
            holder,
        })
    }

    /// Release a held lease.
    ///
    /// # Errors
    ///
    /// `LeaseError::NotHolder` if the token no longer holds the lease (it
    /// lapsed and was taken over).
    pub fn release(&self, token: &LeaseToken) -> Result<(), LeaseError> {
        let mut leases = lock_unpoisoned(&self.leases);

        match leases.get(&token.envelope_id) {
            Some(entry) if entry.holder == token.holder => {
                leases.remove(&token.envelope_id);
                debug!(envelope = %token.envelope_id, "Seal lease released");
                Ok(())
            }
            _ => Err(LeaseError::NotHolder {
                envelope_id: token.envelope_id,
            }),
        }
    }

    /// Whether a live lease exists for an envelope.
    #[must_use]
    pub fn is_held(&self, envelope_id: EnvelopeId) -> bool {
        let now = self.time.now();
        lock_unpoisoned(&self.leases)
            .get(&envelope_id)
            .is_some_and(|entry| entry.expires_at > now)
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
