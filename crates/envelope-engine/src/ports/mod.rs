//! Outbound port: envelope persistence.
//!
//! `update` is the engine's atomicity primitive. Implementations load the
//! envelope, hand a working copy to `mutate`, and commit only when `mutate`
//! returns `Ok`. An `Err` return leaves stored state untouched, which is what
//! makes every precondition failure a zero-mutation abort.

use crate::domain::entities::Envelope;
use shared_types::{EnvelopeId, WorkflowError};

/// Persistence port for envelopes.
pub trait EnvelopeStore: Send + Sync {
    /// Stores a new envelope. Fails `Internal` on id collision.
    fn insert(&self, envelope: Envelope) -> Result<(), WorkflowError>;

    /// Loads an envelope by id, archived or not.
    ///
    /// Visibility filtering is the caller's concern (`resolve_caller`), not
    /// the store's.
    fn load(&self, id: EnvelopeId) -> Result<Envelope, WorkflowError>;

    /// Atomically mutates one envelope.
    ///
    /// `mutate` runs against a working copy under the store's write lock; the
    /// copy replaces the stored envelope only on `Ok`. Returns the committed
    /// envelope.
    fn update(
        &self,
        id: EnvelopeId,
        mutate: &mut dyn FnMut(&mut Envelope) -> Result<(), WorkflowError>,
    ) -> Result<Envelope, WorkflowError>;
}
