//! # Envelope State Machine
//!
//! Owns the envelope/recipient/field lifecycle, signing-order enforcement,
//! and authorization; orchestrates the validation engine, the session guard,
//! the audit ledger, and the event bus.
//!
//! ## Status Machine
//!
//! ```text
//! [DRAFT] ──send──→ [PENDING] ──last required signature + seal──→ [COMPLETED]
//!                        │
//!                        └── any rejection ──→ [REJECTED]
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Status transitions are monotonic; terminal states exclusive | `domain/entities.rs` `EnvelopeStatus::can_transition_to` |
//! | A recipient acts only after all strictly-lower-rank non-CC recipients finish | `domain/turn.rs` |
//! | A field cannot be inserted twice without explicit removal | `service.rs` `act_on_field()` |
//! | Precondition failure aborts with zero partial mutation | `ports/mod.rs` `EnvelopeStore::update` (clone-commit) |
//! | Authorization is checked before every mutation | `service.rs` `resolve_caller()` first in every operation |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ports/    - EnvelopeStore trait (atomic per-envelope update)
//! domain/   - entities, turn ordering, caller resolution
//! adapters/ - in-memory store
//! service.rs- EnvelopeService orchestrator
//! config.rs - engine configuration
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::memory::InMemoryEnvelopeStore;
pub use config::EngineConfig;
pub use domain::access::AuthorizedActor;
pub use domain::entities::{
    CompletionOutcome, DocumentRef, Envelope, EnvelopeStatus, Field, FieldAction, InsertedValue,
    Recipient, RecipientRole, RecipientStatus, SealInfo,
};
pub use ports::EnvelopeStore;
pub use service::EnvelopeService;
