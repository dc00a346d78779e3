//! # Audit Ledger
//!
//! Append-only, strictly-ordered record of every state-affecting workflow
//! action, and the deterministic certificate projection built from it.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Entries are never updated or deleted | no such method exists on the port |
//! | Per-envelope sequence is contiguous 1..N | `adapters/memory.rs` `append()` under one lock |
//! | Certificate projection is deterministic | `domain/certificate.rs` (pure function of inputs) |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ports/    - AuditLedger trait
//! domain/   - AuditEventKind, AuditLogEntry, certificate projection
//! adapters/ - In-memory ledger (mutex-guarded per-envelope vectors)
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::memory::InMemoryAuditLedger;
pub use domain::certificate::{render_certificate, CertificateDocument, EnvelopeSnapshot, SignerSummary};
pub use domain::entities::{AuditEventKind, AuditLogEntry, Page};
pub use ports::AuditLedger;
