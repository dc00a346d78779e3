//! # Sealing Pipeline
//!
//! Turns a fully-signed Pending envelope into an immutable sealed artifact:
//! composed document, trailing certificate, cryptographic signature, and the
//! atomic Pending→Completed flip.
//!
//! ## Pipeline Steps
//!
//! ```text
//! [SealRequested] → re-validate → compose → certify → sign → persist + flip
//!                       │                              │
//!                       │ Rejected/archived            │ retryable errors:
//!                       └──→ abort (fatal)             └──→ bounded backoff
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Sealing an already-Completed envelope returns the existing artifact | `pipeline.rs` `seal()` step 1 |
//! | Rejected or archived envelopes never seal | `pipeline.rs` re-validation checkpoint |
//! | The envelope stays Pending until the artifact is persisted | `pipeline.rs` flip is the last step |
//! | At most one concurrent seal per envelope | `worker.rs` via `SealLeaseStore` |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ports/    - DocumentSource, DocumentRenderer, Signer, CertificateSource,
//!             ArtifactStore
//! domain/   - SealedArtifact, SealingError, RetryPolicy
//! adapters/ - in-memory stores, text-overlay renderer, ed25519 signer,
//!             static/file certificate sources
//! pipeline.rs - the five-step seal
//! worker.rs   - bus-driven worker with per-envelope leases
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod pipeline;
pub mod ports;
pub mod worker;

pub use adapters::certs::{FileCertificateSource, StaticCertificateSource};
pub use adapters::ed25519::Ed25519Signer;
pub use adapters::memory::{InMemoryArtifactStore, InMemoryDocumentSource, TextOverlayRenderer};
pub use config::SealingConfig;
pub use domain::entities::{
    CertificateChain, RetryPolicy, SealedArtifact, SealingError, SignatureMeta, SignerIdentity,
};
pub use pipeline::SealingPipeline;
pub use ports::{ArtifactStore, CertificateSource, DocumentRenderer, DocumentSource, Signer};
pub use worker::SealWorker;
