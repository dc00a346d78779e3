//! # Signing Session Guard
//!
//! Short-lived step-up verification (one-time code) gating the act of signing.
//!
//! ## Per-Pair State Machine
//!
//! Each (recipient, envelope) pair moves through:
//!
//! ```text
//! [NO_CODE] ──issue──→ [CODE_ACTIVE] ──verify ok──→ [VERIFIED]
//!                            │
//!                            ├── wall clock past expiry ──→ [EXPIRED]
//!                            └── attempts spent ──→ [ATTEMPTS_EXHAUSTED]
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | One active code per pair; issuance invalidates the predecessor | `domain/guard.rs` `issue_code()` |
//! | Attempt decrement and proof creation share one lock | `domain/guard.rs` `verify()` |
//! | Expiry is wall-clock comparison at use time, no sweeper | `domain/guard.rs` |
//! | Exhausted/expired codes can never verify | `domain/guard.rs` `verify()` |
//! | Stored codes are digests; comparison is constant-time | `domain/entities.rs` |

pub mod domain;
pub mod ports;

pub use domain::entities::{IssuedCode, ProofId, SessionProof, StepUpStatus};
pub use domain::guard::{SessionGuard, SessionGuardConfig};
pub use ports::SessionGuardApi;
