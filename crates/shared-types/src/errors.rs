//! Workflow error kinds.
//!
//! All expected failures are typed and caller-recoverable. `OutOfTurn` and
//! `StepUpRequired` are ordinary workflow states a UI must render distinctly,
//! not generic failures.

use crate::ids::RecipientId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single structured validation failure for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Stable machine-readable code (e.g. `"empty"`, `"too_long"`, `"not_an_option"`).
    pub code: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl FieldViolation {
    /// Convenience constructor.
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Why a step-up verification attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepUpFailure {
    /// No code has been issued for this (recipient, envelope) pair.
    NoActiveCode,
    /// The active code's validity window has elapsed.
    CodeExpired,
    /// The attempt budget for the active code is spent.
    AttemptsExhausted,
    /// The submitted code does not match.
    CodeMismatch,
    /// The previously issued proof has expired.
    ProofExpired,
    /// Code issuance for the pair is rate limited.
    RateLimited,
}

/// Errors surfaced by the signing-workflow core.
///
/// `NotFound` deliberately covers both "does not exist" and "exists but is not
/// visible to this caller" so existence never leaks through error kinds.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowError {
    /// Envelope, recipient, or field is missing or invisible to the caller.
    #[error("Not found")]
    NotFound,

    /// Caller identity resolved, but lacks authority for this action.
    #[error("Unauthorized")]
    Unauthorized,

    /// The action is illegal from the envelope's current status.
    #[error("Invalid state: cannot {action} while {status}")]
    InvalidState {
        /// Current envelope status name.
        status: &'static str,
        /// Attempted action name.
        action: &'static str,
    },

    /// A lower-ranked recipient has not finished yet.
    #[error("Out of turn: waiting on {waiting_on:?}")]
    OutOfTurn {
        /// The blocking recipient.
        waiting_on: RecipientId,
    },

    /// Field value rejected by the validation engine.
    #[error("Validation failed: {0:?}")]
    ValidationFailed(Vec<FieldViolation>),

    /// The recipient must complete step-up verification before signing.
    #[error("Step-up verification required")]
    StepUpRequired,

    /// Step-up verification failed.
    #[error("Step-up failed: {0:?}")]
    StepUpFailed(StepUpFailure),

    /// Sealing exhausted its retry budget or hit a fatal condition.
    #[error("Sealing failed: {0}")]
    SealingFailed(String),

    /// Unexpected failure (storage outage, programmer error).
    #[error("Internal error: {0}")]
    Internal(String),
}
