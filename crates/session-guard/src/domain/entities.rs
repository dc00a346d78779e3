//! Codes, proofs, and pair status.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::{EnvelopeId, RecipientId, Timestamp};
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Identifier of a verified session proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProofId(Uuid);

impl ProofId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ProofId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// SHA-256 digest of a one-time code.
///
/// The plaintext code leaves the guard exactly once, inside `IssuedCode`;
/// only the digest is retained for verification.
#[derive(Debug, Clone)]
pub(crate) struct CodeDigest([u8; 32]);

impl CodeDigest {
    pub(crate) fn of(code: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(code.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Constant-time comparison against a submitted code.
    pub(crate) fn matches(&self, submitted: &str) -> bool {
        let other = Self::of(submitted);
        self.0.ct_eq(&other.0).into()
    }
}

/// A freshly issued one-time code, returned to the delivery channel once.
#[derive(Debug, Clone)]
pub struct IssuedCode {
    /// The recipient the code was issued to.
    pub recipient_id: RecipientId,
    /// The envelope the code is scoped to.
    pub envelope_id: EnvelopeId,
    /// Plaintext code for out-of-band delivery. Not retained by the guard.
    pub code: String,
    /// When the code stops verifying.
    pub expires_at: Timestamp,
    /// Verification attempts allowed against this code.
    pub attempts_allowed: u32,
}

/// Proof that a recipient completed step-up for one envelope.
///
/// Single-purpose: the engine checks it at signing time only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProof {
    /// Proof identifier presented back at signing time.
    pub id: ProofId,
    /// The recipient the proof belongs to.
    pub recipient_id: RecipientId,
    /// The envelope the proof is scoped to.
    pub envelope_id: EnvelopeId,
    /// When verification succeeded.
    pub verified_at: Timestamp,
    /// When the proof stops being accepted.
    pub expires_at: Timestamp,
}

/// Pure read of a pair's step-up position, for idempotent polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepUpStatus {
    /// Whether this pair requires step-up before signing.
    pub required: bool,
    /// Whether an unexpired code is active.
    pub code_active: bool,
    /// Whether an unexpired proof exists.
    pub proof_valid: bool,
    /// Attempts remaining on the active code, if any.
    pub attempts_remaining: Option<u32>,
}
