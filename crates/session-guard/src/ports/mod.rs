//! Inbound port: the step-up API the envelope engine drives.

use crate::domain::entities::{IssuedCode, ProofId, SessionProof, StepUpStatus};
use crate::domain::guard::SessionGuard;
use shared_types::{EnvelopeId, RecipientId, WorkflowError};

/// Step-up verification API.
///
/// Implementations must be thread-safe (`Send + Sync`); the engine calls in
/// from concurrent request handlers.
pub trait SessionGuardApi: Send + Sync {
    /// Issues a one-time code, invalidating any prior unexpired code for the
    /// pair.
    ///
    /// # Errors
    ///
    /// `StepUpFailed(RateLimited)` when issuance is throttled.
    fn issue_code(
        &self,
        recipient_id: RecipientId,
        envelope_id: EnvelopeId,
    ) -> Result<IssuedCode, WorkflowError>;

    /// Verifies a submitted code, spending one attempt.
    ///
    /// # Errors
    ///
    /// `StepUpFailed` with the precise failure sub-kind.
    fn verify(
        &self,
        recipient_id: RecipientId,
        envelope_id: EnvelopeId,
        submitted: &str,
    ) -> Result<SessionProof, WorkflowError>;

    /// Pure read of the pair's step-up position.
    fn status(&self, recipient_id: RecipientId, envelope_id: EnvelopeId) -> StepUpStatus;

    /// Validates a proof presented at signing time.
    ///
    /// # Errors
    ///
    /// `StepUpRequired` for unknown proofs, `StepUpFailed(ProofExpired)` for
    /// lapsed ones.
    fn check_proof(
        &self,
        recipient_id: RecipientId,
        envelope_id: EnvelopeId,
        proof_id: ProofId,
    ) -> Result<(), WorkflowError>;
}

impl SessionGuardApi for SessionGuard {
    fn issue_code(
        &self,
        recipient_id: RecipientId,
        envelope_id: EnvelopeId,
    ) -> Result<IssuedCode, WorkflowError> {
        SessionGuard::issue_code(self, recipient_id, envelope_id)
    }

    fn verify(
        &self,
        recipient_id: RecipientId,
        envelope_id: EnvelopeId,
        submitted: &str,
    ) -> Result<SessionProof, WorkflowError> {
        SessionGuard::verify(self, recipient_id, envelope_id, submitted)
    }

    fn status(&self, recipient_id: RecipientId, envelope_id: EnvelopeId) -> StepUpStatus {
        SessionGuard::status(self, recipient_id, envelope_id)
    }

    fn check_proof(
        &self,
        recipient_id: RecipientId,
        envelope_id: EnvelopeId,
        proof_id: ProofId,
    ) -> Result<(), WorkflowError> {
        SessionGuard::check_proof(self, recipient_id, envelope_id, proof_id)
    }
}
