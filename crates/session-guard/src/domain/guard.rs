//! The per-pair step-up state machine.
//!
//! All mutation for a pair happens under one lock: the attempt decrement and
//! proof creation cannot be separated by a concurrent caller, so an attempt
//! can never be spent twice and a turn cannot be verified against a code that
//! a parallel `verify` already exhausted.

use super::entities::{CodeDigest, IssuedCode, ProofId, SessionProof, StepUpStatus};
use rand::Rng;
use shared_types::{
    rate_limiter::presets, EnvelopeId, RateLimiter, RecipientId, StepUpFailure, TimeSource,
    Timestamp, WorkflowError,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Guard configuration.
#[derive(Debug, Clone)]
pub struct SessionGuardConfig {
    /// Code validity window in milliseconds.
    pub code_ttl_ms: u64,
    /// Proof validity window in milliseconds (independent, longer).
    pub proof_ttl_ms: u64,
    /// Verification attempts per issued code.
    pub max_attempts: u32,
    /// Whether issuance is rate limited per pair.
    pub rate_limit_issuance: bool,
}

impl Default for SessionGuardConfig {
    fn default() -> Self {
        Self {
            code_ttl_ms: 10 * 60 * 1000,
            proof_ttl_ms: 30 * 60 * 1000,
            max_attempts: 5,
            rate_limit_issuance: true,
        }
    }
}

type PairKey = (RecipientId, EnvelopeId);

struct ActiveCode {
    digest: CodeDigest,
    expires_at: Timestamp,
    attempts_remaining: u32,
}

#[derive(Default)]
struct PairState {
    code: Option<ActiveCode>,
    proof: Option<SessionProof>,
}

/// In-memory step-up guard keyed by (recipient, envelope).
pub struct SessionGuard {
    config: SessionGuardConfig,
    time: Arc<dyn TimeSource>,
    pairs: Mutex<HashMap<PairKey, PairState>>,
    limiters: Mutex<HashMap<PairKey, Arc<RateLimiter>>>,
}

impl SessionGuard {
    /// Creates a guard with default configuration.
    #[must_use]
    pub fn new(time: Arc<dyn TimeSource>) -> Self {
        Self::with_config(time, SessionGuardConfig::default())
    }

    /// Creates a guard with explicit configuration.
    #[must_use]
    pub fn with_config(time: Arc<dyn TimeSource>, config: SessionGuardConfig) -> Self {
        Self {
            config,
            time,
            pairs: Mutex::new(HashMap::new()),
            limiters: Mutex::new(HashMap::new()),
        }
    }

    /// Issues a fresh one-time code for the pair.
    ///
    /// Any prior unexpired code is invalidated synchronously: there is never a
    /// window with two simultaneously valid codes for one pair.
    ///
    /// # Errors
    ///
    /// `StepUpFailed(RateLimited)` when issuance for the pair is throttled.
    pub fn issue_code(
        &self,
        recipient_id: RecipientId,
        envelope_id: EnvelopeId,
    ) -> Result<IssuedCode, WorkflowError> {
        if self.config.rate_limit_issuance && !self.limiter_for((recipient_id, envelope_id)).try_acquire() {
            warn!(recipient = %recipient_id, envelope = %envelope_id, "Code issuance rate limited");
            return Err(WorkflowError::StepUpFailed(StepUpFailure::RateLimited));
        }

        let now = self.time.now();
        let code = generate_code();
        let expires_at = now + self.config.code_ttl_ms;

        let mut pairs = lock_unpoisoned(&self.pairs);
        let state = pairs.entry((recipient_id, envelope_id)).or_default();
        state.code = Some(ActiveCode {
            digest: CodeDigest::of(&code),
            expires_at,
            attempts_remaining: self.config.max_attempts,
        });

        debug!(recipient = %recipient_id, envelope = %envelope_id, "Step-up code issued");

        Ok(IssuedCode {
            recipient_id,
            envelope_id,
            code,
            expires_at,
            attempts_allowed: self.config.max_attempts,
        })
    }

    /// Verifies a submitted code against the pair's active code.
    ///
    /// Expiry is evaluated by wall-clock comparison here, at use time. Each
    /// call against an active code spends one attempt; reaching zero locks the
    /// code out irrevocably until a new one is issued.
    ///
    /// # Errors
    ///
    /// `StepUpFailed` with the precise sub-kind: no active code, expired,
    /// attempts exhausted, or mismatch.
    pub fn verify(
        &self,
        recipient_id: RecipientId,
        envelope_id: EnvelopeId,
        submitted: &str,
    ) -> Result<SessionProof, WorkflowError> {
        let now = self.time.now();
        let mut pairs = lock_unpoisoned(&self.pairs);
        let state = pairs
            .entry((recipient_id, envelope_id))
            .or_default();

        let Some(code) = state.code.as_mut() else {
            return Err(WorkflowError::StepUpFailed(StepUpFailure::NoActiveCode));
        };

        if code.expires_at <= now {
            return Err(WorkflowError::StepUpFailed(StepUpFailure::CodeExpired));
        }
        if code.attempts_remaining == 0 {
            return Err(WorkflowError::StepUpFailed(StepUpFailure::AttemptsExhausted));
        }

        // Spend the attempt before comparing; a mismatch costs one.
        code.attempts_remaining -= 1;

        if !code.digest.matches(submitted) {
            let remaining = code.attempts_remaining;
            warn!(
                recipient = %recipient_id,
                envelope = %envelope_id,
                remaining,
                "Step-up code mismatch"
            );
            return Err(WorkflowError::StepUpFailed(if remaining == 0 {
                StepUpFailure::AttemptsExhausted
            } else {
                StepUpFailure::CodeMismatch
            }));
        }

        // Success: retire the code and mint the proof in the same critical
        // section.
        state.code = None;
        let proof = SessionProof {
            id: ProofId::new(),
            recipient_id,
            envelope_id,
            verified_at: now,
            expires_at: now + self.config.proof_ttl_ms,
        };
        state.proof = Some(proof.clone());

        debug!(recipient = %recipient_id, envelope = %envelope_id, "Step-up verified");
        Ok(proof)
    }

    /// Pure read of the pair's position. Safe to poll.
    #[must_use]
    pub fn status(&self, recipient_id: RecipientId, envelope_id: EnvelopeId) -> StepUpStatus {
        let now = self.time.now();
        let pairs = lock_unpoisoned(&self.pairs);
        let state = pairs.get(&(recipient_id, envelope_id));

        let code_active = state
            .and_then(|s| s.code.as_ref())
            .is_some_and(|c| c.expires_at > now && c.attempts_remaining > 0);
        let attempts_remaining = state
            .and_then(|s| s.code.as_ref())
            .filter(|c| c.expires_at > now)
            .map(|c| c.attempts_remaining);
        let proof_valid = state
            .and_then(|s| s.proof.as_ref())
            .is_some_and(|p| p.expires_at > now);

        StepUpStatus {
            required: true,
            code_active,
            proof_valid,
            attempts_remaining,
        }
    }

    /// Validates a proof presented at signing time.
    ///
    /// # Errors
    ///
    /// `StepUpRequired` when no proof with this id exists for the pair;
    /// `StepUpFailed(ProofExpired)` when its window has elapsed.
    pub fn check_proof(
        &self,
        recipient_id: RecipientId,
        envelope_id: EnvelopeId,
        proof_id: ProofId,
    ) -> Result<(), WorkflowError> {
        let now = self.time.now();
        let pairs = lock_unpoisoned(&self.pairs);

        let proof = pairs
            .get(&(recipient_id, envelope_id))
            .and_then(|s| s.proof.as_ref())
            .filter(|p| p.id == proof_id)
            .ok_or(WorkflowError::StepUpRequired)?;

        if proof.expires_at <= now {
            return Err(WorkflowError::StepUpFailed(StepUpFailure::ProofExpired));
        }
        Ok(())
    }

    fn limiter_for(&self, pair: PairKey) -> Arc<RateLimiter> {
        let mut limiters = lock_unpoisoned(&self.limiters);
        limiters
            .entry(pair)
            .or_insert_with(|| Arc::new(presets::step_up_issuance()))
            .clone()
    }
}

/// Six decimal digits, zero-padded.
fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{n:06}")
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
