//! Sealed artifacts, sealing errors, retry policy.

use audit_ledger::CertificateDocument;
use serde::{Deserialize, Serialize};
use shared_types::{EnvelopeId, Timestamp};
use std::time::Duration;
use thiserror::Error;

/// The signing identity the pipeline seals under.
///
/// Identifies a key held by the `Signer` implementation and the certificate
/// chain published for it; the key operation and the chain lookup are
/// independent concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerIdentity {
    /// Opaque key identifier understood by the signer and certificate source.
    pub key_id: String,
}

impl SignerIdentity {
    /// Convenience constructor.
    #[must_use]
    pub fn new(key_id: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
        }
    }
}

/// Certificate material published for a signer identity.
///
/// A single self-contained certificate or a full chain, leaf first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateChain {
    /// DER/PEM blobs, leaf first.
    pub certificates: Vec<Vec<u8>>,
}

impl CertificateChain {
    /// Single-certificate chain.
    #[must_use]
    pub fn single(certificate: Vec<u8>) -> Self {
        Self {
            certificates: vec![certificate],
        }
    }

    /// The leaf certificate, when the chain is non-empty.
    #[must_use]
    pub fn leaf(&self) -> Option<&[u8]> {
        self.certificates.first().map(Vec::as_slice)
    }
}

/// Signature metadata recorded on the artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureMeta {
    /// Signature algorithm name (e.g. `"Ed25519"`).
    pub algorithm: String,
    /// The key the artifact was signed under.
    pub key_id: String,
    /// Number of certificates in the published chain.
    pub chain_length: usize,
}

/// The immutable output of a successful seal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SealedArtifact {
    /// The sealed envelope.
    pub envelope_id: EnvelopeId,
    /// Composed document with the trailing certificate section.
    pub bytes: Vec<u8>,
    /// Hex SHA-256 of the composed (pre-certificate) content.
    pub content_hash: String,
    /// The certificate projected from the audit trail.
    pub certificate: CertificateDocument,
    /// Detached signature over `bytes`.
    pub signature: Vec<u8>,
    /// How the signature was produced.
    pub signature_meta: SignatureMeta,
    /// When sealing finished.
    pub sealed_at: Timestamp,
}

/// Sealing failures, split by whether a retry can help.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SealingError {
    /// Transient failure (network, remote signer hiccup); retried with backoff.
    #[error("Retryable sealing failure: {0}")]
    Retryable(String),

    /// Permanent failure (bad config, invalid certificate, aborted envelope).
    #[error("Fatal sealing failure: {0}")]
    Fatal(String),
}

impl SealingError {
    /// Whether another attempt can succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }
}

/// Bounded exponential backoff for retryable signing failures.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each retry.
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 50,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}
