//! Outbound ports of the sealing pipeline.
//!
//! The renderer and signer are deliberately ports: PDF composition and
//! KMS/HSM key operations live outside this crate. The adapters shipped here
//! are the single-node implementations.

use crate::domain::entities::{CertificateChain, SealedArtifact, SealingError, SignerIdentity};
use async_trait::async_trait;
use envelope_engine::Field;
use shared_types::EnvelopeId;

/// Source of original document bytes, addressed by storage key.
pub trait DocumentSource: Send + Sync {
    /// Fetches the original bytes for a storage key.
    ///
    /// # Errors
    ///
    /// `Fatal` for unknown keys, `Retryable` for transient storage faults.
    fn fetch(&self, storage_key: &str) -> Result<Vec<u8>, SealingError>;
}

/// Renders inserted field values onto the original document.
pub trait DocumentRenderer: Send + Sync {
    /// Composes the final document from the original and the inserted fields.
    ///
    /// # Errors
    ///
    /// `Fatal` when the document cannot be composed.
    fn render_fields(&self, original: &[u8], fields: &[Field]) -> Result<Vec<u8>, SealingError>;
}

/// Produces the seal signature. Pluggable: local key or remote HSM/KMS.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Signs `bytes` under `identity`, returning the detached signature.
    ///
    /// # Errors
    ///
    /// `Retryable` for transient service failures, `Fatal` for key/config
    /// problems.
    async fn sign(&self, bytes: &[u8], identity: &SignerIdentity) -> Result<Vec<u8>, SealingError>;

    /// Signature algorithm name recorded on the artifact.
    fn algorithm(&self) -> &'static str;
}

/// Publishes certificate material for a signer identity.
///
/// Independent of the key operation: the same identity may sign locally while
/// its chain is served from config, a file, or a remote store.
pub trait CertificateSource: Send + Sync {
    /// The certificate chain for an identity, leaf first.
    ///
    /// # Errors
    ///
    /// `Fatal` for unknown identities or unreadable material.
    fn certificate_chain(&self, identity: &SignerIdentity) -> Result<CertificateChain, SealingError>;
}

/// Storage for sealed artifacts.
pub trait ArtifactStore: Send + Sync {
    /// Persists an artifact, returning its storage key.
    ///
    /// # Errors
    ///
    /// `Retryable` for transient storage faults.
    fn put(&self, artifact: SealedArtifact) -> Result<String, SealingError>;

    /// Loads the artifact sealed for an envelope, if any.
    fn get(&self, envelope_id: EnvelopeId) -> Option<SealedArtifact>;
}
