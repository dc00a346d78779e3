//! The five-step seal.
//!
//! Re-validate, compose, certify, sign, persist. The envelope flips
//! Pending→Completed only after the artifact is persisted; every earlier
//! failure leaves it Pending and re-sealable.

use crate::config::SealingConfig;
use crate::domain::entities::{SealedArtifact, SealingError, SignatureMeta};
use crate::ports::{ArtifactStore, CertificateSource, DocumentRenderer, DocumentSource, Signer};
use audit_ledger::{render_certificate, AuditEventKind, AuditLedger, EnvelopeSnapshot, SignerSummary};
use envelope_engine::{Envelope, EnvelopeStatus, EnvelopeStore, SealInfo};
use shared_bus::{EventPublisher, WorkflowEvent};
use shared_types::{Actor, EnvelopeId, TimeSource};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Seals fully-signed envelopes into immutable artifacts.
pub struct SealingPipeline {
    store: Arc<dyn EnvelopeStore>,
    ledger: Arc<dyn AuditLedger>,
    bus: Arc<dyn EventPublisher>,
    documents: Arc<dyn DocumentSource>,
    renderer: Arc<dyn DocumentRenderer>,
    signer: Arc<dyn Signer>,
    certificates: Arc<dyn CertificateSource>,
    artifacts: Arc<dyn ArtifactStore>,
    time: Arc<dyn TimeSource>,
    config: SealingConfig,
}

impl SealingPipeline {
    /// Wires the pipeline to its collaborators.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        store: Arc<dyn EnvelopeStore>,
        ledger: Arc<dyn AuditLedger>,
        bus: Arc<dyn EventPublisher>,
        documents: Arc<dyn DocumentSource>,
        renderer: Arc<dyn DocumentRenderer>,
        signer: Arc<dyn Signer>,
        certificates: Arc<dyn CertificateSource>,
        artifacts: Arc<dyn ArtifactStore>,
        time: Arc<dyn TimeSource>,
        config: SealingConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            bus,
            documents,
            renderer,
            signer,
            certificates,
            artifacts,
            time,
            config,
        }
    }

    /// Runs the seal for one envelope.
    ///
    /// Idempotent: an already-Completed envelope returns its existing
    /// artifact. Rejected or archived envelopes abort fatally; this is the
    /// cancellation checkpoint for stale `SealRequested` events.
    #[instrument(skip(self), fields(envelope = %envelope_id))]
    pub async fn seal(&self, envelope_id: EnvelopeId) -> Result<SealedArtifact, SealingError> {
        // Step 1: re-validate against current state.
        let envelope = self
            .store
            .load(envelope_id)
            .map_err(|e| SealingError::Fatal(format!("envelope load failed: {e}")))?;

        if envelope.status == EnvelopeStatus::Completed {
            info!(envelope = %envelope_id, "Already sealed, returning existing artifact");
            return self.artifacts.get(envelope_id).ok_or_else(|| {
                SealingError::Fatal("completed envelope has no artifact".to_string())
            });
        }
        if envelope.status == EnvelopeStatus::Rejected || envelope.archived_at.is_some() {
            return Err(SealingError::Fatal(
                "sealing aborted: envelope rejected or archived".to_string(),
            ));
        }
        if envelope.status != EnvelopeStatus::Pending {
            return Err(SealingError::Fatal(format!(
                "sealing aborted: envelope is {}",
                envelope.status.name()
            )));
        }
        if !envelope.all_required_signed() {
            return Err(SealingError::Fatal(
                "sealing aborted: required recipients not all signed".to_string(),
            ));
        }
        if envelope
            .fields
            .iter()
            .any(|f| f.required && f.inserted.is_none())
        {
            return Err(SealingError::Fatal(
                "sealing aborted: required fields not all inserted".to_string(),
            ));
        }

        // Step 2: compose.
        let original = self.documents.fetch(&envelope.document.storage_key)?;
        let composed = self.renderer.render_fields(&original, &envelope.fields)?;
        let content_hash = hex::encode(Sha256::digest(&composed));

        // Step 3: certify from the audit trail.
        let entries = self
            .ledger
            .entries(envelope_id)
            .map_err(|e| SealingError::Fatal(format!("audit trail unavailable: {e}")))?;
        let snapshot = envelope_snapshot(&envelope, content_hash.clone());
        let certificate = render_certificate(&snapshot, &entries);

        let chain = self.certificates.certificate_chain(&self.config.identity)?;

        let mut bytes = composed;
        bytes.extend_from_slice(b"\n");
        bytes.extend_from_slice(certificate.text.as_bytes());

        // Step 4: sign, with bounded backoff on retryable failures.
        let signature = self.sign_with_retries(&bytes).await?;

        // Step 5: persist, then flip atomically with the artifact reference.
        let sealed_at = self.time.now();
        let artifact = SealedArtifact {
            envelope_id,
            bytes,
            content_hash: content_hash.clone(),
            certificate,
            signature,
            signature_meta: SignatureMeta {
                algorithm: self.signer.algorithm().to_string(),
                key_id: self.config.identity.key_id.clone(),
                chain_length: chain.certificates.len(),
            },
            sealed_at,
        };
        let artifact_key = self.artifacts.put(artifact.clone())?;

        let ledger = &self.ledger;
        self.store
            .update(envelope_id, &mut |envelope| {
                if !envelope.status.can_transition_to(EnvelopeStatus::Completed) {
                    return Err(shared_types::WorkflowError::InvalidState {
                        status: envelope.status.name(),
                        action: "seal",
                    });
                }
                envelope.status = EnvelopeStatus::Completed;
                envelope.completed_at = Some(sealed_at);
                envelope.sealing = Some(SealInfo {
                    artifact_key: artifact_key.clone(),
                    content_hash: content_hash.clone(),
                    sealed_at,
                });
                ledger.append(
                    envelope.id,
                    AuditEventKind::EnvelopeSealed,
                    Actor::System,
                    serde_json::json!({ "artifact_key": artifact_key }),
                )?;
                Ok(())
            })
            .map_err(|e| SealingError::Fatal(format!("completion flip failed: {e}")))?;

        info!(envelope = %envelope_id, hash = %artifact.content_hash, "Envelope sealed");
        self.bus
            .publish(WorkflowEvent::EnvelopeCompleted { envelope_id })
            .await;
        Ok(artifact)
    }

    async fn sign_with_retries(&self, bytes: &[u8]) -> Result<Vec<u8>, SealingError> {
        let mut attempt = 1;
        loop {
            match self.signer.sign(bytes, &self.config.identity).await {
                Ok(signature) => return Ok(signature),
                Err(e) if e.is_retryable() && attempt < self.config.retry.max_attempts => {
                    warn!(attempt, error = %e, "Retryable signing failure, backing off");
                    tokio::time::sleep(self.config.retry.delay_after(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Projects the envelope into the certificate's signer summary, in signing
/// order (unranked recipients last, declaration order within a rank).
fn envelope_snapshot(envelope: &Envelope, content_hash: String) -> EnvelopeSnapshot {
    let mut signers: Vec<(usize, SignerSummary)> = envelope
        .recipients
        .iter()
        .enumerate()
        .filter(|(_, r)| r.role.requires_completion())
        .map(|(idx, r)| {
            (
                idx,
                SignerSummary {
                    recipient_id: r.id,
                    name: r.name.clone(),
                    email: r.email.clone(),
                    role: r.role.label().to_string(),
                    order: r.order,
                    signed_at: r.signed_at,
                },
            )
        })
        .collect();
    signers.sort_by_key(|(idx, s)| (s.order.unwrap_or(u32::MAX), *idx));

    EnvelopeSnapshot {
        envelope_id: envelope.id,
        title: envelope.document.title.clone(),
        content_hash,
        signers: signers.into_iter().map(|(_, s)| s).collect(),
    }
}
