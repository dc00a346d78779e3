//! Bus-driven seal worker.
//!
//! Consumes `SealRequested` events (at-least-once) and narrows them to
//! at-most-one concurrent seal per envelope through the lease store.
//! Duplicate requests while a lease is live drop harmlessly; the pipeline's
//! own idempotence covers re-delivery after a completed seal.

use crate::pipeline::SealingPipeline;
use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, SealLeaseStore, WorkflowEvent};
use shared_types::EnvelopeId;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Background worker executing seal requests.
pub struct SealWorker {
    bus: Arc<InMemoryEventBus>,
    leases: Arc<SealLeaseStore>,
    pipeline: Arc<SealingPipeline>,
}

impl SealWorker {
    /// Wires the worker to the bus, lease store, and pipeline.
    #[must_use]
    pub fn new(
        bus: Arc<InMemoryEventBus>,
        leases: Arc<SealLeaseStore>,
        pipeline: Arc<SealingPipeline>,
    ) -> Self {
        Self {
            bus,
            leases,
            pipeline,
        }
    }

    /// Consumes seal requests until the bus closes.
    pub async fn run(self) {
        let mut subscription = self.bus.subscribe(EventFilter::topics(vec![EventTopic::Sealing]));
        info!("Seal worker started");
        while let Some(event) = subscription.recv().await {
            if let WorkflowEvent::SealRequested { envelope_id } = event {
                self.handle(envelope_id).await;
            }
        }
        info!("Seal worker stopped: bus closed");
    }

    /// Spawns the consume loop on the current runtime.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Runs one seal request under the envelope's lease.
    pub async fn handle(&self, envelope_id: EnvelopeId) {
        let token = match self.leases.acquire(envelope_id) {
            Ok(token) => token,
            Err(_) => {
                debug!(envelope = %envelope_id, "Seal lease held, dropping duplicate request");
                return;
            }
        };

        match self.pipeline.seal(envelope_id).await {
            Ok(artifact) => {
                info!(envelope = %envelope_id, hash = %artifact.content_hash, "Seal finished");
            }
            Err(e) => {
                error!(envelope = %envelope_id, error = %e, "Seal failed");
            }
        }

        if let Err(e) = self.leases.release(&token) {
            // Lapsed and taken over; the new holder owns the outcome.
            debug!(envelope = %envelope_id, error = %e, "Lease release skipped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::certs::StaticCertificateSource;
    use crate::adapters::ed25519::Ed25519Signer;
    use crate::adapters::memory::{
        InMemoryArtifactStore, InMemoryDocumentSource, TextOverlayRenderer,
    };
    use crate::config::SealingConfig;
    use crate::ports::ArtifactStore;
    use crate::domain::entities::CertificateChain;
    use audit_ledger::{AuditLedger, InMemoryAuditLedger};
    use envelope_engine::{
        DocumentRef, Envelope, EnvelopeStatus, EnvelopeStore, Field, InMemoryEnvelopeStore,
        InsertedValue, Recipient, RecipientRole, RecipientStatus,
    };
    use field_validation::{FieldKind, FieldValue};
    use shared_bus::EventPublisher;
    use shared_types::{AccountId, MockTimeSource};
    use std::time::Duration;

    struct Fixture {
        store: Arc<InMemoryEnvelopeStore>,
        artifacts: Arc<InMemoryArtifactStore>,
        bus: Arc<InMemoryEventBus>,
        leases: Arc<SealLeaseStore>,
        worker: SealWorker,
    }

    fn fixture() -> Fixture {
        let time = Arc::new(MockTimeSource::new(1_000_000));
        let store = Arc::new(InMemoryEnvelopeStore::new());
        let ledger = Arc::new(InMemoryAuditLedger::new(time.clone()));
        let bus = Arc::new(InMemoryEventBus::new());
        let documents = Arc::new(InMemoryDocumentSource::new());
        let artifacts = Arc::new(InMemoryArtifactStore::new());
        documents.insert("doc-1", b"original".to_vec());

        let pipeline = Arc::new(SealingPipeline::new(
            store.clone(),
            ledger.clone() as Arc<dyn AuditLedger>,
            bus.clone(),
            documents,
            Arc::new(TextOverlayRenderer::new()),
            Arc::new(Ed25519Signer::generate("seal-key")),
            Arc::new(StaticCertificateSource::single(
                "seal-key",
                CertificateChain::single(b"cert".to_vec()),
            )),
            artifacts.clone(),
            time.clone(),
            SealingConfig::default(),
        ));
        let leases = Arc::new(SealLeaseStore::new(time));
        let worker = SealWorker::new(bus.clone(), leases.clone(), pipeline);

        Fixture {
            store,
            artifacts,
            bus,
            leases,
            worker,
        }
    }

    fn sealable_envelope(store: &InMemoryEnvelopeStore) -> Envelope {
        let mut signer = Recipient::new(RecipientRole::Signer, "Ada", "ada@example.com");
        signer.status = RecipientStatus::Signed;
        signer.signed_at = Some(999_000);
        let mut field = Field::new(signer.id, FieldKind::Signature, 1);
        field.inserted = Some(InsertedValue {
            value: FieldValue::text("Ada Lovelace"),
            inserted_at: 998_000,
            inserted_by: signer.id,
        });
        let envelope = Envelope {
            id: shared_types::EnvelopeId::new(),
            owner: AccountId::new(),
            status: EnvelopeStatus::Pending,
            recipients: vec![signer],
            fields: vec![field],
            document: DocumentRef {
                title: "Lease".into(),
                storage_key: "doc-1".into(),
            },
            completed_at: None,
            archived_at: None,
            sealing: None,
        };
        store.insert(envelope.clone()).unwrap();
        envelope
    }

    #[tokio::test]
    async fn test_worker_seals_on_request() {
        let fx = fixture();
        let envelope = sealable_envelope(&fx.store);

        fx.worker.handle(envelope.id).await;

        assert_eq!(
            fx.store.load(envelope.id).unwrap().status,
            EnvelopeStatus::Completed
        );
        assert!(fx.artifacts.get(envelope.id).is_some());
        assert!(!fx.leases.is_held(envelope.id));
    }

    #[tokio::test]
    async fn test_held_lease_drops_duplicate() {
        let fx = fixture();
        let envelope = sealable_envelope(&fx.store);

        let _token = fx.leases.acquire(envelope.id).unwrap();
        fx.worker.handle(envelope.id).await;

        // The duplicate was dropped: no seal ran.
        assert_eq!(
            fx.store.load(envelope.id).unwrap().status,
            EnvelopeStatus::Pending
        );
        assert!(fx.artifacts.get(envelope.id).is_none());
    }

    #[tokio::test]
    async fn test_worker_consumes_bus_events() {
        let fx = fixture();
        let envelope = sealable_envelope(&fx.store);
        let store = fx.store.clone();
        let handle = fx.worker.spawn();

        fx.bus
            .publish(WorkflowEvent::SealRequested {
                envelope_id: envelope.id,
            })
            .await;

        // Poll until the worker finishes the seal.
        for _ in 0..100 {
            if store.load(envelope.id).unwrap().status == EnvelopeStatus::Completed {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(
            store.load(envelope.id).unwrap().status,
            EnvelopeStatus::Completed
        );
        handle.abort();
    }
}
