//! Shared wiring for the integration suite: the whole platform in memory,
//! driven by a mock clock.

use audit_ledger::InMemoryAuditLedger;
use envelope_engine::{
    DocumentRef, EngineConfig, EnvelopeService, EnvelopeStore, Field, InMemoryEnvelopeStore,
    Recipient, RecipientRole,
};
use field_validation::FieldKind;
use sealing_pipeline::{
    CertificateChain, Ed25519Signer, InMemoryArtifactStore, InMemoryDocumentSource, SealWorker,
    SealingConfig, SealingPipeline, StaticCertificateSource, TextOverlayRenderer,
};
use session_guard::SessionGuard;
use shared_bus::{InMemoryEventBus, SealLeaseStore};
use shared_types::{AccountId, CallerIdentity, MockTimeSource};
use std::sync::Arc;
use std::time::Duration;

pub struct Platform {
    pub service: EnvelopeService,
    pub store: Arc<InMemoryEnvelopeStore>,
    pub ledger: Arc<InMemoryAuditLedger>,
    pub bus: Arc<InMemoryEventBus>,
    pub documents: Arc<InMemoryDocumentSource>,
    pub artifacts: Arc<InMemoryArtifactStore>,
    pub leases: Arc<SealLeaseStore>,
    pub pipeline: Arc<SealingPipeline>,
    pub clock: Arc<MockTimeSource>,
    pub owner: CallerIdentity,
}

impl Platform {
    pub fn new() -> Self {
        vellum_telemetry::init_for_tests();

        let clock = Arc::new(MockTimeSource::new(1_700_000_000_000));
        let store = Arc::new(InMemoryEnvelopeStore::new());
        let ledger = Arc::new(InMemoryAuditLedger::new(clock.clone()));
        let bus = Arc::new(InMemoryEventBus::new());
        let guard = Arc::new(SessionGuard::new(clock.clone()));
        let documents = Arc::new(InMemoryDocumentSource::new());
        let artifacts = Arc::new(InMemoryArtifactStore::new());
        let leases = Arc::new(SealLeaseStore::new(clock.clone()));

        let service = EnvelopeService::new(
            store.clone(),
            ledger.clone(),
            guard,
            bus.clone(),
            clock.clone(),
            EngineConfig::default(),
        );
        let pipeline = Arc::new(SealingPipeline::new(
            store.clone(),
            ledger.clone(),
            bus.clone(),
            documents.clone(),
            Arc::new(TextOverlayRenderer::new()),
            Arc::new(Ed25519Signer::generate("seal-key")),
            Arc::new(StaticCertificateSource::single(
                "seal-key",
                CertificateChain::single(b"cert".to_vec()),
            )),
            artifacts.clone(),
            clock.clone(),
            SealingConfig::default(),
        ));

        Self {
            service,
            store,
            ledger,
            bus,
            documents,
            artifacts,
            leases,
            pipeline,
            clock,
            owner: CallerIdentity::Account(AccountId::new()),
        }
    }

    /// Spawns the seal worker on the current runtime.
    pub fn spawn_worker(&self) -> tokio::task::JoinHandle<()> {
        SealWorker::new(self.bus.clone(), self.leases.clone(), self.pipeline.clone())
            .spawn()
    }

    /// Stores document bytes and returns a reference to them.
    pub fn document(&self, title: &str, key: &str) -> DocumentRef {
        self.documents.insert(key, format!("{title} body").into_bytes());
        DocumentRef {
            title: title.into(),
            storage_key: key.into(),
        }
    }

    /// Polls the store until the envelope satisfies `done` or the deadline
    /// passes.
    pub async fn wait_until(
        &self,
        envelope_id: shared_types::EnvelopeId,
        done: impl Fn(&envelope_engine::Envelope) -> bool,
    ) -> envelope_engine::Envelope {
        for _ in 0..200 {
            let envelope = self.store.load(envelope_id).unwrap();
            if done(&envelope) {
                return envelope;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached for envelope {envelope_id}");
    }
}

/// A ranked signer with one required signature field.
pub fn ranked_signer(name: &str, email: &str, order: u32) -> (Recipient, Field) {
    let signer = Recipient::new(RecipientRole::Signer, name, email).with_order(order);
    let field = Field::new(signer.id, FieldKind::Signature, 1);
    (signer, field)
}
