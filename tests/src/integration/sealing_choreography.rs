//! # Sealing Choreography Tests
//!
//! The full signing-to-sealed flow across crates:
//!
//! ```text
//! [Envelope Engine] ──SealRequested──→ [Event Bus] ──→ [Seal Worker]
//!                                                          │ lease
//!                                                          ↓
//!                                                   [Sealing Pipeline]
//!                                                          │
//!                              Pending→Completed ←─────────┘
//!                              + sealed artifact + certificate
//! ```

#[cfg(test)]
mod tests {
    use crate::integration::harness::{ranked_signer, Platform};
    use audit_ledger::{AuditEventKind, AuditLedger};
    use envelope_engine::{CompletionOutcome, EnvelopeStatus, EnvelopeStore, FieldAction};
    use field_validation::FieldValue;
    use sealing_pipeline::ArtifactStore;
    use shared_bus::{EventPublisher, WorkflowEvent};
    use shared_types::CallerIdentity;

    /// Scenario A, second half: the last required signature drives the worker
    /// to seal, and the certificate lists signers in rank order.
    #[tokio::test]
    async fn test_last_signature_seals_envelope() {
        let platform = Platform::new();
        let worker = platform.spawn_worker();
        let (ada, ada_field) = ranked_signer("Ada", "ada@example.com", 1);
        let (bob, bob_field) = ranked_signer("Bob", "bob@example.com", 2);
        let ada_caller = CallerIdentity::RecipientToken(ada.token.clone());
        let bob_caller = CallerIdentity::RecipientToken(bob.token.clone());

        let envelope = platform
            .service
            .create(
                &platform.owner,
                platform.document("Lease Agreement", "doc-1"),
                vec![ada.clone(), bob.clone()],
                vec![ada_field.clone(), bob_field.clone()],
            )
            .unwrap();
        platform.service.send(envelope.id, &platform.owner).await.unwrap();

        for (caller, field, name) in [
            (&ada_caller, &ada_field, "Ada Lovelace"),
            (&bob_caller, &bob_field, "Bob Noble"),
        ] {
            platform
                .service
                .act_on_field(
                    envelope.id,
                    caller,
                    field.id,
                    FieldAction::Insert(FieldValue::text(name)),
                    None,
                )
                .unwrap();
            platform
                .service
                .complete_recipient(envelope.id, caller, CompletionOutcome::Signed, None)
                .await
                .unwrap();
        }

        let sealed = platform
            .wait_until(envelope.id, |e| e.status == EnvelopeStatus::Completed)
            .await;
        let info = sealed.sealing.expect("seal info recorded");
        assert!(sealed.completed_at.is_some());

        let artifact = platform.artifacts.get(envelope.id).expect("artifact stored");
        assert_eq!(artifact.content_hash, info.content_hash);
        let ada_pos = artifact.certificate.text.find("Ada Lovelace").unwrap();
        let bob_pos = artifact.certificate.text.find("Bob Noble").unwrap();
        assert!(ada_pos < bob_pos, "certificate lists signers in rank order");

        // The trail ends with the seal.
        let trail = platform.ledger.entries(envelope.id).unwrap();
        assert_eq!(trail.last().unwrap().kind, AuditEventKind::EnvelopeSealed);
        worker.abort();
    }

    /// Re-delivered seal requests are deduplicated: one artifact, one sealed
    /// trail entry.
    #[tokio::test]
    async fn test_duplicate_seal_requests_seal_once() {
        let platform = Platform::new();
        let worker = platform.spawn_worker();
        let (ada, ada_field) = ranked_signer("Ada", "ada@example.com", 1);
        let ada_caller = CallerIdentity::RecipientToken(ada.token.clone());

        let envelope = platform
            .service
            .create(
                &platform.owner,
                platform.document("NDA", "doc-2"),
                vec![ada],
                vec![ada_field.clone()],
            )
            .unwrap();
        platform.service.send(envelope.id, &platform.owner).await.unwrap();
        platform
            .service
            .act_on_field(
                envelope.id,
                &ada_caller,
                ada_field.id,
                FieldAction::Insert(FieldValue::text("Ada")),
                None,
            )
            .unwrap();
        platform
            .service
            .complete_recipient(envelope.id, &ada_caller, CompletionOutcome::Signed, None)
            .await
            .unwrap();

        // Simulate at-least-once delivery with two extra enqueues.
        for _ in 0..2 {
            platform
                .bus
                .publish(WorkflowEvent::SealRequested {
                    envelope_id: envelope.id,
                })
                .await;
        }

        platform
            .wait_until(envelope.id, |e| e.status == EnvelopeStatus::Completed)
            .await;
        // Give the duplicate requests time to be consumed.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let sealed_entries = platform
            .ledger
            .entries(envelope.id)
            .unwrap()
            .iter()
            .filter(|e| e.kind == AuditEventKind::EnvelopeSealed)
            .count();
        assert_eq!(sealed_entries, 1);
        worker.abort();
    }

    /// A rejected envelope never seals, even when a stale seal request is
    /// still in flight.
    #[tokio::test]
    async fn test_stale_seal_request_for_rejected_envelope_aborts() {
        let platform = Platform::new();
        let (ada, ada_field) = ranked_signer("Ada", "ada@example.com", 1);
        let ada_caller = CallerIdentity::RecipientToken(ada.token.clone());

        let envelope = platform
            .service
            .create(
                &platform.owner,
                platform.document("SOW", "doc-3"),
                vec![ada],
                vec![ada_field],
            )
            .unwrap();
        platform.service.send(envelope.id, &platform.owner).await.unwrap();
        platform
            .service
            .complete_recipient(
                envelope.id,
                &ada_caller,
                CompletionOutcome::Rejected { reason: None },
                None,
            )
            .await
            .unwrap();

        // A stale request hits the cancellation checkpoint.
        let err = platform.pipeline.seal(envelope.id).await.unwrap_err();
        assert!(!err.is_retryable());
        assert!(platform.artifacts.get(envelope.id).is_none());
        assert_eq!(
            platform.store.load(envelope.id).unwrap().status,
            EnvelopeStatus::Rejected
        );
    }

    /// Sealing is idempotent across direct pipeline invocations.
    #[tokio::test]
    async fn test_direct_reseal_returns_same_artifact() {
        let platform = Platform::new();
        let (ada, ada_field) = ranked_signer("Ada", "ada@example.com", 1);
        let ada_caller = CallerIdentity::RecipientToken(ada.token.clone());

        let envelope = platform
            .service
            .create(
                &platform.owner,
                platform.document("Offer", "doc-4"),
                vec![ada],
                vec![ada_field.clone()],
            )
            .unwrap();
        platform.service.send(envelope.id, &platform.owner).await.unwrap();
        platform
            .service
            .act_on_field(
                envelope.id,
                &ada_caller,
                ada_field.id,
                FieldAction::Insert(FieldValue::text("Ada")),
                None,
            )
            .unwrap();
        platform
            .service
            .complete_recipient(envelope.id, &ada_caller, CompletionOutcome::Signed, None)
            .await
            .unwrap();

        let first = platform.pipeline.seal(envelope.id).await.unwrap();
        let second = platform.pipeline.seal(envelope.id).await.unwrap();
        assert_eq!(first, second);
    }
}
