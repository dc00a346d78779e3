//! # Signing Flow Tests
//!
//! Envelope lifecycle end to end through the public service API:
//!
//! ```text
//! create → send → open → insert → sign ──last signer──→ SealRequested
//!                    │
//!                    └── reject ──→ envelope Rejected, no seal
//! ```

#[cfg(test)]
mod tests {
    use crate::integration::harness::{ranked_signer, Platform};
    use envelope_engine::{CompletionOutcome, EnvelopeStatus, Field, FieldAction, RecipientRole};
    use field_validation::{
        CheckboxConstraint, CheckboxRule, CheckboxOutcome, FieldKind, FieldMeta, FieldValue,
        MockConfirmer,
    };
    use audit_ledger::AuditLedger;
    use envelope_engine::{EnvelopeStore, Recipient};
    use shared_types::{CallerIdentity, StepUpFailure, WorkflowError};

    /// Scenario A, first half: ranked signing order is enforced and the flow
    /// runs to a requested seal.
    #[tokio::test]
    async fn test_ranked_signing_flow_requests_seal() {
        let platform = Platform::new();
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

        // Bob is out of turn until Ada finishes.
        let err = platform
            .service
            .act_on_field(
                envelope.id,
                &bob_caller,
                bob_field.id,
                FieldAction::Insert(FieldValue::text("Bob")),
                None,
            )
            .unwrap_err();
        assert_eq!(err, WorkflowError::OutOfTurn { waiting_on: ada.id });

        // Ada signs.
        platform.service.open(envelope.id, &ada_caller).unwrap();
        platform
            .service
            .act_on_field(
                envelope.id,
                &ada_caller,
                ada_field.id,
                FieldAction::Insert(FieldValue::text("Ada Lovelace")),
                None,
            )
            .unwrap();
        platform
            .service
            .complete_recipient(envelope.id, &ada_caller, CompletionOutcome::Signed, None)
            .await
            .unwrap();

        // Now Bob may act; his signature is the last required one.
        platform.service.open(envelope.id, &bob_caller).unwrap();
        platform
            .service
            .act_on_field(
                envelope.id,
                &bob_caller,
                bob_field.id,
                FieldAction::Insert(FieldValue::text("Bob Noble")),
                None,
            )
            .unwrap();
        let signed = platform
            .service
            .complete_recipient(envelope.id, &bob_caller, CompletionOutcome::Signed, None)
            .await
            .unwrap();

        // Sealing confirms completion; until then the envelope is Pending.
        assert_eq!(signed.status, EnvelopeStatus::Pending);
        assert!(signed.all_required_signed());
    }

    /// Scenario B: a rejection short-circuits the envelope; later actions are
    /// InvalidState, not OutOfTurn.
    #[tokio::test]
    async fn test_rejection_short_circuits_envelope() {
        let platform = Platform::new();
        let (ada, ada_field) = ranked_signer("Ada", "ada@example.com", 1);
        let (bob, bob_field) = ranked_signer("Bob", "bob@example.com", 2);
        let ada_caller = CallerIdentity::RecipientToken(ada.token.clone());
        let bob_caller = CallerIdentity::RecipientToken(bob.token.clone());

        let envelope = platform
            .service
            .create(
                &platform.owner,
                platform.document("NDA", "doc-2"),
                vec![ada.clone(), bob.clone()],
                vec![ada_field.clone(), bob_field],
            )
            .unwrap();
        platform.service.send(envelope.id, &platform.owner).await.unwrap();

        // Rejection is accepted even from the higher-ranked recipient's turn
        // position.
        let rejected = platform
            .service
            .complete_recipient(
                envelope.id,
                &bob_caller,
                CompletionOutcome::Rejected {
                    reason: Some("terms changed".into()),
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(rejected.status, EnvelopeStatus::Rejected);

        let err = platform
            .service
            .act_on_field(
                envelope.id,
                &ada_caller,
                ada_field.id,
                FieldAction::Insert(FieldValue::text("Ada")),
                None,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InvalidState {
                status: "rejected",
                ..
            }
        ));
    }

    /// Equal ranks may sign in any order.
    #[tokio::test]
    async fn test_equal_ranks_sign_in_any_order() {
        let platform = Platform::new();
        let (ada, ada_field) = ranked_signer("Ada", "ada@example.com", 1);
        let (bob, bob_field) = ranked_signer("Bob", "bob@example.com", 1);
        let bob_caller = CallerIdentity::RecipientToken(bob.token.clone());

        let envelope = platform
            .service
            .create(
                &platform.owner,
                platform.document("SOW", "doc-3"),
                vec![ada, bob],
                vec![ada_field, bob_field.clone()],
            )
            .unwrap();
        platform.service.send(envelope.id, &platform.owner).await.unwrap();

        // Bob acts first despite equal rank with Ada.
        platform
            .service
            .act_on_field(
                envelope.id,
                &bob_caller,
                bob_field.id,
                FieldAction::Insert(FieldValue::text("Bob Noble")),
                None,
            )
            .unwrap();
        platform
            .service
            .complete_recipient(envelope.id, &bob_caller, CompletionOutcome::Signed, None)
            .await
            .unwrap();
    }

    /// The 6th verification attempt fails even with the correct code.
    #[tokio::test]
    async fn test_step_up_attempts_exhaust() {
        let platform = Platform::new();
        let signer =
            Recipient::new(RecipientRole::Signer, "Ada", "ada@example.com").with_step_up();
        let field = Field::new(signer.id, FieldKind::Signature, 1);
        let caller = CallerIdentity::RecipientToken(signer.token.clone());

        let envelope = platform
            .service
            .create(
                &platform.owner,
                platform.document("Loan", "doc-4"),
                vec![signer],
                vec![field],
            )
            .unwrap();
        platform.service.send(envelope.id, &platform.owner).await.unwrap();

        let issued = platform.service.request_step_up(envelope.id, &caller).unwrap();
        let wrong = if issued.code == "000000" { "111111" } else { "000000" };

        for _ in 0..5 {
            let err = platform
                .service
                .verify_step_up(envelope.id, &caller, wrong)
                .unwrap_err();
            assert!(matches!(err, WorkflowError::StepUpFailed(_)));
        }

        // Attempt budget spent: the correct code no longer verifies.
        let err = platform
            .service
            .verify_step_up(envelope.id, &caller, &issued.code)
            .unwrap_err();
        assert_eq!(
            err,
            WorkflowError::StepUpFailed(StepUpFailure::AttemptsExhausted)
        );
    }

    /// Pick-one checkbox groups resolve a click on another box to just that
    /// box; an `=2` group routes a violating click through confirmation.
    #[tokio::test]
    async fn test_checkbox_policies_through_service() {
        let platform = Platform::new();
        let signer = Recipient::new(RecipientRole::Signer, "Ada", "ada@example.com");
        let pick_one = Field::new(signer.id, FieldKind::Checkbox, 1).with_meta(
            FieldMeta::Checkbox {
                options: 3,
                constraint: Some(CheckboxConstraint {
                    rule: CheckboxRule::AtMost,
                    count: 1,
                }),
            },
        );
        let pick_two = Field::new(signer.id, FieldKind::Checkbox, 1).with_meta(
            FieldMeta::Checkbox {
                options: 4,
                constraint: Some(CheckboxConstraint {
                    rule: CheckboxRule::Exactly,
                    count: 2,
                }),
            },
        );
        let caller = CallerIdentity::RecipientToken(signer.token.clone());

        let envelope = platform
            .service
            .create(
                &platform.owner,
                platform.document("Survey", "doc-5"),
                vec![signer],
                vec![pick_one.clone(), pick_two.clone()],
            )
            .unwrap();
        platform.service.send(envelope.id, &platform.owner).await.unwrap();
        let confirmer = MockConfirmer::cancelling();

        // Pick-one: the second click replaces the first selection.
        platform
            .service
            .click_checkbox(envelope.id, &caller, pick_one.id, 0, &confirmer, None)
            .unwrap();
        let outcome = platform
            .service
            .click_checkbox(envelope.id, &caller, pick_one.id, 2, &confirmer, None)
            .unwrap();
        assert_eq!(outcome, CheckboxOutcome::Committed([2].into_iter().collect()));

        // `=2`: with a satisfied set in place, a third click triggers
        // confirmation; the cancelling confirmer keeps the prior set.
        platform
            .store
            .update(envelope.id, &mut |e| {
                let field = e.fields.iter_mut().find(|f| f.id == pick_two.id).unwrap();
                field.inserted = Some(envelope_engine::InsertedValue {
                    value: FieldValue::checked([0, 1]),
                    inserted_at: 0,
                    inserted_by: field.recipient_id.unwrap(),
                });
                Ok(())
            })
            .unwrap();
        let outcome = platform
            .service
            .click_checkbox(envelope.id, &caller, pick_two.id, 2, &confirmer, None)
            .unwrap();
        assert_eq!(outcome, CheckboxOutcome::Cancelled);
        assert_eq!(confirmer.calls(), 1);

        let stored = platform.service.load(envelope.id, &caller).unwrap();
        let inserted = stored.field(pick_two.id).unwrap().inserted.as_ref().unwrap();
        assert_eq!(inserted.value, FieldValue::checked([0, 1]));
    }

    /// The audit trail records the whole lifecycle with contiguous sequences.
    #[tokio::test]
    async fn test_audit_trail_is_contiguous_and_complete() {
        let platform = Platform::new();
        let (ada, ada_field) = ranked_signer("Ada", "ada@example.com", 1);
        let caller = CallerIdentity::RecipientToken(ada.token.clone());

        let envelope = platform
            .service
            .create(
                &platform.owner,
                platform.document("Offer", "doc-6"),
                vec![ada],
                vec![ada_field.clone()],
            )
            .unwrap();
        platform.service.send(envelope.id, &platform.owner).await.unwrap();
        platform.service.open(envelope.id, &caller).unwrap();
        platform
            .service
            .act_on_field(
                envelope.id,
                &caller,
                ada_field.id,
                FieldAction::Insert(FieldValue::text("Ada")),
                None,
            )
            .unwrap();
        platform
            .service
            .act_on_field(envelope.id, &caller, ada_field.id, FieldAction::Uninsert, None)
            .unwrap();

        let trail = platform.ledger.entries(envelope.id).unwrap();
        for (i, entry) in trail.iter().enumerate() {
            assert_eq!(entry.sequence, i as u64 + 1);
        }
        let labels: Vec<_> = trail.iter().map(|e| e.kind.label()).collect();
        assert_eq!(
            labels,
            vec![
                "Envelope created",
                "Envelope sent",
                "Recipient opened",
                "Field inserted",
                "Field removed",
            ]
        );
    }
}
