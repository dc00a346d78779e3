//! Envelope workflow orchestrator.
//!
//! Every operation follows the same shape: resolve the caller against the
//! loaded envelope, evaluate preconditions, mutate through the store's
//! clone-commit `update`, then publish notifications. Ledger appends run
//! inside the update closure after every precondition, so a failed operation
//! leaves neither state nor trail behind.

use crate::config::EngineConfig;
use crate::domain::access::{resolve_caller, AuthorizedActor};
use crate::domain::entities::{
    CompletionOutcome, DocumentRef, Envelope, EnvelopeStatus, Field, FieldAction, InsertedValue,
    Recipient, RecipientStatus,
};
use crate::domain::turn;
use crate::ports::EnvelopeStore;
use audit_ledger::{AuditEventKind, AuditLedger};
use field_validation::{
    resolve_checkbox_click, validate, CheckboxConfirmer, CheckboxOutcome, FieldValue,
};
use session_guard::{IssuedCode, ProofId, SessionGuardApi, SessionProof};
use shared_bus::{EventPublisher, WorkflowEvent};
use shared_types::{
    CallerIdentity, EnvelopeId, FieldId, RecipientId, TimeSource, WorkflowError,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// The envelope workflow orchestrator.
pub struct EnvelopeService {
    store: Arc<dyn EnvelopeStore>,
    ledger: Arc<dyn AuditLedger>,
    guard: Arc<dyn SessionGuardApi>,
    bus: Arc<dyn EventPublisher>,
    time: Arc<dyn TimeSource>,
    config: EngineConfig,
}

impl EnvelopeService {
    /// Wires the orchestrator to its collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn EnvelopeStore>,
        ledger: Arc<dyn AuditLedger>,
        guard: Arc<dyn SessionGuardApi>,
        bus: Arc<dyn EventPublisher>,
        time: Arc<dyn TimeSource>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            guard,
            bus,
            time,
            config,
        }
    }

    /// Creates a Draft envelope owned by the calling account.
    #[instrument(skip_all)]
    pub fn create(
        &self,
        caller: &CallerIdentity,
        document: DocumentRef,
        recipients: Vec<Recipient>,
        fields: Vec<Field>,
    ) -> Result<Envelope, WorkflowError> {
        let CallerIdentity::Account(owner) = caller else {
            return Err(WorkflowError::Unauthorized);
        };

        let envelope = Envelope {
            id: EnvelopeId::new(),
            owner: *owner,
            status: EnvelopeStatus::Draft,
            recipients,
            fields,
            document,
            completed_at: None,
            archived_at: None,
            sealing: None,
        };
        self.store.insert(envelope.clone())?;
        self.ledger.append(
            envelope.id,
            AuditEventKind::EnvelopeCreated,
            shared_types::Actor::Account(*owner),
            serde_json::json!({ "title": envelope.document.title }),
        )?;

        info!(envelope = %envelope.id, "Envelope created");
        Ok(envelope)
    }

    /// Loads an envelope, applying caller visibility.
    pub fn load(
        &self,
        envelope_id: EnvelopeId,
        caller: &CallerIdentity,
    ) -> Result<Envelope, WorkflowError> {
        let envelope = self.store.load(envelope_id)?;
        resolve_caller(&envelope, caller)?;
        Ok(envelope)
    }

    /// Sends a Draft envelope: Draft→Pending, recipients to Sent.
    ///
    /// Requires at least one non-CC recipient; with completeness enforcement
    /// on, every Signer/Approver must have at least one bound field.
    #[instrument(skip(self, caller), fields(envelope = %envelope_id))]
    pub async fn send(
        &self,
        envelope_id: EnvelopeId,
        caller: &CallerIdentity,
    ) -> Result<Envelope, WorkflowError> {
        let ledger = &self.ledger;
        let enforce = self.config.enforce_completeness;

        let committed = self.store.update(envelope_id, &mut |envelope| {
            let actor = resolve_caller(envelope, caller)?;
            if actor != AuthorizedActor::Owner {
                return Err(WorkflowError::Unauthorized);
            }
            if !envelope.status.can_transition_to(EnvelopeStatus::Pending) {
                return Err(WorkflowError::InvalidState {
                    status: envelope.status.name(),
                    action: "send",
                });
            }
            if !envelope
                .recipients
                .iter()
                .any(|r| r.role != crate::domain::entities::RecipientRole::Cc)
            {
                return Err(WorkflowError::InvalidState {
                    status: envelope.status.name(),
                    action: "send without recipients",
                });
            }
            if enforce {
                for recipient in &envelope.recipients {
                    if recipient.role.requires_completion()
                        && !envelope
                            .fields
                            .iter()
                            .any(|f| f.recipient_id == Some(recipient.id))
                    {
                        return Err(WorkflowError::InvalidState {
                            status: envelope.status.name(),
                            action: "send with fieldless required recipient",
                        });
                    }
                }
            }

            envelope.status = EnvelopeStatus::Pending;
            for recipient in &mut envelope.recipients {
                recipient.status = RecipientStatus::Sent;
            }
            ledger.append(
                envelope.id,
                AuditEventKind::EnvelopeSent,
                actor.audit_actor(envelope),
                serde_json::json!({ "recipients": envelope.recipients.len() }),
            )?;
            Ok(())
        })?;

        info!(envelope = %envelope_id, "Envelope sent");
        self.bus
            .publish(WorkflowEvent::EnvelopeSent {
                envelope_id,
                recipients: committed.recipients.iter().map(|r| r.id).collect(),
            })
            .await;
        Ok(committed)
    }

    /// Records a recipient's first open: Sent→Opened. Re-opens are no-ops.
    pub fn open(
        &self,
        envelope_id: EnvelopeId,
        caller: &CallerIdentity,
    ) -> Result<Envelope, WorkflowError> {
        let ledger = &self.ledger;
        self.store.update(envelope_id, &mut |envelope| {
            let actor = resolve_caller(envelope, caller)?;
            let AuthorizedActor::Recipient(recipient_id) = actor else {
                return Err(WorkflowError::Unauthorized);
            };
            let recipient = envelope
                .recipients
                .iter_mut()
                .find(|r| r.id == recipient_id)
                .ok_or(WorkflowError::NotFound)?;
            if recipient.status != RecipientStatus::Sent {
                return Ok(());
            }
            recipient.status = RecipientStatus::Opened;
            ledger.append(
                envelope.id,
                AuditEventKind::RecipientOpened,
                shared_types::Actor::Recipient(recipient_id),
                serde_json::Value::Null,
            )?;
            Ok(())
        })
    }

    /// Inserts or removes one field value.
    ///
    /// Requires Pending status, the acting recipient's turn, validation-engine
    /// acceptance, and a valid session proof when the acting recipient is
    /// step-up gated. An unbound field binds to the acting recipient at
    /// insert time.
    #[instrument(skip(self, caller, action, proof), fields(envelope = %envelope_id, field = %field_id))]
    pub fn act_on_field(
        &self,
        envelope_id: EnvelopeId,
        caller: &CallerIdentity,
        field_id: FieldId,
        action: FieldAction,
        proof: Option<ProofId>,
    ) -> Result<Envelope, WorkflowError> {
        let ledger = &self.ledger;
        let guard = &self.guard;
        let now = self.time.now();

        self.store.update(envelope_id, &mut |envelope| {
            let actor = resolve_caller(envelope, caller)?;
            let acting_id = match actor {
                AuthorizedActor::Recipient(id) => id,
                _ => return Err(WorkflowError::Unauthorized),
            };
            check_recipient_may_act(envelope, acting_id, "act on field")?;
            require_step_up_proof(guard.as_ref(), envelope, acting_id, proof)?;

            // All precondition reads run immutably before the field is
            // borrowed for mutation.
            let acting = envelope
                .recipient(acting_id)
                .cloned()
                .ok_or(WorkflowError::NotFound)?;
            let snapshot = envelope.field(field_id).ok_or(WorkflowError::NotFound)?;
            let bound_to = snapshot.recipient_id;
            let already_inserted = snapshot.inserted.is_some();

            // A field bound to someone else needs the assistant rule.
            if let Some(owner_id) = bound_to {
                if owner_id != acting_id {
                    let target = envelope
                        .recipients
                        .iter()
                        .find(|r| r.id == owner_id)
                        .ok_or(WorkflowError::NotFound)?;
                    if !turn::assistant_may_act_for(&acting, target) {
                        return Err(WorkflowError::Unauthorized);
                    }
                }
            }

            match &action {
                FieldAction::Insert(value) => {
                    if already_inserted {
                        return Err(WorkflowError::InvalidState {
                            status: envelope.status.name(),
                            action: "insert over an inserted field",
                        });
                    }
                    validate(snapshot.kind, &snapshot.meta, value)
                        .map_err(WorkflowError::ValidationFailed)?;
                    let field = envelope
                        .fields
                        .iter_mut()
                        .find(|f| f.id == field_id)
                        .ok_or(WorkflowError::NotFound)?;
                    if field.recipient_id.is_none() {
                        field.recipient_id = Some(acting_id);
                    }
                    field.inserted = Some(InsertedValue {
                        value: value.clone(),
                        inserted_at: now,
                        inserted_by: acting_id,
                    });
                    ledger.append(
                        envelope.id,
                        AuditEventKind::FieldInserted,
                        shared_types::Actor::Recipient(acting_id),
                        serde_json::json!({ "field": field_id.to_string() }),
                    )?;
                }
                FieldAction::Uninsert => {
                    if !already_inserted {
                        return Err(WorkflowError::InvalidState {
                            status: envelope.status.name(),
                            action: "uninsert an empty field",
                        });
                    }
                    // Removal is barred once the owning recipient signed.
                    if let Some(owner_id) = bound_to {
                        let owner_signed = envelope
                            .recipients
                            .iter()
                            .any(|r| r.id == owner_id && r.status == RecipientStatus::Signed);
                        if owner_signed {
                            return Err(WorkflowError::InvalidState {
                                status: envelope.status.name(),
                                action: "uninsert after signing",
                            });
                        }
                    }
                    let field = envelope
                        .fields
                        .iter_mut()
                        .find(|f| f.id == field_id)
                        .ok_or(WorkflowError::NotFound)?;
                    field.inserted = None;
                    ledger.append(
                        envelope.id,
                        AuditEventKind::FieldUninserted,
                        shared_types::Actor::Recipient(acting_id),
                        serde_json::json!({ "field": field_id.to_string() }),
                    )?;
                }
            }
            Ok(())
        })
    }

    /// Resolves a checkbox click and commits the resulting set.
    ///
    /// Unlike `act_on_field`, a click replaces the prior checked set; the
    /// toggle semantics come from the validation engine's click policy. A
    /// cancelled confirmation commits nothing.
    pub fn click_checkbox(
        &self,
        envelope_id: EnvelopeId,
        caller: &CallerIdentity,
        field_id: FieldId,
        clicked: usize,
        confirmer: &dyn CheckboxConfirmer,
        proof: Option<ProofId>,
    ) -> Result<CheckboxOutcome, WorkflowError> {
        let ledger = &self.ledger;
        let guard = &self.guard;
        let now = self.time.now();
        let mut outcome = CheckboxOutcome::Cancelled;

        self.store.update(envelope_id, &mut |envelope| {
            let actor = resolve_caller(envelope, caller)?;
            let acting_id = match actor {
                AuthorizedActor::Recipient(id) => id,
                _ => return Err(WorkflowError::Unauthorized),
            };
            check_recipient_may_act(envelope, acting_id, "click checkbox")?;
            require_step_up_proof(guard.as_ref(), envelope, acting_id, proof)?;

            let field = envelope
                .fields
                .iter()
                .find(|f| f.id == field_id)
                .ok_or(WorkflowError::NotFound)?;
            let current = match &field.inserted {
                Some(InsertedValue {
                    value: FieldValue::Checked(set),
                    ..
                }) => set.clone(),
                _ => std::collections::BTreeSet::new(),
            };

            outcome = resolve_checkbox_click(&field.meta, &current, clicked, confirmer)
                .map_err(WorkflowError::ValidationFailed)?;

            if let CheckboxOutcome::Committed(set) = &outcome {
                let field = envelope
                    .fields
                    .iter_mut()
                    .find(|f| f.id == field_id)
                    .ok_or(WorkflowError::NotFound)?;
                if field.recipient_id.is_none() {
                    field.recipient_id = Some(acting_id);
                }
                field.inserted = Some(InsertedValue {
                    value: FieldValue::Checked(set.clone()),
                    inserted_at: now,
                    inserted_by: acting_id,
                });
                ledger.append(
                    envelope.id,
                    AuditEventKind::FieldInserted,
                    shared_types::Actor::Recipient(acting_id),
                    serde_json::json!({ "field": field_id.to_string(), "checked": set.len() }),
                )?;
            }
            Ok(())
        })?;

        Ok(outcome)
    }

    /// Finishes a recipient's part: Signed or Rejected.
    ///
    /// Signing requires the recipient's turn, every required field inserted,
    /// and step-up when gated. Rejection is accepted immediately and
    /// short-circuits the whole envelope to Rejected; no seal is requested.
    #[instrument(skip(self, caller, outcome, proof), fields(envelope = %envelope_id))]
    pub async fn complete_recipient(
        &self,
        envelope_id: EnvelopeId,
        caller: &CallerIdentity,
        outcome: CompletionOutcome,
        proof: Option<ProofId>,
    ) -> Result<Envelope, WorkflowError> {
        let ledger = &self.ledger;
        let guard = &self.guard;
        let now = self.time.now();
        let mut acting = None;

        let committed = self.store.update(envelope_id, &mut |envelope| {
            let actor = resolve_caller(envelope, caller)?;
            let acting_id = match actor {
                AuthorizedActor::Recipient(id) => id,
                _ => return Err(WorkflowError::Unauthorized),
            };
            acting = Some(acting_id);

            if envelope.status != EnvelopeStatus::Pending {
                return Err(WorkflowError::InvalidState {
                    status: envelope.status.name(),
                    action: "complete recipient",
                });
            }
            let recipient = envelope
                .recipient(acting_id)
                .cloned()
                .ok_or(WorkflowError::NotFound)?;
            if recipient.status.is_finished() {
                return Err(WorkflowError::InvalidState {
                    status: envelope.status.name(),
                    action: "complete a finished recipient",
                });
            }

            match &outcome {
                CompletionOutcome::Signed => {
                    if let Some(blocker) = turn::blocking_recipient(envelope, &recipient) {
                        return Err(WorkflowError::OutOfTurn {
                            waiting_on: blocker,
                        });
                    }
                    require_step_up_proof(guard.as_ref(), envelope, acting_id, proof)?;
                    let missing = envelope.missing_required_fields(acting_id);
                    if !missing.is_empty() {
                        return Err(WorkflowError::ValidationFailed(
                            missing
                                .iter()
                                .map(|f| {
                                    shared_types::FieldViolation::new(
                                        "missing_required",
                                        format!("required field {f} not inserted"),
                                    )
                                })
                                .collect(),
                        ));
                    }

                    let recipient = envelope
                        .recipients
                        .iter_mut()
                        .find(|r| r.id == acting_id)
                        .ok_or(WorkflowError::NotFound)?;
                    recipient.status = RecipientStatus::Signed;
                    recipient.signed_at = Some(now);
                    ledger.append(
                        envelope.id,
                        AuditEventKind::RecipientSigned,
                        shared_types::Actor::Recipient(acting_id),
                        serde_json::Value::Null,
                    )?;
                }
                CompletionOutcome::Rejected { reason } => {
                    let recipient = envelope
                        .recipients
                        .iter_mut()
                        .find(|r| r.id == acting_id)
                        .ok_or(WorkflowError::NotFound)?;
                    recipient.status = RecipientStatus::Rejected;
                    envelope.status = EnvelopeStatus::Rejected;
                    ledger.append(
                        envelope.id,
                        AuditEventKind::RecipientRejected,
                        shared_types::Actor::Recipient(acting_id),
                        serde_json::json!({ "reason": reason }),
                    )?;
                    ledger.append(
                        envelope.id,
                        AuditEventKind::EnvelopeRejected,
                        shared_types::Actor::Recipient(acting_id),
                        serde_json::Value::Null,
                    )?;
                }
            }
            Ok(())
        })?;

        let acting_id = acting.ok_or_else(|| {
            WorkflowError::Internal("caller vanished during completion".to_string())
        })?;
        match &outcome {
            CompletionOutcome::Signed => {
                info!(envelope = %envelope_id, recipient = %acting_id, "Recipient signed");
                self.bus
                    .publish(WorkflowEvent::RecipientSigned {
                        envelope_id,
                        recipient_id: acting_id,
                    })
                    .await;
                // The envelope stays Pending; sealing confirms completion.
                if committed.all_required_signed() {
                    info!(envelope = %envelope_id, "All required recipients signed, requesting seal");
                    self.bus
                        .publish(WorkflowEvent::SealRequested { envelope_id })
                        .await;
                }
            }
            CompletionOutcome::Rejected { reason } => {
                info!(envelope = %envelope_id, recipient = %acting_id, "Recipient rejected");
                self.bus
                    .publish(WorkflowEvent::RecipientRejected {
                        envelope_id,
                        recipient_id: acting_id,
                        reason: reason.clone(),
                    })
                    .await;
                self.bus
                    .publish(WorkflowEvent::EnvelopeRejected { envelope_id })
                    .await;
            }
        }
        Ok(committed)
    }

    /// Soft-deletes the envelope, independent of status. Owner only.
    pub fn delete(
        &self,
        envelope_id: EnvelopeId,
        caller: &CallerIdentity,
    ) -> Result<Envelope, WorkflowError> {
        let ledger = &self.ledger;
        let now = self.time.now();
        self.store.update(envelope_id, &mut |envelope| {
            let actor = resolve_caller(envelope, caller)?;
            if actor != AuthorizedActor::Owner {
                return Err(WorkflowError::Unauthorized);
            }
            if envelope.archived_at.is_some() {
                return Ok(());
            }
            envelope.archived_at = Some(now);
            ledger.append(
                envelope.id,
                AuditEventKind::EnvelopeDeleted,
                actor.audit_actor(envelope),
                serde_json::Value::Null,
            )?;
            Ok(())
        })
    }

    /// Restores a soft-deleted envelope. Owner only.
    pub fn restore(
        &self,
        envelope_id: EnvelopeId,
        caller: &CallerIdentity,
    ) -> Result<Envelope, WorkflowError> {
        let ledger = &self.ledger;
        self.store.update(envelope_id, &mut |envelope| {
            let actor = resolve_caller(envelope, caller)?;
            if actor != AuthorizedActor::Owner {
                return Err(WorkflowError::Unauthorized);
            }
            if envelope.archived_at.is_none() {
                return Ok(());
            }
            envelope.archived_at = None;
            ledger.append(
                envelope.id,
                AuditEventKind::EnvelopeRestored,
                actor.audit_actor(envelope),
                serde_json::Value::Null,
            )?;
            Ok(())
        })
    }

    /// Issues a step-up code for the calling recipient.
    pub fn request_step_up(
        &self,
        envelope_id: EnvelopeId,
        caller: &CallerIdentity,
    ) -> Result<IssuedCode, WorkflowError> {
        let envelope = self.store.load(envelope_id)?;
        let AuthorizedActor::Recipient(recipient_id) = resolve_caller(&envelope, caller)? else {
            return Err(WorkflowError::Unauthorized);
        };
        self.guard.issue_code(recipient_id, envelope_id)
    }

    /// Verifies a step-up code for the calling recipient, minting a proof.
    pub fn verify_step_up(
        &self,
        envelope_id: EnvelopeId,
        caller: &CallerIdentity,
        code: &str,
    ) -> Result<SessionProof, WorkflowError> {
        let envelope = self.store.load(envelope_id)?;
        let AuthorizedActor::Recipient(recipient_id) = resolve_caller(&envelope, caller)? else {
            return Err(WorkflowError::Unauthorized);
        };
        self.guard.verify(recipient_id, envelope_id, code)
    }
}

/// Pending-status and turn preconditions shared by field actions.
fn check_recipient_may_act(
    envelope: &Envelope,
    acting_id: RecipientId,
    action: &'static str,
) -> Result<(), WorkflowError> {
    if envelope.status != EnvelopeStatus::Pending {
        return Err(WorkflowError::InvalidState {
            status: envelope.status.name(),
            action,
        });
    }
    let acting = envelope.recipient(acting_id).ok_or(WorkflowError::NotFound)?;
    if acting.status.is_finished() {
        return Err(WorkflowError::InvalidState {
            status: envelope.status.name(),
            action,
        });
    }
    if let Some(blocker) = turn::blocking_recipient(envelope, acting) {
        return Err(WorkflowError::OutOfTurn {
            waiting_on: blocker,
        });
    }
    Ok(())
}

/// Enforces the step-up gate for a recipient configured with one.
fn require_step_up_proof(
    guard: &dyn SessionGuardApi,
    envelope: &Envelope,
    acting_id: RecipientId,
    proof: Option<ProofId>,
) -> Result<(), WorkflowError> {
    let gated = envelope
        .recipient(acting_id)
        .is_some_and(|r| r.require_step_up);
    if !gated {
        return Ok(());
    }
    let proof_id = proof.ok_or(WorkflowError::StepUpRequired)?;
    guard.check_proof(acting_id, envelope.id, proof_id)
}
