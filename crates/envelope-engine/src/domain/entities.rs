//! Envelope, recipient, and field entities.

use field_validation::{FieldKind, FieldMeta, FieldValue};
use serde::{Deserialize, Serialize};
use shared_types::{AccessToken, AccountId, EnvelopeId, FieldId, RecipientId, Timestamp};

/// Envelope lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvelopeStatus {
    /// Mutable, collaboratively edited.
    Draft,
    /// Sent to recipients; signing in progress.
    Pending,
    /// Sealed; terminal.
    Completed,
    /// Rejected by a recipient; terminal.
    Rejected,
}

impl EnvelopeStatus {
    /// Whether a transition to `next` is legal. Monotonic: Draft→Pending→
    /// {Completed|Rejected}, nothing else.
    #[must_use]
    pub fn can_transition_to(&self, next: EnvelopeStatus) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Pending)
                | (Self::Pending, Self::Completed)
                | (Self::Pending, Self::Rejected)
        )
    }

    /// Status name for error reporting.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }
}

/// Recipient role in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecipientRole {
    /// Must fill fields and sign.
    Signer,
    /// Must approve (sign-off without fields is fine).
    Approver,
    /// Read-only access.
    Viewer,
    /// Receives a copy; never blocks ordering.
    Cc,
    /// May fill fields on behalf of later recipients.
    Assistant,
}

impl RecipientRole {
    /// Whether completion of this role is required before sealing.
    #[must_use]
    pub fn requires_completion(&self) -> bool {
        matches!(self, Self::Signer | Self::Approver)
    }

    /// Certificate label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Signer => "Signer",
            Self::Approver => "Approver",
            Self::Viewer => "Viewer",
            Self::Cc => "CC",
            Self::Assistant => "Assistant",
        }
    }
}

/// Recipient signing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecipientStatus {
    /// Envelope still in Draft.
    NotSent,
    /// Invited, not yet opened.
    Sent,
    /// Opened the envelope.
    Opened,
    /// Finished signing; terminal for the recipient.
    Signed,
    /// Rejected; terminal for the recipient and the envelope.
    Rejected,
}

impl RecipientStatus {
    /// Whether this recipient no longer blocks lower-priority turns.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Signed | Self::Rejected)
    }
}

/// A party in the signing workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    /// Recipient id.
    pub id: RecipientId,
    /// Role in the workflow.
    pub role: RecipientRole,
    /// Display name.
    pub name: String,
    /// Email address for invitations.
    pub email: String,
    /// Unguessable access token addressing this recipient.
    pub token: AccessToken,
    /// Signing-order rank; `None` means unordered (acts any time).
    pub order: Option<u32>,
    /// Current signing status.
    pub status: RecipientStatus,
    /// Whether step-up verification gates this recipient's signing actions.
    pub require_step_up: bool,
    /// When the recipient signed, if they did.
    pub signed_at: Option<Timestamp>,
}

impl Recipient {
    /// Creates a recipient in `NotSent` with a fresh token.
    #[must_use]
    pub fn new(role: RecipientRole, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: RecipientId::new(),
            role,
            name: name.into(),
            email: email.into(),
            token: AccessToken::generate(),
            order: None,
            status: RecipientStatus::NotSent,
            require_step_up: false,
            signed_at: None,
        }
    }

    /// Sets the signing-order rank.
    #[must_use]
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }

    /// Requires step-up verification before signing actions.
    #[must_use]
    pub fn with_step_up(mut self) -> Self {
        self.require_step_up = true;
        self
    }
}

/// An inserted field value with its insertion timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertedValue {
    /// The committed value.
    pub value: FieldValue,
    /// When it was inserted.
    pub inserted_at: Timestamp,
    /// Who it was inserted by (may differ from the bound recipient for
    /// assistant fills).
    pub inserted_by: RecipientId,
}

/// A positioned placeholder requiring a typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field id.
    pub id: FieldId,
    /// Bound recipient; `None` until an assistant fill binds it.
    pub recipient_id: Option<RecipientId>,
    /// Field type.
    pub kind: FieldKind,
    /// Page number (1-based) in the source document.
    pub page: u32,
    /// Position rectangle as (x, y, width, height) in page units.
    pub rect: (f32, f32, f32, f32),
    /// Type-specific validation metadata.
    pub meta: FieldMeta,
    /// Whether the field must be inserted before its recipient can sign.
    pub required: bool,
    /// Insertion state: `None` = not inserted.
    pub inserted: Option<InsertedValue>,
}

impl Field {
    /// Creates a required field bound to a recipient.
    #[must_use]
    pub fn new(recipient_id: RecipientId, kind: FieldKind, page: u32) -> Self {
        Self {
            id: FieldId::new(),
            recipient_id: Some(recipient_id),
            kind,
            page,
            rect: (0.0, 0.0, 120.0, 32.0),
            meta: FieldMeta::default_for(kind),
            required: true,
            inserted: None,
        }
    }

    /// Creates an unbound field (bound at assistant fill time).
    #[must_use]
    pub fn unbound(kind: FieldKind, page: u32) -> Self {
        Self {
            id: FieldId::new(),
            recipient_id: None,
            kind,
            page,
            rect: (0.0, 0.0, 120.0, 32.0),
            meta: FieldMeta::default_for(kind),
            required: false,
            inserted: None,
        }
    }

    /// Overrides the validation metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: FieldMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Marks the field optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Reference to the source document bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Document title.
    pub title: String,
    /// Opaque storage key for the original bytes.
    pub storage_key: String,
}

/// Sealing metadata recorded when the envelope completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealInfo {
    /// Storage key of the sealed artifact.
    pub artifact_key: String,
    /// Hex SHA-256 of the pre-seal composed content.
    pub content_hash: String,
    /// When sealing finished.
    pub sealed_at: Timestamp,
}

/// The signable unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Envelope id.
    pub id: EnvelopeId,
    /// Owning account.
    pub owner: AccountId,
    /// Lifecycle status.
    pub status: EnvelopeStatus,
    /// Recipients, in declaration order.
    pub recipients: Vec<Recipient>,
    /// Fields, in declaration order.
    pub fields: Vec<Field>,
    /// Source document reference.
    pub document: DocumentRef,
    /// When the envelope completed, if it did.
    pub completed_at: Option<Timestamp>,
    /// Soft-delete flag, orthogonal to `status`.
    pub archived_at: Option<Timestamp>,
    /// Sealing metadata once sealed.
    pub sealing: Option<SealInfo>,
}

impl Envelope {
    /// Looks up a recipient by id.
    #[must_use]
    pub fn recipient(&self, id: RecipientId) -> Option<&Recipient> {
        self.recipients.iter().find(|r| r.id == id)
    }

    /// Looks up a field by id.
    #[must_use]
    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Whether every role-required recipient has signed.
    #[must_use]
    pub fn all_required_signed(&self) -> bool {
        self.recipients
            .iter()
            .filter(|r| r.role.requires_completion())
            .all(|r| r.status == RecipientStatus::Signed)
    }

    /// Required fields of one recipient that are not yet inserted.
    #[must_use]
    pub fn missing_required_fields(&self, recipient_id: RecipientId) -> Vec<FieldId> {
        self.fields
            .iter()
            .filter(|f| {
                f.required && f.recipient_id == Some(recipient_id) && f.inserted.is_none()
            })
            .map(|f| f.id)
            .collect()
    }
}

/// Action performed on a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldAction {
    /// Insert a value (rejected if already inserted).
    Insert(FieldValue),
    /// Explicitly remove the inserted value.
    Uninsert,
}

/// Outcome submitted by `complete_recipient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The recipient finished signing.
    Signed,
    /// The recipient rejected the envelope.
    Rejected {
        /// Optional free-form reason.
        reason: Option<String>,
    },
}
