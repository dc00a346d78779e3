//! Caller resolution and visibility rules.
//!
//! Every operation resolves its `CallerIdentity` against the loaded envelope
//! BEFORE any precondition runs, so an unauthorized caller learns nothing
//! about the envelope's state. A foreign account and an archived envelope both
//! resolve to `NotFound`; existence never leaks through error kinds.

use super::entities::Envelope;
use shared_types::{Actor, CallerIdentity, RecipientId, WorkflowError};

/// A caller resolved against one envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizedActor {
    /// The owning account.
    Owner,
    /// A recipient of this envelope, matched by token.
    Recipient(RecipientId),
    /// Internal caller (the sealing worker).
    System,
}

impl AuthorizedActor {
    /// The audit actor to record for this caller.
    #[must_use]
    pub fn audit_actor(&self, envelope: &Envelope) -> Actor {
        match self {
            Self::Owner => Actor::Account(envelope.owner),
            Self::Recipient(id) => Actor::Recipient(*id),
            Self::System => Actor::System,
        }
    }
}

/// Resolves `caller` against `envelope`.
///
/// Archived envelopes are invisible to everyone except the owner (who needs
/// visibility to restore) and the system. Token matching is constant-time via
/// `AccessToken`'s `PartialEq`.
pub fn resolve_caller(
    envelope: &Envelope,
    caller: &CallerIdentity,
) -> Result<AuthorizedActor, WorkflowError> {
    let resolved = match caller {
        CallerIdentity::Account(id) => {
            if *id == envelope.owner {
                AuthorizedActor::Owner
            } else {
                return Err(WorkflowError::NotFound);
            }
        }
        CallerIdentity::RecipientToken(token) => envelope
            .recipients
            .iter()
            .find(|r| r.token == *token)
            .map(|r| AuthorizedActor::Recipient(r.id))
            .ok_or(WorkflowError::NotFound)?,
        CallerIdentity::System => AuthorizedActor::System,
    };

    if envelope.archived_at.is_some() && !matches!(resolved, AuthorizedActor::Owner | AuthorizedActor::System) {
        return Err(WorkflowError::NotFound);
    }

    Ok(resolved)
}
