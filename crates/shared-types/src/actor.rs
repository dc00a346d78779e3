//! Actor and caller identity.
//!
//! Every mutating call into the engine carries a `CallerIdentity`; every audit
//! entry records the resolved `Actor` that performed the action.

use crate::ids::{AccountId, RecipientId};
use crate::token::AccessToken;
use serde::{Deserialize, Serialize};

/// The resolved party recorded against a state-affecting action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    /// An authenticated platform account (owner or collaborator).
    Account(AccountId),
    /// A recipient identified by their access token.
    Recipient(RecipientId),
    /// The system itself (sealing worker, migrations).
    System,
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Account(id) => write!(f, "account:{id}"),
            Self::Recipient(id) => write!(f, "recipient:{id}"),
            Self::System => write!(f, "system"),
        }
    }
}

/// Unresolved identity presented by a caller.
///
/// Resolution (token → recipient, account → owner/collaborator check) happens
/// inside the engine, before any precondition is evaluated.
#[derive(Debug, Clone)]
pub enum CallerIdentity {
    /// An authenticated account session.
    Account(AccountId),
    /// A bearer token scoped to exactly one recipient.
    RecipientToken(AccessToken),
    /// Internal callers (the sealing worker).
    System,
}
