//! Signing-order (turn) enforcement.
//!
//! A recipient may act only when every strictly-lower-rank, non-CC recipient
//! is finished (Signed or Rejected). Unranked recipients are never blocked by
//! order. Equal ranks act in any order.

use super::entities::{Envelope, Recipient, RecipientRole};
use shared_types::RecipientId;

/// Returns the recipient currently blocking `acting`, if any.
///
/// The blocker is the lowest-ranked unfinished non-CC recipient strictly
/// below `acting`'s rank; reporting the lowest gives the UI a stable
/// "waiting on" answer.
#[must_use]
pub fn blocking_recipient(envelope: &Envelope, acting: &Recipient) -> Option<RecipientId> {
    let rank = acting.order?;

    envelope
        .recipients
        .iter()
        .filter(|r| r.role != RecipientRole::Cc && !r.status.is_finished())
        .filter(|r| r.order.is_some_and(|o| o < rank))
        .min_by_key(|r| r.order)
        .map(|r| r.id)
}

/// Whether an assistant may act on behalf of `target`.
///
/// Assistants act for not-yet-Signed recipients at or above the assistant's
/// own rank; an unranked assistant may act for anyone not yet Signed.
#[must_use]
pub fn assistant_may_act_for(assistant: &Recipient, target: &Recipient) -> bool {
    if assistant.role != RecipientRole::Assistant {
        return false;
    }
    if target.status == super::entities::RecipientStatus::Signed {
        return false;
    }
    match (assistant.order, target.order) {
        (Some(a), Some(t)) => t >= a,
        // Unranked on either side: no ordering constraint to violate.
        _ => true,
    }
}
