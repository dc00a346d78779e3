//! Outbound port: the human-in-the-loop checkbox confirmation boundary.

use crate::domain::entities::CheckboxConstraint;
use std::collections::BTreeSet;
use thiserror::Error;

/// The confirmation boundary could not be reached.
///
/// Callers must fail closed on this: no value is accepted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("checkbox confirmation boundary unavailable")]
pub struct ConfirmerUnavailable;

/// Synchronous human-in-the-loop boundary for ambiguous checkbox states.
///
/// A blocking request/response with explicit cancellation, not a callback.
pub trait CheckboxConfirmer: Send + Sync {
    /// Presents the proposed (invalid) set and the constraint to the recipient.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(set))` - a corrected checked set
    /// - `Ok(None)` - the recipient cancelled; no value is accepted
    ///
    /// # Errors
    ///
    /// `ConfirmerUnavailable` when the boundary cannot be reached.
    fn confirm(
        &self,
        proposed: &BTreeSet<usize>,
        constraint: CheckboxConstraint,
    ) -> Result<Option<BTreeSet<usize>>, ConfirmerUnavailable>;
}

/// Scripted confirmer for tests.
pub struct MockConfirmer {
    response: Option<BTreeSet<usize>>,
    calls: std::sync::atomic::AtomicUsize,
}

impl MockConfirmer {
    /// A confirmer whose user always cancels.
    #[must_use]
    pub fn cancelling() -> Self {
        Self {
            response: None,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// A confirmer whose user always returns `corrected`.
    #[must_use]
    pub fn returning(corrected: BTreeSet<usize>) -> Self {
        Self {
            response: Some(corrected),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Number of times the boundary was invoked.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl CheckboxConfirmer for MockConfirmer {
    fn confirm(
        &self,
        _proposed: &BTreeSet<usize>,
        _constraint: CheckboxConstraint,
    ) -> Result<Option<BTreeSet<usize>>, ConfirmerUnavailable> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

/// Confirmer that is always unreachable; callers must fail closed.
pub struct UnavailableConfirmer;

impl CheckboxConfirmer for UnavailableConfirmer {
    fn confirm(
        &self,
        _proposed: &BTreeSet<usize>,
        _constraint: CheckboxConstraint,
    ) -> Result<Option<BTreeSet<usize>>, ConfirmerUnavailable> {
        Err(ConfirmerUnavailable)
    }
}
