//! Checkbox click resolution policy.
//!
//! A click either commits immediately, or routes through the human-in-the-loop
//! confirmation boundary when the resulting set would violate the constraint.

use super::entities::{CheckboxConstraint, FieldMeta};
use crate::ports::CheckboxConfirmer;
use shared_types::FieldViolation;
use std::collections::BTreeSet;

/// Result of resolving a checkbox click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckboxOutcome {
    /// The click commits this checked set.
    Committed(BTreeSet<usize>),
    /// The recipient cancelled at the confirmation boundary; nothing accepted.
    Cancelled,
}

/// Resolves a single checkbox click against the current checked set.
///
/// Policy:
/// - Rule `<=` or `=` with count 1 and the clicked box unchecked: commit the
///   clicked box as the sole checked value. This applies even when the prior
///   set was inconsistent with the constraint ("pick one" always resolves).
/// - Otherwise the click toggles the box; if the resulting set satisfies the
///   constraint (or there is none), it commits.
/// - A resulting set that violates the constraint goes to the `confirmer`,
///   which returns a corrected set or cancellation. An unavailable confirmer
///   fails closed.
///
/// # Errors
///
/// Structured violations when the confirmation boundary is unavailable or
/// returns a set that still violates the constraint.
pub fn resolve_checkbox_click(
    meta: &FieldMeta,
    current: &BTreeSet<usize>,
    clicked: usize,
    confirmer: &dyn CheckboxConfirmer,
) -> Result<CheckboxOutcome, Vec<FieldViolation>> {
    let (options, constraint) = match meta {
        FieldMeta::Checkbox {
            options,
            constraint,
        } => (*options, *constraint),
        _ => {
            return Err(vec![FieldViolation::new(
                "wrong_meta",
                "field is not a checkbox group".to_string(),
            )])
        }
    };

    if clicked >= options {
        return Err(vec![FieldViolation::new(
            "index_out_of_range",
            format!("checkbox index {clicked} outside group of {options}"),
        )]);
    }

    // Pick-one fast path.
    if let Some(c) = constraint {
        if c.is_pick_one() && !current.contains(&clicked) {
            return Ok(CheckboxOutcome::Committed(BTreeSet::from([clicked])));
        }
    }

    let mut toggled = current.clone();
    if !toggled.remove(&clicked) {
        toggled.insert(clicked);
    }

    match constraint {
        None => Ok(CheckboxOutcome::Committed(toggled)),
        Some(c) if c.satisfied_by(toggled.len()) => Ok(CheckboxOutcome::Committed(toggled)),
        Some(c) => confirm(c, toggled, confirmer),
    }
}

fn confirm(
    constraint: CheckboxConstraint,
    proposed: BTreeSet<usize>,
    confirmer: &dyn CheckboxConfirmer,
) -> Result<CheckboxOutcome, Vec<FieldViolation>> {
    // Fail closed: no confirmation, no value.
    let corrected = confirmer
        .confirm(&proposed, constraint)
        .map_err(|_unavailable| {
            vec![FieldViolation::new(
                "confirmation_unavailable",
                "checkbox confirmation boundary unavailable; no value accepted".to_string(),
            )]
        })?;

    match corrected {
        None => Ok(CheckboxOutcome::Cancelled),
        Some(set) if constraint.satisfied_by(set.len()) => Ok(CheckboxOutcome::Committed(set)),
        Some(set) => Err(vec![FieldViolation::new(
            "count_rule",
            format!(
                "corrected set of {} still violates {:?} {}",
                set.len(),
                constraint.rule,
                constraint.count
            ),
        )]),
    }
}
