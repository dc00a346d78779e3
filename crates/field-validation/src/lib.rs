//! # Field Validation Engine
//!
//! Stateless per-field-type constraint checks for the signing workflow.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Totality: invalid input returns structured violations, never panics | `domain/rules.rs` |
//! | Pick-one fast path: `<=`/`=` with count 1 commits the clicked box alone | `domain/checkbox.rs` |
//! | Fail closed: an unavailable confirmation boundary accepts no value | `domain/checkbox.rs` |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ports/   - CheckboxConfirmer trait (human-in-the-loop boundary)
//! domain/  - FieldKind/FieldMeta/FieldValue, validate(), click policy
//! ```
//!
//! The crate performs no I/O; the only outward dependency is the synchronous
//! `CheckboxConfirmer` port invoked when a checkbox interaction leaves the
//! field invalid.

pub mod domain;
pub mod ports;

pub use domain::checkbox::{resolve_checkbox_click, CheckboxOutcome};
pub use domain::entities::{
    CheckboxConstraint, CheckboxRule, DateFormat, FieldKind, FieldMeta, FieldValue, NumberMeta,
    TextMeta,
};
pub use domain::rules::validate;
pub use ports::{CheckboxConfirmer, ConfirmerUnavailable, MockConfirmer, UnavailableConfirmer};
