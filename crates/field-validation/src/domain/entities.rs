//! Field kinds, type-specific metadata, and candidate values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The ten field types a recipient can be asked to fill.
///
/// Closed enum: adding a variant forces every match site to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Full signature image/typed signature.
    Signature,
    /// Initials.
    Initials,
    /// Recipient name.
    Name,
    /// Email address.
    Email,
    /// Date, format-bound.
    Date,
    /// Free text.
    Text,
    /// Decimal number with optional bounds.
    Number,
    /// One or more checkboxes with an optional count rule.
    Checkbox,
    /// Single choice among configured options.
    Radio,
    /// Single choice from a dropdown of configured options.
    Dropdown,
}

impl FieldKind {
    /// Short lowercase name used in audit metadata.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signature => "signature",
            Self::Initials => "initials",
            Self::Name => "name",
            Self::Email => "email",
            Self::Date => "date",
            Self::Text => "text",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Dropdown => "dropdown",
        }
    }
}

/// Comparison rule for checkbox count constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckboxRule {
    /// Checked count must equal the configured count.
    #[serde(rename = "=")]
    Exactly,
    /// Checked count must not exceed the configured count.
    #[serde(rename = "<=")]
    AtMost,
    /// Checked count must reach at least the configured count.
    #[serde(rename = ">=")]
    AtLeast,
}

/// Optional `(rule, count)` constraint carried by checkbox metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckboxConstraint {
    /// How the checked-set size compares to `count`.
    pub rule: CheckboxRule,
    /// The reference count.
    pub count: usize,
}

impl CheckboxConstraint {
    /// Whether a checked-set of `size` satisfies this constraint.
    #[must_use]
    pub fn satisfied_by(&self, size: usize) -> bool {
        match self.rule {
            CheckboxRule::Exactly => size == self.count,
            CheckboxRule::AtMost => size <= self.count,
            CheckboxRule::AtLeast => size >= self.count,
        }
    }

    /// The "pick one" shape that resolves clicks without confirmation.
    #[must_use]
    pub fn is_pick_one(&self) -> bool {
        self.count == 1 && matches!(self.rule, CheckboxRule::Exactly | CheckboxRule::AtMost)
    }
}

/// Length bounds for text-like fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMeta {
    /// Maximum accepted character count.
    pub max_len: usize,
}

impl Default for TextMeta {
    fn default() -> Self {
        Self { max_len: 1024 }
    }
}

/// Numeric bounds for number fields.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NumberMeta {
    /// Inclusive lower bound.
    pub min: Option<f64>,
    /// Inclusive upper bound.
    pub max: Option<f64>,
    /// Maximum digits after the decimal point.
    pub decimal_places: Option<u8>,
}

/// Supported date format patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateFormat {
    /// `YYYY-MM-DD`
    #[default]
    IsoDate,
    /// `MM/DD/YYYY`
    UsSlashes,
    /// `DD.MM.YYYY`
    EuDots,
}

impl DateFormat {
    /// Expected separator character.
    #[must_use]
    pub fn separator(&self) -> char {
        match self {
            Self::IsoDate => '-',
            Self::UsSlashes => '/',
            Self::EuDots => '.',
        }
    }

    /// Expected digit-group lengths, in order.
    #[must_use]
    pub fn groups(&self) -> [usize; 3] {
        match self {
            Self::IsoDate => [4, 2, 2],
            Self::UsSlashes | Self::EuDots => [2, 2, 4],
        }
    }
}

/// Type-specific validation metadata attached to a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldMeta {
    /// Signature / initials / name / email / free text bounds.
    Text(TextMeta),
    /// Number bounds.
    Number(NumberMeta),
    /// Checkbox option count plus optional count constraint.
    Checkbox {
        /// Number of boxes in the group.
        options: usize,
        /// Optional `(rule, count)` constraint.
        constraint: Option<CheckboxConstraint>,
    },
    /// Configured options for radio/dropdown.
    Options(Vec<String>),
    /// Date format binding.
    Date(DateFormat),
    /// No metadata configured; defaults apply.
    None,
}

impl FieldMeta {
    /// Default metadata for a field kind.
    #[must_use]
    pub fn default_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Signature | FieldKind::Initials | FieldKind::Name | FieldKind::Email
            | FieldKind::Text => Self::Text(TextMeta::default()),
            FieldKind::Number => Self::Number(NumberMeta::default()),
            FieldKind::Checkbox => Self::Checkbox {
                options: 1,
                constraint: None,
            },
            FieldKind::Radio | FieldKind::Dropdown => Self::Options(Vec::new()),
            FieldKind::Date => Self::Date(DateFormat::default()),
        }
    }
}

/// Candidate value submitted for a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Text-like content (signature/initials/name/email/text/date/number as entered).
    Text(String),
    /// Indices of checked boxes within the group.
    Checked(BTreeSet<usize>),
    /// Selected option for radio/dropdown.
    Option(String),
}

impl FieldValue {
    /// Convenience constructor for text values.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Convenience constructor for checked-index sets.
    #[must_use]
    pub fn checked<I: IntoIterator<Item = usize>>(indices: I) -> Self {
        Self::Checked(indices.into_iter().collect())
    }
}
