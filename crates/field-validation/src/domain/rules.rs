//! Per-field-type constraint checks.
//!
//! All functions are total: invalid input yields structured violations,
//! never a panic.

use super::entities::{DateFormat, FieldKind, FieldMeta, FieldValue, NumberMeta, TextMeta};
use shared_types::FieldViolation;

/// Validates a candidate value against a field's type and metadata.
///
/// # Errors
///
/// A non-empty list of structured violations when the value is rejected.
pub fn validate(
    kind: FieldKind,
    meta: &FieldMeta,
    value: &FieldValue,
) -> Result<(), Vec<FieldViolation>> {
    let violations = match kind {
        FieldKind::Signature | FieldKind::Initials | FieldKind::Name => {
            check_text(value, text_meta(meta), kind)
        }
        FieldKind::Text => check_text(value, text_meta(meta), kind),
        FieldKind::Email => check_email(value, text_meta(meta)),
        FieldKind::Number => check_number(value, number_meta(meta)),
        FieldKind::Checkbox => check_checkbox(value, meta),
        FieldKind::Radio | FieldKind::Dropdown => check_option(value, meta),
        FieldKind::Date => check_date(value, date_format(meta)),
    };

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn text_meta(meta: &FieldMeta) -> TextMeta {
    match meta {
        FieldMeta::Text(m) => *m,
        _ => TextMeta::default(),
    }
}

fn number_meta(meta: &FieldMeta) -> NumberMeta {
    match meta {
        FieldMeta::Number(m) => *m,
        _ => NumberMeta::default(),
    }
}

fn date_format(meta: &FieldMeta) -> DateFormat {
    match meta {
        FieldMeta::Date(f) => *f,
        _ => DateFormat::default(),
    }
}

fn expect_text<'v>(value: &'v FieldValue, out: &mut Vec<FieldViolation>) -> Option<&'v str> {
    match value {
        FieldValue::Text(s) => Some(s),
        other => {
            out.push(FieldViolation::new(
                "wrong_value_shape",
                format!("expected a text value, got {other:?}"),
            ));
            None
        }
    }
}

fn check_text(value: &FieldValue, meta: TextMeta, kind: FieldKind) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    let Some(s) = expect_text(value, &mut out) else {
        return out;
    };

    if s.trim().is_empty() {
        out.push(FieldViolation::new(
            "empty",
            format!("{} must not be empty", kind.as_str()),
        ));
    }
    if s.chars().count() > meta.max_len {
        out.push(FieldViolation::new(
            "too_long",
            format!("{} exceeds {} characters", kind.as_str(), meta.max_len),
        ));
    }
    out
}

fn check_email(value: &FieldValue, meta: TextMeta) -> Vec<FieldViolation> {
    let mut out = check_text(value, meta, FieldKind::Email);
    let Some(s) = (match value {
        FieldValue::Text(s) => Some(s.as_str()),
        _ => None,
    }) else {
        return out;
    };

    // Syntactic check only: one '@', non-empty local part, domain with a dot,
    // no whitespace. Deliverability is not this layer's concern.
    let syntactically_valid = {
        let mut parts = s.split('@');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !s.chars().any(char::is_whitespace)
            }
            _ => false,
        }
    };

    if !syntactically_valid && !s.trim().is_empty() {
        out.push(FieldViolation::new(
            "invalid_email",
            format!("'{s}' is not a valid email address"),
        ));
    }
    out
}

fn check_number(value: &FieldValue, meta: NumberMeta) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    let Some(s) = expect_text(value, &mut out) else {
        return out;
    };

    let trimmed = s.trim();
    let Ok(parsed) = trimmed.parse::<f64>() else {
        out.push(FieldViolation::new(
            "not_a_number",
            format!("'{s}' is not a number"),
        ));
        return out;
    };
    if !parsed.is_finite() {
        out.push(FieldViolation::new(
            "not_a_number",
            format!("'{s}' is not a finite number"),
        ));
        return out;
    }

    if let Some(min) = meta.min {
        if parsed < min {
            out.push(FieldViolation::new(
                "below_min",
                format!("{parsed} is below the minimum {min}"),
            ));
        }
    }
    if let Some(max) = meta.max {
        if parsed > max {
            out.push(FieldViolation::new(
                "above_max",
                format!("{parsed} is above the maximum {max}"),
            ));
        }
    }
    if let Some(places) = meta.decimal_places {
        let actual = trimmed
            .split_once('.')
            .map(|(_, frac)| frac.trim_end_matches(['e', 'E']).len())
            .unwrap_or(0);
        if actual > usize::from(places) {
            out.push(FieldViolation::new(
                "too_many_decimals",
                format!("at most {places} decimal places allowed"),
            ));
        }
    }
    out
}

fn check_checkbox(value: &FieldValue, meta: &FieldMeta) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    let FieldValue::Checked(checked) = value else {
        out.push(FieldViolation::new(
            "wrong_value_shape",
            "expected a checked-index set".to_string(),
        ));
        return out;
    };

    let (options, constraint) = match meta {
        FieldMeta::Checkbox {
            options,
            constraint,
        } => (*options, *constraint),
        _ => (usize::MAX, None),
    };

    if let Some(out_of_range) = checked.iter().find(|&&i| i >= options) {
        out.push(FieldViolation::new(
            "index_out_of_range",
            format!("checkbox index {out_of_range} outside group of {options}"),
        ));
    }

    if let Some(constraint) = constraint {
        if !constraint.satisfied_by(checked.len()) {
            out.push(FieldViolation::new(
                "count_rule",
                format!(
                    "{} boxes checked, rule requires {:?} {}",
                    checked.len(),
                    constraint.rule,
                    constraint.count
                ),
            ));
        }
    }
    out
}

fn check_option(value: &FieldValue, meta: &FieldMeta) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    let selected = match value {
        FieldValue::Option(s) => s.as_str(),
        // Some clients submit the option as plain text.
        FieldValue::Text(s) => s.as_str(),
        other => {
            out.push(FieldViolation::new(
                "wrong_value_shape",
                format!("expected an option choice, got {other:?}"),
            ));
            return out;
        }
    };

    let FieldMeta::Options(options) = meta else {
        out.push(FieldViolation::new(
            "no_options_configured",
            "field has no configured options".to_string(),
        ));
        return out;
    };

    if !options.iter().any(|o| o == selected) {
        out.push(FieldViolation::new(
            "not_an_option",
            format!("'{selected}' is not a configured option"),
        ));
    }
    out
}

fn check_date(value: &FieldValue, format: DateFormat) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    let Some(s) = expect_text(value, &mut out) else {
        return out;
    };

    // Format-bound only: digit-group shape and separators. The calendar value
    // itself is supplied by the caller.
    let sep = format.separator();
    let groups = format.groups();
    let parts: Vec<&str> = s.trim().split(sep).collect();

    let shape_ok = parts.len() == 3
        && parts
            .iter()
            .zip(groups.iter())
            .all(|(part, &len)| part.len() == len && part.chars().all(|c| c.is_ascii_digit()));

    if !shape_ok {
        out.push(FieldViolation::new(
            "date_format",
            format!("'{s}' does not match the {format:?} format"),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CheckboxConstraint, CheckboxRule};

    #[test]
    fn test_signature_rejects_empty() {
        let meta = FieldMeta::default_for(FieldKind::Signature);
        let err = validate(FieldKind::Signature, &meta, &FieldValue::text("   ")).unwrap_err();
        assert_eq!(err[0].code, "empty");
    }

    #[test]
    fn test_name_length_bound() {
        let meta = FieldMeta::Text(TextMeta { max_len: 4 });
        assert!(validate(FieldKind::Name, &meta, &FieldValue::text("Ada")).is_ok());
        let err = validate(FieldKind::Name, &meta, &FieldValue::text("Augusta")).unwrap_err();
        assert_eq!(err[0].code, "too_long");
    }

    #[test]
    fn test_email_syntax() {
        let meta = FieldMeta::default_for(FieldKind::Email);
        assert!(validate(FieldKind::Email, &meta, &FieldValue::text("a@b.co")).is_ok());

        for bad in ["plainaddress", "a@b", "a@@b.co", "a b@c.co", "a@.co", "a@co."] {
            let err = validate(FieldKind::Email, &meta, &FieldValue::text(bad)).unwrap_err();
            assert!(
                err.iter().any(|v| v.code == "invalid_email"),
                "expected rejection for {bad}"
            );
        }
    }

    #[test]
    fn test_number_bounds_and_decimals() {
        let meta = FieldMeta::Number(NumberMeta {
            min: Some(0.0),
            max: Some(100.0),
            decimal_places: Some(2),
        });
        assert!(validate(FieldKind::Number, &meta, &FieldValue::text("99.25")).is_ok());

        let err = validate(FieldKind::Number, &meta, &FieldValue::text("-1")).unwrap_err();
        assert_eq!(err[0].code, "below_min");

        let err = validate(FieldKind::Number, &meta, &FieldValue::text("100.001")).unwrap_err();
        assert!(err.iter().any(|v| v.code == "above_max"));
        assert!(err.iter().any(|v| v.code == "too_many_decimals"));

        let err = validate(FieldKind::Number, &meta, &FieldValue::text("twelve")).unwrap_err();
        assert_eq!(err[0].code, "not_a_number");
    }

    #[test]
    fn test_checkbox_count_rule() {
        let meta = FieldMeta::Checkbox {
            options: 4,
            constraint: Some(CheckboxConstraint {
                rule: CheckboxRule::Exactly,
                count: 2,
            }),
        };
        assert!(validate(FieldKind::Checkbox, &meta, &FieldValue::checked([0, 3])).is_ok());

        let err =
            validate(FieldKind::Checkbox, &meta, &FieldValue::checked([1])).unwrap_err();
        assert_eq!(err[0].code, "count_rule");

        let err =
            validate(FieldKind::Checkbox, &meta, &FieldValue::checked([0, 7])).unwrap_err();
        assert!(err.iter().any(|v| v.code == "index_out_of_range"));
    }

    #[test]
    fn test_radio_requires_configured_option() {
        let meta = FieldMeta::Options(vec!["yes".into(), "no".into()]);
        assert!(validate(FieldKind::Radio, &meta, &FieldValue::Option("yes".into())).is_ok());

        let err =
            validate(FieldKind::Dropdown, &meta, &FieldValue::Option("maybe".into())).unwrap_err();
        assert_eq!(err[0].code, "not_an_option");
    }

    #[test]
    fn test_date_format_shape() {
        let iso = FieldMeta::Date(DateFormat::IsoDate);
        assert!(validate(FieldKind::Date, &iso, &FieldValue::text("2026-08-25")).is_ok());
        assert!(validate(FieldKind::Date, &iso, &FieldValue::text("08/25/2026")).is_err());

        let us = FieldMeta::Date(DateFormat::UsSlashes);
        assert!(validate(FieldKind::Date, &us, &FieldValue::text("08/25/2026")).is_ok());
    }

    #[test]
    fn test_wrong_value_shape_is_total() {
        let meta = FieldMeta::default_for(FieldKind::Signature);
        let err = validate(
            FieldKind::Signature,
            &meta,
            &FieldValue::checked([0]),
        )
        .unwrap_err();
        assert_eq!(err[0].code, "wrong_value_shape");
    }
}
