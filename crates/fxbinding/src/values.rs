use std::collections::BTreeMap;

use fxschema::UniformDecl;
use inistore::ConfigStore;
use tracing::{debug, warn};

use crate::control::{control_kind, ControlKind, TRUTHY};
use crate::{FieldValue, FieldValues};

/// A configuration value that could not be read as its field's kind. The
/// field keeps whatever value it held before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCoercionFailure {
    pub name: String,
    pub value: String,
    pub expected: &'static str,
}

/// Raw configuration text for every declaration: the value stored in
/// `section`, or the declaration default when the key (or section) is absent.
pub fn pull_values(
    decls: &[UniformDecl],
    store: &ConfigStore,
    section: &str,
) -> BTreeMap<String, String> {
    let section = store.section(section);
    decls
        .iter()
        .map(|decl| {
            let value = section
                .and_then(|section| section.get(&decl.name))
                .unwrap_or(&decl.default);
            (decl.name.clone(), value.to_string())
        })
        .collect()
}

/// Interprets pulled text per control kind and stores the results in `values`.
/// Fields whose text does not parse are left untouched and reported back.
pub fn apply_values(
    decls: &[UniformDecl],
    raw: &BTreeMap<String, String>,
    values: &mut FieldValues,
) -> Vec<FieldCoercionFailure> {
    let mut failures = Vec::new();
    for decl in decls {
        let Some(text) = raw.get(&decl.name) else {
            continue;
        };
        let kind = control_kind(decl);
        match coerce_value(&kind, text) {
            Some(value) => {
                values.insert(decl.name.clone(), value);
            }
            None => {
                let expected = kind.zero_value().kind_name();
                warn!(name = %decl.name, value = %text, expected, "keeping previous value for unreadable field");
                failures.push(FieldCoercionFailure {
                    name: decl.name.clone(),
                    value: text.clone(),
                    expected,
                });
            }
        }
    }
    failures
}

/// Writes every declaration that has a current value into `section`, creating
/// the section when needed. Keys not named by a declaration are left alone.
///
/// Values that cannot be stored for the declaration's control (see
/// `encode_value`) are skipped, keeping whatever the section held, and
/// reported back.
pub fn push_values(
    decls: &[UniformDecl],
    values: &FieldValues,
    store: &mut ConfigStore,
    section: &str,
) -> Vec<FieldCoercionFailure> {
    let target = store.ensure_section(section);
    let mut rejected = Vec::new();
    let mut written = 0usize;
    for decl in decls {
        let Some(value) = values.get(&decl.name) else {
            continue;
        };
        let kind = control_kind(decl);
        match encode_value(&kind, value) {
            Some(text) => {
                target.set(&decl.name, text);
                written += 1;
            }
            None => {
                let expected = kind.zero_value().kind_name();
                warn!(name = %decl.name, value = %value, expected, "not writing value the field cannot hold");
                rejected.push(FieldCoercionFailure {
                    name: decl.name.clone(),
                    value: format_value(value),
                    expected,
                });
            }
        }
    }
    debug!(section, written, rejected = rejected.len(), "pushed field values into configuration");
    rejected
}

/// Configuration text for `value` held by a control of `kind`. `None` when the
/// variant does not belong to the control, for non-finite floats, and for text
/// with line breaks, which would not read back as a single entry.
pub fn encode_value(kind: &ControlKind, value: &FieldValue) -> Option<String> {
    let fits = match (kind, value) {
        (ControlKind::Combo { .. }, FieldValue::Choice(_))
        | (ControlKind::IntRange { .. }, FieldValue::Int(_))
        | (ControlKind::Checkbox, FieldValue::Bool(_)) => true,
        (ControlKind::FloatRange { .. }, FieldValue::Float(number)) => number.is_finite(),
        (ControlKind::Text, FieldValue::Text(text)) => !text.contains(['\n', '\r']),
        _ => false,
    };
    fits.then(|| format_value(value))
}

/// Reads configuration text as a value for a control of `kind`.
pub fn coerce_value(kind: &ControlKind, raw: &str) -> Option<FieldValue> {
    let text = raw.trim();
    match kind {
        ControlKind::Combo { .. } => text.parse::<usize>().ok().map(FieldValue::Choice),
        ControlKind::IntRange { .. } => parse_int(text).map(FieldValue::Int),
        ControlKind::FloatRange { .. } => parse_float(text).map(FieldValue::Float),
        ControlKind::Checkbox => Some(FieldValue::Bool(
            TRUTHY.iter().any(|truthy| truthy.eq_ignore_ascii_case(text)),
        )),
        ControlKind::Text => Some(FieldValue::Text(raw.to_string())),
    }
}

/// Integer text, or float text truncated toward zero (`"3.0"` reads as 3).
fn parse_int(text: &str) -> Option<i64> {
    text.parse::<i64>().ok().or_else(|| {
        parse_float(text)
            .filter(|value| value.abs() < i64::MAX as f64)
            .map(|value| value.trunc() as i64)
    })
}

fn parse_float(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Configuration text for a field value: decimal numbers, `1`/`0` for
/// booleans, the index for combos and raw text otherwise.
pub fn format_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Int(value) => value.to_string(),
        FieldValue::Float(value) => format_float(*value),
        FieldValue::Bool(true) => "1".to_string(),
        FieldValue::Bool(false) => "0".to_string(),
        FieldValue::Choice(index) => index.to_string(),
        FieldValue::Text(text) => text.clone(),
    }
}

// Integral floats keep one fractional digit so `2.0` is not written as `2`.
fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
