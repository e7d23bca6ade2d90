//! Decides which kind of input a uniform gets, independent of any widget
//! toolkit. The choice is driven by the declared type and the `ui_type`
//! annotation; range bounds come from the `ui_min`/`ui_max`/`ui_step`
//! annotations with 0/100/1 as defaults.
use fxschema::{UniformDecl, UniformKind};
use serde::{Deserialize, Serialize};

use crate::values::coerce_value;
use crate::{FieldValue, FieldValues};

/// Values (compared case-insensitively) that read as `true` for checkboxes.
pub const TRUTHY: [&str; 3] = ["1", "true", "yes"];

/// Separator between combo entries in `ui_items`: a literal backslash-zero.
pub const COMBO_ITEM_SEPARATOR: &str = "\\0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlKind {
    Combo { items: Vec<String> },
    IntRange { min: i64, max: i64, step: i64 },
    FloatRange { min: f64, max: f64, step: f64 },
    Checkbox,
    Text,
}

impl ControlKind {
    /// Value a control holds when the declaration default is unusable.
    pub fn zero_value(&self) -> FieldValue {
        match self {
            Self::Combo { .. } => FieldValue::Choice(0),
            Self::IntRange { .. } => FieldValue::Int(0),
            Self::FloatRange { .. } => FieldValue::Float(0.0),
            Self::Checkbox => FieldValue::Bool(false),
            Self::Text => FieldValue::Text(String::new()),
        }
    }
}

/// Everything a form needs to build one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSpec {
    pub name: String,
    pub label: String,
    pub tooltip: Option<String>,
    pub kind: ControlKind,
}

pub fn control_spec(decl: &UniformDecl) -> ControlSpec {
    ControlSpec {
        name: decl.name.clone(),
        label: decl.label().to_string(),
        tooltip: decl.tooltip().map(str::to_string),
        kind: control_kind(decl),
    }
}

pub fn control_kind(decl: &UniformDecl) -> ControlKind {
    let ui_type = decl.ui_type();
    if ui_type == Some("combo") {
        return ControlKind::Combo {
            items: combo_items(decl.meta("ui_items").unwrap_or_default()),
        };
    }

    if matches!(ui_type, Some("slider" | "drag")) || decl.kind.is_numeric() {
        let min = bound(decl, "ui_min", 0.0);
        let max = bound(decl, "ui_max", 100.0);
        let step = bound(decl, "ui_step", 1.0);
        return if decl.kind == UniformKind::Int {
            ControlKind::IntRange {
                min: min as i64,
                max: max as i64,
                step: step as i64,
            }
        } else {
            ControlKind::FloatRange { min, max, step }
        };
    }

    if decl.kind == UniformKind::Bool {
        ControlKind::Checkbox
    } else {
        ControlKind::Text
    }
}

fn bound(decl: &UniformDecl, key: &str, fallback: f64) -> f64 {
    decl.meta(key)
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(fallback)
}

/// Splits a `ui_items` annotation into combo entries, dropping empty ones.
pub fn combo_items(raw: &str) -> Vec<String> {
    raw.split(COMBO_ITEM_SEPARATOR)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Value a freshly built control shows before any configuration is applied.
pub fn initial_value(decl: &UniformDecl) -> FieldValue {
    let kind = control_kind(decl);
    coerce_value(&kind, &decl.default).unwrap_or_else(|| kind.zero_value())
}

pub fn initial_values(decls: &[UniformDecl]) -> FieldValues {
    decls
        .iter()
        .map(|decl| (decl.name.clone(), initial_value(decl)))
        .collect()
}
