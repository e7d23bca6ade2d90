mod compat;
mod control;
mod discover;
mod session;
mod values;

pub use compat::{check_compatibility, normalize_name, LayoutMismatch};
pub use control::{
    combo_items, control_kind, control_spec, initial_value, initial_values, ControlKind,
    ControlSpec, COMBO_ITEM_SEPARATOR, TRUTHY,
};
pub use discover::{find_config_for_shader, section_for_shader};
pub use session::{LoadReport, Session, SessionError};
pub use values::{
    apply_values, coerce_value, encode_value, format_value, pull_values, push_values,
    FieldCoercionFailure,
};

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Live value of one form field, as held by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Selected index of a combo control.
    Choice(usize),
    Text(String),
}

impl FieldValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Choice(_) => "choice",
            Self::Text(_) => "text",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_value(self))
    }
}

/// Field values keyed by uniform name.
pub type FieldValues = BTreeMap<String, FieldValue>;
