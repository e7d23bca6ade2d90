use std::collections::BTreeMap;

use crate::parse::{classify_line, starts_with_header, strip_bom, Line};
use crate::IMPLICIT_SECTION;

/// Original spelling of every section header and key seen in a file. Section
/// spellings are indexed by their lowercase form; key spellings are grouped by
/// the exact section name, since `[Fx]` and `[FX]` are distinct sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CasingMaps {
    sections: BTreeMap<String, String>,
    keys: BTreeMap<String, BTreeMap<String, String>>,
}

impl CasingMaps {
    /// Records casing straight from the raw lines, independent of the
    /// structured parse.
    pub fn from_text(text: &str) -> Self {
        let text = strip_bom(text);
        let mut casing = Self::default();
        let mut current = (!starts_with_header(text)).then(|| IMPLICIT_SECTION.to_string());
        if let Some(implicit) = &current {
            casing.record_section(implicit);
        }

        for raw in text.lines() {
            match classify_line(raw) {
                Line::Header(name) => {
                    casing.record_section(name);
                    current = Some(name.to_string());
                }
                Line::Entry { key, .. } => {
                    if let Some(section) = &current {
                        casing.record_key(section, key);
                    }
                }
                Line::Ignored => {}
            }
        }

        casing
    }

    fn record_section(&mut self, name: &str) {
        let lower = name.to_ascii_lowercase();
        self.sections.insert(lower, name.to_string());
        self.keys.entry(name.to_string()).or_default();
    }

    fn record_key(&mut self, section: &str, key: &str) {
        self.keys
            .entry(section.to_string())
            .or_default()
            .insert(key.to_ascii_lowercase(), key.to_string());
    }

    /// Original header text for a section, looked up case-insensitively.
    pub fn section_name(&self, section: &str) -> Option<&str> {
        self.sections
            .get(&section.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Original spelling of `key` within the section named exactly `section`,
    /// with the key looked up case-insensitively.
    pub fn key_name(&self, section: &str, key: &str) -> Option<&str> {
        self.keys
            .get(section)?
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
