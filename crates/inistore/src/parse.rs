//! Turns INI text into a `ConfigStore`. The grammar is deliberately loose:
//! `[Section]` headers, `key=value` entries, and everything else ignored.
//!
//! Functions:
//!
//! - `classify_line` is shared with the casing scan in `casing` so both passes
//!   agree on what counts as a header or an entry.
//! - `parse_text` builds the store, synthesizing the implicit section for text
//!   that does not open with a header and rejecting repeated headers.
use crate::casing::CasingMaps;
use crate::{ConfigError, ConfigStore, LoadedConfig, Section};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Line<'a> {
    Header(&'a str),
    Entry { key: &'a str, value: &'a str },
    Ignored,
}

pub(crate) fn classify_line(raw: &str) -> Line<'_> {
    let line = raw.trim();
    if let Some(name) = header_name(line) {
        return Line::Header(name);
    }
    if line.starts_with('#') || line.starts_with(';') {
        return Line::Ignored;
    }
    match line.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Line::Entry {
            key: key.trim(),
            value: value.trim(),
        },
        _ => Line::Ignored,
    }
}

fn header_name(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('[')?;
    let end = rest.find(']')?;
    let name = &rest[..end];
    (!name.is_empty()).then_some(name)
}

/// Text without a leading UTF-8 byte order mark.
pub(crate) fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// True when the first non-blank line of `text` is a section header.
pub(crate) fn starts_with_header(text: &str) -> bool {
    text.lines()
        .find(|line| !line.trim().is_empty())
        .is_some_and(|line| matches!(classify_line(line), Line::Header(_)))
}

pub(crate) fn parse_text(text: &str) -> Result<LoadedConfig, ConfigError> {
    let text = strip_bom(text);
    let casing = CasingMaps::from_text(text);
    let mut store = ConfigStore::default();
    let mut current = None;

    if !starts_with_header(text) {
        store.sections.push(Section::implicit());
        current = Some(0);
    }

    for (index, raw) in text.lines().enumerate() {
        match classify_line(raw) {
            Line::Header(name) => {
                if store.contains_section(name) {
                    return Err(ConfigError::DuplicateSection {
                        name: name.to_string(),
                        line: index + 1,
                    });
                }
                store.sections.push(Section::explicit(name));
                current = Some(store.sections.len() - 1);
            }
            Line::Entry { key, value } => {
                if let Some(section) = current {
                    store.sections[section].set(key, value);
                }
            }
            Line::Ignored => {}
        }
    }

    Ok(LoadedConfig { store, casing })
}
