use crate::{CasingMaps, ConfigStore, Section};

/// Renders the store back to INI text.
///
/// The implicit section comes first without a header, followed by every
/// explicit section in store order, blocks separated by one blank line. Keys
/// are written with the spelling recorded in `casing`, falling back to the
/// stored key for entries the file never contained.
pub fn serialize(store: &ConfigStore, casing: &CasingMaps) -> String {
    let mut out = String::new();
    let mut wrote_any = false;

    if let Some(section) = store.implicit_section() {
        write_entries(&mut out, section, casing);
        wrote_any = !section.is_empty();
    }

    for section in store.sections().filter(|section| !section.is_implicit()) {
        if wrote_any {
            out.push('\n');
        }
        out.push('[');
        out.push_str(section.name());
        out.push_str("]\n");
        write_entries(&mut out, section, casing);
        wrote_any = true;
    }

    out
}

fn write_entries(out: &mut String, section: &Section, casing: &CasingMaps) {
    for (key, value) in section.entries() {
        let key = casing.key_name(section.name(), key).unwrap_or(key);
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }
}
