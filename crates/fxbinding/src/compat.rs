use std::collections::HashSet;

use fxschema::UniformDecl;
use inistore::ConfigStore;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("section '{section}' does not match the shader layout; missing keys: {}", .missing.join(", "))]
pub struct LayoutMismatch {
    pub section: String,
    /// Declaration names without a matching key, sorted.
    pub missing: Vec<String>,
}

/// Lowercases and strips underscores, so `MaxRadius` and `max_radius` compare equal.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|ch| *ch != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Checks that every declaration has a matching key in `section`. Extra keys
/// and other sections are ignored; a missing section matches nothing.
pub fn check_compatibility(
    decls: &[UniformDecl],
    store: &ConfigStore,
    section: &str,
) -> Result<(), LayoutMismatch> {
    let keys: HashSet<String> = store
        .section(section)
        .map(|section| section.keys().map(normalize_name).collect())
        .unwrap_or_default();

    let mut missing: Vec<String> = decls
        .iter()
        .filter(|decl| !keys.contains(&normalize_name(&decl.name)))
        .map(|decl| decl.name.clone())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    missing.sort();
    Err(LayoutMismatch {
        section: section.to_string(),
        missing,
    })
}
