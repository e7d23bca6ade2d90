use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::debug;

/// Name of the preset section holding a shader's values: the shader's file
/// name, extension included (`Bloom.fx`).
pub fn section_for_shader(shader_path: &Path) -> Option<String> {
    shader_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

/// Looks next to the shader for an `.ini` file whose name contains the
/// shader's file stem, ignoring case. Candidates are compared in sorted order,
/// so the first match is stable across platforms.
pub fn find_config_for_shader(shader_path: &Path) -> Result<Option<PathBuf>> {
    let stem = shader_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_lowercase())
        .ok_or_else(|| anyhow!("shader path has no file name: {}", shader_path.display()))?;
    let dir = match shader_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("failed to list configuration candidates in {}", dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if !name.ends_with(".ini") || !name.contains(&stem) {
            continue;
        }
        if entry.file_type()?.is_file() {
            candidates.push(entry.path());
        }
    }
    candidates.sort();

    let found = candidates.into_iter().next();
    match &found {
        Some(path) => debug!(shader = %shader_path.display(), config = %path.display(), "found sibling configuration"),
        None => debug!(shader = %shader_path.display(), "no sibling configuration found"),
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_section_after_shader_file() {
        assert_eq!(
            section_for_shader(Path::new("shaders/Bloom.fx")).as_deref(),
            Some("Bloom.fx")
        );
        assert_eq!(section_for_shader(Path::new("/")), None);
    }

    #[test]
    fn finds_ini_containing_shader_stem() {
        let temp = tempfile::tempdir().unwrap();
        let shader = temp.path().join("Bloom.fx");
        fs::write(&shader, "").unwrap();
        fs::write(temp.path().join("notes.txt"), "").unwrap();
        fs::write(temp.path().join("Vignette.ini"), "").unwrap();
        fs::write(temp.path().join("MyBLOOM_preset.INI"), "").unwrap();
        fs::create_dir(temp.path().join("bloom.ini")).unwrap();

        let found = find_config_for_shader(&shader).expect("scan directory");
        assert_eq!(found, Some(temp.path().join("MyBLOOM_preset.INI")));
    }

    #[test]
    fn prefers_first_candidate_in_sorted_order() {
        let temp = tempfile::tempdir().unwrap();
        let shader = temp.path().join("Bloom.fx");
        fs::write(temp.path().join("bloom_b.ini"), "").unwrap();
        fs::write(temp.path().join("bloom_a.ini"), "").unwrap();

        let found = find_config_for_shader(&shader).expect("scan directory");
        assert_eq!(found, Some(temp.path().join("bloom_a.ini")));
    }

    #[test]
    fn returns_none_without_candidates() {
        let temp = tempfile::tempdir().unwrap();
        let shader = temp.path().join("Bloom.fx");
        fs::write(temp.path().join("Other.ini"), "").unwrap();
        assert_eq!(find_config_for_shader(&shader).unwrap(), None);
    }

    #[test]
    fn fails_for_unreadable_directory() {
        let temp = tempfile::tempdir().unwrap();
        let shader = temp.path().join("missing").join("Bloom.fx");
        assert!(find_config_for_shader(&shader).is_err());
    }
}
