mod casing;
mod parse;
mod write;

pub use casing::CasingMaps;
pub use write::serialize;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Reserved name of the headerless section holding keys that precede the first
/// `[Section]` header.
pub const IMPLICIT_SECTION: &str = "GLOBAL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("section '{name}' already exists (line {line})")]
    DuplicateSection { name: String, line: usize },
    #[error("failed to read configuration at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write configuration to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A parsed configuration file together with the casing recorded from its text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedConfig {
    pub store: ConfigStore,
    pub casing: CasingMaps,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    implicit: bool,
    entries: Vec<(String, String)>,
}

impl Section {
    fn explicit(name: &str) -> Self {
        Self {
            name: name.to_string(),
            implicit: false,
            entries: Vec::new(),
        }
    }

    fn implicit() -> Self {
        Self {
            name: IMPLICIT_SECTION.to_string(),
            implicit: true,
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    /// Value for `key`, compared case-insensitively.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key).map(|index| self.entries[index].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Updates an existing key in place (keeping its position and stored
    /// casing) or appends a new one.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.position(key) {
            Some(index) => self.entries[index].1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(key))
    }
}

/// Section/key/value model of one INI file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigStore {
    sections: Vec<Section>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the file at `path`; a missing file yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<LoadedConfig, ConfigError> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "configuration file missing; starting empty");
                return Ok(LoadedConfig::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let loaded = Self::parse_str(&text)?;
        debug!(
            path = %path.display(),
            sections = loaded.store.sections.len(),
            "parsed configuration file"
        );
        Ok(loaded)
    }

    pub fn parse_str(text: &str) -> Result<LoadedConfig, ConfigError> {
        parse::parse_text(text)
    }

    /// Serializes the store and writes it to `path` in one call.
    pub fn save(&self, path: impl AsRef<Path>, casing: &CasingMaps) -> Result<(), ConfigError> {
        let path = path.as_ref();
        fs::write(path, serialize(self, casing)).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "wrote configuration file");
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Section named exactly `name` (section names are case-sensitive).
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name == name)
    }

    pub fn implicit_section(&self) -> Option<&Section> {
        self.sections.iter().find(|section| section.implicit)
    }

    pub fn contains_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// The section named `name`, appended as a new explicit section if absent.
    pub fn ensure_section(&mut self, name: &str) -> &mut Section {
        let index = match self.sections.iter().position(|section| section.name == name) {
            Some(index) => index,
            None => {
                self.sections.push(Section::explicit(name));
                self.sections.len() - 1
            }
        };
        &mut self.sections[index]
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.ensure_section(section).set(key, value);
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?.get(key)
    }
}
