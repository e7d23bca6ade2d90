//! Per-shader editing context. A `Session` owns everything a form needs while
//! one shader is open: the extracted schema, the preset section it maps to, the
//! live field values, and the configuration file they are synchronized with.
//!
//! Types:
//!
//! - `Session` is constructed per opened shader; the presentation layer keeps
//!   one per window and drops it when the shader is closed.
//! - `LoadReport` describes a successful configuration load, including fields
//!   whose stored text could not be read.
//! - `SessionError` separates fatal load failures (duplicate sections, layout
//!   mismatch) from save failures so callers can surface them precisely.
//!
//! Functions:
//!
//! - `Session::open` extracts the schema, seeds values from defaults and
//!   loads a sibling preset when one exists.
//! - `Session::open_shader` does the same without looking for a preset.
//! - `Session::load_config` parses, checks compatibility, then pulls values.
//! - `Session::autoload_config` finds a sibling preset and loads it.
//! - `Session::save` pushes values into the store and writes the file.
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use fxschema::{load_schema, UniformDecl};
use inistore::{CasingMaps, ConfigError, ConfigStore, LoadedConfig};
use tracing::{info, warn};

use crate::compat::{check_compatibility, LayoutMismatch};
use crate::control::{control_kind, control_spec, initial_values, ControlSpec};
use crate::discover::{find_config_for_shader, section_for_shader};
use crate::values::{apply_values, encode_value, pull_values, push_values, FieldCoercionFailure};
use crate::{FieldValue, FieldValues};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Layout(#[from] LayoutMismatch),
    #[error("no configuration file loaded")]
    NoConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub path: PathBuf,
    /// The file did not exist yet; it will be created on save.
    pub new_file: bool,
    pub failures: Vec<FieldCoercionFailure>,
}

#[derive(Debug)]
struct OpenConfig {
    path: PathBuf,
    store: ConfigStore,
    casing: CasingMaps,
}

#[derive(Debug)]
pub struct Session {
    shader_path: PathBuf,
    section: String,
    schema: Vec<UniformDecl>,
    values: FieldValues,
    config: Option<OpenConfig>,
    last_load: Option<LoadReport>,
}

impl Session {
    /// Opens a shader and loads the first sibling preset, if any.
    ///
    /// A preset that fails to load does not fail the open: the session is
    /// returned without a configuration and the failure is logged. Use
    /// `open_shader` followed by `autoload_config` to handle it instead.
    pub fn open(shader_path: impl AsRef<Path>) -> Result<Self> {
        let mut session = Self::open_shader(shader_path)?;
        if let Err(err) = session.autoload_config() {
            warn!(
                shader = %session.shader_path.display(),
                error = %format_args!("{err:#}"),
                "opened shader without its sibling configuration"
            );
        }
        Ok(session)
    }

    pub fn open_shader(shader_path: impl AsRef<Path>) -> Result<Self> {
        let shader_path = shader_path.as_ref().to_path_buf();
        let section = section_for_shader(&shader_path)
            .ok_or_else(|| anyhow!("shader path has no file name: {}", shader_path.display()))?;
        let schema = load_schema(&shader_path)
            .with_context(|| format!("failed to open shader {}", shader_path.display()))?;
        info!(
            shader = %shader_path.display(),
            uniforms = schema.len(),
            section = %section,
            "opened shader"
        );

        Ok(Self::from_schema(shader_path, section, schema))
    }

    /// Builds a session around an already extracted schema.
    pub fn from_schema(
        shader_path: impl Into<PathBuf>,
        section: impl Into<String>,
        schema: Vec<UniformDecl>,
    ) -> Self {
        let values = initial_values(&schema);
        Self {
            shader_path: shader_path.into(),
            section: section.into(),
            schema,
            values,
            config: None,
            last_load: None,
        }
    }

    pub fn shader_path(&self) -> &Path {
        &self.shader_path
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn schema(&self) -> &[UniformDecl] {
        &self.schema
    }

    pub fn controls(&self) -> Vec<ControlSpec> {
        self.schema.iter().map(control_spec).collect()
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut FieldValues {
        &mut self.values
    }

    /// Sets a field value. Returns `false`, leaving the field unchanged, when
    /// the schema has no such uniform or its control cannot hold `value`.
    pub fn set_value(&mut self, name: &str, value: FieldValue) -> bool {
        let Some(decl) = self.schema.iter().find(|decl| decl.name == name) else {
            return false;
        };
        if encode_value(&control_kind(decl), &value).is_none() {
            return false;
        }
        self.values.insert(name.to_string(), value);
        true
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config.as_ref().map(|config| config.path.as_path())
    }

    pub fn store(&self) -> Option<&ConfigStore> {
        self.config.as_ref().map(|config| &config.store)
    }

    /// Report of the configuration currently loaded, including one picked up
    /// by `open`.
    pub fn last_load(&self) -> Option<&LoadReport> {
        self.last_load.as_ref()
    }

    /// Finds a sibling preset next to the shader and loads it. `Ok(None)` when
    /// there is no candidate; load failures surface as a `SessionError` inside
    /// the returned error.
    pub fn autoload_config(&mut self) -> Result<Option<LoadReport>> {
        let Some(path) = find_config_for_shader(&self.shader_path)? else {
            return Ok(None);
        };
        let report = self
            .load_config(&path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?;
        Ok(Some(report))
    }

    /// Loads `path` as this session's configuration.
    ///
    /// A duplicate section or a layout mismatch aborts the load: the session is
    /// left without a configuration and the field values are not touched. A
    /// missing file is accepted as an empty configuration to be created on save.
    pub fn load_config(&mut self, path: impl AsRef<Path>) -> Result<LoadReport, SessionError> {
        let path = path.as_ref().to_path_buf();
        self.config = None;
        self.last_load = None;

        let new_file = !path.exists();
        let LoadedConfig { store, casing } = ConfigStore::load(&path)?;

        if !new_file {
            if let Err(mismatch) = check_compatibility(&self.schema, &store, &self.section) {
                if !store.contains_section(&self.section) {
                    if let Some(other) = casing.section_name(&self.section) {
                        warn!(expected = %self.section, found = other, "section exists with different casing");
                    }
                }
                warn!(
                    path = %path.display(),
                    section = %self.section,
                    missing = ?mismatch.missing,
                    "configuration does not match shader layout"
                );
                return Err(mismatch.into());
            }
        }

        let raw = pull_values(&self.schema, &store, &self.section);
        let failures = apply_values(&self.schema, &raw, &mut self.values);
        info!(
            path = %path.display(),
            new_file,
            unreadable = failures.len(),
            "loaded configuration"
        );

        self.config = Some(OpenConfig {
            path: path.clone(),
            store,
            casing,
        });
        let report = LoadReport {
            path,
            new_file,
            failures,
        };
        self.last_load = Some(report.clone());
        Ok(report)
    }

    /// Writes the current values into the loaded configuration file and returns
    /// its path. Sections and keys the schema does not name are preserved.
    pub fn save(&mut self) -> Result<PathBuf, SessionError> {
        let config = self.config.as_mut().ok_or(SessionError::NoConfig)?;
        let rejected = push_values(&self.schema, &self.values, &mut config.store, &self.section);
        config.store.save(&config.path, &config.casing)?;
        info!(
            path = %config.path.display(),
            section = %self.section,
            skipped = rejected.len(),
            "saved configuration"
        );
        Ok(config.path.clone())
    }
}
