mod annotations;
mod defines;
mod scan;

pub use annotations::{parse_annotations, DEFAULT_UI_MAX, DEFAULT_UI_MIN};
pub use defines::{collect_defines, Defines};
pub use scan::extract_schema;

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read shader source at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Primitive kind of a uniform, keyed by the type token used in the shader.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UniformKind {
    Int,
    Float,
    Bool,
    Text,
    /// Any type token without a dedicated kind (`float3`, `texture`, ...).
    Other(String),
}

impl UniformKind {
    pub fn from_token(token: &str) -> Self {
        match token {
            "int" => Self::Int,
            "float" => Self::Float,
            "bool" => Self::Bool,
            "string" => Self::Text,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Text => "string",
            Self::Other(token) => token.as_str(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }
}

impl From<String> for UniformKind {
    fn from(value: String) -> Self {
        Self::from_token(&value)
    }
}

impl From<UniformKind> for String {
    fn from(value: UniformKind) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for UniformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tunable parameter declared in a shader source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformDecl {
    pub kind: UniformKind,
    pub name: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    pub default: String,
}

impl UniformDecl {
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn label(&self) -> &str {
        self.meta("ui_label").unwrap_or(&self.name)
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.meta("ui_tooltip").filter(|tip| !tip.is_empty())
    }

    pub fn ui_type(&self) -> Option<&str> {
        self.meta("ui_type")
    }
}

/// Reads a shader file and extracts its uniform declarations.
pub fn load_schema(path: impl AsRef<Path>) -> Result<Vec<UniformDecl>, SchemaError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let decls = extract_schema(&source);
    debug!(path = %path.display(), uniforms = decls.len(), "extracted shader schema");
    Ok(decls)
}
