//! JSON/YAML text to nested document mapping, and back.
//!
//! Reading files or URLs is left to the caller; these helpers only convert
//! already-loaded text.

use crate::validation::StructuralValidationError;
use serde_json::Value;
use thiserror::Error;

/// Text encodings of a contract document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Format for a file extension (`json`, `yaml`, `yml`), case-insensitive
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Document root must be a mapping")]
    NotAMapping,

    #[error("Invalid contract: {0}")]
    Structural(#[from] StructuralValidationError),
}

/// Parse document text into its nested mapping.
pub fn parse_document(text: &str, format: DocumentFormat) -> Result<Value, DocumentError> {
    let value: Value = match format {
        DocumentFormat::Json => serde_json::from_str(text)?,
        DocumentFormat::Yaml => serde_yaml::from_str(text)?,
    };
    if !value.is_object() {
        return Err(DocumentError::NotAMapping);
    }
    Ok(value)
}

pub fn to_json_string(value: &Value) -> Result<String, DocumentError> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn to_yaml_string(value: &Value) -> Result<String, DocumentError> {
    Ok(serde_yaml::to_string(value)?)
}
