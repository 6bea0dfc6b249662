//! Configuration for workbook conversion

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Suffix of synthetic element-type owners unless configured otherwise
pub const DEFAULT_ITEMS_SUFFIX: &str = ".items";

/// Cell encoding settings shared by the serializer and deserializer.
///
/// Both directions of one conversion must use the same settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConversionConfig {
    /// Joins list items within one cell. Splitting uses the trimmed form,
    /// so `", "` splits on `,`.
    pub list_delimiter: String,
    /// Tokens read as `true`, compared case-insensitively
    pub truthy_tokens: Vec<String>,
    /// Tokens read as `false`, compared case-insensitively
    pub falsy_tokens: Vec<String>,
    /// Suffix of the synthetic object name carrying array element rows
    pub items_suffix: String,
    /// Log derived columns (counts, levels) that disagree with the data
    pub check_derived_columns: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            list_delimiter: ", ".to_string(),
            truthy_tokens: ["true", "yes", "y", "1", "on"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            falsy_tokens: ["false", "no", "n", "0", "off"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            items_suffix: DEFAULT_ITEMS_SUFFIX.to_string(),
            check_derived_columns: true,
        }
    }
}

impl ConversionConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from TOML text; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_list_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.list_delimiter = delimiter.into();
        self
    }

    pub fn with_boolean_tokens(mut self, truthy: &[&str], falsy: &[&str]) -> Self {
        self.truthy_tokens = truthy.iter().map(|t| t.to_string()).collect();
        self.falsy_tokens = falsy.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_items_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.items_suffix = suffix.into();
        self
    }

    pub fn with_derived_column_checks(mut self, enabled: bool) -> Self {
        self.check_derived_columns = enabled;
        self
    }

    /// The separator list cells are split on
    pub fn split_separator(&self) -> &str {
        match self.list_delimiter.trim() {
            "" => self.list_delimiter.as_str(),
            trimmed => trimmed,
        }
    }

    /// Boolean value of a token, `None` if it is neither truthy nor falsy
    pub fn parse_bool(&self, token: &str) -> Option<bool> {
        let token = token.trim();
        if self.truthy_tokens.iter().any(|t| t.eq_ignore_ascii_case(token)) {
            Some(true)
        } else if self.falsy_tokens.iter().any(|t| t.eq_ignore_ascii_case(token)) {
            Some(false)
        } else {
            None
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.list_delimiter.is_empty() {
            return Err(ConfigError::Invalid("list_delimiter cannot be empty".to_string()));
        }
        if self.split_separator().contains('\\') {
            return Err(ConfigError::Invalid(
                "list_delimiter cannot contain the escape character '\\'".to_string(),
            ));
        }
        if self.truthy_tokens.is_empty() || self.falsy_tokens.is_empty() {
            return Err(ConfigError::Invalid(
                "truthy_tokens and falsy_tokens need at least one token each".to_string(),
            ));
        }
        if let Some(shared) = self
            .truthy_tokens
            .iter()
            .find(|t| self.falsy_tokens.iter().any(|f| f.eq_ignore_ascii_case(t)))
        {
            return Err(ConfigError::Invalid(format!(
                "token '{}' is both truthy and falsy",
                shared
            )));
        }
        if self.items_suffix.trim().is_empty() {
            return Err(ConfigError::Invalid("items_suffix cannot be empty".to_string()));
        }
        Ok(())
    }
}
