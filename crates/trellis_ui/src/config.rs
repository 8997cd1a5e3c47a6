//! Engine configuration.
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! document is a valid configuration.
//!
//! ```toml
//! key_repeat_delay_ms = 400
//! key_repeat_interval_ms = 30
//! clamp_pointers = true
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::UiResult;

/// Tunables for input synthesis and template splicing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How long a key must be held before it starts repeating.
    pub key_repeat_delay_ms: u64,
    /// Interval between repeated key presses once repeating.
    pub key_repeat_interval_ms: u64,
    /// Drop mouse samples that fall outside the render target.
    pub clamp_pointers: bool,
    /// Joiner placed between an including node's id and a template node's id.
    pub template_separator: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            key_repeat_delay_ms: 500,
            key_repeat_interval_ms: 50,
            clamp_pointers: false,
            template_separator: "__".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or has mistyped fields.
    pub fn from_toml_str(src: &str) -> UiResult<Self> {
        Ok(toml::from_str(src)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_toml_file(path: impl AsRef<Path>) -> UiResult<Self> {
        let src = std::fs::read_to_string(path)?;
        Self::from_toml_str(&src)
    }

    /// Initial key repeat delay.
    #[must_use]
    pub const fn repeat_delay(&self) -> Duration {
        Duration::from_millis(self.key_repeat_delay_ms)
    }

    /// Key repeat interval.
    #[must_use]
    pub const fn repeat_interval(&self) -> Duration {
        Duration::from_millis(self.key_repeat_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.repeat_delay(), Duration::from_millis(500));
        assert_eq!(config.repeat_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_toml_str("clamp_pointers = true\nkey_repeat_delay_ms = 250").unwrap();
        assert!(config.clamp_pointers);
        assert_eq!(config.key_repeat_delay_ms, 250);
        assert_eq!(config.key_repeat_interval_ms, 50);
        assert_eq!(config.template_separator, "__");
    }

    #[test]
    fn test_mistyped_field_rejected() {
        assert!(EngineConfig::from_toml_str("clamp_pointers = \"yes\"").is_err());
    }
}
