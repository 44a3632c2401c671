use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::constants::{
    CONTACT_API_KEY_ENV, DEFAULT_CONTACT_BASE_URL, DEFAULT_CONTACT_MODEL,
    DEFAULT_CONTACT_TEMPERATURE, DEFAULT_LOG_DIRECTORY, DEFAULT_LOG_FILE_NAME, DEFAULT_LOG_FILTER,
    DEFAULT_REGISTRY_BASE_URL, DEFAULT_TIMEOUT_SECONDS,
};
use crate::error::{EnrichError, Result};
use crate::types::ContactFallback;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub registry: RegistryConfig,
    pub contact: ContactConfig,
    pub fallback: ContactFallback,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REGISTRY_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CONTACT_BASE_URL.to_string(),
            model: DEFAULT_CONTACT_MODEL.to_string(),
            temperature: DEFAULT_CONTACT_TEMPERATURE,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: String,
    pub file_name: String,
    /// Write the JSON log file in addition to the console
    pub file_output: bool,
    /// Used when RUST_LOG is not set
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: DEFAULT_LOG_DIRECTORY.to_string(),
            file_name: DEFAULT_LOG_FILE_NAME.to_string(),
            file_output: true,
            default_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            EnrichError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.registry.base_url.trim().is_empty() {
            return Err(EnrichError::Config("registry.base_url must not be empty".into()));
        }
        if self.contact.base_url.trim().is_empty() {
            return Err(EnrichError::Config("contact.base_url must not be empty".into()));
        }
        if self.logging.file_output && self.logging.file_name.trim().is_empty() {
            return Err(EnrichError::Config("logging.file_name must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.contact.temperature) {
            return Err(EnrichError::Config(format!(
                "contact.temperature must be within 0.0..=2.0, got {}",
                self.contact.temperature
            )));
        }
        Ok(())
    }
}

/// Read the contact search API key from the environment.
pub fn contact_api_key() -> Result<String> {
    let key = std::env::var(CONTACT_API_KEY_ENV)?;
    if key.trim().is_empty() {
        return Err(EnrichError::Config(format!("{} is set but empty", CONTACT_API_KEY_ENV)));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{FALLBACK_EMAIL, FALLBACK_PHONE};

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.registry.base_url, DEFAULT_REGISTRY_BASE_URL);
        assert_eq!(config.contact.model, DEFAULT_CONTACT_MODEL);
        assert_eq!(config.fallback.phone, FALLBACK_PHONE);
        assert_eq!(config.fallback.email, FALLBACK_EMAIL);
    }

    #[test]
    fn test_partial_sections_override() {
        let config = Config::from_toml(
            r#"
            [contact]
            model = "sonar"
            temperature = 0.1

            [fallback]
            phone = "(555) 000-0000"
            "#,
        )
        .unwrap();
        assert_eq!(config.contact.model, "sonar");
        assert_eq!(config.contact.base_url, DEFAULT_CONTACT_BASE_URL);
        assert_eq!(config.fallback.phone, "(555) 000-0000");
        assert_eq!(config.fallback.email, FALLBACK_EMAIL);
    }

    #[test]
    fn test_rejects_out_of_range_temperature() {
        let err = Config::from_toml("[contact]\ntemperature = 5.0\n").unwrap_err();
        assert!(matches!(err, EnrichError::Config(_)));
    }

    #[test]
    fn test_logging_section() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.logging.directory, DEFAULT_LOG_DIRECTORY);
        assert!(config.logging.file_output);

        let config = Config::from_toml(
            "[logging]\ndirectory = \"/var/log/enricher\"\nfile_output = false\nfile_name = \"\"\n",
        )
        .unwrap();
        assert_eq!(config.logging.directory, "/var/log/enricher");
        assert_eq!(config.logging.default_filter, DEFAULT_LOG_FILTER);

        let err = Config::from_toml("[logging]\nfile_name = \" \"\n").unwrap_err();
        assert!(matches!(err, EnrichError::Config(_)));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load(Path::new("definitely/not/here.toml")).unwrap();
        assert_eq!(config.registry.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
    }
}
