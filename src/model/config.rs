use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::service::llm::DEFAULT_MAX_OUTPUT_TOKENS;

const ENV_CONFIG_PATH: &str = "CATALOGUE_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_INITIAL_DELAY_MS: u64 = 1000;
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// Tuning for LLM-assisted extraction
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Additional attempts after the first on transient provider failures
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry
    pub initial_delay_ms: u64,
    /// Output token cap per extraction call
    pub max_output_tokens: u32,
    /// Mark the system prompt as cacheable on the provider side
    pub use_cache: bool,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            use_cache: true,
        }
    }
}

/// Cross-origin settings for browser clients
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
        }
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub extraction: ExtractionSettings,
    #[serde(default)]
    pub cors: CorsConfig,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub extraction: ExtractionSettings,
    pub cors: CorsConfig,
    pub port: u16,
    pub host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extraction: ExtractionSettings::default(),
            cors: CorsConfig::default(),
            port: 8080,
            host: "127.0.0.1".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let file = Self::load_config_file(&config_path).unwrap_or_default();

        Self {
            extraction: file.extraction,
            cors: file.cors,
            port,
            host,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse_config(&contents) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "Loaded configuration from file");
                    Some(config)
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    fn parse_config(contents: &str) -> Result<ConfigFile, serde_yaml::Error> {
        let contents = contents.trim();
        if contents.is_empty() {
            return Ok(ConfigFile::default());
        }
        serde_yaml::from_str(contents)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse_config("  \n").unwrap();
        assert_eq!(config.extraction, ExtractionSettings::default());
        assert_eq!(config.cors.allowed_origins, vec!["http://localhost:5173"]);
    }

    #[test]
    fn test_partial_extraction_section() {
        let yaml = r#"
extraction:
  max_retries: 5
  use_cache: false
"#;
        let config = Config::parse_config(yaml).unwrap();
        assert_eq!(config.extraction.max_retries, 5);
        assert!(!config.extraction.use_cache);
        assert_eq!(config.extraction.initial_delay_ms, 1000);
        assert_eq!(config.extraction.max_output_tokens, 4096);
    }

    #[test]
    fn test_cors_origins() {
        let yaml = r#"
cors:
  allowed_origins:
    - https://catalogue.example.com
    - http://localhost:3000
"#;
        let config = Config::parse_config(yaml).unwrap();
        assert_eq!(config.cors.allowed_origins.len(), 2);
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        assert!(Config::parse_config("extraction: [1, 2").is_err());
    }

    #[test]
    fn test_missing_file_returns_none() {
        assert!(Config::load_config_file("/nonexistent/catalogue-config.yaml").is_none());
    }
}
