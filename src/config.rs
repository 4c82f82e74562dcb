use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Model artifact configuration
    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/local.toml".to_string());
        Self::load_from(&config_path)
    }

    /// Load configuration layering the embedded defaults, `path` and `LFP__*` variables
    pub fn load_from(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(path).required(false))
            // Override with environment variables (prefix: LFP)
            .add_source(
                config::Environment::with_prefix("LFP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            artifacts: ArtifactsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Serialized classifier (`.json` or bincode)
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Ordered feature-name list the classifier was trained on
    #[serde(default = "default_feature_columns_path")]
    pub feature_columns_path: PathBuf,

    /// What to do when a categorical option has no column in the feature list
    #[serde(default)]
    pub categorical_coverage: CoverageMode,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            feature_columns_path: default_feature_columns_path(),
            categorical_coverage: CoverageMode::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CoverageMode {
    /// Log uncovered options and keep serving
    #[default]
    Warn,
    /// Refuse to start
    Strict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            service_name: default_service_name(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_model_path() -> PathBuf {
    PathBuf::from("artifacts/model.json")
}

fn default_feature_columns_path() -> PathBuf {
    PathBuf::from("artifacts/feature_columns.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "loan-fraud-predictor".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        assert_eq!(default_http_port(), 8080);
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_model_path(), PathBuf::from("artifacts/model.json"));
    }

    #[test]
    fn test_coverage_mode() {
        assert_eq!(CoverageMode::default(), CoverageMode::Warn);
    }

    #[test]
    fn test_load_embedded_defaults() {
        let config = Config::load_from("config/does-not-exist.toml").unwrap();
        assert_eq!(config.server.http_port, 8080);
        assert_eq!(config.artifacts.categorical_coverage, CoverageMode::Warn);
        assert_eq!(
            config.artifacts.feature_columns_path,
            PathBuf::from("artifacts/feature_columns.json")
        );
    }

    #[test]
    fn test_load_file_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("override.toml");
        std::fs::write(
            &path,
            "[artifacts]\ncategorical_coverage = \"strict\"\n[server]\nhttp_port = 9191\n",
        )
        .unwrap();

        let config = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.http_port, 9191);
        assert_eq!(config.artifacts.categorical_coverage, CoverageMode::Strict);
    }

    #[test]
    fn test_invalid_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[artifacts]\ncategorical_coverage = \"sometimes\"\n").unwrap();

        let err = Config::load_from(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, crate::error::AppError::Configuration(_)));
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }
}
