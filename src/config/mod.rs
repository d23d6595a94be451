//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Relative weights of the percentile dimensions in the composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    #[serde(default = "default_base_stats_weight")]
    pub base_stats: f64,

    #[serde(default = "default_level_weight")]
    pub level: f64,

    #[serde(default = "default_resource_weight")]
    pub resource: f64,
}

fn default_base_stats_weight() -> f64 {
    0.5
}

fn default_level_weight() -> f64 {
    0.3
}

fn default_resource_weight() -> f64 {
    0.2
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            base_stats: default_base_stats_weight(),
            level: default_level_weight(),
            resource: default_resource_weight(),
        }
    }
}

/// Analytics engine tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Members taken from the head of each guild's latest roster
    #[serde(default = "default_candidate_cap")]
    pub candidate_cap_per_guild: usize,

    /// Size of the Main tier
    #[serde(default = "default_main_size")]
    pub main_size: usize,

    /// Leaderboard length per window
    #[serde(default = "default_top_movers")]
    pub top_movers: usize,

    #[serde(default = "default_strength_threshold")]
    pub strength_threshold: f64,

    #[serde(default = "default_weakness_threshold")]
    pub weakness_threshold: f64,

    #[serde(default)]
    pub score_weights: ScoreWeights,

    /// Good/bad interval count per guild
    #[serde(default = "default_highlight_intervals")]
    pub highlight_intervals: usize,
}

fn default_candidate_cap() -> usize {
    50
}

fn default_main_size() -> usize {
    50
}

fn default_top_movers() -> usize {
    5
}

fn default_strength_threshold() -> f64 {
    0.8
}

fn default_weakness_threshold() -> f64 {
    0.2
}

fn default_highlight_intervals() -> usize {
    3
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            candidate_cap_per_guild: default_candidate_cap(),
            main_size: default_main_size(),
            top_movers: default_top_movers(),
            strength_threshold: default_strength_threshold(),
            weakness_threshold: default_weakness_threshold(),
            score_weights: ScoreWeights::default(),
            highlight_intervals: default_highlight_intervals(),
        }
    }
}

impl EngineConfig {
    /// Validate the engine settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = &self.score_weights;
        let total = weights.base_stats + weights.level + weights.resource;
        if (total - 1.0).abs() > 1e-9 {
            return Err(ConfigError::ValidationError(format!(
                "Score weights must sum to 1 (got {})",
                total
            )));
        }
        if [weights.base_stats, weights.level, weights.resource]
            .iter()
            .any(|w| *w < 0.0)
        {
            return Err(ConfigError::ValidationError(
                "Score weights must not be negative".to_string(),
            ));
        }

        for (name, value) in [
            ("strength_threshold", self.strength_threshold),
            ("weakness_threshold", self.weakness_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be within [0, 1] (got {})",
                    name, value
                )));
            }
        }
        if self.strength_threshold <= self.weakness_threshold {
            return Err(ConfigError::ValidationError(
                "strength_threshold must be greater than weakness_threshold".to_string(),
            ));
        }

        for (name, value) in [
            ("candidate_cap_per_guild", self.candidate_cap_per_guild),
            ("main_size", self.main_size),
            ("top_movers", self.top_movers),
            ("highlight_intervals", self.highlight_intervals),
        ] {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }

        Ok(())
    }
}

/// Snapshot source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Remote root serving `scans/manifest.json`; local data dir when unset
    #[serde(default)]
    pub base_url: Option<String>,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("roster-pulse/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            server: ServerConfig::default(),
            source: SourceConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            info!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Source timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        self.engine.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_level, "info");
        assert!(config.source.base_url.is_none());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.engine.main_size, 50);
    }

    #[test]
    fn test_engine_defaults() {
        let engine = EngineConfig::default();

        assert_eq!(engine.candidate_cap_per_guild, 50);
        assert_eq!(engine.top_movers, 5);
        assert_eq!(engine.strength_threshold, 0.8);
        assert_eq!(engine.weakness_threshold, 0.2);
        assert_eq!(engine.score_weights.base_stats, 0.5);
        assert_eq!(engine.highlight_intervals, 3);
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_timeout() {
        let mut config = AppConfig::default();
        config.source.timeout_seconds = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_engine_validation_weights() {
        let mut engine = EngineConfig::default();
        engine.score_weights.level = 0.4;

        assert!(engine.validate().is_err());
    }

    #[test]
    fn test_engine_validation_thresholds() {
        let mut engine = EngineConfig::default();
        engine.weakness_threshold = 0.9;
        assert!(engine.validate().is_err());

        let mut engine = EngineConfig::default();
        engine.strength_threshold = 1.5;
        assert!(engine.validate().is_err());
    }

    #[test]
    fn test_engine_validation_zero_sizes() {
        let mut engine = EngineConfig::default();
        engine.main_size = 0;

        assert!(engine.validate().is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "data_dir = \"/srv/scans\"\n\n[engine]\nmain_size = 30\n\n[source]\nbase_url = \"https://example.com/data\""
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/scans"));
        assert_eq!(config.engine.main_size, 30);
        assert_eq!(config.engine.top_movers, 5);
        assert_eq!(config.source.base_url.as_deref(), Some("https://example.com/data"));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        // Should be parseable
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.data_dir, parsed.data_dir);
        assert_eq!(config.engine, parsed.engine);
    }
}
