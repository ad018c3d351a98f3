//! Configuration management for netcfg
//!
//! Loads the TOML configuration, applies `NETCFG_SECTION__KEY` environment
//! overrides and validates the result.

use crate::error::{NetcfgError, Result};
use crate::metadata::DEFAULT_SCAN_LINES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

pub const SCHEMA_VERSION: &str = "1.0.0";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub redaction: RedactionConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Parser configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Leading lines scanned for vendor markers and the hostname
    pub metadata_scan_lines: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            metadata_scan_lines: DEFAULT_SCAN_LINES,
        }
    }
}

/// Redaction configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedactionConfig {
    /// Extra `[[rule]]` definitions merged over the built-in table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules_file: Option<PathBuf>,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub provider: String, // "hashing" or "fastembed"
    pub model: String,
    pub dimension: usize,
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "hashing".to_string(),
            model: "all-MiniLM-L6-v2".to_string(),
            dimension: 384,
            batch_size: 32,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Chunks returned per file when the caller does not say
    pub top_k: usize,
    /// Chunks fetched per role by a compare
    pub compare_top_k: usize,
    /// Default compare mode: "quick" or "deep"
    pub compare_mode: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            compare_top_k: 50,
            compare_mode: "quick".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(NetcfgError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| NetcfgError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Load from `path` if given, else from the default path, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let default_path = Self::default_path()?;
        if default_path.exists() {
            return Self::load(&default_path);
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| NetcfgError::Io {
                source: e,
                context: format!("Failed to create config directory: {:?}", parent),
            })?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| NetcfgError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: NETCFG_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("NETCFG_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "PARSER__METADATA_SCAN_LINES" => {
                self.parser.metadata_scan_lines = parse_usize(path, value)?;
            }
            "REDACTION__RULES_FILE" => {
                self.redaction.rules_file = Some(PathBuf::from(value));
            }
            "EMBEDDING__PROVIDER" => {
                self.embedding.provider = value.to_string();
            }
            "EMBEDDING__MODEL" => {
                self.embedding.model = value.to_string();
            }
            "EMBEDDING__DIMENSION" => {
                self.embedding.dimension = parse_usize(path, value)?;
            }
            "RETRIEVAL__TOP_K" => {
                self.retrieval.top_k = parse_usize(path, value)?;
            }
            "RETRIEVAL__COMPARE_TOP_K" => {
                self.retrieval.compare_top_k = parse_usize(path, value)?;
            }
            "RETRIEVAL__COMPARE_MODE" => {
                self.retrieval.compare_mode = value.to_string();
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| NetcfgError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("netcfg").join("config.toml"))
    }
}

fn parse_usize(path: &str, value: &str) -> Result<usize> {
    value.parse().map_err(|_| NetcfgError::InvalidConfigValue {
        path: path.to_string(),
        message: format!("Cannot parse '{}' as an unsigned integer", value),
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: SCHEMA_VERSION.to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            parser: ParserConfig::default(),
            redaction: RedactionConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}
