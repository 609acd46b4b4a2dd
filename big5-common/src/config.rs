//! Bootstrap configuration loading and config file resolution
//!
//! Config file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. `BIG5_CONFIG` environment variable
//! 3. Platform config directory (`<config_dir>/big5/big5-pi.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing config file is not fatal: a warning is logged and compiled
//! defaults are used. A config file that exists but cannot be parsed is.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "BIG5_CONFIG";

/// Bootstrap configuration loaded from TOML
///
/// Read once at startup. The service must restart to pick up changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by the CORS layer
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub models: ModelsConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub summary: SummaryConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Declared encoding of the trait regressor artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressorEncoding {
    /// Inspect the artifact and pick the encoding
    #[default]
    Auto,
    /// XGBoost JSON booster
    TreeEnsembleNative,
    /// JSON-exported multi-output regressor
    GenericSerialized,
}

/// Model artifact locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Trait regressor artifact (required)
    #[serde(default = "default_regressor_path")]
    pub regressor: PathBuf,

    #[serde(default)]
    pub regressor_encoding: RegressorEncoding,

    /// Sentence embedding model directory (required)
    #[serde(default = "default_embedding_dir")]
    pub embedding_dir: PathBuf,

    /// L2-normalize sentence embeddings
    #[serde(default = "default_true")]
    pub normalize_embeddings: bool,

    /// Tokenizer truncation length
    #[serde(default = "default_max_sequence_length")]
    pub max_sequence_length: usize,

    /// Count-vectorizer vocabulary artifact (optional)
    #[serde(default)]
    pub topic_vocabulary: Option<PathBuf>,

    /// Topic projection artifact (optional)
    #[serde(default)]
    pub topic_model: Option<PathBuf>,

    /// Full VADER lexicon file; the compiled-in subset is used only when
    /// it cannot be loaded
    #[serde(default = "default_sentiment_lexicon")]
    pub sentiment_lexicon: Option<PathBuf>,

    /// Averaged perceptron tagger: directory holding the three JSON files, or
    /// one combined JSON file. Rule-based tagging when it cannot be loaded
    #[serde(default = "default_pos_tagger")]
    pub pos_tagger: Option<PathBuf>,
}

/// Pipeline behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Fan per-comment work out across a thread pool
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Substitute the neutral profile when prediction fails
    #[serde(default = "default_true")]
    pub fallback_on_error: bool,
}

/// Summary collaborator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// API key (the `GEMINI_API_KEY` environment variable takes priority)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model names, tried in order
    #[serde(default = "default_summary_models")]
    pub models: Vec<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_regressor_path() -> PathBuf {
    PathBuf::from("model/Big_5_final.json")
}

fn default_embedding_dir() -> PathBuf {
    PathBuf::from("model/sentence-embedding")
}

fn default_sentiment_lexicon() -> Option<PathBuf> {
    Some(PathBuf::from("model/vader_lexicon.txt"))
}

fn default_pos_tagger() -> Option<PathBuf> {
    Some(PathBuf::from("model/averaged_perceptron_tagger_eng"))
}

fn default_max_sequence_length() -> usize {
    384
}

fn default_summary_models() -> Vec<String> {
    vec![
        "gemini-1.5-flash".to_string(),
        "gemini-1.5-flash-latest".to_string(),
        "gemini-pro".to_string(),
    ]
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_requests_per_minute() -> u32 {
    30
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            logging: LoggingConfig::default(),
            models: ModelsConfig::default(),
            pipeline: PipelineConfig::default(),
            summary: SummaryConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            regressor: default_regressor_path(),
            regressor_encoding: RegressorEncoding::Auto,
            embedding_dir: default_embedding_dir(),
            normalize_embeddings: true,
            max_sequence_length: default_max_sequence_length(),
            topic_vocabulary: None,
            topic_model: None,
            sentiment_lexicon: default_sentiment_lexicon(),
            pos_tagger: default_pos_tagger(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            fallback_on_error: true,
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            models: default_summary_models(),
            timeout_secs: default_timeout_secs(),
            requests_per_minute: default_requests_per_minute(),
        }
    }
}

impl TomlConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a config file, resolving relative model paths
    /// against the file's directory
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        let mut config = Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
        if let Some(base) = path.parent() {
            config.resolve_relative_paths(base);
        }
        Ok(config)
    }

    /// Make every relative artifact path absolute with respect to `base`
    pub fn resolve_relative_paths(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        join(&mut self.models.regressor);
        join(&mut self.models.embedding_dir);
        for p in [
            &mut self.models.topic_vocabulary,
            &mut self.models.topic_model,
            &mut self.models.sentiment_lexicon,
            &mut self.models.pos_tagger,
            &mut self.logging.file,
        ]
        .into_iter()
        .flatten()
        {
            join(p);
        }
    }
}

/// Resolves which config file to load
pub struct ConfigResolver {
    cli_arg: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_arg: Option<PathBuf>) -> Self {
        Self { cli_arg }
    }

    /// Pick the config file path by priority, if any source names one
    pub fn resolve_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.cli_arg {
            return Some(path.clone());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        default_config_path().filter(|p| p.exists())
    }

    /// Load the resolved config, falling back to defaults when no file exists
    pub fn load(&self) -> Result<TomlConfig> {
        match self.resolve_path() {
            Some(path) if path.exists() => {
                let config = TomlConfig::load(&path)?;
                info!("Loaded config from {}", path.display());
                Ok(config)
            }
            Some(path) => {
                warn!(
                    "Config file {} not found, using compiled defaults",
                    path.display()
                );
                Ok(TomlConfig::default())
            }
            None => {
                info!("No config file found, using compiled defaults");
                Ok(TomlConfig::default())
            }
        }
    }
}

/// Platform config file location (`~/.config/big5/big5-pi.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("big5").join("big5-pi.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.port, 8000);
        assert!(config.pipeline.fallback_on_error);
        assert_eq!(config.models.regressor_encoding, RegressorEncoding::Auto);
    }

    #[test]
    fn test_partial_toml() {
        let config = TomlConfig::from_toml_str(
            r#"
            port = 9100

            [models]
            regressor = "/srv/models/big5.json"
            regressor_encoding = "generic_serialized"
            topic_model = "lda.json"

            [pipeline]
            parallel = false
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.models.regressor, PathBuf::from("/srv/models/big5.json"));
        assert_eq!(
            config.models.regressor_encoding,
            RegressorEncoding::GenericSerialized
        );
        assert!(!config.pipeline.parallel);
        assert!(config.pipeline.fallback_on_error);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_encoding_rejected() {
        let result = TomlConfig::from_toml_str(
            r#"
            [models]
            regressor_encoding = "pickle"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_relative_paths_resolved() {
        let mut config = TomlConfig::from_toml_str(
            r#"
            [models]
            regressor = "/abs/model.json"
            embedding_dir = "embed"
            topic_vocabulary = "vocab.json"
            "#,
        )
        .unwrap();
        config.resolve_relative_paths(Path::new("/etc/big5"));

        assert_eq!(config.models.regressor, PathBuf::from("/abs/model.json"));
        assert_eq!(config.models.embedding_dir, PathBuf::from("/etc/big5/embed"));
        assert_eq!(
            config.models.topic_vocabulary,
            Some(PathBuf::from("/etc/big5/vocab.json"))
        );
        assert_eq!(config.models.topic_model, None);
    }
}
