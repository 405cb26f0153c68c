//! Configuration management for the Mevzuat Assistant.
//!
//! This module handles loading and merging configuration from multiple
//! sources:
//! - Environment variables
//! - Command-line flags
//! - An optional YAML config file
//!
//! Secrets (API keys) are never read from the config file; the file may
//! only name the environment variables that hold them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Default chat model for answer synthesis.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default model for the fallback classifier. A smaller model is
/// sufficient for the single-token routing call.
pub const DEFAULT_CLASSIFIER_MODEL: &str = "gpt-4o-mini";

/// Main application configuration.
///
/// This struct holds all global options that affect pipeline behavior
/// across commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Generation-service provider (e.g., "openai", "ollama")
    pub provider: String,

    /// Model used for answer synthesis
    pub model: String,

    /// Model used by the fallback classifier
    pub classifier_model: String,

    /// API key for the generation service
    pub api_key: Option<String>,

    /// Vector store (Weaviate) endpoint URL
    pub store_url: String,

    /// Vector store API key
    pub store_api_key: Option<String>,

    /// Optional YAML file defining the partition registry
    pub registry_file: Option<PathBuf>,

    /// Optional YAML file defining the statute citation table
    pub statute_file: Option<PathBuf>,

    /// SQLite database path for feedback ratings
    pub feedback_db: PathBuf,

    /// Whether the keyword classifier runs before the model classifier
    pub fast_classifier: bool,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    store: Option<StoreSection>,
    retrieval: Option<RetrievalSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    #[serde(rename = "classifierModel")]
    classifier_model: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreSection {
    url: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RetrievalSection {
    #[serde(rename = "registryFile")]
    registry_file: Option<PathBuf>,
    #[serde(rename = "statuteFile")]
    statute_file: Option<PathBuf>,
    #[serde(rename = "fastClassifier")]
    fast_classifier: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            provider: "openai".to_string(),
            model: DEFAULT_MODEL.to_string(),
            classifier_model: DEFAULT_CLASSIFIER_MODEL.to_string(),
            api_key: None,
            store_url: "http://localhost:8080".to_string(),
            store_api_key: None,
            registry_file: None,
            statute_file: None,
            feedback_db: PathBuf::from("mevzuat-feedback.db"),
            fast_classifier: true,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `MEVZUAT_CONFIG`: Path to config file
    /// - `MEVZUAT_PROVIDER`: Generation-service provider
    /// - `MEVZUAT_MODEL`: Chat model identifier
    /// - `MEVZUAT_API_KEY` / `OPENAI_API_KEY`: Generation-service key
    /// - `WEAVIATE_URL`: Vector store endpoint
    /// - `WEAVIATE_API_KEY`: Vector store key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("MEVZUAT_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        // Load from YAML config file if present
        if let Some(path) = config.config_file.clone() {
            if !path.exists() {
                return Err(AppError::Config(format!(
                    "Config file does not exist: {:?}",
                    path
                )));
            }
            config.merge_yaml(&path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("MEVZUAT_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("MEVZUAT_MODEL") {
            config.model = model;
        }

        if let Ok(url) = std::env::var("WEAVIATE_URL") {
            config.store_url = url;
        }

        if config.api_key.is_none() {
            config.api_key = std::env::var("MEVZUAT_API_KEY")
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .ok();
        }

        if config.store_api_key.is_none() {
            config.store_api_key = std::env::var("WEAVIATE_API_KEY").ok();
        }

        config.log_level = std::env::var("RUST_LOG").ok().or(config.log_level);

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                self.provider = provider;
            }
            if let Some(model) = llm.model {
                self.model = model;
            }
            if let Some(classifier_model) = llm.classifier_model {
                self.classifier_model = classifier_model;
            }
            if let Some(env_var) = llm.api_key_env {
                self.api_key = std::env::var(&env_var).ok();
            }
        }

        if let Some(store) = config_file.store {
            if let Some(url) = store.url {
                self.store_url = url;
            }
            if let Some(env_var) = store.api_key_env {
                self.store_api_key = std::env::var(&env_var).ok();
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            if let Some(registry_file) = retrieval.registry_file {
                self.registry_file = Some(registry_file);
            }
            if let Some(statute_file) = retrieval.statute_file {
                self.statute_file = Some(statute_file);
            }
            if let Some(fast) = retrieval.fast_classifier {
                self.fast_classifier = fast;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables
    /// and the config file.
    pub fn with_overrides(
        mut self,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["openai", "ollama"];

        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        if self.provider == "openai" && self.api_key.is_none() {
            return Err(AppError::Config(
                "OpenAI provider requires an API key (MEVZUAT_API_KEY or OPENAI_API_KEY)"
                    .to_string(),
            ));
        }

        Ok(())
    }
}
