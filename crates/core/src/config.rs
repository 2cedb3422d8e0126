//! Configuration management for AgroDoc.
//!
//! Configuration is resolved once at startup from, in increasing precedence:
//! - Built-in defaults
//! - A YAML file (`AGRODOC_CONFIG` or `config/config.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! Credentials are only ever read from the environment. A missing key is not
//! a startup error; the component that needs it fails on its first call.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default location of the YAML configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Completion providers the factory knows how to build.
pub const KNOWN_LLM_PROVIDERS: [&str; 2] = ["groq", "ollama"];

/// Embedding providers the factory knows how to build.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["ollama", "trigram"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file the values were merged from, if any
    pub config_file: Option<PathBuf>,

    /// Completion service settings
    pub llm: LlmSettings,

    /// Embedding model settings
    pub embedding: EmbeddingSettings,

    /// Path of the SQLite vector index
    pub index_path: PathBuf,

    /// Number of passages retrieved per query
    pub top_k: usize,

    /// Answer cache bounds
    pub cache: CacheSettings,

    /// Weather provider base URL
    pub weather_endpoint: String,

    /// HTTP server bind settings
    pub server: ServerSettings,

    /// Completion API key (`GROQ_API_KEY`)
    #[serde(skip_serializing)]
    pub groq_api_key: Option<String>,

    /// Weather API key (`WEATHER_API_KEY`)
    #[serde(skip_serializing)]
    pub weather_api_key: Option<String>,

    /// Log filter override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Completion service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Provider identifier ("groq" or "ollama")
    pub provider: String,

    /// Completion model identifier
    pub model: String,

    /// Optional endpoint override
    pub endpoint: Option<String>,
}

/// Embedding model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Provider identifier ("ollama" or "trigram")
    pub provider: String,

    /// Embedding model identifier
    pub model: String,

    /// Expected vector dimensions
    pub dimensions: usize,

    /// Optional endpoint override
    pub endpoint: Option<String>,
}

/// Answer cache bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Maximum number of cached answers
    pub capacity: u64,

    /// Optional time-to-live for each entry, in seconds
    pub ttl_secs: Option<u64>,
}

/// HTTP server bind settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// YAML file layout. Every key is optional and only overrides what it names.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    embedding_model: Option<String>,
    llm_model: Option<String>,
    llm_provider: Option<String>,
    llm_endpoint: Option<String>,
    embedding_provider: Option<String>,
    embedding_dimensions: Option<usize>,
    embedding_endpoint: Option<String>,
    index_path: Option<String>,
    top_k: Option<usize>,
    weather_endpoint: Option<String>,
    cache: Option<CacheFile>,
    server: Option<ServerFile>,
    logging: Option<LoggingFile>,
}

#[derive(Debug, Clone, Deserialize)]
struct CacheFile {
    capacity: Option<u64>,
    ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
struct ServerFile {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
struct LoggingFile {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            llm: LlmSettings {
                provider: "groq".to_string(),
                model: "llama3-8b-8192".to_string(),
                endpoint: None,
            },
            embedding: EmbeddingSettings {
                provider: "ollama".to_string(),
                model: "all-minilm".to_string(),
                dimensions: 384,
                endpoint: None,
            },
            index_path: PathBuf::from("data/processed/agrodoc.db"),
            top_k: 5,
            cache: CacheSettings {
                capacity: 1024,
                ttl_secs: None,
            },
            weather_endpoint: "http://api.openweathermap.org".to_string(),
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            groq_api_key: None,
            weather_api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and the environment.
    ///
    /// Environment variables:
    /// - `AGRODOC_CONFIG`: Path to config file
    /// - `AGRODOC_LLM_PROVIDER`: Completion provider
    /// - `AGRODOC_LLM_MODEL`: Completion model identifier
    /// - `AGRODOC_EMBEDDING_MODEL`: Embedding model identifier
    /// - `GROQ_API_KEY`: Completion API key
    /// - `WEATHER_API_KEY`: Weather API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use agrodoc_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Model: {}", config.llm.model);
    /// ```
    pub fn load() -> AppResult<Self> {
        let config_file = std::env::var("AGRODOC_CONFIG").ok().map(PathBuf::from);
        Self::load_from(config_file)
    }

    /// Load configuration using an explicit config file path.
    ///
    /// An explicit path must exist; the default path is used only if present.
    pub fn load_from(config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        let config_path = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                Some(path)
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
                default_path.exists().then_some(default_path)
            }
        };

        if let Some(path) = config_path {
            config = config.merge_yaml(&path)?;
        }

        config.apply_env(|key| std::env::var(key).ok());

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.merge_file(file);
        result.config_file = Some(path.to_path_buf());

        tracing::debug!("Merged configuration from {:?}", path);
        Ok(result)
    }

    fn merge_file(&self, file: ConfigFile) -> Self {
        let mut result = self.clone();

        if let Some(model) = file.embedding_model {
            result.embedding.model = model;
        }
        if let Some(model) = file.llm_model {
            result.llm.model = model;
        }
        if let Some(provider) = file.llm_provider {
            result.llm.provider = provider;
        }
        if file.llm_endpoint.is_some() {
            result.llm.endpoint = file.llm_endpoint;
        }
        if let Some(provider) = file.embedding_provider {
            result.embedding.provider = provider;
        }
        if let Some(dimensions) = file.embedding_dimensions {
            result.embedding.dimensions = dimensions;
        }
        if file.embedding_endpoint.is_some() {
            result.embedding.endpoint = file.embedding_endpoint;
        }
        if let Some(path) = file.index_path {
            result.index_path = PathBuf::from(path);
        }
        if let Some(top_k) = file.top_k {
            result.top_k = top_k;
        }
        if let Some(endpoint) = file.weather_endpoint {
            result.weather_endpoint = endpoint;
        }

        if let Some(cache) = file.cache {
            if let Some(capacity) = cache.capacity {
                result.cache.capacity = capacity;
            }
            if cache.ttl_secs.is_some() {
                result.cache.ttl_secs = cache.ttl_secs;
            }
        }

        if let Some(server) = file.server {
            if let Some(host) = server.host {
                result.server.host = host;
            }
            if let Some(port) = server.port {
                result.server.port = port;
            }
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        result
    }

    /// Apply environment overrides using the given lookup.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(provider) = lookup("AGRODOC_LLM_PROVIDER") {
            self.llm.provider = provider;
        }
        if let Some(model) = lookup("AGRODOC_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(model) = lookup("AGRODOC_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }

        self.groq_api_key = lookup("GROQ_API_KEY").filter(|key| !key.is_empty());
        self.weather_api_key = lookup("WEATHER_API_KEY").filter(|key| !key.is_empty());

        if let Some(level) = lookup("RUST_LOG") {
            self.log_level = Some(level);
        }
        if lookup("NO_COLOR").is_some() {
            self.no_color = true;
        }
    }

    /// Apply CLI overrides to the configuration.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.llm.provider = provider;
        }

        if let Some(model) = model {
            self.llm.model = model;
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

    /// Validate the resolved configuration.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.llm.provider.to_lowercase();
        if !KNOWN_LLM_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown LLM provider: {}. Supported: {}",
                self.llm.provider,
                KNOWN_LLM_PROVIDERS.join(", ")
            )));
        }

        let embedding_provider = self.embedding.provider.to_lowercase();
        if !KNOWN_EMBEDDING_PROVIDERS.contains(&embedding_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        if self.top_k == 0 {
            return Err(AppError::Config(
                "top_k must be greater than zero".to_string(),
            ));
        }

        if self.cache.capacity == 0 {
            return Err(AppError::Config(
                "Cache capacity must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Address the HTTP server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
