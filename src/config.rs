/// Configuration module for docqa.
///
/// Handles loading, validating, and providing default configuration values.
/// The provider API key is never stored in the file; it is resolved from the
/// environment at startup.
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;

// ── Default value functions ──────────────────────────────────────────

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_search_top_k() -> usize {
    crate::store::DEFAULT_TOP_K
}

fn default_embed_batch_size() -> usize {
    100
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_dimensions() -> usize {
    1536
}

fn default_chat_model() -> String {
    "gpt-4o".to_string()
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    /// Maximum chunk length in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks. Must be below `chunk_size`.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    #[serde(default = "default_search_top_k")]
    pub search_top_k: usize,

    /// Number of chunks sent per embedding request.
    #[serde(default = "default_embed_batch_size")]
    pub embed_batch_size: usize,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Front-end origins allowed to call the API with credentials.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_embedding_model")]
    pub embedding: String,

    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    #[serde(default = "default_chat_model")]
    pub chat: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            search_top_k: default_search_top_k(),
            embed_batch_size: default_embed_batch_size(),
            provider: ProviderConfig::default(),
            model: ModelConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key_env: default_api_key_env(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            embedding: default_embedding_model(),
            dimensions: default_dimensions(),
            chat: default_chat_model(),
            temperature: None,
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// If `config_path` is empty, defaults to `"config.json"`.
    /// A missing file yields the default configuration; a malformed one is an error.
    pub fn load(config_path: &str) -> Result<Self> {
        let path = if config_path.is_empty() {
            "config.json"
        } else {
            config_path
        };

        if !Path::new(path).exists() {
            info!("{path} not found, using defaults");
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {path}"))?;

        let cfg: Config =
            serde_json::from_str(&data).with_context(|| format!("invalid JSON in {path}"))?;

        info!("Loaded configuration from {path}");
        Ok(cfg)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.chunk_size > 0, "chunk_size must be positive");
        anyhow::ensure!(
            self.chunk_overlap < self.chunk_size,
            "chunk_overlap ({}) must be smaller than chunk_size ({})",
            self.chunk_overlap,
            self.chunk_size
        );
        anyhow::ensure!(self.search_top_k > 0, "search_top_k must be positive");
        anyhow::ensure!(
            self.embed_batch_size > 0,
            "embed_batch_size must be positive"
        );
        anyhow::ensure!(
            self.model.dimensions > 0,
            "model.dimensions must be positive"
        );
        anyhow::ensure!(
            self.provider.request_timeout_secs > 0,
            "provider.request_timeout_secs must be positive"
        );
        anyhow::ensure!(
            !self.server.cors_origins.is_empty(),
            "at least one CORS origin must be specified"
        );
        Ok(())
    }

    /// Resolve the provider API key from the environment.
    pub fn api_key(&self) -> Result<String, AppError> {
        let name = &self.provider.api_key_env;
        require_api_key(name, std::env::var(name).ok())
    }

    /// Socket address string the server binds to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn require_api_key(name: &str, value: Option<String>) -> Result<String, AppError> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key),
        Some(_) => Err(AppError::Configuration(format!(
            "{name} is set but empty"
        ))),
        None => Err(AppError::Configuration(format!(
            "{name} is not set in the environment"
        ))),
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.search_top_k, 4);
        assert_eq!(config.model.dimensions, 1536);
        assert_eq!(config.model.embedding, "text-embedding-3-small");
        assert_eq!(config.model.chat, "gpt-4o");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.provider.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_load_from_json() {
        let json = r#"{"chunk_size": 500, "server": {"port": 9000}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.server.port, 9000);
        // Other fields should have defaults
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.model.dimensions, 1536);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("absent.json");
        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.chunk_size, 1000);
    }

    #[test]
    fn test_load_invalid_json_is_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::load(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_validate_ok() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_overlap_not_below_chunk_size() {
        let mut config = Config::default();
        config.chunk_overlap = config.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_chunk_size() {
        let mut config = Config::default();
        config.chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_origins() {
        let mut config = Config::default();
        config.server.cors_origins = vec![];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_require_api_key() {
        assert_eq!(
            require_api_key("KEY", Some("sk-test".to_string())).unwrap(),
            "sk-test"
        );
        assert!(matches!(
            require_api_key("KEY", None),
            Err(AppError::Configuration(_))
        ));
        assert!(matches!(
            require_api_key("KEY", Some("  ".to_string())),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_api_key_missing_from_environment() {
        let mut config = Config::default();
        config.provider.api_key_env = "DOCQA_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        let err = config.api_key().unwrap_err();
        assert!(err.to_string().contains("DOCQA_TEST_KEY_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn test_bind_address() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "127.0.0.1:8000");
    }
}
