use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::llm::retry::RetryPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolkitConfig {
    pub api: ApiConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub retry: RetryConfig,
    pub wikipedia: WikipediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub chat_endpoint: String,
    pub chat_model: String,
    pub api_key: String,
    pub embedding_endpoint: String,
    pub embedding_model: String,
    pub embedding_api_key: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub min_chunk_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_secs: u64,
    pub max_delay_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikipediaConfig {
    pub lang: String,
    pub top_pages: usize,
    pub max_chars: usize,
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_secs(self.base_delay_secs),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

impl ToolkitConfig {
    /// Validate config values, returning errors for clearly broken configurations.
    pub fn validate(&self) -> Result<(), String> {
        if self.api.chat_endpoint.is_empty() {
            return Err("api.chat_endpoint must not be empty".into());
        }
        if self.api.request_timeout_secs == 0 {
            return Err("api.request_timeout_secs must be > 0".into());
        }
        if self.chunking.chunk_size < 50 {
            return Err("chunking.chunk_size must be >= 50".into());
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err("chunking.chunk_overlap must be < chunk_size".into());
        }
        if self.retrieval.top_k == 0 {
            return Err("retrieval.top_k must be > 0".into());
        }
        if self.retry.max_attempts == 0 {
            return Err("retry.max_attempts must be > 0".into());
        }
        if self.retry.base_delay_secs > self.retry.max_delay_secs {
            return Err("retry.base_delay_secs must be <= max_delay_secs".into());
        }
        if self.wikipedia.lang.is_empty() {
            return Err("wikipedia.lang must not be empty".into());
        }
        Ok(())
    }

    /// Load config from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Default on-disk location for a user-supplied config file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("aidesk")
            .join("config.json")
    }

    /// Load from the default path if present, otherwise fall back to defaults.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                chat_endpoint: "https://api.deepseek.com/v1/chat/completions".to_string(),
                chat_model: "deepseek-chat".to_string(),
                api_key: std::env::var("DEEPSEEK_API_KEY").unwrap_or_default(),
                embedding_endpoint: "https://api.baichuan-ai.com/v1/embeddings".to_string(),
                embedding_model: "Baichuan-Text-Embedding".to_string(),
                embedding_api_key: std::env::var("BAICHUAN_API_KEY").unwrap_or_default(),
                connect_timeout_secs: 15,
                request_timeout_secs: 60,
            },
            chunking: ChunkingConfig {
                chunk_size: 1000,
                chunk_overlap: 50,
                min_chunk_size: 20,
            },
            retrieval: RetrievalConfig { top_k: 4 },
            retry: RetryConfig {
                max_attempts: 3,
                base_delay_secs: 4,
                max_delay_secs: 10,
            },
            wikipedia: WikipediaConfig {
                lang: "en".to_string(),
                top_pages: 3,
                max_chars: 4000,
            },
        }
    }
}
