use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

/// Environment variables that override the file configuration
pub const ENV_OPENAI_KEY: &str = "AZURE_OPENAI_KEY";
pub const ENV_OPENAI_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const ENV_SEARCH_KEY: &str = "AZURE_SEARCH_KEY";
pub const ENV_SEARCH_ENDPOINT: &str = "AZURE_SEARCH_ENDPOINT";
pub const ENV_SEARCH_INDEX: &str = "AZURE_SEARCH_INDEX";
pub const ENV_LOG_LEVEL: &str = "SEARCHRAG_LOG_LEVEL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Azure OpenAI settings shared by the embedding and chat clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_api_version")]
    pub api_version: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,
    /// Overall request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_openai_api_version() -> String {
    "2025-04-01-preview".to_string()
}

fn default_chat_model() -> String {
    "gpt-4.1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-large".to_string()
}

fn default_embedding_dimension() -> usize {
    3072
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            api_version: default_openai_api_version(),
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            embedding_dimension: default_embedding_dimension(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Azure AI Search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub index: String,
    #[serde(default = "default_search_api_version")]
    pub api_version: String,
    #[serde(default = "default_vector_field")]
    pub vector_field: String,
    #[serde(default = "default_semantic_configuration")]
    pub semantic_configuration: String,
    #[serde(default = "default_query_language")]
    pub query_language: String,
    /// Upper bound on records returned across all pages
    #[serde(default = "default_top")]
    pub top: usize,
    #[serde(default = "default_title_field")]
    pub title_field: String,
    #[serde(default = "default_content_field")]
    pub content_field: String,
    #[serde(default = "default_id_field")]
    pub id_field: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_search_api_version() -> String {
    "2024-07-01".to_string()
}

fn default_vector_field() -> String {
    "text_vector".to_string()
}

fn default_semantic_configuration() -> String {
    "rag-1759107491727-semantic-configuration".to_string()
}

fn default_query_language() -> String {
    "ja-jp".to_string()
}

fn default_top() -> usize {
    100
}

fn default_title_field() -> String {
    "title".to_string()
}

fn default_content_field() -> String {
    "chunk".to_string()
}

fn default_id_field() -> String {
    "chunk_id".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            index: String::new(),
            api_version: default_search_api_version(),
            vector_field: default_vector_field(),
            semantic_configuration: default_semantic_configuration(),
            query_language: default_query_language(),
            top: default_top(),
            title_field: default_title_field(),
            content_field: default_content_field(),
            id_field: default_id_field(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Context budgeting settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Ceiling on prompt tokens plus query tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Tokenizer encoding used for every measurement
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// Replaces the built-in answer template when set
    #[serde(default)]
    pub system_prompt_file: Option<PathBuf>,
}

fn default_max_tokens() -> usize {
    120_000
}

fn default_encoding() -> String {
    "o200k_base".to_string()
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            encoding: default_encoding(),
            system_prompt_file: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub rag: RagConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration: explicit file, else `config.toml` if present, else defaults.
    /// Environment variables are applied on top in every case.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new("config.toml").exists() => Self::from_file("config.toml")?,
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Overlay values from the environment. `lookup` is injected so tests can
    /// avoid touching the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_OPENAI_KEY) {
            self.openai.api_key = v;
        }
        if let Some(v) = lookup(ENV_OPENAI_ENDPOINT) {
            self.openai.endpoint = v;
        }
        if let Some(v) = lookup(ENV_SEARCH_KEY) {
            self.search.api_key = v;
        }
        if let Some(v) = lookup(ENV_SEARCH_ENDPOINT) {
            self.search.endpoint = v;
        }
        if let Some(v) = lookup(ENV_SEARCH_INDEX) {
            self.search.index = v;
        }
        if let Some(v) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = v;
        }
    }

    /// Get the answer template, reading the override file if configured
    pub fn system_prompt(&self) -> crate::Result<String> {
        match &self.rag.system_prompt_file {
            Some(path) => Ok(std::fs::read_to_string(path)?),
            None => Ok(crate::rag::prompts::ANSWER_SYSTEM_PROMPT.to_string()),
        }
    }

    /// Get token ceiling
    pub fn max_tokens(&self) -> usize {
        self.rag.max_tokens
    }

    /// Get tokenizer encoding name
    pub fn encoding(&self) -> &str {
        &self.rag.encoding
    }

    /// Get chat model
    pub fn chat_model(&self) -> &str {
        &self.openai.chat_model
    }

    /// Get embedding model
    pub fn embedding_model(&self) -> &str {
        &self.openai.embedding_model
    }
}
