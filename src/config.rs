//! Layered configuration: built-in defaults, an optional TOML file, then
//! environment variables.
//!
//! The Gemini API key is only ever read from the environment (`GEMINI_API_KEY`,
//! usually supplied through a `.env` file). It is never accepted from the TOML
//! file and never logged.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::models::WebsiteSource;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub vectorstore: VectorStoreConfig,
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
    pub gemini: GeminiConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub loader: LoaderConfig,
    pub server: ServerConfig,
    pub seed: SeedConfig,
    #[serde(skip)]
    pub gemini_api_key: Option<ApiKey>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct VectorStoreConfig {
    /// Directory holding the persistent index. Created if missing.
    pub dir: PathBuf,
    pub collection: String,
    /// Skip chunks whose (source, text) pair is already indexed.
    pub dedup: bool,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("embeddings"),
            collection: "best_practices_pdf".to_string(),
            dedup: false,
        }
    }
}

impl VectorStoreConfig {
    pub fn db_path(&self) -> PathBuf {
        self.dir.join("index.sqlite")
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub batch_size: usize,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-004".to_string(),
            batch_size: 100,
            max_retries: 3,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GenerationConfig {
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            timeout_secs: 20,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_base: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { k: 3 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoaderConfig {
    pub fetch_timeout_secs: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SeedConfig {
    pub pdf_dir: PathBuf,
    pub websites: Vec<WebsiteSource>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            pdf_dir: PathBuf::from("data").join("best_practices"),
            websites: default_websites(),
        }
    }
}

fn default_websites() -> Vec<WebsiteSource> {
    [
        ("https://www.python.org/dev/peps/pep-0008/", "python"),
        ("https://google.github.io/styleguide/cppguide.html", "cpp"),
        (
            "https://www.oracle.com/java/technologies/javase/codeconventions-contents.html",
            "java",
        ),
    ]
    .into_iter()
    .map(|(url, language)| WebsiteSource {
        url: url.to_string(),
        language: language.to_string(),
    })
    .collect()
}

/// Deployment secret; `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl Config {
    /// Apply environment overrides using `lookup` as the variable source.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("VECTORSTORE_DIR").filter(|v| !v.is_empty()) {
            self.vectorstore.dir = PathBuf::from(dir);
        }
        if let Some(key) = lookup("GEMINI_API_KEY").filter(|v| !v.trim().is_empty()) {
            self.gemini_api_key = Some(ApiKey::new(key.trim()));
        }
        if let Some(base) = lookup("GEMINI_API_BASE").filter(|v| !v.is_empty()) {
            self.gemini.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(bind) = lookup("RAGFB_BIND").filter(|v| !v.is_empty()) {
            self.server.bind = bind;
        }
    }

    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// The API key, or a `Config` error naming the missing variable.
    pub fn require_api_key(&self) -> crate::error::Result<&ApiKey> {
        self.gemini_api_key
            .as_ref()
            .ok_or_else(|| crate::error::Error::Config("GEMINI_API_KEY is not set".to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            bail!("chunking.chunk_size must be > 0");
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            bail!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.chunk_overlap,
                self.chunking.chunk_size
            );
        }
        if self.retrieval.k == 0 {
            bail!("retrieval.k must be >= 1");
        }
        if self.embedding.batch_size == 0 {
            bail!("embedding.batch_size must be >= 1");
        }
        if self.embedding.model.trim().is_empty() {
            bail!("embedding.model must not be empty");
        }
        if self.generation.model.trim().is_empty() {
            bail!("generation.model must not be empty");
        }
        if self.vectorstore.collection.trim().is_empty() {
            bail!("vectorstore.collection must not be empty");
        }
        Ok(())
    }
}

/// Parse a TOML config string (no environment overrides).
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    Ok(config)
}

/// Load configuration from `path` (if it exists) and the process environment.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        parse_config(&content)?
    } else {
        Config::default()
    };

    config.apply_env();
    config.validate()?;
    Ok(config)
}
