//! Feedback orchestration: retrieve, render, generate; and webpage ingestion.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{ChunkingConfig, Config};
use crate::embedding::GeminiEmbedder;
use crate::error::Result;
use crate::llm::{GeminiClient, Generator};
use crate::loader;
use crate::models::{AddWebpageResponse, FeedbackResult, Submission};
use crate::prompt::build_prompt;
use crate::retriever::{get_best_practices, preview};
use crate::store::{SqliteVectorStore, VectorIndex};

const WEBPAGE_ADDED: &str = "Webpage added to vector store.";

#[derive(Clone)]
pub struct FeedbackService {
    index: Arc<dyn VectorIndex>,
    generator: Arc<dyn Generator>,
    http: reqwest::Client,
    chunking: ChunkingConfig,
    k: usize,
    fetch_timeout: Duration,
}

impl FeedbackService {
    pub fn new(
        config: &Config,
        index: Arc<dyn VectorIndex>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            index,
            generator,
            http: reqwest::Client::new(),
            chunking: config.chunking.clone(),
            k: config.retrieval.k,
            fetch_timeout: Duration::from_secs(config.loader.fetch_timeout_secs),
        }
    }

    /// Wire the Gemini embedder, the SQLite index and the Gemini generator.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let embedder = Arc::new(GeminiEmbedder::new(config)?);
        let store = SqliteVectorStore::open(&config.vectorstore, embedder).await?;
        let generator = GeminiClient::new(config)?;
        Ok(Self::new(config, Arc::new(store), Arc::new(generator)))
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    /// Review `submission`. Retrieval and generation failures end up inside
    /// the returned feedback text.
    pub async fn generate_feedback(&self, submission: &Submission) -> FeedbackResult {
        tracing::info!(
            language = %submission.language,
            code_chars = submission.code.chars().count(),
            test_cases = submission.test_cases.as_ref().map_or(0, |t| t.len()),
            "feedback requested"
        );

        let context = get_best_practices(self.index.as_ref(), &submission.language, self.k).await;
        let prompt = build_prompt(&context, submission);
        let feedback = self.generator.generate(&prompt).await;

        tracing::debug!(feedback = %preview(&feedback, 250), "feedback generated");
        FeedbackResult { feedback }
    }

    /// Fetch `url`, chunk it under `language`, and index the chunks.
    ///
    /// A fetch failure returns [`Error::Fetch`] before anything is written.
    pub async fn add_webpage(&self, url: &str, language: &str) -> Result<AddWebpageResponse> {
        let chunks =
            loader::load_webpage(&self.http, url, language, &self.chunking, self.fetch_timeout)
                .await?;

        if !chunks.is_empty() {
            let written = self.index.insert(&chunks).await?;
            tracing::info!(url, language, chunks = chunks.len(), written, "webpage indexed");
        }

        Ok(AddWebpageResponse {
            message: WEBPAGE_ADDED.to_string(),
            url: url.to_string(),
            language: language.to_string(),
            chunks_added: chunks.len(),
        })
    }
}

