//! Offline bulk ingestion of the configured PDF folder and website seeds.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::embedding::GeminiEmbedder;
use crate::loader;
use crate::models::Chunk;
use crate::store::{SqliteVectorStore, VectorIndex};

/// `ragfb seed`: embed every seed document into the configured index.
pub async fn run_seed(config: &Config) -> Result<()> {
    config.require_api_key()?;

    let provider = Arc::new(GeminiEmbedder::new(config)?);
    let store = SqliteVectorStore::open(&config.vectorstore, provider).await?;

    let written = seed_index(config, &store).await?;
    if written > 0 {
        println!(
            "Vector store saved in: {}",
            config.vectorstore.dir.display()
        );
        println!("Total chunks stored: {}", written);
    }

    store.close().await;
    Ok(())
}

/// Load all seed documents and insert them into `index`.
///
/// A missing PDF folder is only a warning; a website that cannot be fetched
/// aborts the run before anything is written. Returns rows written.
pub async fn seed_index(config: &Config, index: &dyn VectorIndex) -> Result<usize> {
    let chunks = collect_seed_chunks(config).await?;

    if chunks.is_empty() {
        println!("Nothing to embed.");
        return Ok(0);
    }

    let written = index
        .insert(&chunks)
        .await
        .context("Failed to write seed chunks to the vector store")?;
    Ok(written)
}

async fn collect_seed_chunks(config: &Config) -> Result<Vec<Chunk>> {
    let pdf_dir = config.seed.pdf_dir.clone();
    let pdf_chunks = if pdf_dir.is_dir() {
        let chunking = config.chunking.clone();
        tokio::task::spawn_blocking(move || loader::load_pdf_folder(&pdf_dir, &chunking))
            .await
            .context("PDF loading task failed")??
    } else {
        tracing::warn!(dir = %pdf_dir.display(), "PDF folder not found, skipping PDFs");
        Vec::new()
    };
    println!("Loaded {} PDF chunks.", pdf_chunks.len());

    let http = reqwest::Client::new();
    let timeout = Duration::from_secs(config.loader.fetch_timeout_secs);
    let mut web_chunks = Vec::new();
    for site in &config.seed.websites {
        let chunks =
            loader::load_webpage(&http, &site.url, &site.language, &config.chunking, timeout)
                .await
                .with_context(|| format!("Failed to load seed website {}", site.url))?;
        web_chunks.extend(chunks);
    }
    println!("Loaded {} webpage chunks.", web_chunks.len());

    let mut all = pdf_chunks;
    all.extend(web_chunks);
    println!("Total chunks to index: {}", all.len());
    Ok(all)
}
