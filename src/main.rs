//! # RAG feedback CLI (`ragfb`)
//!
//! Serves the code-review feedback API and manages its vector index.
//!
//! ## Usage
//!
//! ```bash
//! ragfb --config ./config/ragfb.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ragfb init` | Create the vector store directory and schema |
//! | `ragfb serve` | Start the HTTP server |
//! | `ragfb seed` | Ingest the PDF folder and seed websites |
//! | `ragfb add-webpage <url> --language <lang>` | Ingest one webpage |
//! | `ragfb search <language>` | Print the retrieval context for a language |
//!
//! `GEMINI_API_KEY` is read from the environment or a `.env` file.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use rag_feedback::config;
use rag_feedback::embedding::GeminiEmbedder;
use rag_feedback::retriever::get_best_practices;
use rag_feedback::seed;
use rag_feedback::server;
use rag_feedback::service::FeedbackService;
use rag_feedback::store::{SqliteVectorStore, VectorIndex};

/// Retrieval-augmented code review feedback backed by Gemini.
#[derive(Parser)]
#[command(name = "ragfb", version, about)]
struct Cli {
    /// Path to configuration file (TOML). Missing file means defaults.
    #[arg(long, global = true, default_value = "./config/ragfb.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the vector store directory and schema.
    ///
    /// Idempotent; prints the number of indexed chunks.
    Init,

    /// Start the HTTP server.
    Serve {
        /// Bind address, overriding `[server].bind`.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Ingest the configured PDF folder and seed websites.
    Seed,

    /// Fetch a webpage and add its text to the index.
    AddWebpage {
        url: String,

        /// Language label stored with every chunk.
        #[arg(long)]
        language: String,
    },

    /// Print the retrieval context for a language.
    Search {
        language: String,

        /// Number of chunks to retrieve.
        #[arg(short, long)]
        k: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let embedder = Arc::new(GeminiEmbedder::new(&cfg)?);
            let store = SqliteVectorStore::open(&cfg.vectorstore, embedder).await?;
            let count = store.count().await?;
            store.close().await;
            println!(
                "Vector store initialized at {} ({} chunks).",
                cfg.vectorstore.db_path().display(),
                count
            );
        }
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                cfg.server.bind = bind;
            }
            server::run_server(&cfg).await?;
        }
        Commands::Seed => {
            seed::run_seed(&cfg).await?;
        }
        Commands::AddWebpage { url, language } => {
            let service = FeedbackService::from_config(&cfg).await?;
            let response = service.add_webpage(&url, &language).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Search { language, k } => {
            let service = FeedbackService::from_config(&cfg).await?;
            let k = k.unwrap_or(cfg.retrieval.k);
            let context = get_best_practices(service.index().as_ref(), &language, k).await;
            if context.is_empty() {
                println!("No results.");
            } else {
                println!("{}", context);
            }
        }
    }

    Ok(())
}
