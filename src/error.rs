//! Error taxonomy for the feedback service.
//!
//! Only the ingestion path lets these errors reach a caller. The feedback
//! path folds [`Error::Retrieval`] and [`Error::Generation`] into the string
//! it returns (see [`crate::retriever`] and [`crate::llm`]).

use thiserror::Error;

/// Errors produced by the core pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// A required configuration value is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A webpage or remote document could not be fetched.
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The vector index could not answer a query.
    #[error("retrieval failed: {0}")]
    Retrieval(String),

    /// The generation backend failed or returned unusable content.
    #[error("generation failed: {0}")]
    Generation(String),

    /// Text could not be extracted from a PDF or HTML document.
    #[error("text extraction failed: {0}")]
    Extract(String),

    /// The embedding provider rejected a request or returned garbage.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// The underlying SQLite store failed.
    #[error("vector store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl Error {
    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Error::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// True for failures the caller can attribute to the remote page.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Error::Fetch { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
