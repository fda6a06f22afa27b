//! Vector index over SQLite.
//!
//! Every chunk is stored as one row in the `chunks` table together with its
//! embedding (little-endian `f32` BLOB, see [`crate::embedding::vec_to_blob`]).
//! Queries embed the query text and rank the rows of the configured
//! collection by cosine similarity in Rust; there is no ANN index.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::VectorStoreConfig;
use crate::db;
use crate::embedding::{blob_to_vec, cosine_similarity, vec_to_blob, EmbeddingProvider};
use crate::error::{Error, Result};
use crate::migrate;
use crate::models::Chunk;

/// Persistent store of embedded chunks.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Embed and persist `chunks`. Returns the number of rows written.
    async fn insert(&self, chunks: &[Chunk]) -> Result<usize>;

    /// The `k` chunks most similar to `text`, best first.
    async fn query(&self, text: &str, k: usize) -> Result<Vec<Chunk>>;

    /// Number of chunks in the collection.
    async fn count(&self) -> Result<i64>;
}

pub struct SqliteVectorStore {
    pool: SqlitePool,
    collection: String,
    dedup: bool,
    provider: Arc<dyn EmbeddingProvider>,
}

impl SqliteVectorStore {
    /// Open the index under `config.dir`, creating directory and schema as needed.
    pub async fn open(
        config: &VectorStoreConfig,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> anyhow::Result<Self> {
        let pool = db::connect(&config.db_path()).await?;
        migrate::run_migrations(&pool).await?;

        tracing::debug!(
            path = %config.db_path().display(),
            collection = %config.collection,
            "vector store opened"
        );

        Ok(Self {
            pool,
            collection: config.collection.clone(),
            dedup: config.dedup,
            provider,
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Drop chunks already present in the collection or repeated in `chunks`.
    async fn filter_new<'a>(&self, chunks: &'a [Chunk]) -> Result<Vec<&'a Chunk>> {
        let existing: Vec<String> =
            sqlx::query_scalar("SELECT dedup_key FROM chunks WHERE collection = ?")
                .bind(&self.collection)
                .fetch_all(&self.pool)
                .await?;
        let mut seen: HashSet<String> = existing.into_iter().collect();

        Ok(chunks
            .iter()
            .filter(|chunk| seen.insert(chunk.dedup_key()))
            .collect())
    }

    async fn rank(&self, text: &str, k: usize) -> Result<Vec<Chunk>> {
        if k == 0 || self.count().await? == 0 {
            return Ok(Vec::new());
        }

        let query_vec = self.provider.embed_query(text).await?;

        let rows = sqlx::query(
            "SELECT chunk_id, text, language, source, hash, embedding FROM chunks WHERE collection = ? ORDER BY row_id",
        )
        .bind(&self.collection)
        .fetch_all(&self.pool)
        .await?;

        let mut scored: Vec<(f32, Chunk)> = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                let score = cosine_similarity(&query_vec, &blob_to_vec(&blob));
                let chunk = Chunk {
                    id: row.get("chunk_id"),
                    text: row.get("text"),
                    language: row.get("language"),
                    source: row.get("source"),
                    hash: row.get("hash"),
                };
                (score, chunk)
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored.into_iter().map(|(_, chunk)| chunk).collect())
    }
}

#[async_trait]
impl VectorIndex for SqliteVectorStore {
    async fn insert(&self, chunks: &[Chunk]) -> Result<usize> {
        let pending: Vec<&Chunk> = if self.dedup {
            self.filter_new(chunks).await?
        } else {
            chunks.iter().collect()
        };

        if pending.is_empty() {
            return Ok(0);
        }
        if pending.len() < chunks.len() {
            tracing::info!(
                skipped = chunks.len() - pending.len(),
                "skipping chunks already in the index"
            );
        }

        let texts: Vec<String> = pending.iter().map(|c| c.text.clone()).collect();
        let vectors = self.provider.embed_documents(&texts).await?;
        if vectors.len() != pending.len() {
            return Err(Error::Embedding(format!(
                "expected {} embeddings, got {}",
                pending.len(),
                vectors.len()
            )));
        }

        let now = chrono::Utc::now().timestamp();
        let model = self.provider.model_name().to_string();
        let mut tx = self.pool.begin().await?;

        for (chunk, vector) in pending.iter().zip(vectors.iter()) {
            sqlx::query(
                r#"
                INSERT INTO chunks
                    (chunk_id, collection, text, language, source, hash, dedup_key, model, dims, embedding, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&chunk.id)
            .bind(&self.collection)
            .bind(&chunk.text)
            .bind(&chunk.language)
            .bind(&chunk.source)
            .bind(&chunk.hash)
            .bind(chunk.dedup_key())
            .bind(&model)
            .bind(vector.len() as i64)
            .bind(vec_to_blob(vector))
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(rows = pending.len(), collection = %self.collection, "chunks indexed");
        Ok(pending.len())
    }

    async fn query(&self, text: &str, k: usize) -> Result<Vec<Chunk>> {
        self.rank(text, k)
            .await
            .map_err(|e| Error::Retrieval(e.to_string()))
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks WHERE collection = ?")
            .bind(&self.collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
