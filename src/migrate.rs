use anyhow::Result;
use sqlx::SqlitePool;

/// Create the vector index schema. Safe to run on every start.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chunks (
            row_id INTEGER PRIMARY KEY AUTOINCREMENT,
            chunk_id TEXT NOT NULL,
            collection TEXT NOT NULL,
            text TEXT NOT NULL,
            language TEXT NOT NULL,
            source TEXT NOT NULL,
            hash TEXT NOT NULL,
            dedup_key TEXT NOT NULL,
            model TEXT NOT NULL,
            dims INTEGER NOT NULL,
            embedding BLOB NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_collection ON chunks(collection)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_chunks_dedup_key ON chunks(collection, dedup_key)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
