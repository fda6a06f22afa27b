//! Seeding and PDF-folder ingestion against a real SQLite index.

use async_trait::async_trait;
use axum::{http::StatusCode, response::Html, routing::get, Router};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use rag_feedback::config::Config;
use rag_feedback::embedding::EmbeddingProvider;
use rag_feedback::error::Result;
use rag_feedback::loader::load_pdf_folder;
use rag_feedback::models::WebsiteSource;
use rag_feedback::seed::seed_index;
use rag_feedback::store::{SqliteVectorStore, VectorIndex};

struct LengthEmbedder;

#[async_trait]
impl EmbeddingProvider for LengthEmbedder {
    fn model_name(&self) -> &str {
        "length"
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| vec![1.0, t.len() as f32]).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0, text.len() as f32])
    }
}

/// Single-page PDF showing `phrase` in Helvetica, with a correct xref table.
fn minimal_pdf(phrase: &str) -> Vec<u8> {
    let content = format!("BT /F1 12 Tf 100 700 Td ({}) Tj ET", phrase);
    let mut out = Vec::new();
    let mut offsets = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    offsets.push(out.len());
    out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    offsets.push(out.len());
    out.extend_from_slice(b"2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
    offsets.push(out.len());
    out.extend_from_slice(b"3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n");
    offsets.push(out.len());
    out.extend_from_slice(
        format!(
            "4 0 obj << /Length {} >> stream\n{}\nendstream endobj\n",
            content.len(),
            content
        )
        .as_bytes(),
    );
    offsets.push(out.len());
    out.extend_from_slice(b"5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n");
    let xref_start = out.len();
    out.extend_from_slice(b"xref\n0 6\n");
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(b"trailer << /Size 6 /Root 1 0 R >>\nstartxref\n");
    out.extend_from_slice(format!("{}\n", xref_start).as_bytes());
    out.extend_from_slice(b"%%EOF\n");
    out
}

async fn spawn_site() -> String {
    let app = Router::new()
        .route(
            "/pep8",
            get(|| async {
                Html(
                    "<html><head><script>track()</script></head><body>\
                     <h1>Style Guide for Python Code</h1>\
                     <p>Use 4 spaces per indentation level.</p></body></html>",
                )
            }),
        )
        .route(
            "/effective-go",
            get(|| async { Html("<p>Gofmt formats your code.</p>") }),
        )
        .route("/gone", get(|| async { StatusCode::GONE }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn seed_config(tmp: &TempDir, site: &str, pages: &[(&str, &str)]) -> Config {
    let mut config = Config::default();
    config.vectorstore.dir = tmp.path().join("embeddings");
    config.seed.pdf_dir = tmp.path().join("data").join("best_practices");
    config.seed.websites = pages
        .iter()
        .map(|(path, language)| WebsiteSource {
            url: format!("{}{}", site, path),
            language: language.to_string(),
        })
        .collect();
    config
}

async fn open_store(config: &Config) -> SqliteVectorStore {
    SqliteVectorStore::open(&config.vectorstore, Arc::new(LengthEmbedder))
        .await
        .unwrap()
}

#[tokio::test]
async fn seed_indexes_every_website() {
    let site = spawn_site().await;
    let tmp = TempDir::new().unwrap();
    let config = seed_config(&tmp, &site, &[("/pep8", "python"), ("/effective-go", "go")]);
    let store = open_store(&config).await;

    let written = seed_index(&config, &store).await.unwrap();
    assert_eq!(written, 2);
    assert_eq!(store.count().await.unwrap(), 2);

    let hits = store.query("anything", 10).await.unwrap();
    let mut languages: Vec<&str> = hits.iter().map(|c| c.language.as_str()).collect();
    languages.sort();
    assert_eq!(languages, vec!["go", "python"]);
    assert!(hits.iter().all(|c| !c.text.contains("track()")));
}

#[tokio::test]
async fn seed_aborts_on_unfetchable_website() {
    let site = spawn_site().await;
    let tmp = TempDir::new().unwrap();
    let config = seed_config(&tmp, &site, &[("/pep8", "python"), ("/gone", "java")]);
    let store = open_store(&config).await;

    let err = seed_index(&config, &store).await.unwrap_err();
    assert!(format!("{:#}", err).contains("/gone"));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn seed_with_nothing_to_load_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let config = seed_config(&tmp, "http://127.0.0.1:1", &[]);
    let store = open_store(&config).await;

    assert_eq!(seed_index(&config, &store).await.unwrap(), 0);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn seed_twice_duplicates_unless_dedup_enabled() {
    let site = spawn_site().await;

    let tmp = TempDir::new().unwrap();
    let config = seed_config(&tmp, &site, &[("/effective-go", "go")]);
    let store = open_store(&config).await;
    seed_index(&config, &store).await.unwrap();
    seed_index(&config, &store).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 2);

    let tmp = TempDir::new().unwrap();
    let mut config = seed_config(&tmp, &site, &[("/effective-go", "go")]);
    config.vectorstore.dedup = true;
    let store = open_store(&config).await;
    seed_index(&config, &store).await.unwrap();
    assert_eq!(seed_index(&config, &store).await.unwrap(), 0);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[test]
fn pdf_folder_skips_broken_files_and_non_pdfs() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("best_practices");
    fs::create_dir_all(dir.join("nested")).unwrap();
    fs::write(dir.join("python_pep8.pdf"), b"not a valid pdf").unwrap();
    fs::write(dir.join("README.md"), "# Best practices").unwrap();
    fs::write(dir.join("nested").join("go_guide.txt"), "not a pdf").unwrap();

    let chunks = load_pdf_folder(&dir, &Config::default().chunking).unwrap();
    assert!(chunks.is_empty());
}

#[test]
fn pdf_folder_labels_chunks_from_filename() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("best_practices");
    fs::create_dir_all(&dir).unwrap();
    let pdf_path = dir.join("Python_pep8.pdf");
    fs::write(&pdf_path, minimal_pdf("use four spaces")).unwrap();

    let chunks = load_pdf_folder(&dir, &Config::default().chunking).unwrap();
    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].text.contains("use four spaces"), "text: {:?}", chunks[0].text);
    assert_eq!(chunks[0].language, "python");
    assert_eq!(chunks[0].source, pdf_path.display().to_string());
}

#[cfg(unix)]
#[test]
fn pdf_folder_keeps_going_past_unreadable_files() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("best_practices");
    fs::create_dir_all(&dir).unwrap();
    std::os::unix::fs::symlink(dir.join("missing.pdf"), dir.join("cpp_link.pdf")).unwrap();
    fs::write(dir.join("go_broken.pdf"), b"not a valid pdf").unwrap();
    fs::write(dir.join("java_style.pdf"), minimal_pdf("braces on the same line")).unwrap();

    let chunks = load_pdf_folder(&dir, &Config::default().chunking).unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].language, "java");
}

#[tokio::test]
async fn seed_indexes_pdf_folder() {
    let tmp = TempDir::new().unwrap();
    let config = seed_config(&tmp, "http://127.0.0.1:1", &[]);
    fs::create_dir_all(&config.seed.pdf_dir).unwrap();
    fs::write(
        config.seed.pdf_dir.join("go_effective.pdf"),
        minimal_pdf("gofmt formats code"),
    )
    .unwrap();
    let store = open_store(&config).await;

    assert_eq!(seed_index(&config, &store).await.unwrap(), 1);
    let hits = store.query("go", 1).await.unwrap();
    assert_eq!(hits[0].language, "go");
    assert!(hits[0].text.contains("gofmt formats code"));
}
