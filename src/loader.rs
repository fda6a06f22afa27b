//! Document loading: PDF folders and webpages into chunks.

use anyhow::{bail, Context};
use std::path::Path;
use std::time::Duration;
use walkdir::WalkDir;

use crate::chunk::chunk_text;
use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::extract;
use crate::models::Chunk;

/// Load every `.pdf` file directly inside `dir` and chunk its text.
///
/// Files are processed in filename order. The language label is the
/// lowercased filename prefix before the first `_` (`python_pep8.pdf` →
/// `python`). Files that cannot be read or parsed are logged and skipped.
pub fn load_pdf_folder(dir: &Path, chunking: &ChunkingConfig) -> anyhow::Result<Vec<Chunk>> {
    if !dir.is_dir() {
        bail!("PDF folder does not exist: {}", dir.display());
    }

    let mut chunks = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        let candidate = entry.file_type().is_file() || entry.path_is_symlink();
        if !candidate || !is_pdf(entry.path()) {
            continue;
        }

        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy();
        let language = language_from_filename(&file_name);

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };
        let text = match extract::extract_pdf_text(&bytes) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "skipping unreadable PDF");
                continue;
            }
        };

        let source = path.display().to_string();
        let file_chunks = chunk_text(&text, &language, &source, chunking);
        tracing::info!(
            file = %file_name,
            language = %language,
            chunks = file_chunks.len(),
            "loaded PDF"
        );
        chunks.extend(file_chunks);
    }

    Ok(chunks)
}

/// Fetch `url`, strip markup, and chunk the visible text.
///
/// Transport failures and non-2xx responses become [`Error::Fetch`].
pub async fn load_webpage(
    client: &reqwest::Client,
    url: &str,
    language: &str,
    chunking: &ChunkingConfig,
    timeout: Duration,
) -> Result<Vec<Chunk>> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| Error::fetch(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::fetch(url, format!("HTTP {}", status)));
    }

    let markup = response.text().await.map_err(|e| Error::fetch(url, e))?;
    let text = extract::extract_html_text(&markup);
    let chunks = chunk_text(&text, language, url, chunking);

    tracing::info!(url, language, chunks = chunks.len(), "loaded webpage");
    Ok(chunks)
}

/// Lowercased prefix before the first `_`; the file stem when there is none.
pub fn language_from_filename(file_name: &str) -> String {
    let prefix = match file_name.split_once('_') {
        Some((prefix, _)) => prefix,
        None => Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name),
    };
    prefix.to_lowercase()
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}
