//! Best-practice retrieval for a language.

use crate::store::VectorIndex;

const PREVIEW_CHARS: usize = 250;
const HIT_PREVIEW_CHARS: usize = 80;

/// Context text for `language`: the `k` most relevant chunk texts joined
/// with `"\n"`, best first.
///
/// Never fails. An empty index gives `""`; a failing index gives a string
/// starting with `"Error retrieving context: "`.
pub async fn get_best_practices(index: &dyn VectorIndex, language: &str, k: usize) -> String {
    let hits = match index.query(language, k).await {
        Ok(hits) => hits,
        Err(e) => {
            tracing::error!(language, error = %e, "retrieval failed");
            return format!("Error retrieving context: {}", e);
        }
    };

    tracing::info!(language, hits = hits.len(), "retrieved best practices");
    for (i, hit) in hits.iter().enumerate() {
        tracing::debug!(
            rank = i + 1,
            source = %hit.source,
            preview = %preview(&hit.text, HIT_PREVIEW_CHARS),
            "retrieved chunk"
        );
    }

    let context = hits
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    tracing::debug!(context = %preview(&context, PREVIEW_CHARS), "retrieval context");
    context
}

/// First `max_chars` characters of `text`, for log lines.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
