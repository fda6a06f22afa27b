//! Plain-text extraction for ingested documents (PDF, HTML).
//!
//! Extraction never panics: malformed input becomes an
//! [`Error::Extract`] and the caller decides whether to skip the item.

use scraper::{Html, Node};

use crate::error::{Error, Result};

/// Elements whose text is never visible on the rendered page.
const HIDDEN_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

/// Extract the text of each page of a PDF, in page order.
///
/// Pages that carry no extractable text come back as empty strings.
pub fn extract_pdf_pages(bytes: &[u8]) -> Result<Vec<String>> {
    pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| Error::Extract(e.to_string()))
}

/// Extract the whole text of a PDF, pages joined with newlines.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    Ok(extract_pdf_pages(bytes)?.join("\n"))
}

/// Extract visible text from HTML markup.
///
/// Script, style and noscript contents are dropped. Each remaining text node
/// becomes one line; whitespace-only nodes are skipped.
pub fn extract_html_text(markup: &str) -> String {
    let document = Html::parse_document(markup);
    let mut lines: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        let text: &str = text;
        if !text.trim().is_empty() {
            lines.push(text);
        }
    }

    lines.join("\n")
}
