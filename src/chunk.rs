//! Recursive character text splitter.
//!
//! Splits document text into overlapping [`Chunk`]s of at most
//! `chunk_size` characters. The splitter prefers large structural
//! boundaries and only falls back to smaller ones when a piece is still too
//! long:
//!
//! 1. paragraphs (`"\n\n"`)
//! 2. lines (`"\n"`)
//! 3. sentences (`". "`)
//! 4. words (`" "`)
//! 5. single characters
//!
//! Separators stay attached to the start of the piece that follows them, so
//! concatenating the pieces of a split reproduces the input exactly. Small
//! pieces are then merged greedily up to `chunk_size`, and the tail of each
//! chunk (at most `chunk_overlap` characters, in whole pieces) is carried
//! into the next one.
//!
//! Lengths are counted in `char`s, not bytes.

use std::collections::VecDeque;

use crate::config::ChunkingConfig;
use crate::models::Chunk;

const SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

/// Split `text` into chunks tagged with `language` and `source`.
///
/// Empty or whitespace-only text yields no chunks.
pub fn chunk_text(text: &str, language: &str, source: &str, config: &ChunkingConfig) -> Vec<Chunk> {
    split_text(text, config.chunk_size, config.chunk_overlap)
        .into_iter()
        .map(|piece| Chunk::new(piece, language, source))
        .collect()
}

/// Split `text` into trimmed spans of at most `chunk_size` characters.
pub fn split_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let splitter = Splitter {
        chunk_size: chunk_size.max(1),
        chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
    };
    splitter.split(text, &SEPARATORS)
}

struct Splitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Splitter {
    fn split(&self, text: &str, separators: &[&str]) -> Vec<String> {
        // Pick the first separator that occurs in the text; "" always matches.
        let mut separator = "";
        let mut finer: &[&str] = &[];
        for (i, &sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                break;
            }
            if text.contains(sep) {
                separator = sep;
                finer = &separators[i + 1..];
                break;
            }
        }

        let mut out = Vec::new();
        let mut small: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                small.push(piece);
                continue;
            }

            if !small.is_empty() {
                out.extend(self.merge(&small));
                small.clear();
            }

            if finer.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    out.push(trimmed.to_string());
                }
            } else {
                out.extend(self.split(piece, finer));
            }
        }

        if !small.is_empty() {
            out.extend(self.merge(&small));
        }

        out
    }

    /// Greedily merge consecutive pieces into chunks, carrying overlap.
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !window.is_empty() {
                push_joined(&mut chunks, &window);

                // Keep at most `chunk_overlap` chars, and leave room for `piece`.
                while total > self.chunk_overlap || (total > 0 && total + len > self.chunk_size) {
                    match window.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }

            window.push_back(piece);
            total += len;
        }

        push_joined(&mut chunks, &window);
        chunks
    }
}

fn push_joined(chunks: &mut Vec<String>, window: &VecDeque<&str>) {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Split at every occurrence of `separator`, keeping the separator at the
/// start of the following piece. An empty separator splits into chars.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0usize;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ChunkingConfig {
        ChunkingConfig::default()
    }

    fn sample_document() -> String {
        (0..40)
            .map(|p| {
                (0..6)
                    .map(|s| format!("Paragraph {p} sentence {s} explains a naming rule for code"))
                    .collect::<Vec<_>>()
                    .join(". ")
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    #[test]
    fn test_small_text_single_chunk() {
        let chunks = chunk_text("Use four spaces per indentation level.", "python", "pep8.pdf", &cfg());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Use four spaces per indentation level.");
        assert_eq!(chunks[0].language, "python");
        assert_eq!(chunks[0].source, "pep8.pdf");
    }

    #[test]
    fn test_empty_and_whitespace_text_yield_nothing() {
        assert!(chunk_text("", "go", "x", &cfg()).is_empty());
        assert!(chunk_text(" \n\n\t ", "go", "x", &cfg()).is_empty());
    }

    #[test]
    fn test_no_chunk_exceeds_limit() {
        let text = sample_document();
        let chunks = split_text(&text, 500, 50);
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.chars().count() <= 500, "chunk of {} chars", c.chars().count());
        }
    }

    #[test]
    fn test_unbroken_run_is_hard_cut() {
        let text = "x".repeat(1234);
        let chunks = split_text(&text, 500, 50);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 500));
    }

    #[test]
    fn test_chunks_are_substrings_and_cover_every_word() {
        let text = sample_document();
        let chunks = split_text(&text, 500, 50);

        for c in &chunks {
            assert!(text.contains(c.as_str()), "chunk not found verbatim: {c:?}");
        }
        for word in text.split_whitespace() {
            assert!(
                chunks.iter().any(|c| c.contains(word)),
                "word lost during chunking: {word}"
            );
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let text = (0..300).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let chunks = split_text(&text, 100, 20);
        assert!(chunks.len() > 2);
        for pair in chunks.windows(2) {
            let last_word = pair[0].split_whitespace().last().unwrap();
            assert!(
                pair[1].contains(last_word),
                "expected {last_word:?} to be carried into next chunk"
            );
        }
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let para_a = "a".repeat(300);
        let para_b = "b".repeat(300);
        let text = format!("{para_a}\n\n{para_b}");
        let chunks = split_text(&text, 500, 50);
        assert_eq!(chunks, vec![para_a, para_b]);
    }

    #[test]
    fn test_multibyte_text_counts_chars() {
        let text = "é".repeat(600);
        let chunks = split_text(&text, 500, 50);
        assert!(chunks.iter().all(|c| c.chars().count() <= 500));
        assert!(chunks.len() >= 2);
    }

    #[test]
    fn test_deterministic() {
        let text = sample_document();
        assert_eq!(split_text(&text, 200, 30), split_text(&text, 200, 30));
    }

    #[test]
    fn test_separator_kept_with_following_piece() {
        assert_eq!(
            split_keeping_separator("a b c", " "),
            vec!["a", " b", " c"]
        );
        assert_eq!(split_keeping_separator("ab", ""), vec!["a", "b"]);
    }
}
