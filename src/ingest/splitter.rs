//! Recursive character text splitting.
//!
//! Splits on the coarsest separator present (paragraphs, then lines, then
//! words, then single characters) and merges the pieces back into chunks of
//! at most `chunk_size` characters, carrying up to `chunk_overlap` characters
//! of trailing context into the next chunk.

use crate::config::DocumentSettings;

const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Recursive character splitter. Lengths are measured in chars.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    pub fn from_settings(settings: &DocumentSettings) -> Self {
        Self::new(settings.chunk_size, settings.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Split text into trimmed, non-empty chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (separator, rest) = pick_separator(text, separators);

        let pieces: Vec<String> = if separator.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split(separator)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<String> = Vec::new();

        for piece in pieces {
            if len(&piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }

            if !pending.is_empty() {
                chunks.extend(self.merge(&pending, separator));
                pending.clear();
            }

            if rest.is_empty() {
                chunks.push(piece.trim().to_string());
            } else {
                chunks.extend(self.split_with(&piece, rest));
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge(&pending, separator));
        }

        chunks.retain(|c| !c.is_empty());
        chunks
    }

    /// Greedily pack pieces into chunks, keeping an overlapping tail window.
    fn merge(&self, pieces: &[String], separator: &str) -> Vec<String> {
        let sep_len = len(separator);
        let mut chunks = Vec::new();
        let mut window: Vec<&str> = Vec::new();
        let mut total = 0;

        for piece in pieces {
            let piece_len = len(piece);
            let joiner = if window.is_empty() { 0 } else { sep_len };

            if total + piece_len + joiner > self.chunk_size && !window.is_empty() {
                push_joined(&mut chunks, &window, separator);

                while total > self.chunk_overlap
                    || (total > 0
                        && total + piece_len + if window.is_empty() { 0 } else { sep_len }
                            > self.chunk_size)
                {
                    let removed = window.remove(0);
                    total -= len(removed) + if window.is_empty() { 0 } else { sep_len };
                }
            }

            if !window.is_empty() {
                total += sep_len;
            }
            total += piece_len;
            window.push(piece.as_str());
        }

        push_joined(&mut chunks, &window, separator);
        chunks
    }
}

fn pick_separator<'a>(text: &str, separators: &'a [&'a str]) -> (&'a str, &'a [&'a str]) {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() || text.contains(separator) {
            return (*separator, &separators[i + 1..]);
        }
    }
    ("", &[])
}

fn push_joined(chunks: &mut Vec<String>, window: &[&str], separator: &str) {
    let joined = window.join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn len(s: &str) -> usize {
    s.chars().count()
}
