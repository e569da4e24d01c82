//! Recursive character text splitter.
//!
//! Splits a paragraph into bounded-size chunks, preferring to break at
//! paragraph breaks, then line breaks, then spaces, before falling back to a
//! hard character cut. Consecutive chunks from one paragraph carry an
//! overlap of trailing text for context across the boundary.
//!
//! Lengths are counted in `char`s, so multi-byte text is never cut inside a
//! codepoint.

use std::collections::VecDeque;

use siteqa_shared::{ChunkingConfig, Result, SiteQaError};

/// Boundary preference, highest priority first. The empty string means a
/// hard per-character cut and always matches.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Splits paragraph text into chunks of at most `max_chunk_size` chars with
/// `overlap` chars carried between consecutive chunks.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    max_chunk_size: usize,
    overlap: usize,
}

impl TextSplitter {
    /// Build a splitter from config. The overlap must be strictly smaller
    /// than the chunk size or no forward progress is possible.
    pub fn new(config: &ChunkingConfig) -> Result<Self> {
        if config.max_chunk_size == 0 {
            return Err(SiteQaError::validation("max_chunk_size must be positive"));
        }
        if config.overlap >= config.max_chunk_size {
            return Err(SiteQaError::validation(format!(
                "overlap ({}) must be smaller than max_chunk_size ({})",
                config.overlap, config.max_chunk_size
            )));
        }
        Ok(Self {
            max_chunk_size: config.max_chunk_size,
            overlap: config.overlap,
        })
    }

    /// Split one paragraph. Deterministic; empty input yields no chunks and
    /// input within the size budget yields exactly one chunk, untouched.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        if char_len(text) <= self.max_chunk_size {
            return vec![text.to_string()];
        }
        self.split_with(text, &SEPARATORS)
    }

    /// One level of recursive splitting: break on the highest-priority
    /// separator present, keep small pieces for merging, recurse into pieces
    /// that are still too large with the lower-priority separators.
    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (sep, rest) = pick_separator(text, separators);

        let pieces: Vec<String> = if sep.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split(sep)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect()
        };

        let mut chunks: Vec<String> = Vec::new();
        let mut mergeable: Vec<String> = Vec::new();

        for piece in pieces {
            if char_len(&piece) <= self.max_chunk_size {
                mergeable.push(piece);
            } else {
                if !mergeable.is_empty() {
                    chunks.extend(self.merge_pieces(std::mem::take(&mut mergeable), sep));
                }
                chunks.extend(self.split_with(&piece, rest));
            }
        }
        if !mergeable.is_empty() {
            chunks.extend(self.merge_pieces(mergeable, sep));
        }

        chunks
    }

    /// Greedily pack pieces into chunks up to the size budget. When a chunk
    /// fills up, trailing pieces totalling at least `overlap` chars are kept
    /// as the start of the next chunk.
    fn merge_pieces(&self, pieces: Vec<String>, sep: &str) -> Vec<String> {
        let sep_len = char_len(sep);
        let mut chunks: Vec<String> = Vec::new();
        let mut current: VecDeque<(String, usize)> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let piece_len = char_len(&piece);

            if !current.is_empty() && total + sep_len + piece_len > self.max_chunk_size {
                chunks.push(join_pieces(&current, sep));

                // Shrink from the front, keeping at least `overlap` chars.
                while current.len() > 1 {
                    let front_len = current.front().map(|(_, l)| *l).unwrap_or(0);
                    let remaining = total - front_len - sep_len;
                    if remaining < self.overlap {
                        break;
                    }
                    current.pop_front();
                    total = remaining;
                }
                // If the retained tail still cannot fit alongside the new
                // piece, give it up entirely rather than overflow the budget.
                while !current.is_empty() && total + sep_len + piece_len > self.max_chunk_size {
                    let front_len = current.pop_front().map(|(_, l)| l).unwrap_or(0);
                    total -= front_len;
                    if !current.is_empty() {
                        total -= sep_len;
                    }
                }
            }

            if current.is_empty() {
                total = piece_len;
            } else {
                total += sep_len + piece_len;
            }
            current.push_back((piece, piece_len));
        }

        if !current.is_empty() {
            chunks.push(join_pieces(&current, sep));
        }

        chunks
    }
}

/// First separator that occurs in `text`, plus the lower-priority rest.
/// The trailing `""` entry always matches, so this cannot fail.
fn pick_separator<'a>(text: &str, separators: &'a [&'a str]) -> (&'a str, &'a [&'a str]) {
    for (i, sep) in separators.iter().enumerate() {
        if sep.is_empty() || text.contains(sep) {
            return (sep, &separators[i + 1..]);
        }
    }
    ("", &[])
}

fn join_pieces(pieces: &VecDeque<(String, usize)>, sep: &str) -> String {
    pieces
        .iter()
        .map(|(p, _)| p.as_str())
        .collect::<Vec<_>>()
        .join(sep)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
