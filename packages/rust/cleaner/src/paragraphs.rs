//! Paragraph deduplication and short-fragment merging.

use std::collections::HashSet;

use crate::normalize::normalize;

/// Paragraphs shorter than this are merged into their predecessor when the
/// predecessor is also short. Keeps scraped fragments (button labels, one-line
/// notices) from becoming their own index entries.
const MERGE_THRESHOLD: usize = 80;

/// Clean one page's paragraphs: normalize each, merge adjacent short
/// fragments, drop exact duplicates. A single left-to-right pass.
///
/// Merged text is never added to the seen-set, so a merge can reintroduce
/// text that also appears verbatim later. Accepted behavior, kept as-is.
pub fn process_paragraphs(paragraphs: &[String]) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for raw in paragraphs {
        let text = normalize(raw);
        if text.is_empty() {
            continue;
        }

        let last_is_short = cleaned
            .last()
            .is_some_and(|last| last.chars().count() < MERGE_THRESHOLD);

        if last_is_short && text.chars().count() < MERGE_THRESHOLD {
            let last = cleaned.last_mut().expect("non-empty when last_is_short");
            last.push(' ');
            last.push_str(&text);
        } else if !seen.contains(&text) {
            seen.insert(text.clone());
            cleaned.push(text);
        }
    }

    cleaned
}
