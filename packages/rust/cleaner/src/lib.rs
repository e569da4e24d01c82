//! Corpus cleaning for siteqa: normalize scraped text, deduplicate and merge
//! paragraphs, and drop pages with nothing left to index.
//!
//! This crate provides:
//! - [`normalize`] — whitespace/charset/entity normalization for one string
//! - [`process_paragraphs`] — per-page dedup + short-fragment merging
//! - [`clean_page`] / [`clean_corpus`] — page filter and whole-corpus pass

pub mod normalize;
pub mod paragraphs;

use tracing::debug;

use siteqa_shared::{CleanCorpus, CleanPage, RawCorpus, RawPage};

pub use normalize::normalize;
pub use paragraphs::process_paragraphs;

/// Clean one raw page. Returns `None` when the page fails the page filter:
/// the normalized URL or the cleaned paragraph list came out empty.
pub fn clean_page(raw: &RawPage) -> Option<CleanPage> {
    let page_url = normalize(&raw.page_url);
    let paragraphs = process_paragraphs(&raw.paragraphs);

    if page_url.is_empty() || paragraphs.is_empty() {
        return None;
    }

    Some(CleanPage {
        page_url,
        paragraphs,
    })
}

/// Clean an entire raw corpus. Pages are independent; order across pages is
/// insignificant and keys of dropped pages are absent from the output.
pub fn clean_corpus(raw: &RawCorpus) -> CleanCorpus {
    let mut cleaned = CleanCorpus::new();

    for (page_key, page) in raw {
        match clean_page(page) {
            Some(clean) => {
                cleaned.insert(page_key.clone(), clean);
            }
            None => {
                debug!(page_key, "dropping page with empty url or paragraphs");
            }
        }
    }

    cleaned
}
