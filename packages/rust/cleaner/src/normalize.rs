//! Text normalization pass applied to every paragraph and URL.
//!
//! Three steps, in order: whitespace collapse, character filtering,
//! HTML-entity substring replacement. The entity pass runs *after*
//! filtering, so entities whose `;` was stripped stay as-is; that ordering
//! is part of the contract and must not be rearranged.

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Characters kept by the filter: alphanumerics, whitespace, and the
/// punctuation set `. , ! ? - & ' " /`.
static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[^\w\s.,!?\-&'"/]"#).expect("valid regex"));

/// Normalize a raw string: collapse whitespace runs to single spaces, trim,
/// strip disallowed characters, then replace `&nbsp;`/`&amp;` literals.
///
/// Pure and deterministic; empty input yields empty output. Idempotent:
/// normalizing an already-normalized string returns it unchanged.
pub fn normalize(text: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(text, " ");
    let filtered = DISALLOWED_RE.replace_all(collapsed.trim(), "");

    filtered.replace("&nbsp;", " ").replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(normalize("Hello   world!\n"), "Hello world!");
        assert_eq!(normalize("  a\t\tb \n c  "), "a b c");
    }

    #[test]
    fn strips_disallowed_characters() {
        assert_eq!(normalize("Gate #B12 <open>"), "Gate B12 open");
        assert_eq!(normalize("price: $5.00"), "price 5.00");
    }

    #[test]
    fn keeps_allowed_punctuation() {
        let input = "Wait, really?! T-2 & T-3 are 'open' \"now\" 24/7.";
        assert_eq!(normalize(input), input);
    }

    #[test]
    fn keeps_unicode_alphanumerics() {
        assert_eq!(normalize("Café 星耀樟宜"), "Café 星耀樟宜");
    }

    #[test]
    fn entity_replacement_runs_after_filtering() {
        // The filter removes ';' first, so the literal entities are already
        // broken by the time the replacement pass runs. Matches the contract.
        assert_eq!(normalize("Shops&nbsp;open"), "Shops&nbspopen");
        assert_eq!(normalize("Arrivals &amp; departures"), "Arrivals &amp departures");
        // A pre-broken entity (no semicolon to strip) is still not replaced,
        // since replacement looks for the full literal.
        assert_eq!(normalize("A&ampB"), "A&ampB");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t  "), "");
    }

    #[test]
    fn idempotent_on_normalized_text() {
        let once = normalize("Free WiFi  is available&nbsp;at all terminals!");
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }
}
