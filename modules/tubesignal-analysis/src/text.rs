// Shared text normalisation for the miners: URL/HTML stripping, entity
// decoding, tokenising, and n-gram assembly.

use std::sync::OnceLock;

use regex::Regex;

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:https?://|www\.)\S+").expect("url regex"))
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag regex"))
}

fn hex_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9a-f]{6,}$").expect("hex regex"))
}

fn word_split_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\W+").expect("split regex"))
}

pub fn strip_urls(text: &str) -> String {
    url_regex().replace_all(text, " ").into_owned()
}

pub fn strip_html_tags(text: &str) -> String {
    tag_regex().replace_all(text, " ").into_owned()
}

pub fn decode_html_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

/// Normalise free text into the token stream the miners agree on:
/// strip URLs and markup, decode entities, lowercase, split on non-word
/// characters, then drop short words, stop words, hex identifiers, and
/// bare integers.
pub fn tokenize(text: &str, is_stop_word: fn(&str) -> bool) -> Vec<String> {
    let cleaned = strip_urls(text);
    let cleaned = strip_html_tags(&cleaned);
    let cleaned = decode_html_entities(&cleaned).to_lowercase();

    word_split_regex()
        .split(&cleaned)
        .filter(|word| word.len() >= 3)
        .filter(|word| !is_stop_word(word))
        .filter(|word| !hex_id_regex().is_match(word))
        .filter(|word| word.parse::<i64>().is_err())
        .map(|word| word.to_string())
        .collect()
}

/// Consecutive n-grams over an already-filtered token stream.
pub fn ngrams(tokens: &[String], n: usize) -> Vec<String> {
    if n == 0 || tokens.len() < n {
        return Vec::new();
    }
    tokens.windows(n).map(|w| w.join(" ")).collect()
}

/// Tag normalisation: lowercase, trim, collapse internal whitespace;
/// tags of three or more characters survive.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let collapsed = tag
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    (collapsed.len() > 2).then_some(collapsed)
}

/// The >2-character word set used by the long-tail relevance filter.
pub fn significant_words(text: &str) -> std::collections::HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|w| w.len() > 2)
        .map(|w| w.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stopwords::is_extraction_stop_word;

    #[test]
    fn urls_and_markup_are_stripped() {
        let tokens = tokenize(
            "check https://example.com/x?y=1 and <b>bold</b> words",
            is_extraction_stop_word,
        );
        assert_eq!(tokens, vec!["check", "bold", "words"]);
    }

    #[test]
    fn entities_decode_before_tokenising() {
        let tokens = tokenize("rust &amp; wasm", is_extraction_stop_word);
        assert_eq!(tokens, vec!["rust", "wasm"]);
    }

    #[test]
    fn hex_ids_and_integers_are_dropped() {
        let tokens = tokenize("deadbeef01 2024 keyword 12", is_extraction_stop_word);
        assert_eq!(tokens, vec!["keyword"]);
    }

    #[test]
    fn ngrams_join_consecutive_tokens() {
        let tokens: Vec<String> = ["rust", "async", "tutorial"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(ngrams(&tokens, 2), vec!["rust async", "async tutorial"]);
        assert_eq!(ngrams(&tokens, 3), vec!["rust async tutorial"]);
        assert!(ngrams(&tokens, 4).is_empty());
    }

    #[test]
    fn tags_collapse_whitespace_and_require_length() {
        assert_eq!(
            normalize_tag("  Rust   Programming "),
            Some("rust programming".to_string())
        );
        assert_eq!(normalize_tag("go"), None);
    }
}
