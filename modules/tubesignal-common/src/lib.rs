pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::TubeSignalError;
pub use types::*;

/// Canonical actor-key form of a keyword: trimmed, lower-cased.
/// Display strings keep the caller's casing; identity does not.
pub fn keyword_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Parse a channel's declared keyword string. The platform returns a single
/// space-separated string where multi-word keywords are double-quoted, and
/// some channels use commas instead.
pub fn parse_channel_keywords(raw: &str) -> Vec<String> {
    let mut keywords = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in raw.chars() {
        match ch {
            '"' => {
                if in_quotes && !current.trim().is_empty() {
                    keywords.push(current.trim().to_string());
                    current.clear();
                }
                in_quotes = !in_quotes;
            }
            ' ' | ',' if !in_quotes => {
                if !current.trim().is_empty() {
                    keywords.push(current.trim().to_string());
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        keywords.push(current.trim().to_string());
    }
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_key_trims_and_lowercases() {
        assert_eq!(keyword_key("  Rust Tutorial "), "rust tutorial");
    }

    #[test]
    fn channel_keywords_space_separated() {
        assert_eq!(
            parse_channel_keywords("rust programming tutorial"),
            vec!["rust", "programming", "tutorial"]
        );
    }

    #[test]
    fn channel_keywords_quoted_phrases() {
        assert_eq!(
            parse_channel_keywords(r#""rust programming" tutorial "systems language""#),
            vec!["rust programming", "tutorial", "systems language"]
        );
    }

    #[test]
    fn channel_keywords_comma_separated() {
        assert_eq!(
            parse_channel_keywords("rust, programming, tutorial"),
            vec!["rust", "programming", "tutorial"]
        );
    }
}
