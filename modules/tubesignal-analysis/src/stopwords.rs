// Two stop sets exist on purpose: the extraction set used by the TF-IDF
// miner, and the trending set that additionally drops platform boilerplate.
// Words shorter than three characters never reach these lists.

/// Stop words for general keyword extraction.
pub const EXTRACTION_STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "her", "was", "one",
    "our", "out", "get", "has", "him", "his", "how", "now", "see", "two", "way", "who", "did",
    "its", "let", "put", "say", "she", "too", "use", "that", "with", "have", "this", "will",
    "your", "from", "they", "know", "want", "been", "much", "some", "time", "very", "when",
    "come", "here", "just", "like", "long", "make", "many", "more", "only", "over", "such",
    "take", "than", "them", "then", "were", "what", "about", "after", "again", "could", "every",
    "going", "first", "never", "other", "right", "should", "still", "there", "these", "thing",
    "things", "think", "those", "through", "where", "which", "while", "would", "into", "also",
    "their", "because", "before", "being", "between", "both", "does", "doing", "down", "during",
    "each", "gonna", "really", "something", "actually", "little", "well", "even", "back", "good",
    "most", "made", "until", "without",
];

/// Platform boilerplate additionally excluded when mining trending video
/// titles, tags, and descriptions.
pub const TRENDING_EXTRA_STOP_WORDS: &[&str] = &[
    "video", "videos", "official", "watch", "watching", "subscribe", "channel", "shorts",
    "live", "stream", "full", "episode", "trailer", "teaser", "music", "song", "audio",
    "lyric", "lyrics", "feat", "featuring", "premiere", "highlights", "vlog", "reaction",
    "compilation", "clip", "clips", "part", "series", "season", "free", "download", "link",
    "links", "follow", "instagram", "twitter", "tiktok", "merch", "http", "https", "youtube",
];

pub fn is_extraction_stop_word(word: &str) -> bool {
    EXTRACTION_STOP_WORDS.contains(&word)
}

pub fn is_trending_stop_word(word: &str) -> bool {
    EXTRACTION_STOP_WORDS.contains(&word) || TRENDING_EXTRA_STOP_WORDS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trending_set_is_a_superset() {
        assert!(is_extraction_stop_word("the"));
        assert!(is_trending_stop_word("the"));
        assert!(is_trending_stop_word("official"));
        assert!(!is_extraction_stop_word("official"));
    }
}
