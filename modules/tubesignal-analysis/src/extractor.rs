use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use tubesignal_common::{EnrichedVideo, ExtractedKeyword, Video};

use crate::stopwords::{is_extraction_stop_word, is_trending_stop_word};
use crate::text::{ngrams, normalize_tag, tokenize};

/// Default number of terms returned by the TF-IDF extractor.
pub const DEFAULT_TOP_K: usize = 50;

/// Comments considered per video when mining terms.
const COMMENTS_PER_VIDEO: usize = 50;

/// Tags considered per trending video.
const TRENDING_TAGS_PER_VIDEO: usize = 10;
/// Description prefix considered per trending video.
const TRENDING_DESCRIPTION_CHARS: usize = 500;

/// TF-IDF keyword extraction over one research result's video set.
///
/// Each video is one document; its terms are the uni/bi/trigrams of its
/// title, description, transcript, and first fifty comments, plus its
/// normalised tags. The score is `total_count × ln(N / df)` with natural
/// log; a term present in every document scores zero.
pub fn extract_keywords(videos: &[EnrichedVideo], top_k: usize) -> Vec<ExtractedKeyword> {
    if videos.is_empty() {
        return Vec::new();
    }

    let mut totals: HashMap<String, u32> = HashMap::new();
    let mut document_frequency: HashMap<String, u32> = HashMap::new();

    for enriched in videos {
        let mut in_this_video: HashMap<String, u32> = HashMap::new();

        let mut count_text = |text: &str, counts: &mut HashMap<String, u32>| {
            let tokens = tokenize(text, is_extraction_stop_word);
            for n in 1..=3 {
                for gram in ngrams(&tokens, n) {
                    *counts.entry(gram).or_insert(0) += 1;
                }
            }
        };

        count_text(&enriched.video.title, &mut in_this_video);
        count_text(&enriched.video.description, &mut in_this_video);
        if let Some(transcript) = &enriched.transcript {
            count_text(&transcript.text, &mut in_this_video);
        }
        for comment in enriched.comments.iter().take(COMMENTS_PER_VIDEO) {
            count_text(&comment.text, &mut in_this_video);
        }
        for tag in &enriched.video.tags {
            if let Some(tag) = normalize_tag(tag) {
                *in_this_video.entry(tag).or_insert(0) += 1;
            }
        }

        for (term, count) in in_this_video {
            *totals.entry(term.clone()).or_insert(0) += count;
            *document_frequency.entry(term).or_insert(0) += 1;
        }
    }

    let document_count = videos.len() as f64;
    let mut extracted: Vec<ExtractedKeyword> = totals
        .into_iter()
        .map(|(keyword, count)| {
            let df = document_frequency[&keyword];
            ExtractedKeyword {
                tfidf: f64::from(count) * (document_count / f64::from(df)).ln(),
                keyword,
                count,
                video_count: df,
            }
        })
        .collect();

    extracted.sort_by(|a, b| {
        b.tfidf
            .partial_cmp(&a.tfidf)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.count.cmp(&a.count))
            .then(a.keyword.cmp(&b.keyword))
    });
    extracted.truncate(top_k);
    extracted
}

/// One keyword mined from a region's trending chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingCandidate {
    pub keyword: String,
    pub score: u32,
    /// Distinct trending videos the keyword appeared in.
    pub video_count: u32,
}

/// Weighted phrase extraction over trending videos: titles count triple,
/// the first ten tags double, the first 500 description characters single.
/// Phrases must recur across at least two videos.
pub fn extract_trending_keywords(videos: &[Video], top_n: usize) -> Vec<TrendingCandidate> {
    let mut scores: HashMap<String, u32> = HashMap::new();
    let mut seen_in: HashMap<String, HashSet<usize>> = HashMap::new();

    let mut record = |phrase: String, weight: u32, video_index: usize,
                      scores: &mut HashMap<String, u32>,
                      seen_in: &mut HashMap<String, HashSet<usize>>| {
        *scores.entry(phrase.clone()).or_insert(0) += weight;
        seen_in.entry(phrase).or_default().insert(video_index);
    };

    for (index, video) in videos.iter().enumerate() {
        let title_tokens = tokenize(&video.title, is_trending_stop_word);
        for n in 1..=3 {
            for gram in ngrams(&title_tokens, n) {
                record(gram, 3, index, &mut scores, &mut seen_in);
            }
        }

        for tag in video.tags.iter().take(TRENDING_TAGS_PER_VIDEO) {
            let tag_tokens = tokenize(tag, is_trending_stop_word);
            if tag_tokens.is_empty() || tag_tokens.len() > 3 {
                continue;
            }
            record(tag_tokens.join(" "), 2, index, &mut scores, &mut seen_in);
        }

        let description_prefix: String = video
            .description
            .chars()
            .take(TRENDING_DESCRIPTION_CHARS)
            .collect();
        let description_tokens = tokenize(&description_prefix, is_trending_stop_word);
        for n in 1..=3 {
            for gram in ngrams(&description_tokens, n) {
                record(gram, 1, index, &mut scores, &mut seen_in);
            }
        }
    }

    let mut candidates: Vec<TrendingCandidate> = scores
        .into_iter()
        .filter_map(|(keyword, score)| {
            let video_count = seen_in[&keyword].len() as u32;
            (video_count >= 2).then_some(TrendingCandidate {
                keyword,
                score,
                video_count,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(b.video_count.cmp(&a.video_count))
            .then(a.keyword.cmp(&b.keyword))
    });
    candidates.truncate(top_n);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubesignal_common::Transcript;

    fn doc(id: &str, title: &str, description: &str) -> EnrichedVideo {
        EnrichedVideo::bare(Video {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            ..Video::default()
        })
    }

    #[test]
    fn empty_video_set_yields_no_keywords() {
        assert!(extract_keywords(&[], DEFAULT_TOP_K).is_empty());
    }

    #[test]
    fn term_in_every_document_scores_zero() {
        let videos = vec![
            doc("a", "sourdough starter", ""),
            doc("b", "sourdough oven", ""),
        ];
        let extracted = extract_keywords(&videos, DEFAULT_TOP_K);
        let shared = extracted
            .iter()
            .find(|k| k.keyword == "sourdough")
            .expect("shared term extracted");
        assert_eq!(shared.tfidf, 0.0);
        assert_eq!(shared.video_count, 2);

        let unique = extracted
            .iter()
            .find(|k| k.keyword == "starter")
            .expect("unique term extracted");
        assert!(unique.tfidf > 0.0);
    }

    #[test]
    fn extraction_is_deterministic() {
        let videos = vec![
            doc("a", "rust async tutorial", "learn tokio runtime basics"),
            doc("b", "rust ownership explained", "borrow checker deep dive"),
        ];
        let first = extract_keywords(&videos, 10);
        let second = extract_keywords(&videos, 10);
        assert_eq!(first, second);
    }

    #[test]
    fn bigrams_and_trigrams_are_counted() {
        let mut video = doc("a", "mechanical keyboard sound test", "");
        video.transcript = Some(Transcript {
            text: "mechanical keyboard sound test again".to_string(),
            language: "en".to_string(),
        });
        let other = doc("b", "membrane keyboards", "");
        let extracted = extract_keywords(&[video, other], 200);
        let phrases: Vec<&str> = extracted.iter().map(|k| k.keyword.as_str()).collect();
        assert!(phrases.contains(&"mechanical keyboard"));
        assert!(phrases.contains(&"mechanical keyboard sound"));
    }

    #[test]
    fn tags_join_the_term_space() {
        let mut video = doc("a", "untitled", "");
        video.video.tags = vec!["Home Espresso ".to_string()];
        let other = doc("b", "other", "");
        let extracted = extract_keywords(&[video, other], 200);
        assert!(extracted.iter().any(|k| k.keyword == "home espresso"));
    }

    fn trending_video(id: &str, title: &str, tags: &[&str]) -> Video {
        Video {
            id: id.to_string(),
            title: title.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Video::default()
        }
    }

    #[test]
    fn trending_phrases_must_recur_across_videos() {
        let videos = vec![
            trending_video("a", "city marathon finish", &[]),
            trending_video("b", "city marathon recap", &[]),
            trending_video("c", "cooking pasta", &[]),
        ];
        let candidates = extract_trending_keywords(&videos, 20);
        assert!(candidates.iter().any(|c| c.keyword == "city marathon"));
        assert!(!candidates.iter().any(|c| c.keyword == "cooking pasta"));
    }

    #[test]
    fn title_weight_beats_description_weight() {
        let mut with_description = trending_video("a", "quiet phrase", &[]);
        with_description.description = "spotlight moment".to_string();
        let mut other = trending_video("b", "quiet phrase", &[]);
        other.description = "spotlight moment".to_string();

        let candidates = extract_trending_keywords(&[with_description, other], 20);
        let title_score = candidates
            .iter()
            .find(|c| c.keyword == "quiet phrase")
            .unwrap()
            .score;
        let description_score = candidates
            .iter()
            .find(|c| c.keyword == "spotlight moment")
            .unwrap()
            .score;
        assert_eq!(title_score, 6);
        assert_eq!(description_score, 2);
    }

    #[test]
    fn boilerplate_is_filtered_from_trending_terms() {
        let videos = vec![
            trending_video("a", "official trailer reaction", &["subscribe"]),
            trending_video("b", "official trailer reaction", &["subscribe"]),
        ];
        let candidates = extract_trending_keywords(&videos, 20);
        assert!(candidates.is_empty());
    }
}
