use std::collections::{HashMap, HashSet};

use tubesignal_common::{
    EnrichedVideo, RecommendationOptimization, TagOverlap, TargetVideo, TopicCluster,
};

use crate::stopwords::is_extraction_stop_word;
use crate::text::{ngrams, normalize_tag, tokenize};

/// Tag overlaps surfaced.
const MAX_TAG_OVERLAPS: usize = 20;
/// Must-use tags surfaced.
const MAX_MUST_USE_TAGS: usize = 15;
/// Transcript topic clusters surfaced.
const MAX_TOPIC_CLUSTERS: usize = 10;
/// Videos suggested to appear alongside.
const MAX_TARGET_VIDEOS: usize = 5;
/// Transcript vocabulary terms surfaced.
const MAX_TRANSCRIPT_KEYWORDS: usize = 15;
/// Top results considered for the must-use tag rule.
const MUST_USE_WINDOW: usize = 10;

/// Transcript phrases too generic to form a topic cluster. Spoken filler
/// survives the raw split, so it is excluded by name.
const PHRASE_BLACKLIST: &[&str] = &[
    "going to",
    "want to",
    "need to",
    "have to",
    "gonna be",
    "you know",
    "kind of",
    "sort of",
    "lot of",
    "thank you",
    "make sure",
    "little bit",
    "this video",
    "in this",
    "if you",
    "you can",
];

/// Mine the top results for packaging guidance: which tags to carry, which
/// phrases recur in spoken content, and which videos to aim to rank beside.
pub fn optimise_recommendations(
    keyword: &str,
    videos: &[EnrichedVideo],
) -> RecommendationOptimization {
    let keyword_lower = keyword.to_lowercase();

    // --- Tag overlaps across all results ---
    let mut tag_videos: HashMap<String, HashSet<usize>> = HashMap::new();
    for (index, enriched) in videos.iter().enumerate() {
        for tag in &enriched.video.tags {
            if let Some(tag) = normalize_tag(tag) {
                tag_videos.entry(tag).or_default().insert(index);
            }
        }
    }
    let mut tag_overlaps: Vec<TagOverlap> = tag_videos
        .iter()
        .filter(|(_, indexes)| indexes.len() >= 2)
        .map(|(tag, indexes)| TagOverlap {
            tag: tag.clone(),
            video_count: indexes.len() as u32,
            total_views: indexes
                .iter()
                .map(|&i| videos[i].video.view_count)
                .sum::<u64>(),
        })
        .collect();
    tag_overlaps.sort_by(|a, b| {
        b.video_count
            .cmp(&a.video_count)
            .then(b.total_views.cmp(&a.total_views))
            .then(a.tag.cmp(&b.tag))
    });
    tag_overlaps.truncate(MAX_TAG_OVERLAPS);

    // --- Must-use tags over the top window ---
    let window = videos.len().min(MUST_USE_WINDOW);
    let threshold = (window.div_ceil(2)).max(2);
    let mut window_tag_counts: HashMap<String, u32> = HashMap::new();
    for enriched in videos.iter().take(window) {
        let mut seen: HashSet<String> = HashSet::new();
        for tag in &enriched.video.tags {
            if let Some(tag) = normalize_tag(tag) {
                if seen.insert(tag.clone()) {
                    *window_tag_counts.entry(tag).or_insert(0) += 1;
                }
            }
        }
    }
    let mut must_use: Vec<(String, u32)> = window_tag_counts
        .into_iter()
        .filter(|(_, count)| *count as usize >= threshold)
        .collect();
    must_use.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    must_use.truncate(MAX_MUST_USE_TAGS);
    let must_use_tags: Vec<String> = must_use.into_iter().map(|(tag, _)| tag).collect();

    // --- Topic clusters from transcripts ---
    let transcripts: Vec<&str> = videos
        .iter()
        .filter_map(|v| v.transcript.as_ref().map(|t| t.text.as_str()))
        .collect();
    let topic_clusters = topic_clusters(&transcripts);

    // --- Target videos: highest-view results sharing the must-use tags ---
    let mut by_views: Vec<&EnrichedVideo> = videos.iter().collect();
    by_views.sort_by(|a, b| b.video.view_count.cmp(&a.video.view_count));
    let target_videos: Vec<TargetVideo> = by_views
        .iter()
        .filter_map(|enriched| {
            if must_use_tags.is_empty() {
                return None;
            }
            let tags: HashSet<String> = enriched
                .video
                .tags
                .iter()
                .filter_map(|t| normalize_tag(t))
                .collect();
            let matched = must_use_tags
                .iter()
                .filter(|t| tags.contains(*t))
                .count();
            (matched > 0).then(|| TargetVideo {
                video_id: enriched.video.id.clone(),
                title: enriched.video.title.clone(),
                view_count: enriched.video.view_count,
                similarity: matched as f64 / must_use_tags.len() as f64,
            })
        })
        .take(MAX_TARGET_VIDEOS)
        .collect();

    // --- Topic match: share of spoken content that covers the keyword ---
    let with_transcript = transcripts.len();
    let mentioning = transcripts
        .iter()
        .filter(|t| t.to_lowercase().contains(&keyword_lower))
        .count();
    let topic_match_score = if with_transcript == 0 {
        0
    } else {
        (mentioning * 100 / with_transcript) as u8
    };

    let transcript_keywords = transcript_keywords(&transcripts);

    RecommendationOptimization {
        tag_overlaps,
        must_use_tags,
        topic_clusters,
        target_videos,
        topic_match_score,
        transcript_keywords,
    }
}

fn topic_clusters(transcripts: &[&str]) -> Vec<TopicCluster> {
    // Spoken phrases are mined over a raw word split (no stop filter), so
    // that natural two-word topics like "sourdough starter" survive intact;
    // filler is removed by the blacklist and the both-stop-words rule.
    let mut bigram_transcripts: HashMap<String, HashSet<usize>> = HashMap::new();
    for (index, transcript) in transcripts.iter().enumerate() {
        let tokens: Vec<String> = transcript
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() >= 2)
            .map(|w| w.to_string())
            .collect();
        for bigram in ngrams(&tokens, 2) {
            if PHRASE_BLACKLIST.contains(&bigram.as_str()) {
                continue;
            }
            let mut words = bigram.split(' ');
            let (first, second) = (words.next().unwrap_or(""), words.next().unwrap_or(""));
            if is_extraction_stop_word(first) && is_extraction_stop_word(second) {
                continue;
            }
            bigram_transcripts.entry(bigram).or_default().insert(index);
        }
    }

    let recurring: Vec<String> = bigram_transcripts
        .iter()
        .filter(|(_, seen)| seen.len() >= 2)
        .map(|(bigram, _)| bigram.clone())
        .collect();

    let mut clusters: Vec<TopicCluster> = recurring
        .iter()
        .map(|phrase| {
            let words: HashSet<&str> = phrase.split(' ').collect();
            let mut related: Vec<String> = recurring
                .iter()
                .filter(|other| {
                    *other != phrase && other.split(' ').any(|word| words.contains(word))
                })
                .cloned()
                .collect();
            related.sort();
            TopicCluster {
                phrase: phrase.clone(),
                related_terms: related,
            }
        })
        .collect();

    clusters.sort_by(|a, b| {
        b.related_terms
            .len()
            .cmp(&a.related_terms.len())
            .then(a.phrase.cmp(&b.phrase))
    });
    clusters.truncate(MAX_TOPIC_CLUSTERS);
    clusters
}

/// Vocabulary worth speaking aloud: terms recurring across transcripts.
fn transcript_keywords(transcripts: &[&str]) -> Vec<String> {
    if transcripts.is_empty() {
        return Vec::new();
    }
    let threshold = (transcripts.len() / 3).max(2);

    let mut term_transcripts: HashMap<String, HashSet<usize>> = HashMap::new();
    for (index, transcript) in transcripts.iter().enumerate() {
        let tokens: Vec<String> = tokenize(transcript, is_extraction_stop_word)
            .into_iter()
            .filter(|t| t.len() >= 4)
            .collect();
        for term in &tokens {
            term_transcripts
                .entry(term.clone())
                .or_default()
                .insert(index);
        }
        for bigram in ngrams(&tokens, 2) {
            term_transcripts.entry(bigram).or_default().insert(index);
        }
    }

    let mut terms: Vec<(String, usize)> = term_transcripts
        .into_iter()
        .filter(|(_, seen)| seen.len() >= threshold)
        .map(|(term, seen)| (term, seen.len()))
        .collect();
    terms.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    terms.truncate(MAX_TRANSCRIPT_KEYWORDS);
    terms.into_iter().map(|(term, _)| term).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubesignal_common::{Transcript, Video};

    fn with_tags(id: &str, views: u64, tags: &[&str]) -> EnrichedVideo {
        EnrichedVideo::bare(Video {
            id: id.to_string(),
            title: format!("video {id}"),
            view_count: views,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Video::default()
        })
    }

    fn with_transcript(id: &str, text: &str) -> EnrichedVideo {
        let mut enriched = with_tags(id, 100, &[]);
        enriched.transcript = Some(Transcript {
            text: text.to_string(),
            language: "en".to_string(),
        });
        enriched
    }

    #[test]
    fn tag_overlaps_require_two_videos() {
        let videos = vec![
            with_tags("a", 500, &["espresso", "coffee"]),
            with_tags("b", 300, &["espresso", "grinder"]),
            with_tags("c", 100, &["latte"]),
        ];
        let optimization = optimise_recommendations("espresso", &videos);
        assert_eq!(optimization.tag_overlaps.len(), 1);
        assert_eq!(optimization.tag_overlaps[0].tag, "espresso");
        assert_eq!(optimization.tag_overlaps[0].video_count, 2);
        assert_eq!(optimization.tag_overlaps[0].total_views, 800);
    }

    #[test]
    fn must_use_tags_need_half_the_window_with_a_floor_of_two() {
        // 4 videos → threshold max(2,2)=2.
        let videos = vec![
            with_tags("a", 1, &["espresso"]),
            with_tags("b", 1, &["espresso"]),
            with_tags("c", 1, &["grinder"]),
            with_tags("d", 1, &["latte"]),
        ];
        let optimization = optimise_recommendations("espresso", &videos);
        assert_eq!(optimization.must_use_tags, vec!["espresso"]);
    }

    #[test]
    fn target_videos_rank_by_views_with_tag_similarity() {
        let videos = vec![
            with_tags("a", 100, &["espresso", "crema"]),
            with_tags("b", 9_000, &["espresso", "crema"]),
            with_tags("c", 5_000, &["espresso"]),
            with_tags("d", 20_000, &["unrelated"]),
        ];
        let optimization = optimise_recommendations("espresso", &videos);
        // must-use: espresso (3), crema (2)
        assert_eq!(optimization.must_use_tags.len(), 2);
        let targets = &optimization.target_videos;
        assert_eq!(targets[0].video_id, "b");
        assert_eq!(targets[0].similarity, 1.0);
        assert_eq!(targets[1].video_id, "c");
        assert_eq!(targets[1].similarity, 0.5);
        assert!(!targets.iter().any(|t| t.video_id == "d"));
    }

    #[test]
    fn topic_match_counts_transcribed_videos_only() {
        let videos = vec![
            with_transcript("a", "all about espresso tamping"),
            with_transcript("b", "grinder burrs compared"),
            with_tags("c", 10, &[]),
        ];
        let optimization = optimise_recommendations("espresso", &videos);
        assert_eq!(optimization.topic_match_score, 50);
    }

    #[test]
    fn no_transcripts_means_zero_topic_match() {
        let videos = vec![with_tags("a", 10, &[])];
        let optimization = optimise_recommendations("espresso", &videos);
        assert_eq!(optimization.topic_match_score, 0);
        assert!(optimization.topic_clusters.is_empty());
        assert!(optimization.transcript_keywords.is_empty());
    }

    #[test]
    fn recurring_bigrams_cluster_and_blacklist_is_honoured() {
        let videos = vec![
            with_transcript("a", "dial espresso shots slowly, going to taste"),
            with_transcript("b", "dial espresso shots daily, going to extract"),
        ];
        let optimization = optimise_recommendations("espresso", &videos);
        let phrases: Vec<&str> = optimization
            .topic_clusters
            .iter()
            .map(|c| c.phrase.as_str())
            .collect();
        assert!(phrases.contains(&"dial espresso"));
        assert!(phrases.contains(&"espresso shots"));
        assert!(!phrases.contains(&"going to"));
        let dial = optimization
            .topic_clusters
            .iter()
            .find(|c| c.phrase == "dial espresso")
            .unwrap();
        assert!(dial.related_terms.contains(&"espresso shots".to_string()));
    }

    #[test]
    fn transcript_vocabulary_requires_recurrence() {
        let videos = vec![
            with_transcript("a", "portafilter technique matters portafilter"),
            with_transcript("b", "portafilter cleaning routine"),
            with_transcript("c", "milk steaming only"),
        ];
        let optimization = optimise_recommendations("espresso", &videos);
        assert!(optimization
            .transcript_keywords
            .contains(&"portafilter".to_string()));
        assert!(!optimization
            .transcript_keywords
            .contains(&"steaming".to_string()));
    }
}
