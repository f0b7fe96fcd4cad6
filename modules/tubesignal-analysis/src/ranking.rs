use std::collections::HashSet;

use tubesignal_common::{
    ChannelAuthoritySummary, EnrichedVideo, ExtractedKeyword, LongTailVariation,
    OptimalPlacement, RankingFactor, RankingInsights, Video, VideoRankingSignals,
};

/// Factors kept after the primary analysis pass.
const TOP_FACTORS: usize = 5;
/// Factors kept once the channel-keyword-authority pass has merged in.
const TOP_FACTORS_WITH_AUTHORITY: usize = 6;
/// Long-tail variations returned, ordered easiest-first.
const MAX_VARIATIONS: usize = 10;

/// Subscriber share of the top results a newcomer realistically needs.
const MIN_SUBSCRIBER_SHARE: f64 = 0.10;
/// A channel is a keyword authority when this share of its recent uploads
/// carries the keyword.
const KEYWORD_AUTHORITY_RATIO: f64 = 30.0;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub struct RankingInputs<'a> {
    pub keyword: &'a str,
    /// Ordered by search-result position: index 0 is rank 1.
    pub videos: &'a [EnrichedVideo],
    pub youtube_suggestions: &'a [String],
    pub google_suggestions: &'a [String],
    pub extracted: &'a [ExtractedKeyword],
}

/// Reverse-engineer which on-page factors correlate with ranking for this
/// keyword, summarise channel authority, and derive long-tail variations.
pub fn analyse_ranking_factors(inputs: &RankingInputs<'_>) -> RankingInsights {
    let keyword = inputs.keyword.to_lowercase();
    let videos = inputs.videos;

    let mut factors = Vec::new();

    let mut push_bias_factor = |name: &str, predicate: &dyn Fn(&EnrichedVideo) -> bool| {
        let ranks: Vec<usize> = videos
            .iter()
            .enumerate()
            .filter(|(_, v)| predicate(v))
            .map(|(i, _)| i + 1)
            .collect();
        if ranks.is_empty() {
            return;
        }
        factors.push(RankingFactor {
            factor: name.to_string(),
            correlation: position_bias(&ranks, videos.len()),
            videos_with_factor: ranks.len() as u32,
        });
    };

    push_bias_factor("Keyword in title", &|v| {
        v.video.title.to_lowercase().contains(&keyword)
    });
    push_bias_factor("Keyword in description", &|v| {
        v.video.description.to_lowercase().contains(&keyword)
    });
    push_bias_factor("Keyword early in description", &|v| {
        first_chars(&v.video.description, 100)
            .to_lowercase()
            .contains(&keyword)
    });
    push_bias_factor("Keyword in tags", &|v| {
        v.video
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&keyword))
    });
    push_bias_factor("Keyword in transcript", &|v| {
        v.transcript
            .as_ref()
            .map(|t| t.text.to_lowercase().contains(&keyword))
            .unwrap_or(false)
    });
    push_bias_factor("Channel niche focus", &|v| {
        channel_keyword_matches(v, &keyword) > 0
    });

    if videos.len() >= 2 {
        factors.extend(halves_factor(
            videos,
            "High engagement",
            0.5,
            &|v| like_ratio(&v.video),
        ));
        factors.extend(halves_factor(
            videos,
            "Channel authority",
            0.4,
            &|v| {
                v.channel
                    .as_ref()
                    .map(|c| c.subscriber_count as f64)
                    .unwrap_or(0.0)
            },
        ));
    }

    factors.sort_by(|a, b| {
        b.correlation
            .abs()
            .partial_cmp(&a.correlation.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.factor.cmp(&b.factor))
    });
    factors.truncate(TOP_FACTORS);

    let channel_authority = summarise_channel_authority(videos);
    let optimal_placement = derive_optimal_placement(&keyword, videos);
    let long_tail_variations = derive_long_tail_variations(
        inputs.keyword,
        inputs
            .youtube_suggestions
            .iter()
            .chain(inputs.google_suggestions.iter()),
        inputs.extracted,
        channel_authority.needs_established_channel,
    );

    RankingInsights {
        top_factors: factors,
        channel_authority,
        optimal_placement,
        long_tail_variations,
    }
}

/// Normalised deviation of a factor subset's mean rank from the expected
/// mean rank: positive means the factor clusters near the top.
pub fn position_bias(ranks: &[usize], total: usize) -> f64 {
    if ranks.is_empty() || total == 0 {
        return 0.0;
    }
    let expected = (total as f64 + 1.0) / 2.0;
    let mean = ranks.iter().map(|r| *r as f64).sum::<f64>() / ranks.len() as f64;
    round2(((expected - mean) / expected).clamp(-1.0, 1.0))
}

/// Top-half-vs-bottom-half comparison with hand-calibrated magnitudes: the
/// positive value when the top half leads, −0.1 otherwise.
fn halves_factor(
    videos: &[EnrichedVideo],
    name: &str,
    positive: f64,
    measure: &dyn Fn(&EnrichedVideo) -> f64,
) -> Option<RankingFactor> {
    let split = videos.len() / 2;
    if split == 0 {
        return None;
    }
    let mean = |slice: &[EnrichedVideo]| -> f64 {
        slice.iter().map(measure).sum::<f64>() / slice.len() as f64
    };
    let top = mean(&videos[..split]);
    let bottom = mean(&videos[split..]);
    let overall = mean(videos);
    let correlation = if top > bottom { positive } else { -0.1 };
    Some(RankingFactor {
        factor: name.to_string(),
        correlation,
        videos_with_factor: videos.iter().filter(|v| measure(*v) > overall).count() as u32,
    })
}

fn like_ratio(video: &Video) -> f64 {
    if video.view_count == 0 {
        return 0.0;
    }
    video.like_count as f64 / video.view_count as f64
}

fn summarise_channel_authority(videos: &[EnrichedVideo]) -> ChannelAuthoritySummary {
    let subs: Vec<f64> = videos
        .iter()
        .map(|v| {
            v.channel
                .as_ref()
                .map(|c| c.subscriber_count as f64)
                .unwrap_or(0.0)
        })
        .collect();
    let avg = if subs.is_empty() {
        0.0
    } else {
        subs.iter().sum::<f64>() / subs.len() as f64
    };
    let top_ten = &subs[..subs.len().min(10)];
    let top_ten_avg = if top_ten.is_empty() {
        0.0
    } else {
        top_ten.iter().sum::<f64>() / top_ten.len() as f64
    };
    ChannelAuthoritySummary {
        avg_subscribers: round2(avg),
        needs_established_channel: avg > 100_000.0,
        estimated_min_subscribers: (top_ten_avg * MIN_SUBSCRIBER_SHARE) as u64,
    }
}

fn derive_optimal_placement(keyword: &str, videos: &[EnrichedVideo]) -> OptimalPlacement {
    if videos.is_empty() {
        return OptimalPlacement {
            keyword_in_title_start: false,
            keyword_early_in_description: false,
            avg_tag_count: 0.0,
            transcript_mentions_per_minute: 0.0,
        };
    }

    let majority = videos.len().div_ceil(2);
    let in_title_start = videos
        .iter()
        .filter(|v| first_words(&v.video.title, 3).contains(keyword))
        .count();
    let early_in_description = videos
        .iter()
        .filter(|v| {
            first_chars(&v.video.description, 100)
                .to_lowercase()
                .contains(keyword)
        })
        .count();
    let avg_tag_count =
        videos.iter().map(|v| v.video.tags.len() as f64).sum::<f64>() / videos.len() as f64;

    let mut mention_rates = Vec::new();
    for enriched in videos {
        let Some(transcript) = &enriched.transcript else {
            continue;
        };
        let Some(seconds) = enriched.video.duration_seconds().filter(|s| *s > 0) else {
            continue;
        };
        let mentions = transcript.text.to_lowercase().matches(keyword).count() as f64;
        mention_rates.push(mentions / (seconds as f64 / 60.0));
    }
    let mentions_per_minute = if mention_rates.is_empty() {
        0.0
    } else {
        mention_rates.iter().sum::<f64>() / mention_rates.len() as f64
    };

    OptimalPlacement {
        keyword_in_title_start: in_title_start >= majority,
        keyword_early_in_description: early_in_description >= majority,
        avg_tag_count: round2(avg_tag_count),
        transcript_mentions_per_minute: round2(mentions_per_minute),
    }
}

/// Difficulty ladder for long-tail candidates derived from autocomplete and
/// extracted terms. Longer, more specific phrasings rank as easier.
fn derive_long_tail_variations<'a>(
    seed: &str,
    suggestions: impl Iterator<Item = &'a String>,
    extracted: &[ExtractedKeyword],
    needs_established_channel: bool,
) -> Vec<LongTailVariation> {
    let seed_lower = seed.to_lowercase();
    let base: i32 = if needs_established_channel { 70 } else { 40 };

    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(seed_lower.clone());
    let mut variations = Vec::new();

    for suggestion in suggestions {
        let lower = suggestion.to_lowercase();
        if suggestion.len() <= seed.len() || !lower.contains(&seed_lower) {
            continue;
        }
        if !seen.insert(lower) {
            continue;
        }
        let length_bonus = (2 * (suggestion.len() - seed.len()) as i32).min(30);
        variations.push(LongTailVariation {
            keyword: suggestion.clone(),
            difficulty: (base - length_bonus).max(10) as u8,
        });
    }

    for term in extracted {
        let lower = term.keyword.to_lowercase();
        if !lower.contains(' ') || !lower.contains(&seed_lower) || lower == seed_lower {
            continue;
        }
        if !seen.insert(lower) {
            continue;
        }
        variations.push(LongTailVariation {
            keyword: term.keyword.clone(),
            difficulty: (base - 15).max(20) as u8,
        });
    }

    if variations.len() < 3 {
        for term in extracted.iter().filter(|t| !t.keyword.contains(' ')) {
            if variations.len() >= 3 {
                break;
            }
            let lower = term.keyword.to_lowercase();
            if seed_lower.split_whitespace().any(|word| word == lower) {
                continue;
            }
            let combined = format!("{seed} {}", term.keyword);
            if !seen.insert(combined.to_lowercase()) {
                continue;
            }
            variations.push(LongTailVariation {
                keyword: combined,
                difficulty: (base - 15).max(20) as u8,
            });
        }
    }

    variations.sort_by(|a, b| {
        a.difficulty
            .cmp(&b.difficulty)
            .then(a.keyword.cmp(&b.keyword))
    });
    variations.truncate(MAX_VARIATIONS);
    variations
}

fn first_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

fn first_words(text: &str, n: usize) -> String {
    text.to_lowercase()
        .split_whitespace()
        .take(n)
        .collect::<Vec<_>>()
        .join(" ")
}

fn channel_keyword_matches(video: &EnrichedVideo, keyword: &str) -> u32 {
    let Some(channel) = &video.channel else {
        return 0;
    };
    channel
        .keywords
        .iter()
        .filter(|declared| {
            let declared = declared.to_lowercase();
            declared.contains(keyword) || keyword.contains(&declared)
        })
        .count() as u32
}

/// Subscriber bucket → authority tier 1–5.
pub fn channel_authority_tier(subscribers: u64) -> u8 {
    if subscribers >= 10_000_000 {
        5
    } else if subscribers >= 1_000_000 {
        4
    } else if subscribers >= 100_000 {
        3
    } else if subscribers >= 10_000 {
        2
    } else {
        1
    }
}

/// Per-video ranking-signal vector for one (keyword, video) pair, using the
/// video's channel and that channel's recent uploads where available.
pub fn extract_video_signals(
    keyword: &str,
    enriched: &EnrichedVideo,
    channel_recent: &[Video],
) -> VideoRankingSignals {
    let keyword_lower = keyword.to_lowercase();
    let video = &enriched.video;
    let title_lower = video.title.to_lowercase();

    let mut signals = VideoRankingSignals {
        keyword_in_title: title_lower.contains(&keyword_lower),
        keyword_in_first_three_words: first_words(&video.title, 3).contains(&keyword_lower),
        keyword_in_description: video.description.to_lowercase().contains(&keyword_lower),
        tag_match_count: video
            .tags
            .iter()
            .filter(|tag| tag.to_lowercase().contains(&keyword_lower))
            .count() as u32,
        transcript_mentions: enriched
            .transcript
            .as_ref()
            .map(|t| t.text.to_lowercase().matches(&keyword_lower).count() as u32)
            .unwrap_or(0),
        engagement_rate: if video.view_count > 0 {
            round2(
                (video.like_count + video.comment_count) as f64 / video.view_count as f64 * 100.0,
            )
        } else {
            0.0
        },
        comment_keyword_mentions: enriched
            .comments
            .iter()
            .filter(|c| c.text.to_lowercase().contains(&keyword_lower))
            .count() as u32,
        ..VideoRankingSignals::default()
    };

    if let Some(channel) = &enriched.channel {
        signals.channel_authority_tier = channel_authority_tier(channel.subscriber_count);
        signals.keyword_in_channel_name = channel.title.to_lowercase().contains(&keyword_lower);
        signals.keyword_in_channel_description =
            channel.description.to_lowercase().contains(&keyword_lower);
        signals.channel_keyword_match_count = channel_keyword_matches(enriched, &keyword_lower);
        signals.is_niche_channel = signals.channel_keyword_match_count > 0;
    } else {
        signals.channel_authority_tier = 1;
    }

    signals.channel_videos_analysed = channel_recent.len() as u32;
    signals.channel_videos_with_keyword = channel_recent
        .iter()
        .filter(|v| {
            v.title.to_lowercase().contains(&keyword_lower)
                || v.description.to_lowercase().contains(&keyword_lower)
        })
        .count() as u32;
    signals.channel_keyword_ratio = if signals.channel_videos_analysed > 0 {
        round2(
            f64::from(signals.channel_videos_with_keyword)
                / f64::from(signals.channel_videos_analysed)
                * 100.0,
        )
    } else {
        0.0
    };
    signals.is_keyword_authority = signals.channel_keyword_ratio >= KEYWORD_AUTHORITY_RATIO;

    signals.reasons = build_reasons(&signals, enriched);
    signals
}

fn build_reasons(signals: &VideoRankingSignals, enriched: &EnrichedVideo) -> Vec<String> {
    let mut reasons = Vec::new();
    if signals.keyword_in_first_three_words {
        reasons.push("Keyword opens the title".to_string());
    } else if signals.keyword_in_title {
        reasons.push("Keyword appears in the title".to_string());
    }
    if signals.keyword_in_description {
        reasons.push("Keyword appears in the description".to_string());
    }
    if signals.tag_match_count > 0 {
        reasons.push(format!("{} matching tags", signals.tag_match_count));
    }
    if signals.transcript_mentions > 0 {
        reasons.push(format!(
            "Spoken {} times in the video",
            signals.transcript_mentions
        ));
    }
    if signals.engagement_rate >= 5.0 {
        reasons.push(format!(
            "High engagement rate ({:.1}%)",
            signals.engagement_rate
        ));
    }
    if signals.channel_authority_tier >= 3 {
        if let Some(channel) = &enriched.channel {
            reasons.push(format!(
                "Established channel ({} subscribers)",
                channel.subscriber_count
            ));
        }
    }
    if signals.comment_keyword_mentions > 0 {
        reasons.push(format!(
            "Viewers mention the keyword in {} comments",
            signals.comment_keyword_mentions
        ));
    }
    if signals.is_keyword_authority {
        reasons.push(format!(
            "Channel specialises in this topic ({:.0}% of recent uploads)",
            signals.channel_keyword_ratio
        ));
    }
    reasons
}

/// Post-pass over the signal-annotated top results: does belonging to a
/// keyword-authority channel correlate with rank?
pub fn channel_keyword_authority_factor(videos: &[EnrichedVideo]) -> Option<RankingFactor> {
    if videos.is_empty() {
        return None;
    }

    let mut authority_ranks = Vec::new();
    let mut other_ranks = Vec::new();
    let mut ratios = Vec::new();
    for (index, enriched) in videos.iter().enumerate() {
        let signals = enriched.ranking_signals.as_ref()?;
        ratios.push(signals.channel_keyword_ratio);
        if signals.is_keyword_authority {
            authority_ranks.push((index + 1) as f64);
        } else {
            other_ranks.push((index + 1) as f64);
        }
    }

    let rank_part = if !authority_ranks.is_empty() && !other_ranks.is_empty() {
        let mean = |ranks: &[f64]| ranks.iter().sum::<f64>() / ranks.len() as f64;
        (mean(&other_ranks) - mean(&authority_ranks)) / videos.len() as f64
    } else {
        0.0
    };

    let overall_mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
    let top_three = &ratios[..ratios.len().min(3)];
    let top_mean = top_three.iter().sum::<f64>() / top_three.len() as f64;
    let ratio_part = (top_mean - overall_mean) / overall_mean.max(1.0) * 0.5;

    Some(RankingFactor {
        factor: "Channel keyword authority".to_string(),
        correlation: round2((rank_part + ratio_part).clamp(-1.0, 1.0)),
        videos_with_factor: authority_ranks.len() as u32,
    })
}

/// Fold the authority factor into the primary list, re-rank, and trim.
pub fn merge_authority_factor(insights: &mut RankingInsights, factor: RankingFactor) {
    insights.top_factors.push(factor);
    insights.top_factors.sort_by(|a, b| {
        b.correlation
            .abs()
            .partial_cmp(&a.correlation.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.factor.cmp(&b.factor))
    });
    insights.top_factors.truncate(TOP_FACTORS_WITH_AUTHORITY);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubesignal_common::{Channel, Transcript};

    fn enriched(id: &str, title: &str, views: u64, likes: u64, subscribers: u64) -> EnrichedVideo {
        EnrichedVideo {
            channel: Some(Channel {
                id: format!("ch-{id}"),
                title: format!("Channel {id}"),
                subscriber_count: subscribers,
                ..Channel::default()
            }),
            ..EnrichedVideo::bare(Video {
                id: id.to_string(),
                title: title.to_string(),
                view_count: views,
                like_count: likes,
                duration: Some("PT10M".to_string()),
                ..Video::default()
            })
        }
    }

    #[test]
    fn position_bias_rewards_top_clustering() {
        // Subset at ranks 1,2 of 10: mean 1.5 vs expected 5.5 → +0.73
        assert_eq!(position_bias(&[1, 2], 10), 0.73);
        // Subset at the bottom mirrors negative.
        assert_eq!(position_bias(&[9, 10], 10), -0.73);
        // Evenly spread is neutral.
        assert_eq!(position_bias(&[1, 10], 10), 0.0);
        assert_eq!(position_bias(&[], 10), 0.0);
    }

    #[test]
    fn title_factor_surfaces_for_top_heavy_subsets() {
        let videos = vec![
            enriched("a", "sourdough guide", 1000, 100, 1_000),
            enriched("b", "sourdough tips", 1000, 10, 1_000),
            enriched("c", "croissant basics", 1000, 5, 1_000),
            enriched("d", "bagel shaping", 1000, 2, 1_000),
        ];
        let inputs = RankingInputs {
            keyword: "sourdough",
            videos: &videos,
            youtube_suggestions: &[],
            google_suggestions: &[],
            extracted: &[],
        };
        let insights = analyse_ranking_factors(&inputs);
        let title = insights
            .top_factors
            .iter()
            .find(|f| f.factor == "Keyword in title")
            .expect("title factor present");
        // Ranks 1,2 of 4: ((5/2) − 1.5) / (5/2) = 0.4
        assert_eq!(title.correlation, 0.4);
        assert_eq!(title.videos_with_factor, 2);

        let engagement = insights
            .top_factors
            .iter()
            .find(|f| f.factor == "High engagement")
            .expect("engagement factor present");
        assert_eq!(engagement.correlation, 0.5);
    }

    #[test]
    fn authority_summary_flags_established_markets() {
        let videos: Vec<EnrichedVideo> = (0..5)
            .map(|i| enriched(&i.to_string(), "t", 100, 1, 400_000))
            .collect();
        let summary = summarise_channel_authority(&videos);
        assert!(summary.needs_established_channel);
        assert_eq!(summary.avg_subscribers, 400_000.0);
        assert_eq!(summary.estimated_min_subscribers, 40_000);
    }

    #[test]
    fn variation_difficulty_rewards_longer_suggestions() {
        let suggestions = vec![
            "rust tutorial".to_string(),
            "rust tutorial for beginners 2026".to_string(),
            "advanced".to_string(),
        ];
        let variations = derive_long_tail_variations("rust", suggestions.iter(), &[], false);
        // "rust tutorial": bonus 2·9=18 → 40−18=22
        // the long form: bonus capped at 30 → 10
        assert_eq!(variations[0].keyword, "rust tutorial for beginners 2026");
        assert_eq!(variations[0].difficulty, 10);
        assert_eq!(variations[1].keyword, "rust tutorial");
        assert_eq!(variations[1].difficulty, 22);
    }

    #[test]
    fn established_markets_raise_the_difficulty_base() {
        let suggestions = vec!["rust tutorial".to_string()];
        let variations = derive_long_tail_variations("rust", suggestions.iter(), &[], true);
        assert_eq!(variations[0].difficulty, 52);
    }

    #[test]
    fn sparse_candidates_fill_with_seed_combinations() {
        let extracted = vec![
            ExtractedKeyword {
                keyword: "async".to_string(),
                tfidf: 9.0,
                count: 10,
                video_count: 1,
            },
            ExtractedKeyword {
                keyword: "tokio".to_string(),
                tfidf: 7.0,
                count: 8,
                video_count: 1,
            },
        ];
        let variations = derive_long_tail_variations("rust", std::iter::empty(), &extracted, false);
        let keywords: Vec<&str> = variations.iter().map(|v| v.keyword.as_str()).collect();
        assert!(keywords.contains(&"rust async"));
        assert!(keywords.contains(&"rust tokio"));
        assert!(variations.iter().all(|v| v.difficulty == 25));
    }

    #[test]
    fn variations_are_capped_and_sorted_easiest_first() {
        let suggestions: Vec<String> = (0..15)
            .map(|i| format!("rust topic number {i:02}"))
            .collect();
        let variations = derive_long_tail_variations("rust", suggestions.iter(), &[], false);
        assert_eq!(variations.len(), MAX_VARIATIONS);
        for pair in variations.windows(2) {
            assert!(pair[0].difficulty <= pair[1].difficulty);
        }
    }

    #[test]
    fn video_signals_cover_the_vector() {
        let mut video = enriched("a", "Rust Ownership Explained", 10_000, 400, 250_000);
        video.video.description = "Deep dive into rust ownership".to_string();
        video.video.tags = vec!["rust".to_string(), "ownership".to_string()];
        video.transcript = Some(Transcript {
            text: "rust makes ownership simple, rust borrowing too".to_string(),
            language: "en".to_string(),
        });
        video.comments = vec![
            tubesignal_common::Comment {
                id: "c1".to_string(),
                video_id: "a".to_string(),
                author: "x".to_string(),
                text: "best rust video?".to_string(),
                like_count: 3,
                published_at: None,
                reply_count: 0,
                is_question: true,
            },
        ];

        let recent: Vec<Video> = (0..10)
            .map(|i| Video {
                id: format!("r{i}"),
                title: if i < 4 {
                    format!("rust clip {i}")
                } else {
                    format!("other clip {i}")
                },
                ..Video::default()
            })
            .collect();

        let signals = extract_video_signals("rust", &video, &recent);
        assert!(signals.keyword_in_title);
        assert!(signals.keyword_in_first_three_words);
        assert!(signals.keyword_in_description);
        assert_eq!(signals.tag_match_count, 1);
        assert_eq!(signals.transcript_mentions, 2);
        assert_eq!(signals.channel_authority_tier, 3);
        assert_eq!(signals.comment_keyword_mentions, 1);
        assert_eq!(signals.channel_videos_analysed, 10);
        assert_eq!(signals.channel_videos_with_keyword, 4);
        assert_eq!(signals.channel_keyword_ratio, 40.0);
        assert!(signals.is_keyword_authority);
        assert!(!signals.reasons.is_empty());
    }

    #[test]
    fn authority_post_pass_rewards_top_ranked_authorities() {
        let mut videos: Vec<EnrichedVideo> = (0..5)
            .map(|i| enriched(&i.to_string(), "t", 100, 1, 1_000))
            .collect();
        for (i, v) in videos.iter_mut().enumerate() {
            let mut signals = VideoRankingSignals::default();
            signals.is_keyword_authority = i < 2;
            signals.channel_keyword_ratio = if i < 2 { 60.0 } else { 5.0 };
            v.ranking_signals = Some(signals);
        }
        let factor = channel_keyword_authority_factor(&videos).expect("factor");
        // Authority mean rank 1.5 vs other 4.0 → rank part 0.5; ratio part
        // ((60+60+5)/3 − 27) / 27 × 0.5 ≈ 0.27 → 0.77
        assert!(factor.correlation > 0.5);
        assert_eq!(factor.videos_with_factor, 2);
    }

    #[test]
    fn merged_authority_factor_respects_the_cap() {
        let mut insights = RankingInsights {
            top_factors: (0..5)
                .map(|i| RankingFactor {
                    factor: format!("factor {i}"),
                    correlation: 0.9 - f64::from(i) * 0.1,
                    videos_with_factor: 1,
                })
                .collect(),
            channel_authority: ChannelAuthoritySummary {
                avg_subscribers: 0.0,
                needs_established_channel: false,
                estimated_min_subscribers: 0,
            },
            optimal_placement: OptimalPlacement {
                keyword_in_title_start: false,
                keyword_early_in_description: false,
                avg_tag_count: 0.0,
                transcript_mentions_per_minute: 0.0,
            },
            long_tail_variations: Vec::new(),
        };
        merge_authority_factor(
            &mut insights,
            RankingFactor {
                factor: "Channel keyword authority".to_string(),
                correlation: 0.75,
                videos_with_factor: 2,
            },
        );
        assert_eq!(insights.top_factors.len(), 6);
        assert_eq!(insights.top_factors[2].factor, "Channel keyword authority");
    }
}
