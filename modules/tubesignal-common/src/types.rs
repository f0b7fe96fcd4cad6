use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Platform entities ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailSet {
    pub default_url: Option<String>,
    pub medium_url: Option<String>,
    pub high_url: Option<String>,
}

impl ThumbnailSet {
    /// Best available thumbnail, largest first.
    pub fn best(&self) -> Option<&str> {
        self.high_url
            .as_deref()
            .or(self.medium_url.as_deref())
            .or(self.default_url.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: String,
    pub published_at: Option<DateTime<Utc>>,
    pub channel_id: String,
    pub channel_title: String,
    /// Ordered as received from the platform.
    pub tags: Vec<String>,
    pub category_id: Option<String>,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    /// ISO-8601 duration, e.g. "PT4M13S".
    pub duration: Option<String>,
    pub definition: Option<String>,
    pub thumbnails: ThumbnailSet,
}

impl Video {
    /// Duration in seconds, parsed from the ISO-8601 form the platform uses.
    pub fn duration_seconds(&self) -> Option<u64> {
        parse_iso8601_duration(self.duration.as_deref()?)
    }
}

/// Parse durations of the shape `PT#H#M#S` (any component optional).
pub fn parse_iso8601_duration(raw: &str) -> Option<u64> {
    let rest = raw.strip_prefix("PT").or_else(|| raw.strip_prefix("P"))?;
    let mut seconds: u64 = 0;
    let mut number = String::new();
    for ch in rest.chars() {
        if ch.is_ascii_digit() {
            number.push(ch);
            continue;
        }
        let value: u64 = number.parse().ok()?;
        number.clear();
        match ch {
            'H' => seconds += value * 3600,
            'M' => seconds += value * 60,
            'S' => seconds += value,
            _ => return None,
        }
    }
    Some(seconds)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub title: String,
    pub description: String,
    pub custom_url: Option<String>,
    pub subscriber_count: u64,
    pub video_count: u64,
    pub view_count: u64,
    /// Declared channel keywords, already parsed from the platform's
    /// quoted space/comma-separated string.
    pub keywords: Vec<String>,
    pub thumbnails: ThumbnailSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub video_id: String,
    pub author: String,
    pub text: String,
    pub like_count: u64,
    pub published_at: Option<DateTime<Utc>>,
    pub reply_count: u64,
    /// Derived at construction: the text contains a '?'.
    pub is_question: bool,
}

impl Comment {
    pub fn derive_is_question(text: &str) -> bool {
        text.contains('?')
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedVideo {
    pub video: Video,
    pub transcript: Option<Transcript>,
    pub comments: Vec<Comment>,
    pub channel: Option<Channel>,
    pub ranking_signals: Option<VideoRankingSignals>,
}

impl EnrichedVideo {
    pub fn bare(video: Video) -> Self {
        Self {
            video,
            transcript: None,
            comments: Vec::new(),
            channel: None,
            ranking_signals: None,
        }
    }
}

// --- Ad-network metrics ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionLevel {
    Low,
    Medium,
    High,
    #[default]
    Unknown,
}

impl std::fmt::Display for CompetitionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompetitionLevel::Low => write!(f, "low"),
            CompetitionLevel::Medium => write!(f, "medium"),
            CompetitionLevel::High => write!(f, "high"),
            CompetitionLevel::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordMetrics {
    pub keyword: String,
    pub monthly_searches: u64,
    pub competition: CompetitionLevel,
    /// 0–100.
    pub competition_index: u8,
    /// Top-of-page bids in minor currency units (micros).
    pub low_top_of_page_bid_micros: u64,
    pub high_top_of_page_bid_micros: u64,
}

// --- Trends ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendData {
    pub keyword: String,
    /// 0–100.
    pub interest_score: u8,
    pub direction: TrendDirection,
    /// Up to 10 of each.
    pub related_queries: Vec<String>,
    pub rising_queries: Vec<String>,
}

// --- Research ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchResult {
    pub keyword: String,
    pub produced_at: DateTime<Utc>,
    /// Top-N search results, enriched; ordered by search rank.
    pub videos: Vec<EnrichedVideo>,
    pub youtube_suggestions: Vec<String>,
    pub google_suggestions: Vec<String>,
    pub metrics: Option<KeywordMetrics>,
    pub total_results: u64,
}

/// One partial research yield, emitted per source in completion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResearchPartial {
    Search { videos: Vec<Video>, total_results: u64 },
    YoutubeSuggestions(Vec<String>),
    GoogleSuggestions(Vec<String>),
}

// --- Demand classification ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendType {
    Seasonal,
    Trending,
    Consistent,
    Declining,
}

impl std::fmt::Display for TrendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendType::Seasonal => write!(f, "seasonal"),
            TrendType::Trending => write!(f, "trending"),
            TrendType::Consistent => write!(f, "consistent"),
            TrendType::Declining => write!(f, "declining"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDemand {
    pub monthly_searches: u64,
    pub trend_type: TrendType,
    /// −100..=100.
    pub momentum: i32,
    /// Month name, e.g. "December", when the keyword is seasonal.
    pub seasonal_peak_month: Option<String>,
}

// --- Content supply / gap ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Hot,
    Active,
    Moderate,
    Slow,
    Dormant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionTier {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSupply {
    pub video_count: u64,
    pub avg_views: f64,
    pub avg_subscribers: f64,
    pub uploads_today: u32,
    pub uploads_last_3_days: u32,
    pub uploads_last_week: u32,
    pub uploads_last_month: u32,
    pub uploads_last_year: u32,
    /// 0.0..=2.0, rounded to two decimals.
    pub content_gap_score: f64,
    pub activity: ActivityLevel,
    pub competition: CompetitionTier,
    pub dormant_niche: bool,
}

// --- Ranking insights ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingFactor {
    pub factor: String,
    /// Position bias in [−1, +1], two decimals.
    pub correlation: f64,
    /// How many of the analysed videos exhibit the factor.
    pub videos_with_factor: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAuthoritySummary {
    pub avg_subscribers: f64,
    pub needs_established_channel: bool,
    pub estimated_min_subscribers: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalPlacement {
    /// Majority of top results carry the keyword in the first three title words.
    pub keyword_in_title_start: bool,
    /// Majority carry it within the first 100 description characters.
    pub keyword_early_in_description: bool,
    pub avg_tag_count: f64,
    pub transcript_mentions_per_minute: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTailVariation {
    pub keyword: String,
    /// 0–100 estimated difficulty; lower is easier.
    pub difficulty: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingInsights {
    /// Strongest factors by |correlation|; at most 6 once the
    /// channel-keyword-authority pass has run.
    pub top_factors: Vec<RankingFactor>,
    pub channel_authority: ChannelAuthoritySummary,
    pub optimal_placement: OptimalPlacement,
    /// At most 10, ordered by ascending difficulty.
    pub long_tail_variations: Vec<LongTailVariation>,
}

/// Per-video ranking-signal vector for one (keyword, video) pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoRankingSignals {
    pub keyword_in_title: bool,
    pub keyword_in_first_three_words: bool,
    pub keyword_in_description: bool,
    pub tag_match_count: u32,
    pub transcript_mentions: u32,
    /// (likes + comments) / views, in percent.
    pub engagement_rate: f64,
    /// 1–5 by subscriber bucket.
    pub channel_authority_tier: u8,
    pub keyword_in_channel_name: bool,
    pub keyword_in_channel_description: bool,
    pub channel_keyword_match_count: u32,
    pub is_niche_channel: bool,
    pub comment_keyword_mentions: u32,
    pub channel_videos_analysed: u32,
    pub channel_videos_with_keyword: u32,
    /// Percentage of the channel's recent uploads that carry the keyword.
    pub channel_keyword_ratio: f64,
    /// ratio ≥ 30%.
    pub is_keyword_authority: bool,
    pub reasons: Vec<String>,
}

// --- Scores and grades ---

/// Declared worst-to-best so the derived ordering matches grade quality:
/// A > B > C > D > F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    F,
    D,
    C,
    B,
    A,
}

impl Grade {
    /// A long-tail candidate worth surfacing.
    pub fn is_good(self) -> bool {
        matches!(self, Grade::A | Grade::B | Grade::C)
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Grade::A => write!(f, "A"),
            Grade::B => write!(f, "B"),
            Grade::C => write!(f, "C"),
            Grade::D => write!(f, "D"),
            Grade::F => write!(f, "F"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    /// 0–100.
    pub opportunity: u8,
    /// 0–100.
    pub difficulty: u8,
    pub grade: Grade,
}

// --- Keyword extraction ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedKeyword {
    pub keyword: String,
    pub tfidf: f64,
    /// Total occurrences across all videos and sources.
    pub count: u32,
    /// Number of distinct videos the term appears in.
    pub video_count: u32,
}

// --- Recommendation optimisation ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagOverlap {
    pub tag: String,
    pub video_count: u32,
    pub total_views: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicCluster {
    pub phrase: String,
    pub related_terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetVideo {
    pub video_id: String,
    pub title: String,
    pub view_count: u64,
    /// Share of must-use tags the video carries, 0.0..=1.0.
    pub similarity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationOptimization {
    pub tag_overlaps: Vec<TagOverlap>,
    pub must_use_tags: Vec<String>,
    pub topic_clusters: Vec<TopicCluster>,
    pub target_videos: Vec<TargetVideo>,
    /// Percent of transcript-bearing videos whose transcript mentions the keyword.
    pub topic_match_score: u8,
    pub transcript_keywords: Vec<String>,
}

// --- Analysis result ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub keyword: String,
    pub analysed_at: DateTime<Utc>,
    pub demand: SearchDemand,
    pub supply: ContentSupply,
    pub ranking: RankingInsights,
    pub scores: Scores,
    pub recommendations: Vec<String>,
    /// Top extracted terms, at most 20.
    pub top_keywords: Vec<ExtractedKeyword>,
    pub optimization: RecommendationOptimization,
    /// Top five search results with ranking-signal annotations.
    pub top_videos: Vec<EnrichedVideo>,
}

// --- Long-tail results ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LongTailSource {
    YoutubeTrends,
    GoogleAds,
}

impl std::fmt::Display for LongTailSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LongTailSource::YoutubeTrends => write!(f, "YouTube Trends"),
            LongTailSource::GoogleAds => write!(f, "Google Ads"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTailResult {
    pub keyword: String,
    pub source: LongTailSource,
    pub opportunity: u8,
    pub difficulty: u8,
    pub grade: Grade,
    pub monthly_searches: u64,
    pub competition: CompetitionLevel,
    pub video_count: u64,
    pub avg_competitor_views: f64,
    pub analysed_at: DateTime<Utc>,
}

/// One incremental long-tail notification published on the parent keyword's
/// topic. `total_count` is fixed for the lifetime of one run;
/// `analysed_count` strictly increases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTailUpdate {
    pub parent_keyword: String,
    pub result: Option<LongTailResult>,
    pub is_complete: bool,
    pub analysed_count: u32,
    pub total_count: u32,
    pub results_so_far: Vec<LongTailResult>,
}

// --- Trending digest ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingKeywordSummary {
    pub keyword: String,
    pub grade: Grade,
    pub opportunity: u8,
    pub difficulty: u8,
    pub monthly_searches: u64,
    /// How many of the region's trending videos surfaced the keyword.
    pub trending_video_count: u32,
    pub top_video_title: Option<String>,
    pub top_video_thumbnail: Option<String>,
}

/// Compact projection of a trending video, small enough to persist per region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingVideo {
    pub id: String,
    pub title: String,
    pub channel_title: String,
    pub view_count: u64,
    pub thumbnail_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

// --- Durable slot states ---

/// Durable state of one keyword-analysis actor. New fields default so the
/// record evolves across deployments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordCacheState {
    pub analysis: Option<AnalysisResult>,
    pub analysis_cached_at: Option<DateTime<Utc>>,
    pub long_tails: Vec<LongTailResult>,
    pub long_tails_cached_at: Option<DateTime<Utc>>,
}

/// Durable state of one trending-analysis actor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendingCacheState {
    pub keywords: Vec<TrendingKeywordSummary>,
    pub videos: Vec<TrendingVideo>,
    pub last_warmup_at: Option<DateTime<Utc>>,
    pub region: String,
}

// --- Forum / web video pass-through records ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumPost {
    pub id: String,
    pub title: String,
    pub text: String,
    pub subreddit: String,
    pub score: i64,
    pub num_comments: u64,
    pub permalink: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebVideoResult {
    pub title: String,
    pub url: String,
    pub source: String,
    pub snippet: Option<String>,
    pub duration: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_ordering_is_total() {
        assert!(Grade::A > Grade::B);
        assert!(Grade::B > Grade::C);
        assert!(Grade::D > Grade::F);
        assert!(Grade::C.is_good());
        assert!(!Grade::D.is_good());
    }

    #[test]
    fn iso8601_durations_parse() {
        assert_eq!(parse_iso8601_duration("PT4M13S"), Some(253));
        assert_eq!(parse_iso8601_duration("PT1H2M3S"), Some(3723));
        assert_eq!(parse_iso8601_duration("PT45S"), Some(45));
        assert_eq!(parse_iso8601_duration("4m13s"), None);
    }

    #[test]
    fn comment_question_detection() {
        assert!(Comment::derive_is_question("how do you do this?"));
        assert!(!Comment::derive_is_question("great video"));
    }

    #[test]
    fn cache_state_defaults_for_new_fields() {
        // A slot written by an older deployment round-trips into the
        // current shape with zero values for anything it lacked.
        let state: KeywordCacheState = serde_json::from_str("{}").unwrap();
        assert!(state.analysis.is_none());
        assert!(state.long_tails.is_empty());
    }
}
