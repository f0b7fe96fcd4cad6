// GraphQL object types mapped from the domain records. The schema owns its
// own shapes so the engine's types stay transport-free.

use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};

use tubesignal_common as domain;
use tubesignal_sources::SearchPage;

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl From<domain::Grade> for Grade {
    fn from(grade: domain::Grade) -> Self {
        match grade {
            domain::Grade::A => Grade::A,
            domain::Grade::B => Grade::B,
            domain::Grade::C => Grade::C,
            domain::Grade::D => Grade::D,
            domain::Grade::F => Grade::F,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
pub enum SuggestProvider {
    Youtube,
    Google,
}

impl From<SuggestProvider> for tubesignal_sources::SuggestProvider {
    fn from(provider: SuggestProvider) -> Self {
        match provider {
            SuggestProvider::Youtube => tubesignal_sources::SuggestProvider::YouTube,
            SuggestProvider::Google => tubesignal_sources::SuggestProvider::Google,
        }
    }
}

#[derive(SimpleObject)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: String,
    pub published_at: Option<DateTime<Utc>>,
    pub channel_id: String,
    pub channel_title: String,
    pub tags: Vec<String>,
    pub category_id: Option<String>,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub duration: Option<String>,
    pub definition: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl From<domain::Video> for Video {
    fn from(v: domain::Video) -> Self {
        Self {
            thumbnail_url: v.thumbnails.best().map(String::from),
            id: v.id,
            title: v.title,
            description: v.description,
            published_at: v.published_at,
            channel_id: v.channel_id,
            channel_title: v.channel_title,
            tags: v.tags,
            category_id: v.category_id,
            view_count: v.view_count,
            like_count: v.like_count,
            comment_count: v.comment_count,
            duration: v.duration,
            definition: v.definition,
        }
    }
}

#[derive(SimpleObject)]
pub struct SearchResults {
    pub videos: Vec<Video>,
    pub total_results: u64,
}

impl From<SearchPage> for SearchResults {
    fn from(page: SearchPage) -> Self {
        Self {
            videos: page.videos.into_iter().map(Video::from).collect(),
            total_results: page.total_results,
        }
    }
}

#[derive(SimpleObject)]
pub struct Channel {
    pub id: String,
    pub title: String,
    pub description: String,
    pub custom_url: Option<String>,
    pub subscriber_count: u64,
    pub video_count: u64,
    pub view_count: u64,
    pub keywords: Vec<String>,
    pub thumbnail_url: Option<String>,
}

impl From<domain::Channel> for Channel {
    fn from(c: domain::Channel) -> Self {
        Self {
            thumbnail_url: c.thumbnails.best().map(String::from),
            id: c.id,
            title: c.title,
            description: c.description,
            custom_url: c.custom_url,
            subscriber_count: c.subscriber_count,
            video_count: c.video_count,
            view_count: c.view_count,
            keywords: c.keywords,
        }
    }
}

#[derive(SimpleObject)]
pub struct Comment {
    pub id: String,
    pub video_id: String,
    pub author: String,
    pub text: String,
    pub like_count: u64,
    pub published_at: Option<DateTime<Utc>>,
    pub reply_count: u64,
    pub is_question: bool,
}

impl From<domain::Comment> for Comment {
    fn from(c: domain::Comment) -> Self {
        Self {
            id: c.id,
            video_id: c.video_id,
            author: c.author,
            text: c.text,
            like_count: c.like_count,
            published_at: c.published_at,
            reply_count: c.reply_count,
            is_question: c.is_question,
        }
    }
}

#[derive(SimpleObject)]
pub struct Transcript {
    pub text: String,
    pub language: String,
}

impl From<domain::Transcript> for Transcript {
    fn from(t: domain::Transcript) -> Self {
        Self {
            text: t.text,
            language: t.language,
        }
    }
}

#[derive(SimpleObject)]
pub struct VideoRankingSignals {
    pub keyword_in_title: bool,
    pub keyword_in_first_three_words: bool,
    pub keyword_in_description: bool,
    pub tag_match_count: u64,
    pub transcript_mentions: u64,
    pub engagement_rate: f64,
    pub channel_authority_tier: u64,
    pub keyword_in_channel_name: bool,
    pub keyword_in_channel_description: bool,
    pub channel_keyword_match_count: u64,
    pub is_niche_channel: bool,
    pub comment_keyword_mentions: u64,
    pub channel_videos_analysed: u64,
    pub channel_videos_with_keyword: u64,
    pub channel_keyword_ratio: f64,
    pub is_keyword_authority: bool,
    pub reasons: Vec<String>,
}

impl From<domain::VideoRankingSignals> for VideoRankingSignals {
    fn from(s: domain::VideoRankingSignals) -> Self {
        Self {
            keyword_in_title: s.keyword_in_title,
            keyword_in_first_three_words: s.keyword_in_first_three_words,
            keyword_in_description: s.keyword_in_description,
            tag_match_count: s.tag_match_count.into(),
            transcript_mentions: s.transcript_mentions.into(),
            engagement_rate: s.engagement_rate,
            channel_authority_tier: s.channel_authority_tier.into(),
            keyword_in_channel_name: s.keyword_in_channel_name,
            keyword_in_channel_description: s.keyword_in_channel_description,
            channel_keyword_match_count: s.channel_keyword_match_count.into(),
            is_niche_channel: s.is_niche_channel,
            comment_keyword_mentions: s.comment_keyword_mentions.into(),
            channel_videos_analysed: s.channel_videos_analysed.into(),
            channel_videos_with_keyword: s.channel_videos_with_keyword.into(),
            channel_keyword_ratio: s.channel_keyword_ratio,
            is_keyword_authority: s.is_keyword_authority,
            reasons: s.reasons,
        }
    }
}

#[derive(SimpleObject)]
pub struct EnrichedVideo {
    pub video: Video,
    pub transcript: Option<Transcript>,
    pub comments: Vec<Comment>,
    pub channel: Option<Channel>,
    pub ranking_signals: Option<VideoRankingSignals>,
}

impl From<domain::EnrichedVideo> for EnrichedVideo {
    fn from(e: domain::EnrichedVideo) -> Self {
        Self {
            video: e.video.into(),
            transcript: e.transcript.map(Into::into),
            comments: e.comments.into_iter().map(Into::into).collect(),
            channel: e.channel.map(Into::into),
            ranking_signals: e.ranking_signals.map(Into::into),
        }
    }
}

#[derive(SimpleObject)]
pub struct KeywordMetrics {
    pub keyword: String,
    pub monthly_searches: u64,
    pub competition: String,
    pub competition_index: u64,
    pub low_top_of_page_bid_micros: u64,
    pub high_top_of_page_bid_micros: u64,
}

impl From<domain::KeywordMetrics> for KeywordMetrics {
    fn from(m: domain::KeywordMetrics) -> Self {
        Self {
            keyword: m.keyword,
            monthly_searches: m.monthly_searches,
            competition: m.competition.to_string(),
            competition_index: m.competition_index.into(),
            low_top_of_page_bid_micros: m.low_top_of_page_bid_micros,
            high_top_of_page_bid_micros: m.high_top_of_page_bid_micros,
        }
    }
}

#[derive(SimpleObject)]
pub struct TrendData {
    pub keyword: String,
    pub interest_score: u64,
    pub direction: String,
    pub related_queries: Vec<String>,
    pub rising_queries: Vec<String>,
}

impl From<domain::TrendData> for TrendData {
    fn from(t: domain::TrendData) -> Self {
        Self {
            keyword: t.keyword,
            interest_score: t.interest_score.into(),
            direction: format!("{:?}", t.direction).to_lowercase(),
            related_queries: t.related_queries,
            rising_queries: t.rising_queries,
        }
    }
}

#[derive(SimpleObject)]
pub struct ResearchResult {
    pub keyword: String,
    pub produced_at: DateTime<Utc>,
    pub videos: Vec<EnrichedVideo>,
    pub youtube_suggestions: Vec<String>,
    pub google_suggestions: Vec<String>,
    pub metrics: Option<KeywordMetrics>,
    pub total_results: u64,
}

impl From<domain::ResearchResult> for ResearchResult {
    fn from(r: domain::ResearchResult) -> Self {
        Self {
            keyword: r.keyword,
            produced_at: r.produced_at,
            videos: r.videos.into_iter().map(Into::into).collect(),
            youtube_suggestions: r.youtube_suggestions,
            google_suggestions: r.google_suggestions,
            metrics: r.metrics.map(Into::into),
            total_results: r.total_results,
        }
    }
}

#[derive(SimpleObject)]
pub struct SearchDemand {
    pub monthly_searches: u64,
    pub trend_type: String,
    pub momentum: i64,
    pub seasonal_peak_month: Option<String>,
}

impl From<domain::SearchDemand> for SearchDemand {
    fn from(d: domain::SearchDemand) -> Self {
        Self {
            monthly_searches: d.monthly_searches,
            trend_type: d.trend_type.to_string(),
            momentum: d.momentum.into(),
            seasonal_peak_month: d.seasonal_peak_month,
        }
    }
}

#[derive(SimpleObject)]
pub struct ContentSupply {
    pub video_count: u64,
    pub avg_views: f64,
    pub avg_subscribers: f64,
    pub uploads_today: u64,
    pub uploads_last_3_days: u64,
    pub uploads_last_week: u64,
    pub uploads_last_month: u64,
    pub uploads_last_year: u64,
    pub content_gap_score: f64,
    pub activity: String,
    pub competition: String,
    pub dormant_niche: bool,
}

impl From<domain::ContentSupply> for ContentSupply {
    fn from(s: domain::ContentSupply) -> Self {
        Self {
            video_count: s.video_count,
            avg_views: s.avg_views,
            avg_subscribers: s.avg_subscribers,
            uploads_today: s.uploads_today.into(),
            uploads_last_3_days: s.uploads_last_3_days.into(),
            uploads_last_week: s.uploads_last_week.into(),
            uploads_last_month: s.uploads_last_month.into(),
            uploads_last_year: s.uploads_last_year.into(),
            content_gap_score: s.content_gap_score,
            activity: format!("{:?}", s.activity).to_lowercase(),
            competition: format!("{:?}", s.competition).to_lowercase(),
            dormant_niche: s.dormant_niche,
        }
    }
}

#[derive(SimpleObject)]
pub struct RankingFactor {
    pub factor: String,
    pub correlation: f64,
    pub videos_with_factor: u64,
}

impl From<domain::RankingFactor> for RankingFactor {
    fn from(f: domain::RankingFactor) -> Self {
        Self {
            factor: f.factor,
            correlation: f.correlation,
            videos_with_factor: f.videos_with_factor.into(),
        }
    }
}

#[derive(SimpleObject)]
pub struct ChannelAuthority {
    pub avg_subscribers: f64,
    pub needs_established_channel: bool,
    pub estimated_min_subscribers: u64,
}

#[derive(SimpleObject)]
pub struct OptimalPlacement {
    pub keyword_in_title_start: bool,
    pub keyword_early_in_description: bool,
    pub avg_tag_count: f64,
    pub transcript_mentions_per_minute: f64,
}

#[derive(SimpleObject)]
pub struct LongTailVariation {
    pub keyword: String,
    pub difficulty: u64,
}

#[derive(SimpleObject)]
pub struct RankingInsights {
    pub top_factors: Vec<RankingFactor>,
    pub channel_authority: ChannelAuthority,
    pub optimal_placement: OptimalPlacement,
    pub long_tail_variations: Vec<LongTailVariation>,
}

impl From<domain::RankingInsights> for RankingInsights {
    fn from(r: domain::RankingInsights) -> Self {
        Self {
            top_factors: r.top_factors.into_iter().map(Into::into).collect(),
            channel_authority: ChannelAuthority {
                avg_subscribers: r.channel_authority.avg_subscribers,
                needs_established_channel: r.channel_authority.needs_established_channel,
                estimated_min_subscribers: r.channel_authority.estimated_min_subscribers,
            },
            optimal_placement: OptimalPlacement {
                keyword_in_title_start: r.optimal_placement.keyword_in_title_start,
                keyword_early_in_description: r.optimal_placement.keyword_early_in_description,
                avg_tag_count: r.optimal_placement.avg_tag_count,
                transcript_mentions_per_minute: r
                    .optimal_placement
                    .transcript_mentions_per_minute,
            },
            long_tail_variations: r
                .long_tail_variations
                .into_iter()
                .map(|v| LongTailVariation {
                    keyword: v.keyword,
                    difficulty: v.difficulty.into(),
                })
                .collect(),
        }
    }
}

#[derive(SimpleObject)]
pub struct Scores {
    pub opportunity: u64,
    pub difficulty: u64,
    pub grade: Grade,
}

impl From<domain::Scores> for Scores {
    fn from(s: domain::Scores) -> Self {
        Self {
            opportunity: s.opportunity.into(),
            difficulty: s.difficulty.into(),
            grade: s.grade.into(),
        }
    }
}

#[derive(SimpleObject)]
pub struct ExtractedKeyword {
    pub keyword: String,
    pub tfidf: f64,
    pub count: u64,
    pub video_count: u64,
}

impl From<domain::ExtractedKeyword> for ExtractedKeyword {
    fn from(k: domain::ExtractedKeyword) -> Self {
        Self {
            keyword: k.keyword,
            tfidf: k.tfidf,
            count: k.count.into(),
            video_count: k.video_count.into(),
        }
    }
}

#[derive(SimpleObject)]
pub struct TagOverlap {
    pub tag: String,
    pub video_count: u64,
    pub total_views: u64,
}

#[derive(SimpleObject)]
pub struct TopicCluster {
    pub phrase: String,
    pub related_terms: Vec<String>,
}

#[derive(SimpleObject)]
pub struct TargetVideo {
    pub video_id: String,
    pub title: String,
    pub view_count: u64,
    pub similarity: f64,
}

#[derive(SimpleObject)]
pub struct RecommendationOptimization {
    pub tag_overlaps: Vec<TagOverlap>,
    pub must_use_tags: Vec<String>,
    pub topic_clusters: Vec<TopicCluster>,
    pub target_videos: Vec<TargetVideo>,
    pub topic_match_score: u64,
    pub transcript_keywords: Vec<String>,
}

impl From<domain::RecommendationOptimization> for RecommendationOptimization {
    fn from(o: domain::RecommendationOptimization) -> Self {
        Self {
            tag_overlaps: o
                .tag_overlaps
                .into_iter()
                .map(|t| TagOverlap {
                    tag: t.tag,
                    video_count: t.video_count.into(),
                    total_views: t.total_views,
                })
                .collect(),
            must_use_tags: o.must_use_tags,
            topic_clusters: o
                .topic_clusters
                .into_iter()
                .map(|c| TopicCluster {
                    phrase: c.phrase,
                    related_terms: c.related_terms,
                })
                .collect(),
            target_videos: o
                .target_videos
                .into_iter()
                .map(|t| TargetVideo {
                    video_id: t.video_id,
                    title: t.title,
                    view_count: t.view_count,
                    similarity: t.similarity,
                })
                .collect(),
            topic_match_score: o.topic_match_score.into(),
            transcript_keywords: o.transcript_keywords,
        }
    }
}

#[derive(SimpleObject)]
pub struct AnalysisResult {
    pub keyword: String,
    pub analysed_at: DateTime<Utc>,
    pub demand: SearchDemand,
    pub supply: ContentSupply,
    pub ranking: RankingInsights,
    pub scores: Scores,
    pub recommendations: Vec<String>,
    pub top_keywords: Vec<ExtractedKeyword>,
    pub optimization: RecommendationOptimization,
    pub top_videos: Vec<EnrichedVideo>,
}

impl From<domain::AnalysisResult> for AnalysisResult {
    fn from(a: domain::AnalysisResult) -> Self {
        Self {
            keyword: a.keyword,
            analysed_at: a.analysed_at,
            demand: a.demand.into(),
            supply: a.supply.into(),
            ranking: a.ranking.into(),
            scores: a.scores.into(),
            recommendations: a.recommendations,
            top_keywords: a.top_keywords.into_iter().map(Into::into).collect(),
            optimization: a.optimization.into(),
            top_videos: a.top_videos.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(SimpleObject)]
pub struct LongTailResult {
    pub keyword: String,
    pub source: String,
    pub opportunity: u64,
    pub difficulty: u64,
    pub grade: Grade,
    pub monthly_searches: u64,
    pub competition: String,
    pub video_count: u64,
    pub avg_competitor_views: f64,
    pub analysed_at: DateTime<Utc>,
}

impl From<domain::LongTailResult> for LongTailResult {
    fn from(r: domain::LongTailResult) -> Self {
        Self {
            keyword: r.keyword,
            source: r.source.to_string(),
            opportunity: r.opportunity.into(),
            difficulty: r.difficulty.into(),
            grade: r.grade.into(),
            monthly_searches: r.monthly_searches,
            competition: r.competition.to_string(),
            video_count: r.video_count,
            avg_competitor_views: r.avg_competitor_views,
            analysed_at: r.analysed_at,
        }
    }
}

#[derive(SimpleObject)]
pub struct LongTailUpdate {
    pub parent_keyword: String,
    pub result: Option<LongTailResult>,
    pub is_complete: bool,
    pub analysed_count: u64,
    pub total_count: u64,
    pub all_results_so_far: Vec<LongTailResult>,
}

impl From<domain::LongTailUpdate> for LongTailUpdate {
    fn from(u: domain::LongTailUpdate) -> Self {
        Self {
            parent_keyword: u.parent_keyword,
            result: u.result.map(Into::into),
            is_complete: u.is_complete,
            analysed_count: u.analysed_count.into(),
            total_count: u.total_count.into(),
            all_results_so_far: u.results_so_far.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(SimpleObject)]
pub struct TrendingKeyword {
    pub keyword: String,
    pub grade: Grade,
    pub opportunity: u64,
    pub difficulty: u64,
    pub monthly_searches: u64,
    pub trending_video_count: u64,
    pub top_video_title: Option<String>,
    pub top_video_thumbnail: Option<String>,
}

impl From<domain::TrendingKeywordSummary> for TrendingKeyword {
    fn from(k: domain::TrendingKeywordSummary) -> Self {
        Self {
            keyword: k.keyword,
            grade: k.grade.into(),
            opportunity: k.opportunity.into(),
            difficulty: k.difficulty.into(),
            monthly_searches: k.monthly_searches,
            trending_video_count: k.trending_video_count.into(),
            top_video_title: k.top_video_title,
            top_video_thumbnail: k.top_video_thumbnail,
        }
    }
}

#[derive(SimpleObject)]
pub struct TrendingVideo {
    pub id: String,
    pub title: String,
    pub channel_title: String,
    pub view_count: u64,
    pub thumbnail_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<domain::TrendingVideo> for TrendingVideo {
    fn from(v: domain::TrendingVideo) -> Self {
        Self {
            id: v.id,
            title: v.title,
            channel_title: v.channel_title,
            view_count: v.view_count,
            thumbnail_url: v.thumbnail_url,
            published_at: v.published_at,
        }
    }
}

#[derive(SimpleObject)]
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

impl From<domain::ForumPost> for ForumPost {
    fn from(p: domain::ForumPost) -> Self {
        Self {
            id: p.id,
            title: p.title,
            text: p.text,
            subreddit: p.subreddit,
            score: p.score,
            num_comments: p.num_comments,
            permalink: p.permalink,
            created_at: p.created_at,
        }
    }
}

#[derive(SimpleObject)]
pub struct WebVideoResult {
    pub title: String,
    pub url: String,
    pub source: String,
    pub snippet: Option<String>,
    pub duration: Option<String>,
}

impl From<domain::WebVideoResult> for WebVideoResult {
    fn from(r: domain::WebVideoResult) -> Self {
        Self {
            title: r.title,
            url: r.url,
            source: r.source,
            snippet: r.snippet,
            duration: r.duration,
        }
    }
}

/// Acknowledgment for fire-and-forget long-tail starts.
#[derive(SimpleObject)]
pub struct LongTailStartAck {
    pub topic: String,
    pub started: bool,
}
