// Test mocks for the adapter boundary, one per trait, HashMap-backed with
// builder registration. Unregistered keys answer neutral values so sparse
// fixtures stay small; `failing()` constructors simulate hard outages.
//
// Also provides fixture constructors for the domain records the engine
// tests assemble repeatedly.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use tubesignal_common::{
    Channel, Comment, ForumPost, KeywordMetrics, ThumbnailSet, Transcript, TrendData, Video,
    WebVideoResult,
};

use crate::adapters::{
    CaptionApi, ForumApi, PlannerApi, SearchPage, SourceAdapters, SuggestApi, TrendsApi, VideoApi,
    WebVideoApi,
};

// ---------------------------------------------------------------------------
// MockVideoApi
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockVideoApi {
    searches: HashMap<String, SearchPage>,
    videos: HashMap<String, Video>,
    channels: HashMap<String, Channel>,
    channel_videos: HashMap<String, Vec<Video>>,
    trending: HashMap<String, Vec<Video>>,
    comments: HashMap<String, Vec<Comment>>,
    fail_all: bool,
    pub search_calls: AtomicU32,
}

impl MockVideoApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every method fails, as if the platform is unreachable.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    pub fn on_search(mut self, query: &str, page: SearchPage) -> Self {
        self.searches.insert(query.to_string(), page);
        self
    }

    pub fn on_video(mut self, video: Video) -> Self {
        self.videos.insert(video.id.clone(), video);
        self
    }

    pub fn on_channel(mut self, channel: Channel) -> Self {
        self.channels.insert(channel.id.clone(), channel);
        self
    }

    pub fn on_channel_videos(mut self, channel_id: &str, videos: Vec<Video>) -> Self {
        self.channel_videos.insert(channel_id.to_string(), videos);
        self
    }

    pub fn on_trending(mut self, region: &str, videos: Vec<Video>) -> Self {
        self.trending.insert(region.to_string(), videos);
        self
    }

    pub fn on_comments(mut self, video_id: &str, comments: Vec<Comment>) -> Self {
        self.comments.insert(video_id.to_string(), comments);
        self
    }
}

#[async_trait]
impl VideoApi for MockVideoApi {
    async fn search(&self, query: &str, _max_results: u32) -> Result<SearchPage> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all {
            bail!("mock platform down");
        }
        Ok(self.searches.get(query).cloned().unwrap_or_default())
    }

    async fn video(&self, id: &str) -> Result<Option<Video>> {
        if self.fail_all {
            bail!("mock platform down");
        }
        Ok(self.videos.get(id).cloned())
    }

    async fn channel(&self, id: &str) -> Result<Option<Channel>> {
        if self.fail_all {
            bail!("mock platform down");
        }
        Ok(self.channels.get(id).cloned())
    }

    async fn channel_videos(&self, channel_id: &str, max_results: u32) -> Result<Vec<Video>> {
        if self.fail_all {
            bail!("mock platform down");
        }
        let mut videos = self
            .channel_videos
            .get(channel_id)
            .cloned()
            .unwrap_or_default();
        videos.truncate(max_results as usize);
        Ok(videos)
    }

    async fn trending(&self, region: &str, max_results: u32) -> Result<Vec<Video>> {
        if self.fail_all {
            bail!("mock platform down");
        }
        let mut videos = self.trending.get(region).cloned().unwrap_or_default();
        videos.truncate(max_results as usize);
        Ok(videos)
    }

    async fn comments(&self, video_id: &str, max_results: u32) -> Result<Vec<Comment>> {
        if self.fail_all {
            bail!("mock platform down");
        }
        let mut comments = self.comments.get(video_id).cloned().unwrap_or_default();
        comments.truncate(max_results as usize);
        Ok(comments)
    }
}

// ---------------------------------------------------------------------------
// Remaining adapter mocks
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockSuggestApi {
    suggestions: HashMap<String, Vec<String>>,
}

impl MockSuggestApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_keyword(mut self, keyword: &str, suggestions: &[&str]) -> Self {
        self.suggestions.insert(
            keyword.to_string(),
            suggestions.iter().map(|s| s.to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl SuggestApi for MockSuggestApi {
    async fn suggestions(&self, keyword: &str) -> Result<Vec<String>> {
        Ok(self.suggestions.get(keyword).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct MockTrendsApi {
    trends: HashMap<String, TrendData>,
}

impl MockTrendsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_keyword(mut self, keyword: &str, data: TrendData) -> Self {
        self.trends.insert(keyword.to_string(), data);
        self
    }
}

#[async_trait]
impl TrendsApi for MockTrendsApi {
    async fn interest(&self, keyword: &str, _region: &str) -> Result<Option<TrendData>> {
        Ok(self.trends.get(keyword).cloned())
    }
}

#[derive(Default)]
pub struct MockPlannerApi {
    metrics: HashMap<String, KeywordMetrics>,
    ideas: HashMap<String, Vec<KeywordMetrics>>,
    fail_all: bool,
}

impl MockPlannerApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the whole key ring reporting quota exhaustion.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    pub fn on_metrics(mut self, metrics: KeywordMetrics) -> Self {
        self.metrics.insert(metrics.keyword.to_lowercase(), metrics);
        self
    }

    pub fn on_ideas(mut self, keyword: &str, ideas: Vec<KeywordMetrics>) -> Self {
        self.ideas.insert(keyword.to_lowercase(), ideas);
        self
    }
}

#[async_trait]
impl PlannerApi for MockPlannerApi {
    async fn metrics(&self, keyword: &str) -> Result<Option<KeywordMetrics>> {
        if self.fail_all {
            bail!("all ad-network API keys exhausted");
        }
        Ok(self.metrics.get(&keyword.to_lowercase()).cloned())
    }

    async fn ideas(&self, keyword: &str, limit: u32) -> Result<Vec<KeywordMetrics>> {
        if self.fail_all {
            bail!("all ad-network API keys exhausted");
        }
        let mut ideas = self
            .ideas
            .get(&keyword.to_lowercase())
            .cloned()
            .unwrap_or_default();
        ideas.truncate(limit as usize);
        Ok(ideas)
    }
}

#[derive(Default)]
pub struct MockCaptionApi {
    transcripts: HashMap<String, Transcript>,
}

impl MockCaptionApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_video(mut self, video_id: &str, text: &str) -> Self {
        self.transcripts.insert(
            video_id.to_string(),
            Transcript {
                text: text.to_string(),
                language: "en".to_string(),
            },
        );
        self
    }
}

#[async_trait]
impl CaptionApi for MockCaptionApi {
    async fn transcript(&self, video_id: &str) -> Result<Option<Transcript>> {
        Ok(self.transcripts.get(video_id).cloned())
    }
}

#[derive(Default)]
pub struct MockForumApi {
    posts: HashMap<String, Vec<ForumPost>>,
}

impl MockForumApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_query(mut self, query: &str, posts: Vec<ForumPost>) -> Self {
        self.posts.insert(query.to_string(), posts);
        self
    }
}

#[async_trait]
impl ForumApi for MockForumApi {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<ForumPost>> {
        let mut posts = self.posts.get(query).cloned().unwrap_or_default();
        posts.truncate(limit as usize);
        Ok(posts)
    }
}

#[derive(Default)]
pub struct MockWebVideoApi {
    results: HashMap<String, Vec<WebVideoResult>>,
}

impl MockWebVideoApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_query(mut self, query: &str, results: Vec<WebVideoResult>) -> Self {
        self.results.insert(query.to_string(), results);
        self
    }
}

#[async_trait]
impl WebVideoApi for MockWebVideoApi {
    async fn search(&self, query: &str) -> Result<Vec<WebVideoResult>> {
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Adapter-set assembly and fixtures
// ---------------------------------------------------------------------------

/// An adapter set where every source answers neutral values.
pub fn empty_adapters() -> SourceAdapters {
    adapters_with(MockVideoApi::new())
}

/// An adapter set around a prepared video mock, everything else neutral.
pub fn adapters_with(video: MockVideoApi) -> SourceAdapters {
    SourceAdapters {
        video: Arc::new(video),
        youtube_suggest: Arc::new(MockSuggestApi::new()),
        google_suggest: Arc::new(MockSuggestApi::new()),
        trends: Arc::new(MockTrendsApi::new()),
        planner: Arc::new(MockPlannerApi::new()),
        captions: Arc::new(MockCaptionApi::new()),
        forum: Arc::new(MockForumApi::new()),
        web_video: Arc::new(MockWebVideoApi::new()),
    }
}

/// Minimal video fixture.
pub fn video(id: &str, title: &str) -> Video {
    Video {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        published_at: Some(Utc::now() - Duration::days(30)),
        channel_id: format!("ch-{id}"),
        channel_title: format!("Channel {id}"),
        tags: Vec::new(),
        category_id: None,
        view_count: 0,
        like_count: 0,
        comment_count: 0,
        duration: Some("PT10M".to_string()),
        definition: Some("hd".to_string()),
        thumbnails: ThumbnailSet::default(),
    }
}

/// Video fixture with the stats the miners read.
pub fn video_with_stats(
    id: &str,
    title: &str,
    views: u64,
    likes: u64,
    published_at: DateTime<Utc>,
) -> Video {
    Video {
        view_count: views,
        like_count: likes,
        comment_count: views / 100,
        published_at: Some(published_at),
        ..video(id, title)
    }
}

pub fn channel(id: &str, title: &str, subscribers: u64) -> Channel {
    Channel {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        custom_url: None,
        subscriber_count: subscribers,
        video_count: 100,
        view_count: subscribers * 50,
        keywords: Vec::new(),
        thumbnails: ThumbnailSet::default(),
    }
}

pub fn comment(video_id: &str, n: u32, text: &str) -> Comment {
    Comment {
        id: format!("{video_id}-c{n}"),
        video_id: video_id.to_string(),
        author: format!("viewer{n}"),
        text: text.to_string(),
        like_count: u64::from(n),
        published_at: Some(Utc::now() - Duration::days(1)),
        reply_count: 0,
        is_question: Comment::derive_is_question(text),
    }
}

pub fn metrics(keyword: &str, monthly: u64, competition: tubesignal_common::CompetitionLevel, index: u8) -> KeywordMetrics {
    KeywordMetrics {
        keyword: keyword.to_string(),
        monthly_searches: monthly,
        competition,
        competition_index: index,
        low_top_of_page_bid_micros: 150_000,
        high_top_of_page_bid_micros: 1_200_000,
    }
}
