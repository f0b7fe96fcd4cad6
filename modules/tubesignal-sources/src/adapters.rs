// Adapter contracts for the external signal sources. Implementations are
// thin HTTP clients (see `clients`); tests swap in the HashMap-backed mocks
// from `testing`.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tubesignal_common::{
    Channel, Comment, ForumPost, KeywordMetrics, Transcript, TrendData, Video, WebVideoResult,
};

/// One page of platform search results plus the platform's total-hit count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub videos: Vec<Video>,
    pub total_results: u64,
}

/// The video platform's data API.
#[async_trait]
pub trait VideoApi: Send + Sync + 'static {
    /// Top results by relevance, up to `max_results`.
    async fn search(&self, query: &str, max_results: u32) -> Result<SearchPage>;

    /// Full video resource, `None` when the id does not resolve.
    async fn video(&self, id: &str) -> Result<Option<Video>>;

    async fn channel(&self, id: &str) -> Result<Option<Channel>>;

    /// A channel's most recent uploads.
    async fn channel_videos(&self, channel_id: &str, max_results: u32) -> Result<Vec<Video>>;

    /// The region's most-popular chart.
    async fn trending(&self, region: &str, max_results: u32) -> Result<Vec<Video>>;

    /// Top-level comments by relevance.
    async fn comments(&self, video_id: &str, max_results: u32) -> Result<Vec<Comment>>;
}

/// An autocomplete endpoint. Two providers exist (platform-scoped and plain
/// web) and are registered as distinct adapters.
#[async_trait]
pub trait SuggestApi: Send + Sync + 'static {
    async fn suggestions(&self, keyword: &str) -> Result<Vec<String>>;
}

/// The trends service.
#[async_trait]
pub trait TrendsApi: Send + Sync + 'static {
    async fn interest(&self, keyword: &str, region: &str) -> Result<Option<TrendData>>;
}

/// The ad-network keyword-ideas service.
#[async_trait]
pub trait PlannerApi: Send + Sync + 'static {
    /// Metrics for the keyword itself, when the network knows it.
    async fn metrics(&self, keyword: &str) -> Result<Option<KeywordMetrics>>;

    /// Related keyword ideas with their metrics.
    async fn ideas(&self, keyword: &str, limit: u32) -> Result<Vec<KeywordMetrics>>;
}

/// The transcript scraper. Transcripts are immutable once fetched.
#[async_trait]
pub trait CaptionApi: Send + Sync + 'static {
    async fn transcript(&self, video_id: &str) -> Result<Option<Transcript>>;
}

/// The community forum search.
#[async_trait]
pub trait ForumApi: Send + Sync + 'static {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<ForumPost>>;
}

/// Web video search (google-video vertical).
#[async_trait]
pub trait WebVideoApi: Send + Sync + 'static {
    async fn search(&self, query: &str) -> Result<Vec<WebVideoResult>>;
}

/// The full adapter set, injected into the source hosts and the engine.
#[derive(Clone)]
pub struct SourceAdapters {
    pub video: Arc<dyn VideoApi>,
    pub youtube_suggest: Arc<dyn SuggestApi>,
    pub google_suggest: Arc<dyn SuggestApi>,
    pub trends: Arc<dyn TrendsApi>,
    pub planner: Arc<dyn PlannerApi>,
    pub captions: Arc<dyn CaptionApi>,
    pub forum: Arc<dyn ForumApi>,
    pub web_video: Arc<dyn WebVideoApi>,
}
