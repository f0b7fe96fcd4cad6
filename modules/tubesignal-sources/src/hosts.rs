use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::oneshot;
use tracing::warn;

use tubesignal_common::{
    Channel, Comment, ForumPost, KeywordMetrics, Transcript, TrendData, TubeSignalError, Video,
    WebVideoResult,
};
use tubesignal_runtime::{Actor, ActorFactory, ActorHost};

use crate::adapters::{SearchPage, SourceAdapters, SuggestApi, TrendsApi, VideoApi};
use crate::cache::TtlCell;
use crate::enrichment::{EnrichmentActor, EnrichmentFactory};
use crate::source_actor::{CachedSourceActor, SourceActorFactory, SourceFetch, SourceMsg};

// Cache horizons per source kind.
const SEARCH_TTL_MINUTES: i64 = 10;
const SUGGEST_TTL_HOURS: i64 = 1;
const TRENDS_TTL_HOURS: i64 = 1;
const COMMENTS_TTL_HOURS: i64 = 6;
const FORUM_TTL_HOURS: i64 = 6;
const WEB_VIDEO_TTL_HOURS: i64 = 6;
const CHANNEL_DETAILS_TTL_HOURS: i64 = 24;
const CHANNEL_RECENT_TTL_HOURS: i64 = 6;

/// Fetch sizes.
const SEARCH_MAX_RESULTS: u32 = 50;
const COMMENTS_FETCH_MAX: u32 = 50;
const RECENT_VIDEOS_MAX: u32 = 50;
const IDEAS_FETCH_MAX: u32 = 50;
const FORUM_FETCH_MAX: u32 = 25;

pub type SearchHost = ActorHost<CachedSourceActor<SearchPage>>;
pub type SuggestHost = ActorHost<CachedSourceActor<Vec<String>>>;
pub type TrendsHost = ActorHost<CachedSourceActor<Option<TrendData>>>;
pub type TranscriptHost = ActorHost<CachedSourceActor<Option<Transcript>>>;
pub type CommentsHost = ActorHost<CachedSourceActor<Vec<Comment>>>;
pub type ForumHost = ActorHost<CachedSourceActor<Vec<ForumPost>>>;
pub type WebVideoHost = ActorHost<CachedSourceActor<Vec<WebVideoResult>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestProvider {
    YouTube,
    Google,
}

/// Composite key for the autocomplete actor: one instance per
/// (provider, keyword) pair.
pub fn suggest_key(provider: SuggestProvider, keyword: &str) -> String {
    match provider {
        SuggestProvider::YouTube => format!("yt:{keyword}"),
        SuggestProvider::Google => format!("g:{keyword}"),
    }
}

/// Composite key for the trends actor: one instance per (region, keyword).
pub fn trends_key(region: &str, keyword: &str) -> String {
    format!("{region}:{keyword}")
}

/// All per-source actor hosts, one per external signal source.
#[derive(Clone)]
pub struct SourceHosts {
    /// Keyed by keyword.
    pub search: SearchHost,
    /// Keyed by `suggest_key`.
    pub suggest: SuggestHost,
    /// Keyed by `trends_key`.
    pub trends: TrendsHost,
    /// Keyed by keyword.
    pub planner: ActorHost<PlannerActor>,
    /// Keyed by channel id.
    pub channels: ActorHost<ChannelActor>,
    /// Keyed by video id.
    pub transcripts: TranscriptHost,
    /// Keyed by video id.
    pub comments: CommentsHost,
    /// Keyed by query.
    pub forum: ForumHost,
    /// Keyed by query.
    pub web_video: WebVideoHost,
    /// Keyed by video id.
    pub enrichment: ActorHost<EnrichmentActor>,
}

impl SourceHosts {
    pub fn new(adapters: &SourceAdapters) -> Self {
        let transcripts: TranscriptHost = ActorHost::new(
            "transcript",
            SourceActorFactory::new(
                None,
                Arc::new(TranscriptFetch {
                    captions: adapters.captions.clone(),
                }),
            ),
        );
        let comments: CommentsHost = ActorHost::new(
            "comments",
            SourceActorFactory::new(
                Some(Duration::hours(COMMENTS_TTL_HOURS)),
                Arc::new(CommentsFetch {
                    api: adapters.video.clone(),
                }),
            ),
        );
        let channels = ActorHost::new(
            "channel",
            ChannelFactory {
                api: adapters.video.clone(),
            },
        );
        let enrichment = ActorHost::new(
            "enrichment",
            EnrichmentFactory::new(
                adapters.video.clone(),
                transcripts.clone(),
                comments.clone(),
                channels.clone(),
            ),
        );

        Self {
            search: ActorHost::new(
                "search",
                SourceActorFactory::new(
                    Some(Duration::minutes(SEARCH_TTL_MINUTES)),
                    Arc::new(SearchFetch {
                        api: adapters.video.clone(),
                    }),
                ),
            ),
            suggest: ActorHost::new(
                "autocomplete",
                SourceActorFactory::new(
                    Some(Duration::hours(SUGGEST_TTL_HOURS)),
                    Arc::new(SuggestFetch {
                        youtube: adapters.youtube_suggest.clone(),
                        google: adapters.google_suggest.clone(),
                    }),
                ),
            ),
            trends: ActorHost::new(
                "trends",
                SourceActorFactory::new(
                    Some(Duration::hours(TRENDS_TTL_HOURS)),
                    Arc::new(TrendsFetch {
                        api: adapters.trends.clone(),
                    }),
                ),
            ),
            planner: ActorHost::new(
                "keyword-planner",
                PlannerFactory {
                    api: adapters.planner.clone(),
                },
            ),
            channels,
            transcripts,
            comments,
            forum: ActorHost::new(
                "forum",
                SourceActorFactory::new(
                    Some(Duration::hours(FORUM_TTL_HOURS)),
                    Arc::new(ForumFetch {
                        api: adapters.forum.clone(),
                    }),
                ),
            ),
            web_video: ActorHost::new(
                "web-video",
                SourceActorFactory::new(
                    Some(Duration::hours(WEB_VIDEO_TTL_HOURS)),
                    Arc::new(WebVideoFetch {
                        api: adapters.web_video.clone(),
                    }),
                ),
            ),
            enrichment,
        }
    }

    /// Convenience wrapper: a source actor's single get call.
    pub async fn get<T: Clone + Default + Send + 'static>(
        host: &ActorHost<CachedSourceActor<T>>,
        key: &str,
    ) -> Result<T, TubeSignalError> {
        host.call(key, |reply| SourceMsg::Get { reply }).await
    }
}

// --- Fetch bindings for the generic cached source actor ---

struct SearchFetch {
    api: Arc<dyn VideoApi>,
}

#[async_trait]
impl SourceFetch<SearchPage> for SearchFetch {
    fn source(&self) -> &'static str {
        "search"
    }

    async fn fetch(&self, key: &str) -> Result<SearchPage> {
        self.api.search(key, SEARCH_MAX_RESULTS).await
    }
}

struct SuggestFetch {
    youtube: Arc<dyn SuggestApi>,
    google: Arc<dyn SuggestApi>,
}

#[async_trait]
impl SourceFetch<Vec<String>> for SuggestFetch {
    fn source(&self) -> &'static str {
        "autocomplete"
    }

    async fn fetch(&self, key: &str) -> Result<Vec<String>> {
        match key.split_once(':') {
            Some(("yt", keyword)) => self.youtube.suggestions(keyword).await,
            Some(("g", keyword)) => self.google.suggestions(keyword).await,
            _ => anyhow::bail!("malformed autocomplete key '{key}'"),
        }
    }
}

struct TrendsFetch {
    api: Arc<dyn TrendsApi>,
}

#[async_trait]
impl SourceFetch<Option<TrendData>> for TrendsFetch {
    fn source(&self) -> &'static str {
        "trends"
    }

    async fn fetch(&self, key: &str) -> Result<Option<TrendData>> {
        let Some((region, keyword)) = key.split_once(':') else {
            anyhow::bail!("malformed trends key '{key}'");
        };
        self.api.interest(keyword, region).await
    }
}

struct TranscriptFetch {
    captions: Arc<dyn crate::adapters::CaptionApi>,
}

#[async_trait]
impl SourceFetch<Option<Transcript>> for TranscriptFetch {
    fn source(&self) -> &'static str {
        "transcript"
    }

    async fn fetch(&self, key: &str) -> Result<Option<Transcript>> {
        self.captions.transcript(key).await
    }
}

struct CommentsFetch {
    api: Arc<dyn VideoApi>,
}

#[async_trait]
impl SourceFetch<Vec<Comment>> for CommentsFetch {
    fn source(&self) -> &'static str {
        "comments"
    }

    async fn fetch(&self, key: &str) -> Result<Vec<Comment>> {
        self.api.comments(key, COMMENTS_FETCH_MAX).await
    }
}

struct ForumFetch {
    api: Arc<dyn crate::adapters::ForumApi>,
}

#[async_trait]
impl SourceFetch<Vec<ForumPost>> for ForumFetch {
    fn source(&self) -> &'static str {
        "forum"
    }

    async fn fetch(&self, key: &str) -> Result<Vec<ForumPost>> {
        self.api.search(key, FORUM_FETCH_MAX).await
    }
}

struct WebVideoFetch {
    api: Arc<dyn crate::adapters::WebVideoApi>,
}

#[async_trait]
impl SourceFetch<Vec<WebVideoResult>> for WebVideoFetch {
    fn source(&self) -> &'static str {
        "web-video"
    }

    async fn fetch(&self, key: &str) -> Result<Vec<WebVideoResult>> {
        self.api.search(key).await
    }
}

// --- Channel actor: two methods with distinct horizons ---

pub enum ChannelMsg {
    Details {
        reply: oneshot::Sender<Option<Channel>>,
    },
    RecentVideos {
        reply: oneshot::Sender<Vec<Video>>,
    },
}

pub struct ChannelActor {
    id: String,
    api: Arc<dyn VideoApi>,
    details: TtlCell<Option<Channel>>,
    recent: TtlCell<Vec<Video>>,
}

#[async_trait]
impl Actor for ChannelActor {
    type Msg = ChannelMsg;

    async fn handle(&mut self, msg: ChannelMsg) {
        let now = Utc::now();
        match msg {
            ChannelMsg::Details { reply } => {
                let ttl = Some(Duration::hours(CHANNEL_DETAILS_TTL_HOURS));
                if let Some(value) = self.details.get(ttl, now) {
                    let _ = reply.send(value);
                    return;
                }
                let value = match self.api.channel(&self.id).await {
                    Ok(channel) => {
                        self.details.put(channel.clone(), now);
                        channel
                    }
                    Err(e) => {
                        warn!(channel_id = self.id.as_str(), error = %e,
                              "Channel details fetch failed, returning neutral value");
                        None
                    }
                };
                let _ = reply.send(value);
            }
            ChannelMsg::RecentVideos { reply } => {
                let ttl = Some(Duration::hours(CHANNEL_RECENT_TTL_HOURS));
                if let Some(value) = self.recent.get(ttl, now) {
                    let _ = reply.send(value);
                    return;
                }
                let value = match self.api.channel_videos(&self.id, RECENT_VIDEOS_MAX).await {
                    Ok(videos) => {
                        self.recent.put(videos.clone(), now);
                        videos
                    }
                    Err(e) => {
                        warn!(channel_id = self.id.as_str(), error = %e,
                              "Channel uploads fetch failed, returning neutral value");
                        Vec::new()
                    }
                };
                let _ = reply.send(value);
            }
        }
    }
}

struct ChannelFactory {
    api: Arc<dyn VideoApi>,
}

#[async_trait]
impl ActorFactory<ChannelActor> for ChannelFactory {
    async fn activate(&self, key: &str) -> Result<ChannelActor, TubeSignalError> {
        Ok(ChannelActor {
            id: key.to_string(),
            api: self.api.clone(),
            details: TtlCell::new(),
            recent: TtlCell::new(),
        })
    }
}

// --- Keyword-planner actor: metrics + ideas, process-lifetime cache ---

pub enum PlannerMsg {
    Metrics {
        reply: oneshot::Sender<Option<KeywordMetrics>>,
    },
    Ideas {
        limit: u32,
        reply: oneshot::Sender<Vec<KeywordMetrics>>,
    },
}

pub struct PlannerActor {
    keyword: String,
    api: Arc<dyn crate::adapters::PlannerApi>,
    metrics: TtlCell<Option<KeywordMetrics>>,
    ideas: TtlCell<Vec<KeywordMetrics>>,
}

#[async_trait]
impl Actor for PlannerActor {
    type Msg = PlannerMsg;

    async fn handle(&mut self, msg: PlannerMsg) {
        let now = Utc::now();
        match msg {
            PlannerMsg::Metrics { reply } => {
                if let Some(value) = self.metrics.get(None, now) {
                    let _ = reply.send(value);
                    return;
                }
                let value = match self.api.metrics(&self.keyword).await {
                    Ok(metrics) => {
                        self.metrics.put(metrics.clone(), now);
                        metrics
                    }
                    Err(e) => {
                        warn!(keyword = self.keyword.as_str(), error = %e,
                              "Keyword metrics fetch failed, returning neutral value");
                        None
                    }
                };
                let _ = reply.send(value);
            }
            PlannerMsg::Ideas { limit, reply } => {
                if let Some(ideas) = self.ideas.get(None, now) {
                    let _ = reply.send(truncated(ideas, limit));
                    return;
                }
                let value = match self.api.ideas(&self.keyword, IDEAS_FETCH_MAX).await {
                    Ok(ideas) => {
                        self.ideas.put(ideas.clone(), now);
                        ideas
                    }
                    Err(e) => {
                        warn!(keyword = self.keyword.as_str(), error = %e,
                              "Keyword ideas fetch failed, returning neutral value");
                        Vec::new()
                    }
                };
                let _ = reply.send(truncated(value, limit));
            }
        }
    }
}

fn truncated(mut ideas: Vec<KeywordMetrics>, limit: u32) -> Vec<KeywordMetrics> {
    ideas.truncate(limit as usize);
    ideas
}

struct PlannerFactory {
    api: Arc<dyn crate::adapters::PlannerApi>,
}

#[async_trait]
impl ActorFactory<PlannerActor> for PlannerFactory {
    async fn activate(&self, key: &str) -> Result<PlannerActor, TubeSignalError> {
        Ok(PlannerActor {
            keyword: key.to_string(),
            api: self.api.clone(),
            metrics: TtlCell::new(),
            ideas: TtlCell::new(),
        })
    }
}
