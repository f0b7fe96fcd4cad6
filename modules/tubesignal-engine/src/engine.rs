use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use tubesignal_common::{
    keyword_key, AnalysisResult, Channel, Comment, EnrichedVideo, ForumPost, KeywordMetrics,
    LongTailResult, LongTailUpdate, ResearchPartial, ResearchResult, Transcript, TrendData,
    TrendingCacheState, TrendingKeywordSummary, TrendingVideo, TubeSignalError, Video,
    WebVideoResult,
};
use tubesignal_runtime::{ActorHost, StateStore};
use tubesignal_sources::hosts::{suggest_key, trends_key, SuggestProvider};
use tubesignal_sources::{
    ChannelMsg, EnrichmentMsg, PlannerMsg, SearchPage, SourceAdapters, SourceHosts,
};

use crate::bus::LongTailBus;
use crate::keyword::{KeywordActor, KeywordFactory, KeywordMsg};
use crate::research::{ResearchActor, ResearchFactory, ResearchMsg};
use crate::trending::{TrendingActor, TrendingFactory, TrendingMsg};

/// Depth of the channels feeding the pub/sub bus from streaming runs.
const STREAM_CHANNEL_CAPACITY: usize = 32;

/// Shared engine state: every actor host plus the adapter set, durable
/// store, and notification bus. Actor factories hold a `Weak` back-reference
/// so the keyword actor can recurse into its own host.
pub struct EngineInner {
    pub sources: SourceHosts,
    pub research: ActorHost<ResearchActor>,
    pub keywords: ActorHost<KeywordActor>,
    pub trending: ActorHost<TrendingActor>,
    pub adapters: SourceAdapters,
    pub store: Arc<dyn StateStore>,
    pub bus: LongTailBus,
    pub default_region: String,
}

/// The keyword-analysis engine facade. Cheap to clone; all methods route
/// through key-addressed single-threaded actors.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

impl Engine {
    pub fn new(
        adapters: SourceAdapters,
        store: Arc<dyn StateStore>,
        default_region: String,
    ) -> Self {
        let inner = Arc::new_cyclic(|weak| EngineInner {
            sources: SourceHosts::new(&adapters),
            research: ActorHost::new(
                "research",
                ResearchFactory {
                    engine: weak.clone(),
                },
            ),
            keywords: ActorHost::new(
                "keyword-analysis",
                KeywordFactory {
                    engine: weak.clone(),
                    store: store.clone(),
                },
            ),
            trending: ActorHost::new(
                "trending-analysis",
                TrendingFactory {
                    engine: weak.clone(),
                    store: store.clone(),
                },
            ),
            adapters,
            store,
            bus: LongTailBus::new(),
            default_region,
        });
        Self { inner }
    }

    pub fn bus(&self) -> &LongTailBus {
        &self.inner.bus
    }

    // --- Research ---

    pub async fn research_keyword(&self, keyword: &str) -> Result<ResearchResult, TubeSignalError> {
        let key = keyword_key(keyword);
        self.inner
            .research
            .call(&key, |reply| ResearchMsg::Research { reply })
            .await?
    }

    /// Partial research results in completion order. The stream ends after
    /// one partial per source.
    pub async fn research_keyword_stream(
        &self,
        keyword: &str,
    ) -> Result<mpsc::Receiver<ResearchPartial>, TubeSignalError> {
        let key = keyword_key(keyword);
        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        self.inner
            .research
            .send(&key, ResearchMsg::ResearchStream { tx })
            .await?;
        Ok(rx)
    }

    // --- Keyword analysis ---

    pub async fn analyse_keyword(&self, keyword: &str) -> Result<AnalysisResult, TubeSignalError> {
        let key = keyword_key(keyword);
        self.inner
            .keywords
            .call(&key, |reply| KeywordMsg::Analyse { reply })
            .await?
    }

    /// Batched long-tail analysis; results persist in the keyword's durable
    /// slot. Incremental updates are published on the parent-keyword topic.
    pub async fn analyse_long_tails(
        &self,
        keyword: &str,
        max: usize,
    ) -> Result<Vec<LongTailResult>, TubeSignalError> {
        let key = keyword_key(keyword);
        let progress = self.spawn_bus_forwarder(&key);
        self.inner
            .keywords
            .call(&key, |reply| KeywordMsg::AnalyseLongTails {
                max,
                progress: Some(progress),
                reply,
            })
            .await?
    }

    /// Fire-and-forget batched run, for the acknowledge-then-subscribe
    /// entry point.
    pub async fn start_long_tail_analysis(
        &self,
        keyword: &str,
        max: usize,
    ) -> Result<(), TubeSignalError> {
        let key = keyword_key(keyword);
        let progress = self.spawn_bus_forwarder(&key);
        let (reply, _discard) = tokio::sync::oneshot::channel();
        self.inner
            .keywords
            .send(
                &key,
                KeywordMsg::AnalyseLongTails {
                    max,
                    progress: Some(progress),
                    reply,
                },
            )
            .await?;
        info!(keyword = key.as_str(), max, "batched long-tail analysis started");
        Ok(())
    }

    /// Fire-and-forget streaming run publishing onto the parent-keyword
    /// topic. Ephemeral: nothing persists.
    pub async fn spawn_long_tail_stream(
        &self,
        keyword: &str,
        max: usize,
    ) -> Result<(), TubeSignalError> {
        let key = keyword_key(keyword);
        let tx = self.spawn_bus_forwarder(&key);
        self.inner
            .keywords
            .send(&key, KeywordMsg::StreamLongTails { max, tx })
            .await?;
        info!(keyword = key.as_str(), max, "streaming long-tail analysis started");
        Ok(())
    }

    pub fn subscribe_long_tails(
        &self,
        keyword: &str,
    ) -> tokio::sync::broadcast::Receiver<LongTailUpdate> {
        self.inner.bus.subscribe(&keyword_key(keyword))
    }

    /// Bridge an mpsc progress channel onto the broadcast bus.
    fn spawn_bus_forwarder(&self, topic: &str) -> mpsc::Sender<LongTailUpdate> {
        let (tx, mut rx) = mpsc::channel::<LongTailUpdate>(STREAM_CHANNEL_CAPACITY);
        let bus = self.inner.bus.clone();
        let topic = topic.to_string();
        tokio::spawn(async move {
            while let Some(update) = rx.recv().await {
                bus.publish(&topic, update);
            }
        });
        tx
    }

    // --- Trending ---

    pub async fn warm_up_trending(
        &self,
        region: &str,
    ) -> Result<TrendingCacheState, TubeSignalError> {
        self.inner
            .trending
            .call(&region.to_uppercase(), |reply| TrendingMsg::WarmUp { reply })
            .await?
    }

    pub async fn trending_keywords(
        &self,
        region: &str,
    ) -> Result<Vec<TrendingKeywordSummary>, TubeSignalError> {
        self.inner
            .trending
            .call(&region.to_uppercase(), |reply| TrendingMsg::Keywords { reply })
            .await
    }

    pub async fn trending_videos(&self, region: &str) -> Result<Vec<TrendingVideo>, TubeSignalError> {
        self.inner
            .trending
            .call(&region.to_uppercase(), |reply| TrendingMsg::Videos { reply })
            .await
    }

    // --- Per-source pass-throughs ---

    pub async fn search_videos(&self, query: &str) -> Result<SearchPage, TubeSignalError> {
        SourceHosts::get(&self.inner.sources.search, &keyword_key(query)).await
    }

    /// Full enrichment of a single video (details, transcript, comments,
    /// channel).
    pub async fn get_video(&self, video_id: &str) -> Result<EnrichedVideo, TubeSignalError> {
        self.inner
            .sources
            .enrichment
            .call(video_id, |reply| EnrichmentMsg::Full { reply })
            .await?
    }

    pub async fn get_channel(&self, channel_id: &str) -> Result<Option<Channel>, TubeSignalError> {
        self.inner
            .sources
            .channels
            .call(channel_id, |reply| ChannelMsg::Details { reply })
            .await
    }

    pub async fn get_channel_videos(
        &self,
        channel_id: &str,
    ) -> Result<Vec<Video>, TubeSignalError> {
        self.inner
            .sources
            .channels
            .call(channel_id, |reply| ChannelMsg::RecentVideos { reply })
            .await
    }

    pub async fn get_autocomplete(
        &self,
        keyword: &str,
        provider: SuggestProvider,
    ) -> Result<Vec<String>, TubeSignalError> {
        SourceHosts::get(
            &self.inner.sources.suggest,
            &suggest_key(provider, &keyword_key(keyword)),
        )
        .await
    }

    pub async fn get_transcript(
        &self,
        video_id: &str,
    ) -> Result<Option<Transcript>, TubeSignalError> {
        SourceHosts::get(&self.inner.sources.transcripts, video_id).await
    }

    pub async fn get_comments(&self, video_id: &str) -> Result<Vec<Comment>, TubeSignalError> {
        SourceHosts::get(&self.inner.sources.comments, video_id).await
    }

    pub async fn search_reddit(&self, query: &str) -> Result<Vec<ForumPost>, TubeSignalError> {
        SourceHosts::get(&self.inner.sources.forum, query).await
    }

    pub async fn get_trends(
        &self,
        keyword: &str,
        region: Option<&str>,
    ) -> Result<Option<TrendData>, TubeSignalError> {
        let region = region.unwrap_or(&self.inner.default_region);
        SourceHosts::get(
            &self.inner.sources.trends,
            &trends_key(region, &keyword_key(keyword)),
        )
        .await
    }

    pub async fn search_google_video(
        &self,
        query: &str,
    ) -> Result<Vec<WebVideoResult>, TubeSignalError> {
        SourceHosts::get(&self.inner.sources.web_video, query).await
    }

    pub async fn get_keyword_metrics(
        &self,
        keyword: &str,
    ) -> Result<Option<KeywordMetrics>, TubeSignalError> {
        self.inner
            .sources
            .planner
            .call(&keyword_key(keyword), |reply| PlannerMsg::Metrics { reply })
            .await
    }

    pub async fn get_keyword_ideas(
        &self,
        keyword: &str,
        limit: u32,
    ) -> Result<Vec<KeywordMetrics>, TubeSignalError> {
        self.inner
            .sources
            .planner
            .call(&keyword_key(keyword), |reply| PlannerMsg::Ideas {
                limit,
                reply,
            })
            .await
    }
}

