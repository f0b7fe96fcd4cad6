use std::sync::{Arc, Weak};

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio::sync::oneshot;
use tracing::{info, warn};

use tubesignal_analysis::{extract_trending_keywords, TrendingCandidate};
use tubesignal_common::{
    keyword_key, TrendingCacheState, TrendingKeywordSummary, TrendingVideo, TubeSignalError,
    Video,
};
use tubesignal_runtime::{Actor, ActorFactory, DurableSlot, StateStore};

use crate::engine::EngineInner;
use crate::keyword::KeywordMsg;

/// Trending videos fetched per region.
const TRENDING_FETCH_MAX: u32 = 50;
/// Extracted keywords analysed per warm-up.
const WARMUP_KEYWORDS: usize = 20;
/// Concurrent sub-analyses during warm-up.
const WARMUP_CONCURRENCY: usize = 4;

pub enum TrendingMsg {
    /// Recompute the region's digest: fetch the chart, mine keywords, run a
    /// sub-analysis per keyword, persist.
    WarmUp {
        reply: oneshot::Sender<Result<TrendingCacheState, TubeSignalError>>,
    },
    /// Serve the persisted digest verbatim; never computes.
    Keywords {
        reply: oneshot::Sender<Vec<TrendingKeywordSummary>>,
    },
    Videos {
        reply: oneshot::Sender<Vec<TrendingVideo>>,
    },
}

/// Keyed by region code. Owns the durable trending digest.
pub struct TrendingActor {
    region: String,
    engine: Arc<EngineInner>,
    slot: DurableSlot<TrendingCacheState>,
}

#[async_trait]
impl Actor for TrendingActor {
    type Msg = TrendingMsg;

    async fn handle(&mut self, msg: TrendingMsg) {
        match msg {
            TrendingMsg::WarmUp { reply } => {
                let result = self.warm_up().await;
                let _ = reply.send(result);
            }
            TrendingMsg::Keywords { reply } => {
                let _ = reply.send(self.slot.get().keywords.clone());
            }
            TrendingMsg::Videos { reply } => {
                let _ = reply.send(self.slot.get().videos.clone());
            }
        }
    }
}

impl TrendingActor {
    async fn warm_up(&mut self) -> Result<TrendingCacheState, TubeSignalError> {
        let region = self.region.as_str();
        info!(region, "trending warm-up starting");

        let videos = match self
            .engine
            .adapters
            .video
            .trending(region, TRENDING_FETCH_MAX)
            .await
        {
            Ok(videos) => videos,
            Err(e) => {
                warn!(region, error = %e, "trending chart fetch failed");
                Vec::new()
            }
        };
        if videos.is_empty() {
            warn!(region, "no trending videos, keeping the previous digest");
            return Ok(self.slot.get().clone());
        }

        let candidates = extract_trending_keywords(&videos, WARMUP_KEYWORDS);
        info!(region, candidates = candidates.len(), "trending keywords mined");

        let summaries: Vec<TrendingKeywordSummary> = stream::iter(
            candidates
                .into_iter()
                .map(|candidate| self.summarise_candidate(candidate, &videos)),
        )
        .buffer_unordered(WARMUP_CONCURRENCY)
        .filter_map(|summary| async move { summary })
        .collect()
        .await;

        let mut keywords = summaries;
        keywords.sort_by(|a, b| {
            let net_a = i32::from(a.opportunity) - i32::from(a.difficulty);
            let net_b = i32::from(b.opportunity) - i32::from(b.difficulty);
            net_b
                .cmp(&net_a)
                .then(b.trending_video_count.cmp(&a.trending_video_count))
                .then(a.keyword.cmp(&b.keyword))
        });

        let state = TrendingCacheState {
            keywords,
            videos: videos.iter().map(compact_video).collect(),
            last_warmup_at: Some(Utc::now()),
            region: self.region.clone(),
        };
        *self.slot.get_mut() = state.clone();
        self.slot.commit().await?;

        info!(
            region,
            keywords = state.keywords.len(),
            videos = state.videos.len(),
            "trending warm-up persisted"
        );
        Ok(state)
    }

    /// One sub-analysis per mined keyword; failures are logged and skipped.
    async fn summarise_candidate(
        &self,
        candidate: TrendingCandidate,
        videos: &[Video],
    ) -> Option<TrendingKeywordSummary> {
        let key = keyword_key(&candidate.keyword);
        let analysis = match self
            .engine
            .keywords
            .call(&key, |reply| KeywordMsg::Analyse { reply })
            .await
        {
            Ok(Ok(analysis)) => analysis,
            Ok(Err(e)) | Err(e) => {
                warn!(keyword = candidate.keyword.as_str(), error = %e,
                      "trending candidate analysis failed, skipping");
                return None;
            }
        };

        let needle = candidate.keyword.to_lowercase();
        let top_video = videos
            .iter()
            .find(|v| v.title.to_lowercase().contains(&needle));

        Some(TrendingKeywordSummary {
            keyword: candidate.keyword,
            grade: analysis.scores.grade,
            opportunity: analysis.scores.opportunity,
            difficulty: analysis.scores.difficulty,
            monthly_searches: analysis.demand.monthly_searches,
            trending_video_count: candidate.video_count,
            top_video_title: top_video.map(|v| v.title.clone()),
            top_video_thumbnail: top_video.and_then(|v| v.thumbnails.best().map(String::from)),
        })
    }
}

fn compact_video(video: &Video) -> TrendingVideo {
    TrendingVideo {
        id: video.id.clone(),
        title: video.title.clone(),
        channel_title: video.channel_title.clone(),
        view_count: video.view_count,
        thumbnail_url: video.thumbnails.best().map(String::from),
        published_at: video.published_at,
    }
}

pub struct TrendingFactory {
    pub(crate) engine: Weak<EngineInner>,
    pub(crate) store: Arc<dyn StateStore>,
}

#[async_trait]
impl ActorFactory<TrendingActor> for TrendingFactory {
    async fn activate(&self, key: &str) -> Result<TrendingActor, TubeSignalError> {
        let engine = self.engine.upgrade().ok_or_else(|| {
            TubeSignalError::RouteUnavailable("engine has shut down".to_string())
        })?;
        let slot = DurableSlot::mount(self.store.clone(), "trending-analysis", key).await?;
        Ok(TrendingActor {
            region: key.to_string(),
            engine,
            slot,
        })
    }
}
