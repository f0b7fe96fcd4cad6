use std::sync::{Arc, Weak};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use tubesignal_common::{EnrichedVideo, ResearchPartial, ResearchResult, TubeSignalError};
use tubesignal_runtime::{Actor, ActorFactory};
use tubesignal_sources::hosts::{suggest_key, SuggestProvider};
use tubesignal_sources::{EnrichmentMsg, PlannerMsg, SourceHosts};

use crate::engine::EngineInner;

/// Memo horizon for a complete research result.
const MEMO_TTL_HOURS: i64 = 1;
/// Search results fast-enriched in phase 2.
const ENRICH_TOP_N: usize = 10;

pub enum ResearchMsg {
    Research {
        reply: oneshot::Sender<Result<ResearchResult, TubeSignalError>>,
    },
    /// Yield one partial per source in completion order, then terminate.
    ResearchStream { tx: mpsc::Sender<ResearchPartial> },
}

/// Keyed by keyword: fans out to every signal source, fast-enriches the top
/// results, and memoises the composed bundle for an hour.
pub struct ResearchActor {
    keyword: String,
    engine: Arc<EngineInner>,
    memo: tubesignal_sources::cache::TtlCell<ResearchResult>,
}

#[async_trait]
impl Actor for ResearchActor {
    type Msg = ResearchMsg;

    async fn handle(&mut self, msg: ResearchMsg) {
        match msg {
            ResearchMsg::Research { reply } => {
                let now = Utc::now();
                if let Some(memoised) = self.memo.get(Some(Duration::hours(MEMO_TTL_HOURS)), now) {
                    debug!(keyword = self.keyword.as_str(), "research memo hit");
                    let _ = reply.send(Ok(memoised));
                    return;
                }
                let result = self.run_research().await;
                if let Ok(result) = &result {
                    self.memo.put(result.clone(), now);
                }
                let _ = reply.send(result);
            }
            ResearchMsg::ResearchStream { tx } => {
                self.run_stream(tx).await;
            }
        }
    }
}

impl ResearchActor {
    async fn run_research(&self) -> Result<ResearchResult, TubeSignalError> {
        let sources = &self.engine.sources;
        let keyword = self.keyword.as_str();
        info!(keyword, "research: phase 1 fan-out");

        // Phase 1: all four sources in parallel. Per-source actors already
        // neutralise adapter failures; a routing failure degrades the same
        // way here.
        let youtube_suggest_key = suggest_key(SuggestProvider::YouTube, keyword);
        let google_suggest_key = suggest_key(SuggestProvider::Google, keyword);
        let (page, youtube_suggestions, google_suggestions, metrics) = tokio::join!(
            SourceHosts::get(&sources.search, keyword),
            SourceHosts::get(&sources.suggest, &youtube_suggest_key),
            SourceHosts::get(&sources.suggest, &google_suggest_key),
            sources
                .planner
                .call(keyword, |reply| PlannerMsg::Metrics { reply }),
        );
        let page = page.unwrap_or_default();
        let youtube_suggestions = youtube_suggestions.unwrap_or_default();
        let google_suggestions = google_suggestions.unwrap_or_default();
        let metrics = metrics.unwrap_or_default();

        // Phase 2: fast-enrich the top results in parallel, preserving rank
        // order. Videos whose details no longer resolve are dropped.
        let enrich_targets: Vec<(usize, String)> = page
            .videos
            .iter()
            .take(ENRICH_TOP_N)
            .enumerate()
            .map(|(rank, video)| (rank, video.id.clone()))
            .collect();
        let mut enrichments: Vec<(usize, EnrichedVideo)> = futures::stream::iter(
            enrich_targets.into_iter().map(|(rank, id)| {
                let enrichment = sources.enrichment.clone();
                async move {
                    let outcome = enrichment
                        .call(&id, |reply| EnrichmentMsg::Fast { reply })
                        .await;
                    (rank, id, outcome)
                }
            }),
        )
        .buffer_unordered(ENRICH_TOP_N)
        .filter_map(|(rank, id, outcome)| async move {
            match outcome {
                Ok(Ok(enriched)) => Some((rank, enriched)),
                Ok(Err(e)) => {
                    debug!(video_id = id.as_str(), error = %e, "dropping unenrichable video");
                    None
                }
                Err(e) => {
                    warn!(video_id = id.as_str(), error = %e, "enrichment route failed");
                    None
                }
            }
        })
        .collect()
        .await;
        enrichments.sort_by_key(|(rank, _)| *rank);

        info!(
            keyword,
            enriched = enrichments.len(),
            total_results = page.total_results,
            "research: composed"
        );

        Ok(ResearchResult {
            keyword: self.keyword.clone(),
            produced_at: Utc::now(),
            videos: enrichments.into_iter().map(|(_, v)| v).collect(),
            youtube_suggestions,
            google_suggestions,
            metrics,
            total_results: page.total_results,
        })
    }

    /// One partial per source as each completes. No replay, no resubscribe:
    /// a dropped receiver abandons the remainder.
    async fn run_stream(&self, tx: mpsc::Sender<ResearchPartial>) {
        let sources = self.engine.sources.clone();
        let keyword = self.keyword.clone();

        let mut partials: FuturesUnordered<
            futures::future::BoxFuture<'static, ResearchPartial>,
        > = FuturesUnordered::new();

        {
            let sources = sources.clone();
            let keyword = keyword.clone();
            partials.push(Box::pin(async move {
                let page = SourceHosts::get(&sources.search, &keyword)
                    .await
                    .unwrap_or_default();
                ResearchPartial::Search {
                    videos: page.videos,
                    total_results: page.total_results,
                }
            }));
        }
        {
            let sources = sources.clone();
            let key = suggest_key(SuggestProvider::YouTube, &keyword);
            partials.push(Box::pin(async move {
                ResearchPartial::YoutubeSuggestions(
                    SourceHosts::get(&sources.suggest, &key).await.unwrap_or_default(),
                )
            }));
        }
        {
            let key = suggest_key(SuggestProvider::Google, &keyword);
            partials.push(Box::pin(async move {
                ResearchPartial::GoogleSuggestions(
                    SourceHosts::get(&sources.suggest, &key).await.unwrap_or_default(),
                )
            }));
        }

        while let Some(partial) = partials.next().await {
            if tx.send(partial).await.is_err() {
                debug!(keyword = self.keyword.as_str(), "research stream cancelled");
                return;
            }
        }
    }
}

pub struct ResearchFactory {
    pub(crate) engine: Weak<EngineInner>,
}

#[async_trait]
impl ActorFactory<ResearchActor> for ResearchFactory {
    async fn activate(&self, key: &str) -> Result<ResearchActor, TubeSignalError> {
        let engine = self.engine.upgrade().ok_or_else(|| {
            TubeSignalError::RouteUnavailable("engine has shut down".to_string())
        })?;
        Ok(ResearchActor {
            keyword: key.to_string(),
            engine,
            memo: tubesignal_sources::cache::TtlCell::new(),
        })
    }
}
