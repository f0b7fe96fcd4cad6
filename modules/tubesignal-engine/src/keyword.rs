use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use futures::future::join_all;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use tubesignal_analysis::{
    analyse_ranking_factors, calculate_scores, channel_keyword_authority_factor,
    classify_search_demand, extract_keywords, extract_video_signals, merge_authority_factor,
    optimise_recommendations, text::significant_words, RankingInputs,
};
use tubesignal_common::{
    keyword_key, AnalysisResult, CompetitionLevel, KeywordCacheState, KeywordMetrics,
    LongTailResult, LongTailSource, LongTailUpdate, TrendType, TubeSignalError, Video,
};
use tubesignal_runtime::{Actor, ActorFactory, DurableSlot, StateStore};
use tubesignal_sources::hosts::trends_key;
use tubesignal_sources::{ChannelMsg, PlannerMsg, SourceHosts};

use crate::engine::EngineInner;

/// Durable cache horizon for both the analysis and the long-tail list.
const CACHE_TTL_HOURS: i64 = 24;
/// Extracted terms fed into ranking analysis.
const EXTRACTED_TERMS: usize = 50;
/// Extracted terms kept on the analysis result.
const TOP_KEYWORDS_KEPT: usize = 20;
/// Videos annotated with per-video ranking signals.
const SIGNAL_TOP_N: usize = 5;
/// Recent uploads pulled per top channel.
const CHANNEL_RECENT_MAX: usize = 50;
/// Planner ideas considered as long-tail candidates.
const IDEA_CANDIDATE_LIMIT: u32 = 50;
/// Candidates analysed concurrently in the batched path.
const BATCH_SIZE: usize = 3;
/// Pause between candidate batches.
const BATCH_DELAY: StdDuration = StdDuration::from_secs(2);
/// Ad-network competition index admitted by the candidate filter.
const MAX_COMPETITION_INDEX: u8 = 40;

pub enum KeywordMsg {
    Analyse {
        reply: oneshot::Sender<Result<AnalysisResult, TubeSignalError>>,
    },
    /// Batched long-tail analysis with durable caching. `progress`, when
    /// given, receives one update per analysed candidate.
    AnalyseLongTails {
        max: usize,
        progress: Option<mpsc::Sender<LongTailUpdate>>,
        reply: oneshot::Sender<Result<Vec<LongTailResult>, TubeSignalError>>,
    },
    /// Serial, ephemeral variant: each good result is yielded immediately;
    /// nothing is persisted.
    StreamLongTails {
        max: usize,
        tx: mpsc::Sender<LongTailUpdate>,
    },
}

/// Keyed by keyword. Owns the durable per-keyword cache and composes the
/// research orchestrator with the signal miners; long-tail exploration
/// recurses into this same actor kind under candidate keys.
pub struct KeywordActor {
    keyword: String,
    engine: Arc<EngineInner>,
    slot: DurableSlot<KeywordCacheState>,
}

#[async_trait]
impl Actor for KeywordActor {
    type Msg = KeywordMsg;

    async fn handle(&mut self, msg: KeywordMsg) {
        match msg {
            KeywordMsg::Analyse { reply } => {
                let result = self.analyse().await;
                let _ = reply.send(result);
            }
            KeywordMsg::AnalyseLongTails {
                max,
                progress,
                reply,
            } => {
                let result = self.analyse_long_tails(max, progress).await;
                let _ = reply.send(result);
            }
            KeywordMsg::StreamLongTails { max, tx } => {
                self.stream_long_tails(max, tx).await;
            }
        }
    }
}

impl KeywordActor {
    // --- Analysis ---

    async fn analyse(&mut self) -> Result<AnalysisResult, TubeSignalError> {
        let now = Utc::now();
        let ttl = Duration::hours(CACHE_TTL_HOURS);
        if let (Some(analysis), Some(cached_at)) = (
            &self.slot.get().analysis,
            self.slot.get().analysis_cached_at,
        ) {
            if now - cached_at < ttl {
                debug!(keyword = self.keyword.as_str(), "analysis cache hit");
                return Ok(analysis.clone());
            }
        }

        info!(keyword = self.keyword.as_str(), "analysing keyword");
        let research = self
            .engine
            .research
            .call(&self.keyword, |reply| {
                crate::research::ResearchMsg::Research { reply }
            })
            .await??;

        let trend = SourceHosts::get(
            &self.engine.sources.trends,
            &trends_key(&self.engine.default_region, &self.keyword),
        )
        .await
        .unwrap_or_default();

        let extracted = extract_keywords(&research.videos, EXTRACTED_TERMS);

        let demand = classify_search_demand(
            &self.keyword,
            trend.as_ref(),
            research.metrics.as_ref(),
        );
        let supply = tubesignal_analysis::score_content_gap(
            &research.videos,
            research.metrics.as_ref(),
            research.total_results,
            now,
        );
        let mut ranking = analyse_ranking_factors(&RankingInputs {
            keyword: &self.keyword,
            videos: &research.videos,
            youtube_suggestions: &research.youtube_suggestions,
            google_suggestions: &research.google_suggestions,
            extracted: &extracted,
        });
        let optimization = optimise_recommendations(&self.keyword, &research.videos);

        let scores = calculate_scores(&demand, &supply, &ranking.channel_authority, now);

        // Annotate the top results with per-video signals, fetching each
        // distinct channel's recent uploads in parallel.
        let top_videos = self.annotate_top_videos(&research.videos).await;
        if let Some(factor) = channel_keyword_authority_factor(&top_videos) {
            merge_authority_factor(&mut ranking, factor);
        }

        let recommendations = build_recommendations(&demand, &supply, &ranking, &optimization);

        let mut top_keywords = extracted;
        top_keywords.truncate(TOP_KEYWORDS_KEPT);

        let result = AnalysisResult {
            keyword: self.keyword.clone(),
            analysed_at: now,
            demand,
            supply,
            ranking,
            scores,
            recommendations,
            top_keywords,
            optimization,
            top_videos,
        };

        let state = self.slot.get_mut();
        state.analysis = Some(result.clone());
        state.analysis_cached_at = Some(now);
        self.slot.commit().await?;

        Ok(result)
    }

    async fn annotate_top_videos(
        &self,
        videos: &[tubesignal_common::EnrichedVideo],
    ) -> Vec<tubesignal_common::EnrichedVideo> {
        let top = &videos[..videos.len().min(SIGNAL_TOP_N)];

        let channel_ids: Vec<String> = {
            let mut seen = HashSet::new();
            top.iter()
                .filter_map(|v| {
                    let id = v.video.channel_id.clone();
                    (!id.is_empty() && seen.insert(id.clone())).then_some(id)
                })
                .collect()
        };

        let recents: HashMap<String, Vec<Video>> = join_all(channel_ids.into_iter().map(|id| {
            let channels = self.engine.sources.channels.clone();
            async move {
                let videos = channels
                    .call(&id, |reply| ChannelMsg::RecentVideos { reply })
                    .await
                    .unwrap_or_default();
                (id, videos)
            }
        }))
        .await
        .into_iter()
        .collect();

        top.iter()
            .map(|enriched| {
                let recent = recents
                    .get(&enriched.video.channel_id)
                    .map(|v| &v[..v.len().min(CHANNEL_RECENT_MAX)])
                    .unwrap_or(&[]);
                let mut annotated = enriched.clone();
                annotated.ranking_signals =
                    Some(extract_video_signals(&self.keyword, enriched, recent));
                annotated
            })
            .collect()
    }

    // --- Long-tail exploration ---

    async fn analyse_long_tails(
        &mut self,
        max: usize,
        progress: Option<mpsc::Sender<LongTailUpdate>>,
    ) -> Result<Vec<LongTailResult>, TubeSignalError> {
        let now = Utc::now();
        let ttl = Duration::hours(CACHE_TTL_HOURS);
        if let Some(cached_at) = self.slot.get().long_tails_cached_at {
            if now - cached_at < ttl {
                debug!(keyword = self.keyword.as_str(), "long-tail cache hit");
                return Ok(self.slot.get().long_tails.clone());
            }
        }

        let candidates = self.gather_candidates(GatherMode::Batched).await;
        let total_count = candidates.len() as u32;
        info!(
            keyword = self.keyword.as_str(),
            candidates = total_count,
            "long-tail analysis starting"
        );

        let mut good: Vec<LongTailResult> = Vec::new();
        let mut analysed_count: u32 = 0;
        let batch_count = candidates.len().div_ceil(BATCH_SIZE);

        for (batch_index, batch) in candidates.chunks(BATCH_SIZE).enumerate() {
            let outcomes =
                join_all(batch.iter().map(|candidate| self.analyse_candidate(candidate))).await;
            for outcome in outcomes.into_iter().flatten() {
                analysed_count += 1;
                let keep = outcome.grade.is_good();
                if keep {
                    good.push(outcome.clone());
                }
                if let Some(progress) = &progress {
                    let _ = progress
                        .send(LongTailUpdate {
                            parent_keyword: self.keyword.clone(),
                            result: keep.then_some(outcome),
                            is_complete: false,
                            analysed_count,
                            total_count,
                            results_so_far: good.clone(),
                        })
                        .await;
                }
            }
            // Pace the recursion; the final batch exits without sleeping.
            if batch_index + 1 < batch_count {
                tokio::time::sleep(BATCH_DELAY).await;
            }
        }

        order_long_tails(&mut good);
        good.truncate(max);

        if let Some(progress) = &progress {
            let _ = progress
                .send(LongTailUpdate {
                    parent_keyword: self.keyword.clone(),
                    result: None,
                    is_complete: true,
                    analysed_count,
                    total_count,
                    results_so_far: good.clone(),
                })
                .await;
        }

        let state = self.slot.get_mut();
        state.long_tails = good.clone();
        state.long_tails_cached_at = Some(now);
        self.slot.commit().await?;

        Ok(good)
    }

    async fn stream_long_tails(&mut self, max: usize, tx: mpsc::Sender<LongTailUpdate>) {
        let candidates = self.gather_candidates(GatherMode::Streaming { max }).await;
        let total_count = candidates.len() as u32;
        info!(
            keyword = self.keyword.as_str(),
            candidates = total_count,
            "long-tail streaming starting"
        );

        let mut yielded: Vec<LongTailResult> = Vec::new();
        let mut analysed_count: u32 = 0;

        for candidate in &candidates {
            if yielded.len() >= max {
                return;
            }
            let Some(result) = self.analyse_candidate(candidate).await else {
                continue;
            };
            analysed_count += 1;
            if !result.grade.is_good() {
                continue;
            }
            yielded.push(result.clone());
            let update = LongTailUpdate {
                parent_keyword: self.keyword.clone(),
                result: Some(result),
                is_complete: false,
                analysed_count,
                total_count,
                results_so_far: yielded.clone(),
            };
            if tx.send(update).await.is_err() {
                debug!(
                    keyword = self.keyword.as_str(),
                    "long-tail stream cancelled, abandoning remaining candidates"
                );
                return;
            }
            if yielded.len() >= max {
                return;
            }
        }

        // Exhausted the candidates before reaching the target: close with a
        // completion marker.
        let _ = tx
            .send(LongTailUpdate {
                parent_keyword: self.keyword.clone(),
                result: None,
                is_complete: true,
                analysed_count,
                total_count,
                results_so_far: yielded,
            })
            .await;
    }

    /// Recursively analyse one candidate under its own actor key. Failures
    /// are logged and skipped; long-tail orchestration never raises.
    async fn analyse_candidate(&self, candidate: &Candidate) -> Option<LongTailResult> {
        let key = keyword_key(&candidate.keyword);
        let analysis = match self
            .engine
            .keywords
            .call(&key, |reply| KeywordMsg::Analyse { reply })
            .await
        {
            Ok(Ok(analysis)) => analysis,
            Ok(Err(e)) | Err(e) => {
                warn!(candidate = candidate.keyword.as_str(), error = %e,
                      "long-tail candidate analysis failed, skipping");
                return None;
            }
        };

        // Prefer the ad network's numbers for the candidate when available.
        let metrics = match &candidate.metrics {
            Some(metrics) => Some(metrics.clone()),
            None => self
                .engine
                .sources
                .planner
                .call(&key, |reply| PlannerMsg::Metrics { reply })
                .await
                .ok()
                .flatten(),
        };

        Some(LongTailResult {
            keyword: candidate.keyword.clone(),
            source: candidate.source,
            opportunity: analysis.scores.opportunity,
            difficulty: analysis.scores.difficulty,
            grade: analysis.scores.grade,
            monthly_searches: metrics
                .as_ref()
                .map(|m| m.monthly_searches)
                .unwrap_or(analysis.demand.monthly_searches),
            competition: metrics
                .as_ref()
                .map(|m| m.competition)
                .unwrap_or(CompetitionLevel::Unknown),
            video_count: analysis.supply.video_count,
            avg_competitor_views: analysis.supply.avg_views,
            analysed_at: analysis.analysed_at,
        })
    }

    /// Candidate gathering from trends and the ad network.
    ///
    /// The streaming mode relaxes the filters: a single-word seed admits
    /// every ad-network idea regardless of relevance, and high-competition
    /// ideas are admitted while the pool stays smaller than 3×max.
    async fn gather_candidates(&self, mode: GatherMode) -> Vec<Candidate> {
        let seed = self.keyword.as_str();
        let single_word_seed = !seed.trim().contains(' ');

        let trends_key = trends_key(&self.engine.default_region, seed);
        let (trend, ideas) = tokio::join!(
            SourceHosts::get(&self.engine.sources.trends, &trends_key),
            self.engine.sources.planner.call(seed, |reply| {
                PlannerMsg::Ideas {
                    limit: IDEA_CANDIDATE_LIMIT,
                    reply,
                }
            }),
        );
        let trend = trend.unwrap_or_default();
        let ideas = ideas.unwrap_or_default();

        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(keyword_key(seed));
        let mut candidates: Vec<Candidate> = Vec::new();

        if let Some(trend) = &trend {
            for query in trend.related_queries.iter().chain(&trend.rising_queries) {
                if !is_related(seed, query) {
                    continue;
                }
                if seen.insert(keyword_key(query)) {
                    candidates.push(Candidate {
                        keyword: query.clone(),
                        source: LongTailSource::YoutubeTrends,
                        metrics: None,
                    });
                }
            }
        }

        let streaming = matches!(mode, GatherMode::Streaming { .. });
        let relevance_ok = |idea: &KeywordMetrics| {
            (streaming && single_word_seed) || is_related(seed, &idea.keyword)
        };
        let low_competition = |idea: &KeywordMetrics| {
            idea.competition == CompetitionLevel::Low
                || idea.competition_index <= MAX_COMPETITION_INDEX
        };

        for idea in &ideas {
            if !relevance_ok(idea) || !low_competition(idea) {
                continue;
            }
            if seen.insert(keyword_key(&idea.keyword)) {
                candidates.push(Candidate {
                    keyword: idea.keyword.clone(),
                    source: LongTailSource::GoogleAds,
                    metrics: Some(idea.clone()),
                });
            }
        }

        // Second relaxation: admit high-competition ideas while the pool is
        // thin.
        if let GatherMode::Streaming { max } = mode {
            if candidates.len() < 3 * max {
                for idea in &ideas {
                    if !relevance_ok(idea) {
                        continue;
                    }
                    if seen.insert(keyword_key(&idea.keyword)) {
                        candidates.push(Candidate {
                            keyword: idea.keyword.clone(),
                            source: LongTailSource::GoogleAds,
                            metrics: Some(idea.clone()),
                        });
                    }
                }
            }
        }

        candidates
    }
}

#[derive(Clone, Copy)]
enum GatherMode {
    Batched,
    Streaming { max: usize },
}

#[derive(Clone)]
struct Candidate {
    keyword: String,
    source: LongTailSource,
    metrics: Option<KeywordMetrics>,
}

/// Relevance of a long-tail candidate to its seed: containment either way,
/// or overlapping >2-character word sets. Case-insensitive.
pub fn is_related(seed: &str, candidate: &str) -> bool {
    let seed_lower = seed.to_lowercase();
    let candidate_lower = candidate.to_lowercase();
    if candidate_lower.contains(&seed_lower) || seed_lower.contains(&candidate_lower) {
        return true;
    }
    !significant_words(&seed_lower)
        .is_disjoint(&significant_words(&candidate_lower))
}

/// Best net score first; difficulty breaks ties, easiest first.
fn order_long_tails(results: &mut [LongTailResult]) {
    results.sort_by(|a, b| {
        let net_a = i32::from(a.opportunity) - i32::from(a.difficulty);
        let net_b = i32::from(b.opportunity) - i32::from(b.difficulty);
        net_b
            .cmp(&net_a)
            .then(a.difficulty.cmp(&b.difficulty))
            .then(a.keyword.cmp(&b.keyword))
    });
}

fn build_recommendations(
    demand: &tubesignal_common::SearchDemand,
    supply: &tubesignal_common::ContentSupply,
    ranking: &tubesignal_common::RankingInsights,
    optimization: &tubesignal_common::RecommendationOptimization,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if supply.content_gap_score > 1.0 {
        recommendations.push(format!(
            "Demand outstrips supply (gap {:.2}) — strong upload opportunity",
            supply.content_gap_score
        ));
    }
    if supply.dormant_niche {
        recommendations
            .push("Searched-for niche with no recent uploads; first-mover advantage".to_string());
    }
    match demand.trend_type {
        TrendType::Trending => {
            recommendations.push("Interest is rising; publish while momentum holds".to_string());
        }
        TrendType::Seasonal => {
            if let Some(month) = &demand.seasonal_peak_month {
                recommendations.push(format!("Seasonal keyword peaking in {month}; schedule uploads ahead of the peak"));
            }
        }
        TrendType::Declining => {
            recommendations
                .push("Interest is declining; prefer a long-tail variation".to_string());
        }
        TrendType::Consistent => {}
    }
    if ranking.channel_authority.needs_established_channel {
        recommendations.push(format!(
            "Top results average {:.0} subscribers; target a long-tail variation or differentiate hard",
            ranking.channel_authority.avg_subscribers
        ));
    } else {
        recommendations.push("Smaller channels rank here — achievable keyword".to_string());
    }
    if !optimization.must_use_tags.is_empty() {
        recommendations.push(format!(
            "Carry the {} consensus tags the top results share",
            optimization.must_use_tags.len()
        ));
    }
    if let Some(factor) = ranking.top_factors.first() {
        if factor.correlation > 0.0 {
            recommendations.push(format!(
                "Strongest ranking signal: {}",
                factor.factor.to_lowercase()
            ));
        }
    }

    recommendations
}

pub struct KeywordFactory {
    pub(crate) engine: Weak<EngineInner>,
    pub(crate) store: Arc<dyn StateStore>,
}

#[async_trait]
impl ActorFactory<KeywordActor> for KeywordFactory {
    async fn activate(&self, key: &str) -> Result<KeywordActor, TubeSignalError> {
        let engine = self.engine.upgrade().ok_or_else(|| {
            TubeSignalError::RouteUnavailable("engine has shut down".to_string())
        })?;
        let slot = DurableSlot::mount(self.store.clone(), "keyword-analysis", key).await?;
        Ok(KeywordActor {
            keyword: key.to_string(),
            engine,
            slot,
        })
    }
}
