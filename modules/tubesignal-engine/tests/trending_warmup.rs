// Trending warm-up: keyword mining over the regional chart, sub-analysis
// fan-out with per-candidate failure tolerance, and digest persistence.

mod common;

use std::sync::Arc;

use tubesignal_common::Video;
use tubesignal_sources::adapters::SourceAdapters;
use tubesignal_sources::testing::{empty_adapters, video_with_stats, MockVideoApi};

use common::engine_with;

fn trending_video(id: &str, title: &str) -> Video {
    video_with_stats(
        id,
        title,
        500_000,
        20_000,
        chrono::Utc::now() - chrono::Duration::days(1),
    )
}

/// Two recurring title phrases across four chart entries.
fn chart() -> Vec<Video> {
    vec![
        trending_video("a1", "alpha rocket launch"),
        trending_video("a2", "alpha rocket launch"),
        trending_video("b1", "failing topic review"),
        trending_video("b2", "failing topic review"),
    ]
}

fn adapters_with_chart() -> SourceAdapters {
    SourceAdapters {
        video: Arc::new(MockVideoApi::new().on_trending("US", chart())),
        ..empty_adapters()
    }
}

#[tokio::test]
async fn warmup_mines_analyses_and_persists_the_digest() {
    let (engine, store) = engine_with(adapters_with_chart());

    let state = engine.warm_up_trending("US").await.unwrap();

    assert_eq!(state.region, "US");
    assert_eq!(state.videos.len(), 4);
    assert!(state.last_warmup_at.is_some());
    // Both phrases and their component words recur across two videos each.
    assert!(state
        .keywords
        .iter()
        .any(|k| k.keyword == "alpha rocket launch"));
    assert!(state.keywords.iter().all(|k| k.trending_video_count == 2));
    // Every summary carries the verdict of its sub-analysis.
    assert!(state.keywords.iter().all(|k| k.opportunity > 0));
    // The top video annotation points at a chart entry containing the term.
    let phrase = state
        .keywords
        .iter()
        .find(|k| k.keyword == "alpha rocket launch")
        .unwrap();
    assert_eq!(
        phrase.top_video_title.as_deref(),
        Some("alpha rocket launch")
    );

    // Served verbatim from the durable slot afterwards.
    let cached = engine.trending_keywords("US").await.unwrap();
    assert_eq!(cached.len(), state.keywords.len());
    assert!(store.read_raw("trending-analysis", "US").is_some());
}

#[tokio::test]
async fn failing_candidates_are_skipped_not_fatal() {
    let (engine, store) = engine_with(adapters_with_chart());
    // Any keyword slot starting with "failing" cannot persist, so its
    // sub-analysis errors out.
    store.fail_writes_for("keyword-analysis", "failing");

    let state = engine.warm_up_trending("US").await.unwrap();

    // 12 mined candidates (3 unigrams + 2 bigrams + 1 trigram per phrase
    // set), minus the 3 whose keys start with "failing".
    assert_eq!(state.keywords.len(), 9);
    assert!(!state.keywords.iter().any(|k| k.keyword.starts_with("failing")));
}

#[tokio::test]
async fn warmup_is_idempotent_with_a_monotonic_timestamp() {
    let (engine, _) = engine_with(adapters_with_chart());

    let first = engine.warm_up_trending("US").await.unwrap();
    let second = engine.warm_up_trending("US").await.unwrap();

    let ids = |state: &tubesignal_common::TrendingCacheState| -> Vec<String> {
        state.videos.iter().map(|v| v.id.clone()).collect()
    };
    assert_eq!(ids(&first), ids(&second));
    assert!(second.last_warmup_at.unwrap() > first.last_warmup_at.unwrap());
}

#[tokio::test]
async fn empty_chart_aborts_and_keeps_the_previous_digest() {
    let (engine, _) = engine_with(adapters_with_chart());
    let warmed = engine.warm_up_trending("US").await.unwrap();
    assert!(!warmed.keywords.is_empty());

    // A region with no chart data: the existing digest (empty for this
    // fresh region) is preserved rather than overwritten.
    let empty = engine.warm_up_trending("DE").await.unwrap();
    assert!(empty.keywords.is_empty());
    assert!(empty.last_warmup_at.is_none());

    // The warmed region's digest is untouched.
    let keywords = engine.trending_keywords("US").await.unwrap();
    assert_eq!(keywords.len(), warmed.keywords.len());
}
