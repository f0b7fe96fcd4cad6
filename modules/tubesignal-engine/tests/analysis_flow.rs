// End-to-end analysis flows over mock adapters: graceful degradation,
// durable caching, and persist-failure semantics.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tubesignal_common::{CompetitionTier, Grade, TubeSignalError};
use tubesignal_engine::Engine;
use tubesignal_sources::adapters::SourceAdapters;
use tubesignal_sources::testing::{
    adapters_with, empty_adapters, MockPlannerApi, MockVideoApi,
};

use common::{engine_with, FlakyStore};

#[tokio::test]
async fn empty_research_still_produces_a_full_verdict() {
    let (engine, _) = engine_with(empty_adapters());

    let analysis = engine.analyse_keyword("__zzznoresults").await.unwrap();

    assert_eq!(analysis.demand.monthly_searches, 0);
    assert_eq!(analysis.supply.video_count, 0);
    assert_eq!(analysis.supply.content_gap_score, 0.0);
    assert_eq!(analysis.supply.competition, CompetitionTier::Low);
    // volume 3 + gap 5 + momentum 10 + rankability 25
    assert_eq!(analysis.scores.opportunity, 43);
    // authority 5 + saturation 3 + views 3 + requirement 5
    assert_eq!(analysis.scores.difficulty, 16);
    assert_eq!(analysis.scores.grade, Grade::B);
    assert!(analysis.top_videos.is_empty());
    assert!(!analysis.recommendations.is_empty());
}

#[tokio::test]
async fn quota_exhausted_planner_degrades_to_zero_volume() {
    let adapters = SourceAdapters {
        planner: Arc::new(MockPlannerApi::failing()),
        ..empty_adapters()
    };
    let (engine, _) = engine_with(adapters);

    let analysis = engine.analyse_keyword("espresso").await.unwrap();
    assert_eq!(analysis.demand.monthly_searches, 0);
    assert_eq!(analysis.scores.grade, Grade::B);
}

#[tokio::test]
async fn analysis_is_served_from_the_durable_cache() {
    let video_api = MockVideoApi::new();
    let video_api = common::saturate(video_api, "espresso");
    let video: Arc<MockVideoApi> = Arc::new(video_api);
    let adapters = SourceAdapters {
        video: video.clone(),
        ..empty_adapters()
    };
    let (engine, _) = engine_with(adapters);

    let first = engine.analyse_keyword("espresso").await.unwrap();
    let second = engine.analyse_keyword("Espresso ").await.unwrap();

    // Identity is case-insensitive; the second call replays the cache.
    assert_eq!(first.analysed_at, second.analysed_at);
    assert_eq!(video.search_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn research_drops_videos_whose_details_vanished() {
    use tubesignal_sources::testing::{video_with_stats, channel};
    use tubesignal_sources::SearchPage;

    let resolvable = video_with_stats(
        "kept",
        "espresso basics",
        5_000,
        200,
        chrono::Utc::now() - chrono::Duration::days(5),
    );
    let mut ghost = resolvable.clone();
    ghost.id = "ghost".to_string();

    let api = MockVideoApi::new()
        .on_search(
            "espresso",
            SearchPage {
                videos: vec![ghost, resolvable.clone()],
                total_results: 2,
            },
        )
        // Only one of the two ids resolves to details.
        .on_video(resolvable.clone())
        .on_channel(channel(&resolvable.channel_id, "Maker", 3_000));

    let (engine, _) = engine_with(adapters_with(api));
    let research = engine.research_keyword("espresso").await.unwrap();

    assert_eq!(research.videos.len(), 1);
    assert_eq!(research.videos[0].video.id, "kept");
    assert_eq!(research.total_results, 2);
}

#[tokio::test]
async fn persist_failure_surfaces_and_leaves_the_slot_untouched() {
    let store = Arc::new(FlakyStore::new());
    store.fail_all_writes();
    let engine = Engine::new(empty_adapters(), store.clone(), "US".to_string());

    let outcome = engine.analyse_keyword("espresso").await;
    assert!(matches!(outcome, Err(TubeSignalError::Persist(_))));
    assert!(store.read_raw("keyword-analysis", "espresso").is_none());
}

#[tokio::test]
async fn full_video_lookup_carries_the_transcript() {
    use tubesignal_sources::testing::{video_with_stats, MockCaptionApi};

    let video = video_with_stats(
        "v1",
        "espresso tuning",
        9_000,
        300,
        chrono::Utc::now() - chrono::Duration::days(2),
    );
    let adapters = SourceAdapters {
        video: Arc::new(MockVideoApi::new().on_video(video)),
        captions: Arc::new(MockCaptionApi::new().on_video("v1", "grind finer for espresso")),
        ..empty_adapters()
    };
    let (engine, _) = engine_with(adapters);

    let enriched = engine.get_video("v1").await.unwrap();
    assert_eq!(
        enriched.transcript.as_ref().map(|t| t.text.as_str()),
        Some("grind finer for espresso")
    );

    let missing = engine.get_video("nope").await;
    assert!(matches!(missing, Err(TubeSignalError::NotFound(_))));
}
