// Shared fixtures for the engine integration tests: a state store with
// controllable write failures, and engine assembly around the adapter mocks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;

use tubesignal_engine::Engine;
use tubesignal_runtime::StateStore;
use tubesignal_sources::adapters::SourceAdapters;
use tubesignal_sources::testing::{channel, video_with_stats};
use tubesignal_sources::SearchPage;
use tubesignal_sources::testing::MockVideoApi;

/// In-memory store whose writes can be made to fail, globally or for keys
/// with a given prefix under a given actor kind.
#[derive(Default)]
pub struct FlakyStore {
    records: Mutex<HashMap<(String, String), serde_json::Value>>,
    fail_all_writes: AtomicBool,
    fail_prefix: Mutex<Option<(String, String)>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_all_writes(&self) {
        self.fail_all_writes.store(true, Ordering::SeqCst);
    }

    /// Fail writes for slots of `kind` whose key starts with `prefix`.
    pub fn fail_writes_for(&self, kind: &str, prefix: &str) {
        *self.fail_prefix.lock().unwrap() = Some((kind.to_string(), prefix.to_string()));
    }

    pub fn read_raw(&self, kind: &str, key: &str) -> Option<serde_json::Value> {
        self.records
            .lock()
            .unwrap()
            .get(&(kind.to_string(), key.to_string()))
            .cloned()
    }
}

#[async_trait]
impl StateStore for FlakyStore {
    async fn read(&self, kind: &str, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.read_raw(kind, key))
    }

    async fn write(&self, kind: &str, key: &str, state: serde_json::Value) -> Result<()> {
        if self.fail_all_writes.load(Ordering::SeqCst) {
            bail!("store is read-only");
        }
        if let Some((fail_kind, prefix)) = self.fail_prefix.lock().unwrap().clone() {
            if kind == fail_kind && key.starts_with(&prefix) {
                bail!("write rejected for {kind}/{key}");
            }
        }
        self.records
            .lock()
            .unwrap()
            .insert((kind.to_string(), key.to_string()), state);
        Ok(())
    }
}

pub fn engine_with(adapters: SourceAdapters) -> (Engine, Arc<FlakyStore>) {
    let store = Arc::new(FlakyStore::new());
    let engine = Engine::new(adapters, store.clone(), "US".to_string());
    (engine, store)
}

/// Register a saturated market for `query` on the mock: three 2M-view
/// videos from 2M-subscriber channels and a deep results page. Any keyword
/// researched against it grades F.
pub fn saturate(mut api: MockVideoApi, query: &str) -> MockVideoApi {
    let mut videos = Vec::new();
    for i in 0..3 {
        let id = format!("{}-big-{i}", query.replace(' ', "-"));
        let mut video = video_with_stats(
            &id,
            &format!("{query} masterclass {i}"),
            2_000_000,
            80_000,
            chrono::Utc::now() - chrono::Duration::days(10),
        );
        let channel_id = format!("ch-{id}");
        video.channel_id = channel_id.clone();
        api = api
            .on_video(video.clone())
            .on_channel(channel(&channel_id, "Big Channel", 2_000_000));
        videos.push(video);
    }
    api.on_search(
        query,
        SearchPage {
            videos,
            total_results: 150,
        },
    )
}
