use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::oneshot;
use tracing::warn;

use tubesignal_common::TubeSignalError;
use tubesignal_runtime::{Actor, ActorFactory};

use crate::cache::TtlCell;

/// The fetch half of a per-source actor: given the actor's key, call the
/// adapter once. The generic actor supplies caching, freshness, and the
/// swallow-on-error neutral value (`T::default()`).
#[async_trait]
pub trait SourceFetch<T>: Send + Sync + 'static {
    fn source(&self) -> &'static str;

    async fn fetch(&self, key: &str) -> Result<T>;
}

pub enum SourceMsg<T> {
    Get { reply: oneshot::Sender<T> },
}

/// Generic per-source cached actor, keyed by the source's natural
/// identifier. Failures are logged, answered with the neutral value, and
/// never cached — the next call retries the adapter.
pub struct CachedSourceActor<T: Clone + Default + Send + 'static> {
    key: String,
    ttl: Option<Duration>,
    fetch: Arc<dyn SourceFetch<T>>,
    cell: TtlCell<T>,
}

#[async_trait]
impl<T: Clone + Default + Send + 'static> Actor for CachedSourceActor<T> {
    type Msg = SourceMsg<T>;

    async fn handle(&mut self, msg: SourceMsg<T>) {
        let SourceMsg::Get { reply } = msg;
        let now = Utc::now();
        if let Some(value) = self.cell.get(self.ttl, now) {
            let _ = reply.send(value);
            return;
        }
        let value = match self.fetch.fetch(&self.key).await {
            Ok(value) => {
                self.cell.put(value.clone(), now);
                value
            }
            Err(e) => {
                warn!(source = self.fetch.source(), key = self.key.as_str(), error = %e,
                      "Source fetch failed, returning neutral value");
                T::default()
            }
        };
        let _ = reply.send(value);
    }
}

pub struct SourceActorFactory<T: Clone + Default + Send + 'static> {
    ttl: Option<Duration>,
    fetch: Arc<dyn SourceFetch<T>>,
}

impl<T: Clone + Default + Send + 'static> SourceActorFactory<T> {
    pub fn new(ttl: Option<Duration>, fetch: Arc<dyn SourceFetch<T>>) -> Self {
        Self { ttl, fetch }
    }
}

#[async_trait]
impl<T: Clone + Default + Send + 'static> ActorFactory<CachedSourceActor<T>>
    for SourceActorFactory<T>
{
    async fn activate(&self, key: &str) -> Result<CachedSourceActor<T>, TubeSignalError> {
        Ok(CachedSourceActor {
            key: key.to_string(),
            ttl: self.ttl,
            fetch: self.fetch.clone(),
            cell: TtlCell::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tubesignal_runtime::ActorHost;

    struct FlakyFetch {
        calls: Arc<AtomicU32>,
        fail_first: bool,
    }

    #[async_trait]
    impl SourceFetch<Vec<String>> for FlakyFetch {
        fn source(&self) -> &'static str {
            "flaky"
        }

        async fn fetch(&self, key: &str) -> Result<Vec<String>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && n == 0 {
                anyhow::bail!("upstream down");
            }
            Ok(vec![format!("{key}:{n}")])
        }
    }

    #[tokio::test]
    async fn fresh_cache_short_circuits_the_adapter() {
        let calls = Arc::new(AtomicU32::new(0));
        let host = ActorHost::new(
            "flaky",
            SourceActorFactory::new(
                Some(Duration::hours(1)),
                Arc::new(FlakyFetch {
                    calls: calls.clone(),
                    fail_first: false,
                }),
            ),
        );

        let first = host
            .call("kw", |reply| SourceMsg::Get { reply })
            .await
            .unwrap();
        let second = host
            .call("kw", |reply| SourceMsg::Get { reply })
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_yields_neutral_value_and_is_not_cached() {
        let calls = Arc::new(AtomicU32::new(0));
        let host = ActorHost::new(
            "flaky",
            SourceActorFactory::new(
                Some(Duration::hours(1)),
                Arc::new(FlakyFetch {
                    calls: calls.clone(),
                    fail_first: true,
                }),
            ),
        );

        let neutral = host
            .call("kw", |reply| SourceMsg::Get { reply })
            .await
            .unwrap();
        assert!(neutral.is_empty());

        // The neutral answer was not stored; the retry reaches the adapter.
        let retried = host
            .call("kw", |reply| SourceMsg::Get { reply })
            .await
            .unwrap();
        assert_eq!(retried, vec!["kw:1".to_string()]);
    }
}
