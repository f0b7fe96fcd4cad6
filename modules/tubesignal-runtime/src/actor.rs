use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::debug;

use tubesignal_common::TubeSignalError;

/// Mailbox depth per actor instance. Senders back-pressure once a key has
/// this many queued calls.
const MAILBOX_CAPACITY: usize = 64;

/// One logical actor. `handle` runs to completion (possibly suspending on
/// awaited sub-calls) before the next message for the same key is taken.
#[async_trait]
pub trait Actor: Send + 'static {
    type Msg: Send + 'static;

    async fn handle(&mut self, msg: Self::Msg);
}

/// Constructs an actor instance for a key on first reference. Activation is
/// async so implementations can mount durable slots; it fails with
/// `RouteUnavailable` only when a mounted slot's store is unreachable.
#[async_trait]
pub trait ActorFactory<A: Actor>: Send + Sync + 'static {
    async fn activate(&self, key: &str) -> Result<A, TubeSignalError>;
}

struct HostInner<A: Actor> {
    kind: &'static str,
    factory: Box<dyn ActorFactory<A>>,
    mailboxes: Mutex<HashMap<String, mpsc::Sender<A::Msg>>>,
}

/// Key-addressable host for one actor kind. Cloning shares the instance map.
pub struct ActorHost<A: Actor> {
    inner: Arc<HostInner<A>>,
}

impl<A: Actor> Clone for ActorHost<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A: Actor> ActorHost<A> {
    pub fn new(kind: &'static str, factory: impl ActorFactory<A>) -> Self {
        Self {
            inner: Arc::new(HostInner {
                kind,
                factory: Box::new(factory),
                mailboxes: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.inner.kind
    }

    /// Enqueue a message for `key`, activating the instance if needed.
    pub async fn send(&self, key: &str, msg: A::Msg) -> Result<(), TubeSignalError> {
        let tx = self.mailbox(key).await?;
        if let Err(mpsc::error::SendError(msg)) = tx.send(msg).await {
            // The worker ended between lookup and send. Re-activate once.
            self.inner.mailboxes.lock().await.remove(key);
            let tx = self.mailbox(key).await?;
            tx.send(msg).await.map_err(|_| {
                TubeSignalError::RouteUnavailable(format!(
                    "{} actor '{key}' mailbox closed",
                    self.inner.kind
                ))
            })?;
        }
        Ok(())
    }

    /// Typed request/reply: build the message around a fresh oneshot sender
    /// and await the actor's response.
    pub async fn call<R: Send + 'static>(
        &self,
        key: &str,
        make: impl FnOnce(oneshot::Sender<R>) -> A::Msg,
    ) -> Result<R, TubeSignalError> {
        let (tx, rx) = oneshot::channel();
        self.send(key, make(tx)).await?;
        rx.await.map_err(|_| {
            TubeSignalError::RouteUnavailable(format!(
                "{} actor '{key}' dropped the reply",
                self.inner.kind
            ))
        })
    }

    /// Look up or lazily create the mailbox for `key`. Holding the map lock
    /// across activation guarantees at most one instance per identity.
    async fn mailbox(&self, key: &str) -> Result<mpsc::Sender<A::Msg>, TubeSignalError> {
        let mut mailboxes = self.inner.mailboxes.lock().await;
        if let Some(tx) = mailboxes.get(key) {
            return Ok(tx.clone());
        }

        let mut actor = self.inner.factory.activate(key).await?;
        let (tx, mut rx) = mpsc::channel::<A::Msg>(MAILBOX_CAPACITY);
        let kind = self.inner.kind;
        let owned_key = key.to_string();
        debug!(kind, key, "actor activated");
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                actor.handle(msg).await;
            }
            debug!(kind, key = owned_key.as_str(), "actor deactivated");
        });
        mailboxes.insert(key.to_string(), tx.clone());
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct Counter {
        key: String,
        value: u32,
        in_flight: Arc<AtomicU32>,
        max_in_flight: Arc<AtomicU32>,
    }

    enum CounterMsg {
        Add {
            amount: u32,
            reply: oneshot::Sender<u32>,
        },
        Key {
            reply: oneshot::Sender<String>,
        },
    }

    #[async_trait]
    impl Actor for Counter {
        type Msg = CounterMsg;

        async fn handle(&mut self, msg: CounterMsg) {
            match msg {
                CounterMsg::Add { amount, reply } => {
                    let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    self.max_in_flight.fetch_max(now, Ordering::SeqCst);
                    // Suspend mid-call so overlap would be observable.
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    self.value += amount;
                    self.in_flight.fetch_sub(1, Ordering::SeqCst);
                    let _ = reply.send(self.value);
                }
                CounterMsg::Key { reply } => {
                    let _ = reply.send(self.key.clone());
                }
            }
        }
    }

    struct CounterFactory {
        in_flight: Arc<AtomicU32>,
        max_in_flight: Arc<AtomicU32>,
        activations: Arc<AtomicU32>,
    }

    #[async_trait]
    impl ActorFactory<Counter> for CounterFactory {
        async fn activate(&self, key: &str) -> Result<Counter, TubeSignalError> {
            self.activations.fetch_add(1, Ordering::SeqCst);
            Ok(Counter {
                key: key.to_string(),
                value: 0,
                in_flight: self.in_flight.clone(),
                max_in_flight: self.max_in_flight.clone(),
            })
        }
    }

    fn host() -> (ActorHost<Counter>, Arc<AtomicU32>, Arc<AtomicU32>) {
        let in_flight = Arc::new(AtomicU32::new(0));
        let max_in_flight = Arc::new(AtomicU32::new(0));
        let activations = Arc::new(AtomicU32::new(0));
        let host = ActorHost::new(
            "counter",
            CounterFactory {
                in_flight: in_flight.clone(),
                max_in_flight: max_in_flight.clone(),
                activations: activations.clone(),
            },
        );
        (host, max_in_flight, activations)
    }

    #[tokio::test]
    async fn calls_to_one_key_serialise() {
        let (host, max_in_flight, _) = host();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let host = host.clone();
            handles.push(tokio::spawn(async move {
                host.call("k", |reply| CounterMsg::Add { amount: 1, reply })
                    .await
                    .unwrap()
            }));
        }
        let mut last = 0;
        for h in handles {
            last = last.max(h.await.unwrap());
        }
        assert_eq!(last, 8);
        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_keys_run_concurrently_and_activate_once() {
        let (host, _, activations) = host();
        let (a, b) = tokio::join!(
            host.call("a", |reply| CounterMsg::Add { amount: 2, reply }),
            host.call("b", |reply| CounterMsg::Add { amount: 3, reply }),
        );
        assert_eq!(a.unwrap(), 2);
        assert_eq!(b.unwrap(), 3);

        host.call("a", |reply| CounterMsg::Add { amount: 1, reply })
            .await
            .unwrap();
        assert_eq!(activations.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn actor_receives_its_key() {
        let (host, _, _) = host();
        let key = host
            .call("some-keyword", |reply| CounterMsg::Key { reply })
            .await
            .unwrap();
        assert_eq!(key, "some-keyword");
    }
}
