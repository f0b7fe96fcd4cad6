use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use tubesignal_common::LongTailUpdate;

/// Buffered updates per topic before slow subscribers start dropping.
const TOPIC_CAPACITY: usize = 64;

/// In-process pub/sub for long-tail progress, one topic per parent keyword.
/// Slow subscribers lag and drop; publishers never block.
#[derive(Clone, Default)]
pub struct LongTailBus {
    topics: Arc<Mutex<HashMap<String, broadcast::Sender<LongTailUpdate>>>>,
}

impl LongTailBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<LongTailUpdate> {
        let mut topics = self.topics.lock().expect("bus lock poisoned");
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .subscribe()
    }

    /// Publish to a topic. Returns how many subscribers it reached.
    pub fn publish(&self, topic: &str, update: LongTailUpdate) -> usize {
        let topics = self.topics.lock().expect("bus lock poisoned");
        match topics.get(topic) {
            Some(sender) => sender.send(update).unwrap_or(0),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(parent: &str, analysed: u32) -> LongTailUpdate {
        LongTailUpdate {
            parent_keyword: parent.to_string(),
            result: None,
            is_complete: false,
            analysed_count: analysed,
            total_count: 10,
            results_so_far: Vec::new(),
        }
    }

    #[tokio::test]
    async fn updates_reach_topic_subscribers_only() {
        let bus = LongTailBus::new();
        let mut espresso = bus.subscribe("espresso");
        let _latte = bus.subscribe("latte");

        assert_eq!(bus.publish("espresso", update("espresso", 1)), 1);
        assert_eq!(bus.publish("unknown", update("unknown", 1)), 0);

        let received = espresso.recv().await.unwrap();
        assert_eq!(received.parent_keyword, "espresso");
    }
}
