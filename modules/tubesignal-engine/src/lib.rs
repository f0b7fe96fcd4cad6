//! The keyword-analysis orchestration fabric: research fan-out, keyword
//! analysis with durable caching and recursive long-tail exploration, the
//! per-region trending digest, the daily warm-up worker, and the long-tail
//! notification bus.

pub mod bus;
pub mod engine;
pub mod keyword;
pub mod research;
pub mod trending;
pub mod warmup;

pub use bus::LongTailBus;
pub use engine::Engine;
pub use warmup::WarmupWorker;
