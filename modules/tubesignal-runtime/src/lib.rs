//! String-keyed single-threaded actor fabric.
//!
//! Every logical actor is addressed by (kind, key). The host keeps one
//! mailbox and one worker task per key; calls to the same key serialise in
//! FIFO order, calls to different keys run concurrently. Actors activate
//! lazily on first reference and may mount a durable state slot that is
//! read once at activation and written through on explicit commit.

pub mod actor;
pub mod state;

pub use actor::{Actor, ActorFactory, ActorHost};
pub use state::{DurableSlot, MemoryStateStore, PostgresStateStore, StateStore};
