//! External signal sources: adapter traits, thin HTTP clients, and the
//! per-source cached actors the analysis fabric composes.
//!
//! Every per-source actor follows the same contract: a fresh in-process
//! cache value is returned as-is; otherwise the adapter is called and the
//! result stored. Adapter failures are logged and replaced by a neutral
//! value — they never propagate, so downstream pipelines compose over
//! partial data.

pub mod adapters;
pub mod cache;
pub mod clients;
pub mod enrichment;
pub mod hosts;
pub mod keyring;
pub mod source_actor;
pub mod testing;

pub use adapters::{
    CaptionApi, ForumApi, PlannerApi, SearchPage, SourceAdapters, SuggestApi, TrendsApi, VideoApi,
    WebVideoApi,
};
pub use enrichment::{EnrichmentActor, EnrichmentMsg};
pub use hosts::{
    suggest_key, trends_key, ChannelActor, ChannelMsg, PlannerActor, PlannerMsg, SourceHosts,
    SuggestProvider,
};
pub use keyring::KeyRing;
pub use source_actor::{CachedSourceActor, SourceMsg};
