// Thin HTTP clients, one per external service. Each maps wire DTOs into the
// shared domain records and nothing else; caching and failure-neutralising
// live in the per-source actors.

pub mod captions;
pub mod planner;
pub mod reddit;
pub mod serper;
pub mod suggest;
pub mod trends;
pub mod youtube;

pub use captions::TimedTextClient;
pub use planner::GoogleAdsClient;
pub use reddit::RedditClient;
pub use serper::SerperClient;
pub use suggest::SuggestClient;
pub use trends::TrendsClient;
pub use youtube::YouTubeClient;
