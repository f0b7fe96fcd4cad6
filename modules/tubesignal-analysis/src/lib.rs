//! Pure signal miners. Every function here is stateless: it takes one
//! research bundle (plus auxiliary inputs) and computes a verdict slice.
//! Time-dependent calculations take `now` explicitly.

pub mod content_gap;
pub mod demand;
pub mod extractor;
pub mod ranking;
pub mod recommendation;
pub mod scoring;
pub mod stopwords;
pub mod text;

pub use content_gap::score_content_gap;
pub use demand::classify_search_demand;
pub use extractor::{extract_keywords, extract_trending_keywords, TrendingCandidate};
pub use ranking::{
    analyse_ranking_factors, channel_keyword_authority_factor, extract_video_signals,
    merge_authority_factor, RankingInputs,
};
pub use recommendation::optimise_recommendations;
pub use scoring::calculate_scores;
