// Ad-network keyword planner client with process-wide key rotation.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use tubesignal_common::{CompetitionLevel, KeywordMetrics};

use crate::adapters::PlannerApi;
use crate::keyring::KeyRing;

const BASE_URL: &str = "https://googleads.googleapis.com/v19";

pub struct GoogleAdsClient {
    http: reqwest::Client,
    ring: Arc<KeyRing>,
    customer_id: String,
}

impl GoogleAdsClient {
    pub fn new(http: reqwest::Client, ring: Arc<KeyRing>, customer_id: String) -> Self {
        Self {
            http,
            ring,
            customer_id,
        }
    }

    /// Run one keyword-ideas request, rotating the key ring past
    /// quota-exhausted keys. Fails once rotation returns to its start.
    async fn generate_ideas(&self, keyword: &str, limit: u32) -> Result<Vec<KeywordMetrics>> {
        let Some((start, mut key)) = self.ring.current() else {
            bail!("no ad-network API keys configured");
        };
        let mut index = start;

        loop {
            match self.request_ideas(&key, keyword, limit).await {
                Ok(ideas) => return Ok(ideas),
                Err(e) if is_quota_exhausted(&e) => {
                    warn!(keyword, index, "Ad-network key quota exhausted, rotating");
                    let (next_index, next_key) = self
                        .ring
                        .advance_from(index)
                        .context("no ad-network API keys configured")?;
                    if next_index == start {
                        bail!("all ad-network API keys exhausted");
                    }
                    index = next_index;
                    key = next_key;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn request_ideas(
        &self,
        key: &str,
        keyword: &str,
        limit: u32,
    ) -> Result<Vec<KeywordMetrics>> {
        let url = format!(
            "{BASE_URL}/customers/{}:generateKeywordIdeas",
            self.customer_id
        );
        let body = serde_json::json!({
            "keywordSeed": { "keywords": [keyword] },
            "includeAdultKeywords": false,
            "pageSize": limit,
        });
        let response = self
            .http
            .post(&url)
            .header("developer-token", key)
            .json(&body)
            .send()
            .await
            .context("keyword ideas request")?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            bail!("quota exceeded: {status}");
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if text.contains("RESOURCE_EXHAUSTED") {
                bail!("quota exceeded: {text}");
            }
            bail!("keyword ideas request failed: {status}: {text}");
        }

        let parsed: KeywordIdeaResponse = response.json().await?;
        info!(keyword, results = parsed.results.len(), "planner: ideas");
        Ok(parsed
            .results
            .into_iter()
            .map(KeywordIdeaResult::into_metrics)
            .collect())
    }
}

fn is_quota_exhausted(e: &anyhow::Error) -> bool {
    e.to_string().contains("quota exceeded")
}

#[async_trait]
impl PlannerApi for GoogleAdsClient {
    async fn metrics(&self, keyword: &str) -> Result<Option<KeywordMetrics>> {
        let needle = keyword.trim().to_lowercase();
        let ideas = self.generate_ideas(keyword, 25).await?;
        Ok(ideas
            .into_iter()
            .find(|idea| idea.keyword.to_lowercase() == needle))
    }

    async fn ideas(&self, keyword: &str, limit: u32) -> Result<Vec<KeywordMetrics>> {
        let mut ideas = self.generate_ideas(keyword, limit).await?;
        ideas.truncate(limit as usize);
        Ok(ideas)
    }
}

// --- Wire DTOs ---

#[derive(Deserialize)]
struct KeywordIdeaResponse {
    #[serde(default)]
    results: Vec<KeywordIdeaResult>,
}

#[derive(Deserialize)]
struct KeywordIdeaResult {
    #[serde(default)]
    text: String,
    #[serde(rename = "keywordIdeaMetrics")]
    metrics: Option<IdeaMetrics>,
}

#[derive(Deserialize, Default)]
struct IdeaMetrics {
    #[serde(rename = "avgMonthlySearches", default)]
    avg_monthly_searches: u64,
    #[serde(default)]
    competition: String,
    #[serde(rename = "competitionIndex", default)]
    competition_index: u8,
    #[serde(rename = "lowTopOfPageBidMicros", default)]
    low_top_of_page_bid_micros: u64,
    #[serde(rename = "highTopOfPageBidMicros", default)]
    high_top_of_page_bid_micros: u64,
}

impl KeywordIdeaResult {
    fn into_metrics(self) -> KeywordMetrics {
        let m = self.metrics.unwrap_or_default();
        KeywordMetrics {
            keyword: self.text,
            monthly_searches: m.avg_monthly_searches,
            competition: match m.competition.as_str() {
                "LOW" => CompetitionLevel::Low,
                "MEDIUM" => CompetitionLevel::Medium,
                "HIGH" => CompetitionLevel::High,
                _ => CompetitionLevel::Unknown,
            },
            competition_index: m.competition_index.min(100),
            low_top_of_page_bid_micros: m.low_top_of_page_bid_micros,
            high_top_of_page_bid_micros: m.high_top_of_page_bid_micros,
        }
    }
}
