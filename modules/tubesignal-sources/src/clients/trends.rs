// Trends sidecar client. The trends service has no stable public API, so a
// small self-hosted scraper fronts it (same arrangement the browserless
// scraper uses) and answers plain JSON.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use tubesignal_common::{TrendData, TrendDirection};

use crate::adapters::TrendsApi;

pub struct TrendsClient {
    http: reqwest::Client,
    base_url: String,
}

impl TrendsClient {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }
}

#[derive(Deserialize)]
struct TrendsResponse {
    #[serde(default)]
    interest_score: u8,
    #[serde(default)]
    direction: String,
    #[serde(default)]
    related_queries: Vec<String>,
    #[serde(default)]
    rising_queries: Vec<String>,
}

#[async_trait]
impl TrendsApi for TrendsClient {
    async fn interest(&self, keyword: &str, region: &str) -> Result<Option<TrendData>> {
        let url = format!("{}/trends", self.base_url.trim_end_matches('/'));
        let response = self
            .http
            .get(&url)
            .query(&[("keyword", keyword), ("region", region)])
            .send()
            .await
            .context("trends request")?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: TrendsResponse = response.error_for_status()?.json().await?;
        debug!(keyword, region, interest = body.interest_score, "trends");

        Ok(Some(TrendData {
            keyword: keyword.to_string(),
            interest_score: body.interest_score.min(100),
            direction: parse_direction(&body.direction),
            related_queries: body.related_queries.into_iter().take(10).collect(),
            rising_queries: body.rising_queries.into_iter().take(10).collect(),
        }))
    }
}

fn parse_direction(raw: &str) -> TrendDirection {
    match raw.to_ascii_lowercase().as_str() {
        "rising" | "up" => TrendDirection::Rising,
        "falling" | "down" => TrendDirection::Falling,
        "stable" | "flat" => TrendDirection::Stable,
        _ => TrendDirection::Unknown,
    }
}
