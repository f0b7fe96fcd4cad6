// Serper google-video search client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use tubesignal_common::WebVideoResult;

use crate::adapters::WebVideoApi;

const VIDEOS_URL: &str = "https://google.serper.dev/videos";

pub struct SerperClient {
    http: reqwest::Client,
    api_key: String,
}

impl SerperClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl WebVideoApi for SerperClient {
    async fn search(&self, query: &str) -> Result<Vec<WebVideoResult>> {
        info!(query, "serper: video search");
        let body: VideosResponse = self
            .http
            .post(VIDEOS_URL)
            .header("X-API-KEY", &self.api_key)
            .json(&serde_json::json!({ "q": query }))
            .send()
            .await
            .context("serper video search")?
            .error_for_status()?
            .json()
            .await?;

        Ok(body
            .videos
            .into_iter()
            .map(|v| WebVideoResult {
                title: v.title,
                url: v.link,
                source: v.source.unwrap_or_default(),
                snippet: v.snippet,
                duration: v.duration,
            })
            .collect())
    }
}

#[derive(Deserialize)]
struct VideosResponse {
    #[serde(default)]
    videos: Vec<VideoHit>,
}

#[derive(Deserialize)]
struct VideoHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    source: Option<String>,
    snippet: Option<String>,
    duration: Option<String>,
}
