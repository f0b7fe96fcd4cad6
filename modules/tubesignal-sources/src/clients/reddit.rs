// Reddit search client (public JSON listing, no auth).

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use tubesignal_common::ForumPost;

use crate::adapters::ForumApi;

const SEARCH_URL: &str = "https://www.reddit.com/search.json";
const USER_AGENT: &str = "tubesignal/0.4 keyword research";

pub struct RedditClient {
    http: reqwest::Client,
}

impl RedditClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ForumApi for RedditClient {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<ForumPost>> {
        info!(query, limit, "reddit: searching");
        let limit = limit.min(100).to_string();
        let body: Listing = self
            .http
            .get(SEARCH_URL)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[("q", query), ("sort", "relevance"), ("limit", &limit)])
            .send()
            .await
            .context("reddit search")?
            .error_for_status()?
            .json()
            .await?;

        Ok(body
            .data
            .children
            .into_iter()
            .map(|child| {
                let post = child.data;
                ForumPost {
                    id: post.id,
                    title: post.title,
                    text: post.selftext,
                    subreddit: post.subreddit,
                    score: post.score,
                    num_comments: post.num_comments,
                    permalink: post
                        .permalink
                        .map(|p| format!("https://www.reddit.com{p}")),
                    created_at: post.created_utc.and_then(|ts| {
                        DateTime::<Utc>::from_timestamp(ts as i64, 0)
                    }),
                }
            })
            .collect())
    }
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Deserialize)]
struct ListingChild {
    data: PostData,
}

#[derive(Deserialize)]
struct PostData {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    subreddit: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: u64,
    permalink: Option<String>,
    created_utc: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_maps_to_forum_posts() {
        let raw = serde_json::json!({
            "data": {"children": [{
                "data": {
                    "id": "abc",
                    "title": "How do I rank videos?",
                    "selftext": "Trying to grow a channel",
                    "subreddit": "NewTubers",
                    "score": 42,
                    "num_comments": 7,
                    "permalink": "/r/NewTubers/comments/abc/",
                    "created_utc": 1767225600.0
                }
            }]}
        });
        let listing: Listing = serde_json::from_value(raw).unwrap();
        assert_eq!(listing.data.children.len(), 1);
        let post = &listing.data.children[0].data;
        assert_eq!(post.score, 42);
        assert_eq!(post.subreddit, "NewTubers");
    }
}
