// YouTube Data API v3 client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use tubesignal_common::{
    parse_channel_keywords, Channel, Comment, ThumbnailSet, Video,
};

use crate::adapters::{SearchPage, VideoApi};

const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

pub struct YouTubeClient {
    http: reqwest::Client,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{BASE_URL}/{path}");
        let response = self
            .http
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("GET {path}"))?
            .error_for_status()
            .with_context(|| format!("GET {path}"))?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl VideoApi for YouTubeClient {
    async fn search(&self, query: &str, max_results: u32) -> Result<SearchPage> {
        info!(query, max_results, "youtube: search");
        let max = max_results.min(50).to_string();
        let body: SearchListResponse = self
            .get_json(
                "search",
                &[
                    ("part", "snippet"),
                    ("type", "video"),
                    ("order", "relevance"),
                    ("maxResults", &max),
                    ("q", query),
                ],
            )
            .await?;

        let videos = body
            .items
            .into_iter()
            .filter_map(|item| {
                let id = item.id.video_id?;
                Some(item.snippet.into_video(id))
            })
            .collect();

        Ok(SearchPage {
            videos,
            total_results: body.page_info.map(|p| p.total_results).unwrap_or(0),
        })
    }

    async fn video(&self, id: &str) -> Result<Option<Video>> {
        let body: VideoListResponse = self
            .get_json(
                "videos",
                &[
                    ("part", "snippet,contentDetails,statistics"),
                    ("id", id),
                ],
            )
            .await?;
        Ok(body.items.into_iter().next().map(VideoItem::into_video))
    }

    async fn channel(&self, id: &str) -> Result<Option<Channel>> {
        let body: ChannelListResponse = self
            .get_json(
                "channels",
                &[
                    ("part", "snippet,statistics,brandingSettings"),
                    ("id", id),
                ],
            )
            .await?;
        Ok(body.items.into_iter().next().map(ChannelItem::into_channel))
    }

    async fn channel_videos(&self, channel_id: &str, max_results: u32) -> Result<Vec<Video>> {
        info!(channel_id, max_results, "youtube: channel uploads");
        let max = max_results.min(50).to_string();
        let body: SearchListResponse = self
            .get_json(
                "search",
                &[
                    ("part", "snippet"),
                    ("type", "video"),
                    ("order", "date"),
                    ("maxResults", &max),
                    ("channelId", channel_id),
                ],
            )
            .await?;
        Ok(body
            .items
            .into_iter()
            .filter_map(|item| {
                let id = item.id.video_id?;
                Some(item.snippet.into_video(id))
            })
            .collect())
    }

    async fn trending(&self, region: &str, max_results: u32) -> Result<Vec<Video>> {
        info!(region, max_results, "youtube: trending chart");
        let max = max_results.min(50).to_string();
        let body: VideoListResponse = self
            .get_json(
                "videos",
                &[
                    ("part", "snippet,contentDetails,statistics"),
                    ("chart", "mostPopular"),
                    ("regionCode", region),
                    ("maxResults", &max),
                ],
            )
            .await?;
        Ok(body.items.into_iter().map(VideoItem::into_video).collect())
    }

    async fn comments(&self, video_id: &str, max_results: u32) -> Result<Vec<Comment>> {
        let max = max_results.min(100).to_string();
        let body: CommentThreadListResponse = self
            .get_json(
                "commentThreads",
                &[
                    ("part", "snippet"),
                    ("order", "relevance"),
                    ("textFormat", "plainText"),
                    ("maxResults", &max),
                    ("videoId", video_id),
                ],
            )
            .await?;
        Ok(body
            .items
            .into_iter()
            .map(|thread| {
                let snippet = thread.snippet.top_level_comment.snippet;
                Comment {
                    id: thread.id,
                    video_id: video_id.to_string(),
                    author: snippet.author_display_name.unwrap_or_default(),
                    is_question: Comment::derive_is_question(
                        snippet.text_display.as_deref().unwrap_or(""),
                    ),
                    text: snippet.text_display.unwrap_or_default(),
                    like_count: snippet.like_count.unwrap_or(0),
                    published_at: snippet.published_at,
                    reply_count: thread.snippet.total_reply_count.unwrap_or(0),
                }
            })
            .collect())
    }
}

// --- Wire DTOs ---

fn parse_count(raw: Option<String>) -> u64 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(0)
}

#[derive(Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
    #[serde(rename = "pageInfo")]
    page_info: Option<PageInfo>,
}

#[derive(Deserialize)]
struct PageInfo {
    #[serde(rename = "totalResults", default)]
    total_results: u64,
}

#[derive(Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct Snippet {
    #[serde(rename = "publishedAt")]
    published_at: Option<DateTime<Utc>>,
    #[serde(rename = "channelId", default)]
    channel_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "channelTitle", default)]
    channel_title: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(rename = "categoryId")]
    category_id: Option<String>,
    thumbnails: Option<Thumbnails>,
}

impl Snippet {
    fn into_video(self, id: String) -> Video {
        Video {
            id,
            title: self.title,
            description: self.description,
            published_at: self.published_at,
            channel_id: self.channel_id,
            channel_title: self.channel_title,
            tags: self.tags,
            category_id: self.category_id,
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            duration: None,
            definition: None,
            thumbnails: self.thumbnails.map(Thumbnails::into_set).unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct Thumbnails {
    default: Option<ThumbnailUrl>,
    medium: Option<ThumbnailUrl>,
    high: Option<ThumbnailUrl>,
}

#[derive(Deserialize)]
struct ThumbnailUrl {
    url: String,
}

impl Thumbnails {
    fn into_set(self) -> ThumbnailSet {
        ThumbnailSet {
            default_url: self.default.map(|t| t.url),
            medium_url: self.medium.map(|t| t.url),
            high_url: self.high.map(|t| t.url),
        }
    }
}

#[derive(Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Deserialize)]
struct VideoItem {
    id: String,
    snippet: Snippet,
    #[serde(rename = "contentDetails")]
    content_details: Option<ContentDetails>,
    statistics: Option<Statistics>,
}

#[derive(Deserialize)]
struct ContentDetails {
    duration: Option<String>,
    definition: Option<String>,
}

#[derive(Deserialize)]
struct Statistics {
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
    #[serde(rename = "likeCount")]
    like_count: Option<String>,
    #[serde(rename = "commentCount")]
    comment_count: Option<String>,
}

impl VideoItem {
    fn into_video(self) -> Video {
        let mut video = self.snippet.into_video(self.id);
        if let Some(details) = self.content_details {
            video.duration = details.duration;
            video.definition = details.definition;
        }
        if let Some(stats) = self.statistics {
            video.view_count = parse_count(stats.view_count);
            video.like_count = parse_count(stats.like_count);
            video.comment_count = parse_count(stats.comment_count);
        }
        video
    }
}

#[derive(Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Deserialize)]
struct ChannelItem {
    id: String,
    snippet: ChannelSnippet,
    statistics: Option<ChannelStatistics>,
    #[serde(rename = "brandingSettings")]
    branding_settings: Option<BrandingSettings>,
}

#[derive(Deserialize)]
struct ChannelSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "customUrl")]
    custom_url: Option<String>,
    thumbnails: Option<Thumbnails>,
}

#[derive(Deserialize)]
struct ChannelStatistics {
    #[serde(rename = "subscriberCount")]
    subscriber_count: Option<String>,
    #[serde(rename = "videoCount")]
    video_count: Option<String>,
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
}

#[derive(Deserialize)]
struct BrandingSettings {
    channel: Option<BrandingChannel>,
}

#[derive(Deserialize)]
struct BrandingChannel {
    keywords: Option<String>,
}

impl ChannelItem {
    fn into_channel(self) -> Channel {
        let keywords = self
            .branding_settings
            .and_then(|b| b.channel)
            .and_then(|c| c.keywords)
            .map(|raw| parse_channel_keywords(&raw))
            .unwrap_or_default();
        let stats = self.statistics;
        Channel {
            id: self.id,
            title: self.snippet.title,
            description: self.snippet.description,
            custom_url: self.snippet.custom_url,
            subscriber_count: parse_count(stats.as_ref().and_then(|s| s.subscriber_count.clone())),
            video_count: parse_count(stats.as_ref().and_then(|s| s.video_count.clone())),
            view_count: parse_count(stats.as_ref().and_then(|s| s.view_count.clone())),
            keywords,
            thumbnails: self
                .snippet
                .thumbnails
                .map(Thumbnails::into_set)
                .unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct CommentThreadListResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
}

#[derive(Deserialize)]
struct CommentThread {
    id: String,
    snippet: CommentThreadSnippet,
}

#[derive(Deserialize)]
struct CommentThreadSnippet {
    #[serde(rename = "topLevelComment")]
    top_level_comment: TopLevelComment,
    #[serde(rename = "totalReplyCount")]
    total_reply_count: Option<u64>,
}

#[derive(Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Deserialize)]
struct CommentSnippet {
    #[serde(rename = "authorDisplayName")]
    author_display_name: Option<String>,
    #[serde(rename = "textDisplay")]
    text_display: Option<String>,
    #[serde(rename = "likeCount")]
    like_count: Option<u64>,
    #[serde(rename = "publishedAt")]
    published_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_item_maps_statistics_and_details() {
        let raw = serde_json::json!({
            "id": "abc123",
            "snippet": {
                "publishedAt": "2026-01-10T12:00:00Z",
                "channelId": "UC1",
                "title": "A video",
                "description": "About things",
                "channelTitle": "Maker",
                "tags": ["one", "two"],
                "categoryId": "27",
                "thumbnails": {"high": {"url": "https://i.example/hq.jpg"}}
            },
            "contentDetails": {"duration": "PT4M13S", "definition": "hd"},
            "statistics": {"viewCount": "1200", "likeCount": "34", "commentCount": "5"}
        });
        let item: VideoItem = serde_json::from_value(raw).unwrap();
        let video = item.into_video();
        assert_eq!(video.view_count, 1200);
        assert_eq!(video.like_count, 34);
        assert_eq!(video.duration_seconds(), Some(253));
        assert_eq!(video.tags, vec!["one", "two"]);
        assert_eq!(video.thumbnails.best(), Some("https://i.example/hq.jpg"));
    }

    #[test]
    fn channel_item_parses_declared_keywords() {
        let raw = serde_json::json!({
            "id": "UC1",
            "snippet": {"title": "Maker", "description": ""},
            "statistics": {"subscriberCount": "52000", "videoCount": "310", "viewCount": "9000000"},
            "brandingSettings": {"channel": {"keywords": "\"rust programming\" tutorials"}}
        });
        let item: ChannelItem = serde_json::from_value(raw).unwrap();
        let channel = item.into_channel();
        assert_eq!(channel.subscriber_count, 52000);
        assert_eq!(channel.keywords, vec!["rust programming", "tutorials"]);
    }

    #[test]
    fn search_items_without_video_id_are_dropped() {
        let raw = serde_json::json!({
            "items": [
                {"id": {}, "snippet": {"title": "channel hit"}},
                {"id": {"videoId": "v1"}, "snippet": {"title": "video hit"}}
            ],
            "pageInfo": {"totalResults": 9001}
        });
        let body: SearchListResponse = serde_json::from_value(raw).unwrap();
        let ids: Vec<_> = body
            .items
            .into_iter()
            .filter_map(|i| i.id.video_id)
            .collect();
        assert_eq!(ids, vec!["v1"]);
    }
}
