// Transcript scraper against the platform's timedtext endpoint. Answers XML
// caption cues; absence of cues means the video has no transcript.

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use tubesignal_common::Transcript;

use crate::adapters::CaptionApi;

const TIMEDTEXT_URL: &str = "https://video.google.com/timedtext";
const LANGUAGE: &str = "en";

pub struct TimedTextClient {
    http: reqwest::Client,
}

impl TimedTextClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl CaptionApi for TimedTextClient {
    async fn transcript(&self, video_id: &str) -> Result<Option<Transcript>> {
        let body = self
            .http
            .get(TIMEDTEXT_URL)
            .query(&[("lang", LANGUAGE), ("v", video_id)])
            .send()
            .await
            .context("timedtext request")?
            .error_for_status()?
            .text()
            .await?;

        let text = extract_cue_text(&body);
        if text.is_empty() {
            debug!(video_id, "timedtext: no captions");
            return Ok(None);
        }
        debug!(video_id, chars = text.len(), "timedtext: transcript");
        Ok(Some(Transcript {
            text,
            language: LANGUAGE.to_string(),
        }))
    }
}

/// Concatenate `<text ...>cue</text>` bodies into one transcript string.
fn extract_cue_text(xml: &str) -> String {
    static CUE: OnceLock<Regex> = OnceLock::new();
    let cue = CUE.get_or_init(|| Regex::new(r"<text[^>]*>([\s\S]*?)</text>").expect("cue regex"));

    let mut parts = Vec::new();
    for capture in cue.captures_iter(xml) {
        let chunk = decode_entities(&capture[1]);
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            parts.push(chunk.to_string());
        }
    }
    parts.join(" ")
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&amp;#39;", "'")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cues_concatenate_into_one_transcript() {
        let xml = r#"<?xml version="1.0"?><transcript>
            <text start="0.0" dur="2.1">today we&#39;re building</text>
            <text start="2.1" dur="1.8">a keyword tool</text>
        </transcript>"#;
        assert_eq!(extract_cue_text(xml), "today we're building a keyword tool");
    }

    #[test]
    fn empty_document_yields_empty_text() {
        assert_eq!(extract_cue_text(""), "");
        assert_eq!(extract_cue_text("<transcript></transcript>"), "");
    }
}
