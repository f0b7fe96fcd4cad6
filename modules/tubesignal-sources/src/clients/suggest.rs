// Autocomplete client. The same endpoint serves both providers: the `ds`
// parameter scopes suggestions to the video platform, omitting it yields
// plain web suggestions.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::adapters::SuggestApi;

const SUGGEST_URL: &str = "https://suggestqueries.google.com/complete/search";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuggestScope {
    YouTube,
    Google,
}

pub struct SuggestClient {
    http: reqwest::Client,
    scope: SuggestScope,
}

impl SuggestClient {
    pub fn new(http: reqwest::Client, scope: SuggestScope) -> Self {
        Self { http, scope }
    }
}

#[async_trait]
impl SuggestApi for SuggestClient {
    async fn suggestions(&self, keyword: &str) -> Result<Vec<String>> {
        let mut query = vec![("client", "firefox"), ("q", keyword)];
        if self.scope == SuggestScope::YouTube {
            query.push(("ds", "yt"));
        }
        let body = self
            .http
            .get(SUGGEST_URL)
            .query(&query)
            .send()
            .await
            .context("autocomplete request")?
            .error_for_status()?
            .text()
            .await?;

        let suggestions = parse_suggest_body(&body)?;
        debug!(keyword, scope = ?self.scope, count = suggestions.len(), "autocomplete");
        Ok(suggestions)
    }
}

/// The endpoint answers `["<query>", ["s1", "s2", ...], ...]`.
fn parse_suggest_body(body: &str) -> Result<Vec<String>> {
    let value: serde_json::Value = serde_json::from_str(body).context("autocomplete body")?;
    let suggestions = value
        .get(1)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|s| s.as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default();
    Ok(suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggest_body_parses() {
        let body = r#"["rust tut",["rust tutorial","rust tutorial for beginners"],[],{}]"#;
        assert_eq!(
            parse_suggest_body(body).unwrap(),
            vec!["rust tutorial", "rust tutorial for beginners"]
        );
    }

    #[test]
    fn malformed_body_yields_empty_list() {
        assert!(parse_suggest_body(r#"["only the echo"]"#).unwrap().is_empty());
    }
}
