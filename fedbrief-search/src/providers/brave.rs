//! Brave Search — primary provider, JSON Web Search API.
//!
//! Brave runs its own index and exposes a clean JSON API. It needs a
//! subscription token (`X-Subscription-Token`); without one configured,
//! this backend fails fast with a config error so the chain can fall
//! through to DuckDuckGo.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::provider::ProviderBackend;
use crate::types::{Provider, SearchHit};

const ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";

/// Brave Search JSON API backend.
pub struct BraveProvider;

impl ProviderBackend for BraveProvider {
    async fn fetch(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let token = config
            .brave_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| SearchError::Config("Brave API key not configured".into()))?;

        tracing::trace!(query, "Brave search");

        let client = http::build_client(config)?;
        let count = config.max_results.to_string();

        let response = client
            .get(ENDPOINT)
            .query(&[("q", query), ("count", count.as_str())])
            .header("Accept", "application/json")
            .header("X-Subscription-Token", token)
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("Brave request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("Brave HTTP error: {e}")))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(format!("Brave response not JSON: {e}")))?;

        parse_brave_body(&body, config.max_results)
    }

    fn provider(&self) -> Provider {
        Provider::Brave
    }
}

/// Parse a Brave Web Search API body into hits.
///
/// Extracted as a separate function for testability with canned JSON.
pub(crate) fn parse_brave_body(
    body: &serde_json::Value,
    max_results: usize,
) -> Result<Vec<SearchHit>, SearchError> {
    let results = body
        .get("web")
        .and_then(|w| w.get("results"))
        .and_then(|r| r.as_array())
        .ok_or_else(|| SearchError::Parse("Brave body missing web.results".into()))?;

    let mut hits = Vec::new();
    for item in results {
        let url = item
            .get("url")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .trim()
            .to_string();
        if url.is_empty() {
            continue;
        }

        let title = item
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .trim()
            .to_string();
        let snippet = item
            .get("description")
            .and_then(|v| v.as_str())
            .map(strip_highlight_markup)
            .unwrap_or_default();

        hits.push(SearchHit {
            title,
            url,
            snippet,
            provider: Provider::Brave.name().to_string(),
        });

        if hits.len() >= max_results {
            break;
        }
    }

    tracing::debug!(count = hits.len(), "Brave results parsed");
    Ok(hits)
}

/// Brave wraps query-term matches in `<strong>` tags inside descriptions.
fn strip_highlight_markup(s: &str) -> String {
    s.replace("<strong>", "").replace("</strong>", "")
}
