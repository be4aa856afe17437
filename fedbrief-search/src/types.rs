//! Core types for web search hits and provider identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single search hit returned from a web search provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// The title of the result page.
    pub title: String,
    /// The URL of the result.
    pub url: String,
    /// A text snippet summarising the page content.
    pub snippet: String,
    /// Which provider returned this hit.
    pub provider: String,
}

/// Search providers that fedbrief-search can query.
///
/// The order in [`crate::SearchConfig::providers`] determines the fallback
/// chain: the first entry is the primary, the rest are tried in order when
/// the primary fails for a given query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    /// Brave Search JSON API — independent index, requires a subscription token.
    Brave,
    /// DuckDuckGo HTML endpoint — keyless, scraper-tolerant fallback.
    DuckDuckGo,
}

impl Provider {
    /// Returns the identifier recorded in provenance logs for this provider.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Brave => "brave",
            Self::DuckDuckGo => "duckduckgo",
        }
    }

    /// Returns all available provider variants.
    pub fn all() -> &'static [Provider] {
        &[Self::Brave, Self::DuckDuckGo]
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The tagged outcome of a per-query provider chain: which provider
/// answered, and what it returned.
///
/// Fallback is a per-call decision — callers receive this tagged value
/// rather than reading any "current provider" state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The provider that produced the hits.
    pub provider: Provider,
    /// The raw, provider-ranked hits for the query.
    pub hits: Vec<SearchHit>,
}
