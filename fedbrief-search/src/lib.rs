//! # fedbrief-search
//!
//! Embedded web search for the fedbrief pipeline.
//!
//! This crate answers one question for the pipeline's aggregator: "what
//! does the web say for this query, and which provider said it?" It
//! queries Brave Search's JSON API first and falls back to scraping
//! DuckDuckGo's HTML endpoint, per query, returning a tagged
//! [`ProviderResponse`] so callers always know the origin of their hits.
//!
//! ## Design
//!
//! - Sequential fallback chain, decided per call — no sticky provider state
//! - An empty or invalid response triggers fallback just like an error
//! - In-memory read-through cache keyed by (query, provider chain)
//! - URL normalisation helpers for the aggregator's dedup keys
//! - User-Agent rotation for the scraping provider
//!
//! No ranking, no relevance scoring, no page fetching: hits are returned
//! in provider rank order and the caller applies its own capping and
//! deduplication policy.

pub mod cache;
pub mod config;
pub mod error;
pub mod fallback;
pub mod http;
pub mod normalize;
pub mod provider;
pub mod providers;
pub mod types;

pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use normalize::normalize_url;
pub use provider::ProviderBackend;
pub use types::{Provider, ProviderResponse, SearchHit};

/// Search the web for one query using the configured fallback chain.
///
/// Tries each provider in `config.providers` order and returns the first
/// usable (non-empty) response, tagged with the provider that produced
/// it. Results are returned in provider rank order, at most
/// `config.max_results` of them.
///
/// # Errors
///
/// Returns [`SearchError::AllProvidersFailed`] if every configured
/// provider fails or returns nothing, or [`SearchError::Config`] if the
/// configuration is invalid.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> fedbrief_search::Result<()> {
/// let config = fedbrief_search::SearchConfig::default();
/// let response = fedbrief_search::search("federal funds rate outlook", &config).await?;
/// println!("{} hits from {}", response.hits.len(), response.provider);
/// # Ok(())
/// # }
/// ```
pub async fn search(query: &str, config: &SearchConfig) -> Result<ProviderResponse> {
    fallback::search_with_fallback(query, config).await
}
