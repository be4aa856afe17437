//! Trait definition for pluggable search provider backends.
//!
//! Each provider (Brave, DuckDuckGo) implements [`ProviderBackend`] to
//! give the fallback chain a uniform interface for querying and parsing.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::types::{Provider, SearchHit};

/// A pluggable search provider backend.
///
/// Implementors fetch a provider's response for a single query and
/// extract structured [`SearchHit`] values. Each backend handles its own:
///
/// - request construction (endpoint, query encoding, auth headers)
/// - response parsing (JSON body or HTML via CSS selectors)
/// - error mapping for transport failures, bad status, or parse failures
///
/// All implementations must be `Send + Sync`.
pub trait ProviderBackend: Send + Sync {
    /// Fetch raw hits for a query, in provider rank order.
    ///
    /// At most `config.max_results` hits are returned.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the HTTP request fails, the response
    /// cannot be parsed, or the provider is misconfigured (e.g. a missing
    /// API key) — all of which make the caller fall through to the next
    /// provider in the chain.
    fn fetch(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> impl std::future::Future<Output = Result<Vec<SearchHit>, SearchError>> + Send;

    /// Returns which [`Provider`] variant this backend represents.
    fn provider(&self) -> Provider;
}
