//! Per-query provider fallback chain.
//!
//! Tries each configured provider in order for a single query and stops
//! at the first usable response. Fallback is decided per call — there is
//! no sticky "current provider" state across queries. An empty result
//! list counts as a failure so the next provider still gets a chance.

use crate::cache::{self, CacheKey};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::provider::ProviderBackend;
use crate::providers::{BraveProvider, DuckDuckGoProvider};
use crate::types::{Provider, ProviderResponse};

/// Run the provider chain for one query.
///
/// # Errors
///
/// Returns [`SearchError::AllProvidersFailed`] only if **every**
/// configured provider fails or returns no hits; the message concatenates
/// the per-provider failure reasons for the run's debug trail.
pub async fn search_with_fallback(
    query: &str,
    config: &SearchConfig,
) -> Result<ProviderResponse, SearchError> {
    config.validate()?;

    let key = CacheKey::new(query, &config.providers);
    if config.cache_ttl_seconds > 0 {
        if let Some(cached) = cache::get(&key, config.cache_ttl_seconds).await {
            tracing::debug!(provider = %cached.provider, "search cache hit");
            return Ok(cached);
        }
    }

    let mut failures: Vec<String> = Vec::new();

    for provider in &config.providers {
        let outcome = dispatch(*provider, query, config).await;
        match classify(*provider, outcome) {
            Ok(response) => {
                tracing::debug!(
                    provider = %response.provider,
                    count = response.hits.len(),
                    "provider answered"
                );
                if config.cache_ttl_seconds > 0 {
                    cache::insert(key, response.clone(), config.cache_ttl_seconds).await;
                }
                return Ok(response);
            }
            Err(reason) => {
                tracing::warn!(provider = %provider, reason = %reason, "provider failed, falling through");
                failures.push(reason);
            }
        }
    }

    Err(SearchError::AllProvidersFailed(failures.join("; ")))
}

/// Dispatch a query to the concrete backend for a provider.
async fn dispatch(
    provider: Provider,
    query: &str,
    config: &SearchConfig,
) -> Result<Vec<crate::types::SearchHit>, SearchError> {
    match provider {
        Provider::Brave => BraveProvider.fetch(query, config).await,
        Provider::DuckDuckGo => DuckDuckGoProvider.fetch(query, config).await,
    }
}

/// Classify one provider outcome: a non-empty hit list is a success,
/// anything else (error or empty list) is a failure with a reason.
fn classify(
    provider: Provider,
    outcome: Result<Vec<crate::types::SearchHit>, SearchError>,
) -> Result<ProviderResponse, String> {
    match outcome {
        Ok(hits) if hits.is_empty() => Err(format!("{provider}: empty result set")),
        Ok(hits) => Ok(ProviderResponse { provider, hits }),
        Err(err) => Err(format!("{provider}: {err}")),
    }
}
