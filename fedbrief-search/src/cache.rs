//! In-memory read-through cache for provider responses.
//!
//! Memoises the tagged [`ProviderResponse`] of a fallback chain, keyed by
//! the request signature (normalised query + provider chain). Uses
//! [`moka`] for async-friendly caching with TTL and automatic eviction.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;
use std::time::Duration;

use moka::future::Cache;

use crate::types::{Provider, ProviderResponse};

/// Maximum number of cached responses.
const MAX_CACHE_ENTRIES: u64 = 100;

/// Global process-wide response cache.
///
/// Lazily initialised on first access. TTL is fixed at first creation.
static CACHE: OnceLock<Cache<CacheKey, ProviderResponse>> = OnceLock::new();

/// Composite cache key: normalised query + provider chain hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Lowercased, trimmed query string.
    query: String,
    /// Hash of the provider chain **in order** — `[Brave, DuckDuckGo]`
    /// and `[DuckDuckGo, Brave]` are different fallback behaviours and
    /// must not share an entry.
    chain_hash: u64,
}

impl CacheKey {
    /// Build a deterministic cache key from a query and provider chain.
    pub fn new(query: &str, providers: &[Provider]) -> Self {
        Self {
            query: query.trim().to_lowercase(),
            chain_hash: hash_chain(providers),
        }
    }
}

fn get_or_init_cache(ttl_seconds: u64) -> &'static Cache<CacheKey, ProviderResponse> {
    CACHE.get_or_init(|| {
        Cache::builder()
            .max_capacity(MAX_CACHE_ENTRIES)
            .time_to_live(Duration::from_secs(ttl_seconds))
            .build()
    })
}

/// Look up a cached response for the given key.
pub async fn get(key: &CacheKey, ttl_seconds: u64) -> Option<ProviderResponse> {
    let cache = get_or_init_cache(ttl_seconds);
    cache.get(key).await
}

/// Insert a response into the cache.
pub async fn insert(key: CacheKey, response: ProviderResponse, ttl_seconds: u64) {
    let cache = get_or_init_cache(ttl_seconds);
    cache.insert(key, response).await;
}

/// Compute an order-sensitive hash of a provider chain.
fn hash_chain(providers: &[Provider]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for provider in providers {
        provider.name().hash(&mut hasher);
    }
    hasher.finish()
}
