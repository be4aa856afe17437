//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls the provider fallback chain, raw result
//! counts, timeouts, and caching. The defaults match the pipeline's
//! hardcoded Brave-then-DuckDuckGo chain.

use crate::error::SearchError;
use crate::types::Provider;

/// Configuration for a web search call.
///
/// Use [`Default::default()`] for the standard chain, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Provider fallback chain. The first entry is the primary; the rest
    /// are tried in order, per query, when the primary fails.
    pub providers: Vec<Provider>,
    /// Maximum number of raw hits requested from a single provider call.
    /// This is the fetch budget, not the pipeline's per-query admission cap.
    pub max_results: usize,
    /// Per-provider HTTP request timeout in seconds.
    pub timeout_seconds: u64,
    /// How long to cache provider responses in seconds. Set to 0 to disable.
    pub cache_ttl_seconds: u64,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents (DuckDuckGo scraping only).
    pub user_agent: Option<String>,
    /// Brave Search subscription token. `None` or empty means the Brave
    /// provider fails with a config error and the chain falls through.
    pub brave_api_key: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            providers: vec![Provider::Brave, Provider::DuckDuckGo],
            max_results: 10,
            timeout_seconds: 10,
            cache_ttl_seconds: 600,
            user_agent: None,
            brave_api_key: None,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_results` must be greater than 0
    /// - `timeout_seconds` must be greater than 0
    /// - `providers` must not be empty
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.providers.is_empty() {
            return Err(SearchError::Config(
                "at least one provider must be configured".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = SearchConfig::default();
        assert_eq!(config.max_results, 10);
        assert_eq!(config.timeout_seconds, 10);
        assert_eq!(config.cache_ttl_seconds, 600);
        assert!(config.user_agent.is_none());
        assert!(config.brave_api_key.is_none());
    }

    #[test]
    fn default_chain_is_brave_then_duckduckgo() {
        let config = SearchConfig::default();
        assert_eq!(
            config.providers,
            vec![Provider::Brave, Provider::DuckDuckGo]
        );
    }

    #[test]
    fn valid_config_passes_validation() {
        let config = SearchConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_max_results_rejected() {
        let config = SearchConfig {
            max_results: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_results"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = SearchConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn empty_providers_rejected() {
        let config = SearchConfig {
            providers: vec![],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("provider"));
    }

    #[test]
    fn single_provider_valid() {
        let config = SearchConfig {
            providers: vec![Provider::DuckDuckGo],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn custom_user_agent() {
        let config = SearchConfig {
            user_agent: Some("fedbrief/0.1".into()),
            ..Default::default()
        };
        assert_eq!(config.user_agent.as_deref(), Some("fedbrief/0.1"));
        assert!(config.validate().is_ok());
    }
}
