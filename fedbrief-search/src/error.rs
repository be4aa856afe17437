//! Error types for the fedbrief-search crate.
//!
//! Error messages are stable strings suitable for display and for
//! recording in run debug summaries. API keys never appear in messages.

/// Errors that can occur during web search operations.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Every provider in the fallback chain failed for a query.
    #[error("all search providers failed: {0}")]
    AllProvidersFailed(String),

    /// An HTTP request to a provider failed (transport, timeout, or status).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to parse a provider response (JSON body or HTML page).
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid or incomplete search configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for fedbrief-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_all_providers_failed() {
        let err = SearchError::AllProvidersFailed("brave: 401; duckduckgo: timeout".into());
        assert_eq!(
            err.to_string(),
            "all search providers failed: brave: 401; duckduckgo: timeout"
        );
    }

    #[test]
    fn display_http() {
        let err = SearchError::Http("connection refused".into());
        assert_eq!(err.to_string(), "HTTP error: connection refused");
    }

    #[test]
    fn display_parse() {
        let err = SearchError::Parse("missing web.results".into());
        assert_eq!(err.to_string(), "parse error: missing web.results");
    }

    #[test]
    fn display_config() {
        let err = SearchError::Config("providers must not be empty".into());
        assert_eq!(err.to_string(), "config error: providers must not be empty");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
    }
}
