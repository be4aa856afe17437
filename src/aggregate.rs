//! Cross-query source aggregation.
//!
//! Issues the run's fixed query batch in order, applies the two capping
//! policies (per-query truncation, then the run-wide cap), deduplicates
//! by normalised URL with first occurrence winning, and hands every
//! admitted record to the provenance log as it is discovered — not in a
//! final batch — so a mid-run crash leaves a non-empty partial log.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;

use fedbrief_search::{normalize_url, ProviderResponse, SearchConfig, SearchError, SearchHit};

use crate::error::Result;
use crate::provenance::{ProvenanceLog, SourceRecord};

/// The two collection bounds applied during aggregation, in order.
#[derive(Debug, Clone, Copy)]
pub struct AggregateCaps {
    /// Maximum raw hits a single query may contribute, applied before the
    /// cross-query merge.
    pub per_query: usize,
    /// Maximum records in the aggregated set for the whole run.
    pub run: usize,
}

/// Seam between the aggregator and the web. Lets tests script provider
/// behaviour per query without any network traffic.
#[async_trait]
pub trait SourceSearcher: Send + Sync {
    /// Run the provider fallback chain for one query.
    async fn search(&self, query: &str) -> std::result::Result<ProviderResponse, SearchError>;
}

/// Production searcher backed by `fedbrief-search`.
pub struct WebSearcher {
    config: SearchConfig,
}

impl WebSearcher {
    /// Wrap a search configuration.
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SourceSearcher for WebSearcher {
    async fn search(&self, query: &str) -> std::result::Result<ProviderResponse, SearchError> {
        fedbrief_search::search(query, &self.config).await
    }
}

/// The aggregated, deduplicated, capped result set plus the non-fatal
/// flags accumulated while collecting it.
#[derive(Debug, Default)]
pub struct AggregatedSources {
    /// Admitted records in discovery order.
    pub records: Vec<SourceRecord>,
    /// Non-fatal collection failures (`search_failed:<query>`).
    pub flags: Vec<String>,
}

/// Collect sources for the whole query batch.
///
/// Queries run strictly in order, one at a time. A query whose entire
/// provider chain fails contributes zero records and a flag; it never
/// aborts the run. Only provenance-log I/O errors propagate.
pub async fn collect_sources(
    queries: &[String],
    caps: AggregateCaps,
    searcher: &dyn SourceSearcher,
    log: &ProvenanceLog,
) -> Result<AggregatedSources> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut aggregated = AggregatedSources::default();

    for query in queries {
        match searcher.search(query).await {
            Ok(response) => {
                let truncated = truncate_per_query(response.hits, caps.per_query);
                let admitted = admit_hits(
                    query,
                    truncated,
                    caps.run,
                    &mut seen,
                    &mut aggregated.records,
                    log,
                )?;
                tracing::info!(
                    query = %query,
                    provider = %response.provider,
                    admitted,
                    total = aggregated.records.len(),
                    "query aggregated"
                );
            }
            Err(err) => {
                tracing::warn!(query = %query, error = %err, "query contributed no sources");
                aggregated.flags.push(format!("search_failed:{query}"));
            }
        }
    }

    Ok(aggregated)
}

/// First capping policy: truncate a query's raw hit list to the
/// per-query budget before any merging.
fn truncate_per_query(mut hits: Vec<SearchHit>, cap: usize) -> Vec<SearchHit> {
    hits.truncate(cap);
    hits
}

/// Merge one query's truncated hits into the aggregated set.
///
/// Suppresses URLs already seen anywhere in the run (first occurrence is
/// authoritative for title and snippet), stops at the run cap, and
/// appends each admitted record to the provenance log before moving on.
fn admit_hits(
    query: &str,
    hits: Vec<SearchHit>,
    run_cap: usize,
    seen: &mut HashSet<String>,
    records: &mut Vec<SourceRecord>,
    log: &ProvenanceLog,
) -> Result<usize> {
    let mut admitted = 0;

    for hit in hits {
        if records.len() >= run_cap {
            break;
        }

        let url = hit.url.trim();
        if url.is_empty() {
            continue;
        }
        if !seen.insert(normalize_url(url)) {
            continue;
        }

        admitted += 1;
        let record = SourceRecord {
            ts: Utc::now(),
            query: query.to_string(),
            title: hit.title,
            url: url.to_string(),
            snippet: hit.snippet,
            provider: hit.provider,
            rank_in_query: admitted,
        };
        log.append(&record)?;
        records.push(record);
    }

    Ok(admitted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedbrief_search::Provider;
    use std::collections::HashMap;

    fn hit(url: &str, provider: &str) -> SearchHit {
        SearchHit {
            title: format!("title {url}"),
            url: url.into(),
            snippet: format!("snippet {url}"),
            provider: provider.into(),
        }
    }

    /// Scripted searcher: maps each query to a canned outcome.
    struct ScriptedSearcher {
        outcomes: HashMap<String, ProviderResponse>,
    }

    impl ScriptedSearcher {
        fn new(outcomes: Vec<(&str, Provider, Vec<SearchHit>)>) -> Self {
            Self {
                outcomes: outcomes
                    .into_iter()
                    .map(|(q, provider, hits)| {
                        (q.to_string(), ProviderResponse { provider, hits })
                    })
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl SourceSearcher for ScriptedSearcher {
        async fn search(
            &self,
            query: &str,
        ) -> std::result::Result<ProviderResponse, SearchError> {
            self.outcomes.get(query).cloned().ok_or_else(|| {
                SearchError::AllProvidersFailed(format!("no script for {query}"))
            })
        }
    }

    fn caps(per_query: usize, run: usize) -> AggregateCaps {
        AggregateCaps { per_query, run }
    }

    fn temp_log(dir: &tempfile::TempDir) -> ProvenanceLog {
        ProvenanceLog::new(dir.path().join("test.sources.jsonl"))
    }

    fn urls(n: usize, prefix: &str) -> Vec<SearchHit> {
        (0..n)
            .map(|i| hit(&format!("https://{prefix}{i}.example.com"), "brave"))
            .collect()
    }

    #[test]
    fn per_query_truncation_is_a_standalone_step() {
        assert_eq!(truncate_per_query(urls(9, "t"), 4).len(), 4);
        assert_eq!(truncate_per_query(urls(2, "t"), 4).len(), 2);
        assert!(truncate_per_query(vec![], 4).is_empty());
    }

    #[tokio::test]
    async fn per_query_cap_truncates_raw_results() {
        let dir = tempfile::tempdir().expect("tempdir");
        let searcher = ScriptedSearcher::new(vec![("q1", Provider::Brave, urls(8, "a"))]);

        let result = collect_sources(
            &["q1".to_string()],
            caps(6, 20),
            &searcher,
            &temp_log(&dir),
        )
        .await
        .expect("collect");

        assert_eq!(result.records.len(), 6);
        assert!(result.flags.is_empty());
    }

    #[tokio::test]
    async fn run_cap_discards_later_results() {
        let dir = tempfile::tempdir().expect("tempdir");
        let searcher = ScriptedSearcher::new(vec![
            ("q1", Provider::Brave, urls(6, "a")),
            ("q2", Provider::Brave, urls(6, "b")),
            ("q3", Provider::Brave, urls(6, "c")),
        ]);

        let result = collect_sources(
            &["q1".to_string(), "q2".to_string(), "q3".to_string()],
            caps(6, 10),
            &searcher,
            &temp_log(&dir),
        )
        .await
        .expect("collect");

        assert_eq!(result.records.len(), 10);
        // q3 contributes nothing beyond the cap; nothing is queued.
        assert!(result
            .records
            .iter()
            .all(|r| r.query == "q1" || r.query == "q2"));
    }

    #[tokio::test]
    async fn first_occurrence_wins_across_queries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let shared = "https://shared.example.com/page";
        let searcher = ScriptedSearcher::new(vec![
            ("q1", Provider::Brave, vec![hit(shared, "brave")]),
            (
                "q2",
                Provider::DuckDuckGo,
                vec![hit(shared, "duckduckgo"), hit("https://other.com", "duckduckgo")],
            ),
        ]);

        let result = collect_sources(
            &["q1".to_string(), "q2".to_string()],
            caps(6, 20),
            &searcher,
            &temp_log(&dir),
        )
        .await
        .expect("collect");

        assert_eq!(result.records.len(), 2);
        // The earliest discovery is authoritative.
        assert_eq!(result.records[0].url, shared);
        assert_eq!(result.records[0].query, "q1");
        assert_eq!(result.records[0].provider, "brave");
        assert_eq!(result.records[1].url, "https://other.com");
    }

    #[tokio::test]
    async fn duplicates_within_one_query_collapse() {
        let dir = tempfile::tempdir().expect("tempdir");
        let searcher = ScriptedSearcher::new(vec![(
            "q1",
            Provider::Brave,
            vec![
                hit("https://a.com", "brave"),
                hit("https://a.com", "brave"),
                hit("https://b.com", "brave"),
            ],
        )]);

        let result = collect_sources(
            &["q1".to_string()],
            caps(6, 20),
            &searcher,
            &temp_log(&dir),
        )
        .await
        .expect("collect");

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].rank_in_query, 1);
        assert_eq!(result.records[1].rank_in_query, 2);
    }

    #[tokio::test]
    async fn equivalent_urls_deduplicate_after_normalisation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let searcher = ScriptedSearcher::new(vec![
            (
                "q1",
                Provider::Brave,
                vec![hit("https://Example.COM/page/?utm_source=x", "brave")],
            ),
            (
                "q2",
                Provider::Brave,
                vec![hit("https://example.com/page", "brave")],
            ),
        ]);

        let result = collect_sources(
            &["q1".to_string(), "q2".to_string()],
            caps(6, 20),
            &searcher,
            &temp_log(&dir),
        )
        .await
        .expect("collect");

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].query, "q1");
    }

    #[tokio::test]
    async fn failed_query_flags_and_run_continues() {
        let dir = tempfile::tempdir().expect("tempdir");
        // "q1" has no script entry, so the searcher fails it.
        let searcher = ScriptedSearcher::new(vec![("q2", Provider::DuckDuckGo, urls(2, "b"))]);

        let result = collect_sources(
            &["q1".to_string(), "q2".to_string()],
            caps(6, 20),
            &searcher,
            &temp_log(&dir),
        )
        .await
        .expect("collect must not fail on provider errors");

        assert_eq!(result.flags, vec!["search_failed:q1".to_string()]);
        assert_eq!(result.records.len(), 2);
        assert!(result.records.iter().all(|r| r.query == "q2"));
    }

    #[tokio::test]
    async fn fallback_provider_tag_is_preserved() {
        let dir = tempfile::tempdir().expect("tempdir");
        let searcher = ScriptedSearcher::new(vec![(
            "q1",
            Provider::DuckDuckGo,
            vec![hit("https://a.com", "duckduckgo")],
        )]);

        let result = collect_sources(
            &["q1".to_string()],
            caps(6, 20),
            &searcher,
            &temp_log(&dir),
        )
        .await
        .expect("collect");

        assert_eq!(result.records[0].provider, "duckduckgo");
    }

    #[tokio::test]
    async fn overlap_scenario_counts_distinct_urls() {
        // Query A returns 8 raw hits (truncated to 6); A's third URL is
        // also B's first. Final size: |A(top 6) ∪ B(top 6)| = 6 + 5.
        let dir = tempfile::tempdir().expect("tempdir");
        let a_hits = urls(8, "a");
        let shared_url = a_hits[2].url.clone();
        let mut b_hits = vec![hit(&shared_url, "brave")];
        b_hits.extend(urls(5, "b"));

        let searcher = ScriptedSearcher::new(vec![
            ("A", Provider::Brave, a_hits),
            ("B", Provider::Brave, b_hits),
        ]);

        let result = collect_sources(
            &["A".to_string(), "B".to_string()],
            caps(6, 20),
            &searcher,
            &temp_log(&dir),
        )
        .await
        .expect("collect");

        assert_eq!(result.records.len(), 11);
        let a_count = result.records.iter().filter(|r| r.query == "A").count();
        let b_count = result.records.iter().filter(|r| r.query == "B").count();
        assert_eq!(a_count, 6);
        assert_eq!(b_count, 5);
        // Discovery order: all of A's records precede B's.
        assert!(result.records[..6].iter().all(|r| r.query == "A"));
    }

    #[tokio::test]
    async fn records_are_logged_incrementally() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = temp_log(&dir);
        let searcher = ScriptedSearcher::new(vec![("q1", Provider::Brave, urls(3, "a"))]);

        let result = collect_sources(&["q1".to_string()], caps(6, 20), &searcher, &log)
            .await
            .expect("collect");

        let logged = log.read_records().expect("read log");
        assert_eq!(logged, result.records);
    }

    #[tokio::test]
    async fn hits_without_urls_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let searcher = ScriptedSearcher::new(vec![(
            "q1",
            Provider::Brave,
            vec![hit("", "brave"), hit("https://a.com", "brave")],
        )]);

        let result = collect_sources(
            &["q1".to_string()],
            caps(6, 20),
            &searcher,
            &temp_log(&dir),
        )
        .await
        .expect("collect");

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].rank_in_query, 1);
    }
}
