//! Configuration for a pipeline run.
//!
//! Defaults are usable as-is for a stubbed run. Values load from an
//! optional TOML file, then `FEDBRIEF_*` environment variables, then CLI
//! flags, in that order of increasing precedence. API keys are only ever
//! read from the environment, never from config files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{BriefError, Result};
use fedbrief_search::{Provider, SearchConfig};

/// The fixed query batch issued for every run, in aggregation order.
pub const DEFAULT_QUERIES: &[&str] = &[
    "Federal Reserve FOMC meeting statement rate decision",
    "Jerome Powell federal funds rate outlook",
];

/// Top-level configuration for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Directory receiving all run artifacts.
    pub artifacts_dir: PathBuf,
    /// Per-query admission cap applied before the cross-query merge.
    pub per_query_cap: usize,
    /// Hard cap on the aggregated result set for the whole run.
    pub run_cap: usize,
    /// Ordered query batch. Immutable once the run starts.
    pub queries: Vec<String>,
    /// Use canned responses instead of calling the chat backend.
    pub stub: bool,
    /// Sampling parameters forwarded to every generative call.
    pub sampling: SamplingConfig,
    /// Chat-completion backend settings.
    pub llm: LlmConfig,
    /// Web-search settings.
    pub search: SearchSettings,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from("runs"),
            per_query_cap: 6,
            run_cap: 20,
            queries: DEFAULT_QUERIES.iter().map(|q| (*q).to_string()).collect(),
            stub: false,
            sampling: SamplingConfig::default(),
            llm: LlmConfig::default(),
            search: SearchSettings::default(),
        }
    }
}

/// Sampling parameters for generative calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// LLM temperature.
    pub temperature: f32,
    /// Nucleus sampling parameter.
    pub top_p: f32,
    /// Seed, where the backend supports it.
    pub seed: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            top_p: 1.0,
            seed: None,
        }
    }
}

/// Chat-completion backend settings (OpenAI-compatible API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL including the version prefix, e.g. `https://openrouter.ai/api/v1`.
    pub api_url: String,
    /// Model for the macro-analyst phase.
    pub analyst_model: String,
    /// Model for the fact-check phase.
    pub factcheck_model: String,
    /// Model for the executive-writer phase.
    pub writer_model: String,
    /// Completion budget for the analyst phase.
    pub analyst_max_tokens: u32,
    /// Completion budget for the fact-check phase.
    pub factcheck_max_tokens: u32,
    /// Completion budget for the writer phase.
    pub writer_max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://openrouter.ai/api/v1".into(),
            analyst_model: "z-ai/glm-4.5-air:free".into(),
            factcheck_model: "moonshotai/kimi-k2:free".into(),
            writer_model: "openai/gpt-oss-20b:free".into(),
            analyst_max_tokens: 3000,
            factcheck_max_tokens: 1200,
            writer_max_tokens: 1200,
        }
    }
}

/// Web-search settings forwarded to `fedbrief-search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Raw hits requested per provider call (fetch budget, not the
    /// pipeline admission cap).
    pub max_results: usize,
    /// Per-provider HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Provider response cache TTL in seconds. 0 disables caching.
    pub cache_ttl_seconds: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: 10,
            timeout_seconds: 10,
            cache_ttl_seconds: 600,
        }
    }
}

impl RunConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| BriefError::Config(format!("invalid config file: {e}")))
    }

    /// Apply `FEDBRIEF_*` environment overrides.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary lookup (seam for tests).
    pub fn apply_overrides_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<()> {
        if let Some(dir) = lookup("FEDBRIEF_ART_DIR") {
            self.artifacts_dir = PathBuf::from(dir);
        }
        if let Some(cap) = lookup("FEDBRIEF_PER_QUERY_CAP") {
            self.per_query_cap = parse_override("FEDBRIEF_PER_QUERY_CAP", &cap)?;
        }
        if let Some(cap) = lookup("FEDBRIEF_RUN_CAP") {
            self.run_cap = parse_override("FEDBRIEF_RUN_CAP", &cap)?;
        }
        if let Some(t) = lookup("FEDBRIEF_TEMPERATURE") {
            self.sampling.temperature = parse_override("FEDBRIEF_TEMPERATURE", &t)?;
        }
        if let Some(p) = lookup("FEDBRIEF_TOP_P") {
            self.sampling.top_p = parse_override("FEDBRIEF_TOP_P", &p)?;
        }
        if let Some(s) = lookup("FEDBRIEF_SEED") {
            self.sampling.seed = Some(parse_override("FEDBRIEF_SEED", &s)?);
        }
        Ok(())
    }

    /// Validate the assembled configuration.
    pub fn validate(&self) -> Result<()> {
        if self.per_query_cap == 0 {
            return Err(BriefError::Config(
                "per_query_cap must be greater than 0".into(),
            ));
        }
        if self.run_cap == 0 {
            return Err(BriefError::Config("run_cap must be greater than 0".into()));
        }
        if self.queries.is_empty() {
            return Err(BriefError::Config("query batch must not be empty".into()));
        }
        Ok(())
    }

    /// Build the search-crate configuration, pulling the Brave token from
    /// the environment.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            providers: vec![Provider::Brave, Provider::DuckDuckGo],
            max_results: self.search.max_results,
            timeout_seconds: self.search.timeout_seconds,
            cache_ttl_seconds: self.search.cache_ttl_seconds,
            user_agent: None,
            brave_api_key: std::env::var("BRAVE_API_KEY").ok(),
        }
    }
}

fn parse_override<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| BriefError::Config(format!("cannot parse {name}={raw:?}")))
}

/// Resolve the run's "today" date (YYYY-MM-DD).
///
/// Precedence: `FEDBRIEF_TODAY` env var, then the explicit override (CLI
/// flag), then the current UTC date. Deterministic dates keep reruns and
/// cached artifacts comparable.
pub fn resolve_today(explicit: Option<&str>) -> String {
    if let Ok(env) = std::env::var("FEDBRIEF_TODAY") {
        if !env.trim().is_empty() {
            return env.trim().to_string();
        }
    }
    if let Some(value) = explicit {
        return value.to_string();
    }
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_pipeline_caps() {
        let config = RunConfig::default();
        assert_eq!(config.per_query_cap, 6);
        assert_eq!(config.run_cap, 20);
        assert_eq!(config.queries.len(), 2);
        assert!(!config.stub);
        assert_eq!(config.artifacts_dir, PathBuf::from("runs"));
    }

    #[test]
    fn default_validates() {
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_caps_rejected() {
        let mut config = RunConfig::default();
        config.per_query_cap = 0;
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.run_cap = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_query_batch_rejected() {
        let mut config = RunConfig::default();
        config.queries.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("query batch"));
    }

    #[test]
    fn toml_round_trip_with_partial_file() {
        let config = RunConfig::from_toml_str(
            r#"
            per_query_cap = 4
            run_cap = 12

            [llm]
            analyst_model = "test/analyst"
            "#,
        )
        .expect("partial TOML should parse");
        assert_eq!(config.per_query_cap, 4);
        assert_eq!(config.run_cap, 12);
        assert_eq!(config.llm.analyst_model, "test/analyst");
        // Unspecified sections keep defaults.
        assert_eq!(config.llm.factcheck_model, "moonshotai/kimi-k2:free");
        assert_eq!(config.search.max_results, 10);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = RunConfig::from_toml_str("per_query_cap = \"six\"").unwrap_err();
        assert!(matches!(err, BriefError::Config(_)));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("FEDBRIEF_ART_DIR", "/tmp/briefs"),
            ("FEDBRIEF_PER_QUERY_CAP", "3"),
            ("FEDBRIEF_RUN_CAP", "9"),
            ("FEDBRIEF_TEMPERATURE", "0.5"),
            ("FEDBRIEF_SEED", "42"),
        ]
        .into_iter()
        .collect();

        let mut config = RunConfig::default();
        config
            .apply_overrides_from(|name| env.get(name).map(|v| (*v).to_string()))
            .expect("overrides should apply");

        assert_eq!(config.artifacts_dir, PathBuf::from("/tmp/briefs"));
        assert_eq!(config.per_query_cap, 3);
        assert_eq!(config.run_cap, 9);
        assert!((config.sampling.temperature - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.sampling.seed, Some(42));
    }

    #[test]
    fn unparsable_env_override_rejected() {
        let mut config = RunConfig::default();
        let err = config
            .apply_overrides_from(|name| {
                (name == "FEDBRIEF_RUN_CAP").then(|| "twenty".to_string())
            })
            .unwrap_err();
        assert!(err.to_string().contains("FEDBRIEF_RUN_CAP"));
    }

    #[test]
    fn missing_env_leaves_defaults() {
        let mut config = RunConfig::default();
        config
            .apply_overrides_from(|_| None)
            .expect("no-op overrides");
        assert_eq!(config.per_query_cap, 6);
        assert_eq!(config.run_cap, 20);
    }

    #[test]
    fn resolve_today_prefers_explicit_without_env() {
        if std::env::var("FEDBRIEF_TODAY").is_ok() {
            return;
        }
        assert_eq!(resolve_today(Some("2025-08-23")), "2025-08-23");
    }

    #[test]
    fn resolve_today_falls_back_to_current_date() {
        if std::env::var("FEDBRIEF_TODAY").is_ok() {
            return;
        }
        let today = resolve_today(None);
        // YYYY-MM-DD shape.
        assert_eq!(today.len(), 10);
        assert_eq!(today.as_bytes()[4], b'-');
        assert_eq!(today.as_bytes()[7], b'-');
    }
}
