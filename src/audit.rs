//! Audit snapshots of generative calls.
//!
//! One JSON document per call, capturing the full request and response
//! so any run's generated content can be reproduced and inspected.

use chrono::Utc;
use serde::Serialize;

use crate::config::SamplingConfig;
use crate::error::Result;
use crate::llm::ChatMessage;
use crate::run::RunPaths;

/// The persisted shape of one generative call.
#[derive(Debug, Serialize)]
struct LlmCallRecord<'a> {
    ts: chrono::DateTime<Utc>,
    run_id: &'a str,
    role: &'a str,
    provider: &'a str,
    model: &'a str,
    params: &'a SamplingConfig,
    messages: &'a [ChatMessage],
    response: &'a serde_json::Value,
}

/// Writes sequence-numbered audit snapshots for a run.
#[derive(Debug)]
pub struct AuditLog {
    run_id: String,
    seq: u32,
}

impl AuditLog {
    /// Create an audit log for a run.
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            seq: 0,
        }
    }

    /// Persist a complete snapshot of one generative call.
    ///
    /// Returns the snapshot path. Failing to write is an I/O error and
    /// therefore fatal to the run.
    #[allow(clippy::too_many_arguments)]
    pub fn save_llm_call(
        &mut self,
        paths: &RunPaths,
        role: &str,
        provider: &str,
        model: &str,
        params: &SamplingConfig,
        messages: &[ChatMessage],
        response: &serde_json::Value,
    ) -> Result<std::path::PathBuf> {
        self.seq += 1;
        let record = LlmCallRecord {
            ts: Utc::now(),
            run_id: &self.run_id,
            role,
            provider,
            model,
            params,
            messages,
            response,
        };
        let path = paths.llm_snapshot(role, self.seq);
        std::fs::write(&path, serde_json::to_string_pretty(&record)?)?;
        tracing::info!(role, path = %path.display(), "llm call audited");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::RunContext;

    #[test]
    fn snapshots_capture_request_and_response() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = RunContext::with_run_id("audit1", dir.path());
        let mut audit = AuditLog::new("audit1");

        let messages = vec![
            ChatMessage::system("sys"),
            ChatMessage::user("check these notes"),
        ];
        let response = serde_json::json!({ "choices": [] });

        let path = audit
            .save_llm_call(
                &ctx.paths,
                "FactChecker",
                "stub",
                "test/model",
                &SamplingConfig::default(),
                &messages,
                &response,
            )
            .expect("save");

        let text = std::fs::read_to_string(&path).expect("read snapshot");
        let value: serde_json::Value = serde_json::from_str(&text).expect("parse");
        assert_eq!(value["run_id"], "audit1");
        assert_eq!(value["role"], "FactChecker");
        assert_eq!(value["model"], "test/model");
        assert_eq!(value["messages"][1]["content"], "check these notes");
        assert!(value["response"]["choices"].is_array());
    }

    #[test]
    fn repeated_calls_get_distinct_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = RunContext::with_run_id("audit2", dir.path());
        let mut audit = AuditLog::new("audit2");
        let response = serde_json::json!({});

        let first = audit
            .save_llm_call(
                &ctx.paths,
                "MacroAnalyst",
                "stub",
                "m",
                &SamplingConfig::default(),
                &[],
                &response,
            )
            .expect("save");
        let second = audit
            .save_llm_call(
                &ctx.paths,
                "MacroAnalyst",
                "stub",
                "m",
                &SamplingConfig::default(),
                &[],
                &response,
            )
            .expect("save");

        assert_ne!(first, second);
        assert!(first.exists());
        assert!(second.exists());
    }
}
