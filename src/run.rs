//! Run identity and artifact path management.
//!
//! Every pipeline execution gets a run id; every artifact filename is
//! derived from it in one place so concurrent runs sharing an artifacts
//! directory never collide.

use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Identity of one pipeline execution.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// The run identifier prefixing every artifact filename.
    pub run_id: String,
    /// Artifact path helpers for this run.
    pub paths: RunPaths,
}

impl RunContext {
    /// Create a context with a fresh run id.
    ///
    /// Honours a `RUN_ID` environment override (useful for reproducing a
    /// run's file namespace); otherwise uses the first 8 characters of a
    /// v4 UUID.
    pub fn new(artifacts_dir: &Path) -> Self {
        let run_id = std::env::var("RUN_ID")
            .ok()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string()[..8].to_string());
        Self::with_run_id(run_id, artifacts_dir)
    }

    /// Create a context with an explicit run id.
    pub fn with_run_id(run_id: impl Into<String>, artifacts_dir: &Path) -> Self {
        let run_id = run_id.into();
        let paths = RunPaths {
            run_id: run_id.clone(),
            artifacts_dir: artifacts_dir.to_path_buf(),
        };
        Self { run_id, paths }
    }
}

/// All artifact filenames for a run, derived in one place.
#[derive(Debug, Clone)]
pub struct RunPaths {
    run_id: String,
    artifacts_dir: PathBuf,
}

impl RunPaths {
    /// The artifacts directory for this run.
    pub fn dir(&self) -> &Path {
        &self.artifacts_dir
    }

    /// Run metadata manifest.
    pub fn manifest(&self) -> PathBuf {
        self.named("manifest.json")
    }

    /// Append-only provenance log (line-delimited JSON).
    pub fn sources_log(&self) -> PathBuf {
        self.named("sources.jsonl")
    }

    /// Consolidated provenance document (single JSON array).
    pub fn sources_consolidated(&self) -> PathBuf {
        self.named("sources.json")
    }

    /// Macro-analyst notes (Markdown).
    pub fn macro_notes(&self) -> PathBuf {
        self.named("macro.notes.md")
    }

    /// Fact-check results and flags (JSON).
    pub fn factcheck(&self) -> PathBuf {
        self.named("factcheck.json")
    }

    /// Final executive brief (Markdown).
    pub fn brief(&self) -> PathBuf {
        self.named("brief.md")
    }

    /// Finalisation debug summary (JSON).
    pub fn debug(&self) -> PathBuf {
        self.named("debug.json")
    }

    /// Audit snapshot for one generative call.
    ///
    /// `seq` keeps repeated calls by the same role distinct.
    pub fn llm_snapshot(&self, role: &str, seq: u32) -> PathBuf {
        self.named(&format!("{role}.{seq}.llm.json"))
    }

    fn named(&self, suffix: &str) -> PathBuf {
        self.artifacts_dir.join(format!("{}.{suffix}", self.run_id))
    }
}
