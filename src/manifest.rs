//! Run manifest: environment metadata captured at pipeline start.

use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::Result;
use crate::run::RunPaths;

/// The persisted manifest shape.
#[derive(Debug, Serialize)]
struct Manifest<'a> {
    run_id: &'a str,
    version: &'static str,
    git_rev: String,
    os: &'static str,
    arch: &'static str,
    env_flags: BTreeMap<String, String>,
    ts: chrono::DateTime<Utc>,
}

/// Write the run manifest artifact.
///
/// Captures the crate version, a best-effort git revision, the platform,
/// and every `FEDBRIEF_*` environment flag so a run's inputs can be
/// reconstructed later.
pub fn write_manifest(paths: &RunPaths, run_id: &str) -> Result<PathBuf> {
    let manifest = Manifest {
        run_id,
        version: env!("CARGO_PKG_VERSION"),
        git_rev: git_rev(),
        os: std::env::consts::OS,
        arch: std::env::consts::ARCH,
        env_flags: env_flags("FEDBRIEF_"),
        ts: Utc::now(),
    };

    let path = paths.manifest();
    std::fs::write(&path, serde_json::to_string_pretty(&manifest)?)?;
    tracing::info!(path = %path.display(), "manifest written");
    Ok(path)
}

/// Collect environment variables with the given prefix, sorted by name.
fn env_flags(prefix: &str) -> BTreeMap<String, String> {
    std::env::vars()
        .filter(|(name, _)| name.starts_with(prefix))
        .collect()
}

/// Short git revision of the working tree, or `"nogit"`.
fn git_rev() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|rev| !rev.is_empty())
        .unwrap_or_else(|| "nogit".to_string())
}
