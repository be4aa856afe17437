//! # fedbrief
//!
//! Monitoring-first Federal Reserve policy research pipeline.
//!
//! One run walks a strictly linear sequence: collect web sources for a
//! fixed query batch (Brave primary, DuckDuckGo fallback, per query),
//! then drive three scripted generative phases — macro analyst, fact
//! checker, executive writer — over the collected material, and finally
//! consolidate the provenance trail.
//!
//! Everything observable about a run lands in flat files under the
//! artifacts directory, namespaced by run id: an append-only JSONL
//! provenance log written at discovery time, its consolidated JSON
//! export, the three phase artifacts, one audit snapshot per generative
//! call, a manifest, and a debug summary carrying every non-fatal
//! failure flag.
//!
//! Failure policy: search and generative failures degrade content and
//! raise flags; only artifact I/O failures abort a run.

pub mod aggregate;
pub mod assess;
pub mod audit;
pub mod config;
pub mod error;
pub mod format;
pub mod llm;
pub mod manifest;
pub mod pipeline;
pub mod provenance;
pub mod run;

pub use config::RunConfig;
pub use error::{BriefError, Result};
pub use pipeline::{Phase, Pipeline, PipelineOutcome};
pub use provenance::{ProvenanceLog, SourceRecord};
pub use run::RunContext;
