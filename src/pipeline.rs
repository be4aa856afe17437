//! Pipeline orchestration: the linear phase machine.
//!
//! One run walks `Init → Collecting → Analyzing → FactChecking → Writing
//! → Finalizing → Done` with no branching and no retries beyond the
//! per-query provider fallback inside Collecting. Generative failures
//! degrade a phase to placeholder content and a flag; only artifact I/O
//! failures abort. Finalizing always runs and always emits the debug
//! summary.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::aggregate::{self, AggregateCaps, SourceSearcher};
use crate::assess::assess_source_sufficiency;
use crate::audit::AuditLog;
use crate::config::RunConfig;
use crate::error::{BriefError, Result};
use crate::format::format_source_blocks;
use crate::llm::{ChatClient, ChatMessage, ChatRequest};
use crate::manifest::write_manifest;
use crate::provenance::ProvenanceLog;
use crate::run::RunContext;

/// The pipeline's phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Config validation, artifact directory, manifest.
    Init,
    /// Search aggregation and source formatting.
    Collecting,
    /// Macro-analyst generative call.
    Analyzing,
    /// Fact-check generative call plus sufficiency assessment.
    FactChecking,
    /// Executive-writer generative call.
    Writing,
    /// Provenance consolidation and debug summary.
    Finalizing,
    /// Terminal state.
    Done,
}

impl Phase {
    /// The phase that legally follows this one.
    pub fn next(self) -> Option<Phase> {
        match self {
            Self::Init => Some(Self::Collecting),
            Self::Collecting => Some(Self::Analyzing),
            Self::Analyzing => Some(Self::FactChecking),
            Self::FactChecking => Some(Self::Writing),
            Self::Writing => Some(Self::Finalizing),
            Self::Finalizing => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Lowercase phase name for logs and the debug summary.
    pub fn name(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Collecting => "collecting",
            Self::Analyzing => "analyzing",
            Self::FactChecking => "fact_checking",
            Self::Writing => "writing",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The debug summary emitted at finalisation.
#[derive(Debug, Serialize)]
struct DebugSummary<'a> {
    run_id: &'a str,
    phase_reached: &'static str,
    search_results_found: usize,
    consolidated_sources: usize,
    sources_log: String,
    sources_file: String,
    macro_notes_file: String,
    factcheck_file: String,
    brief_file: String,
    flags: &'a [String],
}

/// What a completed run hands back to the caller.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// The run identifier.
    pub run_id: String,
    /// Path of the executive brief.
    pub brief_path: PathBuf,
    /// Path of the debug summary.
    pub debug_path: PathBuf,
    /// Number of aggregated source records.
    pub source_count: usize,
    /// All accumulated non-fatal failure flags.
    pub flags: Vec<String>,
}

/// One pipeline execution over injected search and chat backends.
pub struct Pipeline<'a> {
    config: &'a RunConfig,
    today: String,
    ctx: RunContext,
    client: &'a dyn ChatClient,
    searcher: &'a dyn SourceSearcher,
    audit: AuditLog,
    phase: Phase,
    flags: Vec<String>,
}

impl<'a> Pipeline<'a> {
    /// Assemble a pipeline for one run.
    pub fn new(
        config: &'a RunConfig,
        today: String,
        ctx: RunContext,
        client: &'a dyn ChatClient,
        searcher: &'a dyn SourceSearcher,
    ) -> Self {
        let audit = AuditLog::new(ctx.run_id.clone());
        Self {
            config,
            today,
            ctx,
            client,
            searcher,
            audit,
            phase: Phase::Init,
            flags: Vec::new(),
        }
    }

    /// Execute the run to completion.
    pub async fn run(mut self) -> Result<PipelineOutcome> {
        tracing::info!(run_id = %self.ctx.run_id, today = %self.today, "pipeline starting");

        // Init
        self.config.validate()?;
        std::fs::create_dir_all(self.ctx.paths.dir())?;
        write_manifest(&self.ctx.paths, &self.ctx.run_id)?;

        // Collecting
        self.advance(Phase::Collecting)?;
        let log = ProvenanceLog::new(self.ctx.paths.sources_log());
        let caps = AggregateCaps {
            per_query: self.config.per_query_cap,
            run: self.config.run_cap,
        };
        let collected =
            aggregate::collect_sources(&self.config.queries, caps, self.searcher, &log).await?;
        self.flags.extend(collected.flags.iter().cloned());
        let sources_block = format_source_blocks(&collected.records);

        // Analyzing
        self.advance(Phase::Analyzing)?;
        let notes = self.analyst_phase(&sources_block).await?;

        // FactChecking
        self.advance(Phase::FactChecking)?;
        let fact_text = self
            .factcheck_phase(&notes, &sources_block, &collected.records)
            .await?;

        // Writing
        self.advance(Phase::Writing)?;
        self.writer_phase(&notes, &fact_text).await?;

        // Finalizing — always reached unless an artifact write failed above.
        self.advance(Phase::Finalizing)?;
        let consolidated = log.consolidate(&self.ctx.paths.sources_consolidated())?;
        let summary = DebugSummary {
            run_id: &self.ctx.run_id,
            phase_reached: Phase::Done.name(),
            search_results_found: collected.records.len(),
            consolidated_sources: consolidated.len(),
            sources_log: self.ctx.paths.sources_log().display().to_string(),
            sources_file: self.ctx.paths.sources_consolidated().display().to_string(),
            macro_notes_file: self.ctx.paths.macro_notes().display().to_string(),
            factcheck_file: self.ctx.paths.factcheck().display().to_string(),
            brief_file: self.ctx.paths.brief().display().to_string(),
            flags: &self.flags,
        };
        std::fs::write(
            self.ctx.paths.debug(),
            serde_json::to_string_pretty(&summary)?,
        )?;

        self.advance(Phase::Done)?;
        tracing::info!(
            run_id = %self.ctx.run_id,
            sources = collected.records.len(),
            flags = self.flags.len(),
            "pipeline finished"
        );

        Ok(PipelineOutcome {
            run_id: self.ctx.run_id.clone(),
            brief_path: self.ctx.paths.brief(),
            debug_path: self.ctx.paths.debug(),
            source_count: collected.records.len(),
            flags: self.flags,
        })
    }

    /// Move to the next phase, rejecting anything non-linear.
    fn advance(&mut self, to: Phase) -> Result<()> {
        if self.phase.next() != Some(to) {
            return Err(BriefError::Pipeline(format!(
                "illegal phase transition {} -> {to}",
                self.phase
            )));
        }
        tracing::info!(from = %self.phase, to = %to, "phase transition");
        self.phase = to;
        Ok(())
    }

    /// Run one generative call: audit it, and turn an LLM failure into
    /// `None` (the caller substitutes placeholder content and flags it).
    async fn generate(
        &mut self,
        role: &str,
        model: &str,
        max_tokens: u32,
        messages: Vec<ChatMessage>,
    ) -> Result<Option<String>> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: messages.clone(),
            max_tokens,
            temperature: self.config.sampling.temperature,
            top_p: self.config.sampling.top_p,
            seed: self.config.sampling.seed,
        };

        match self.client.complete(&request).await {
            Ok(completion) => {
                self.audit.save_llm_call(
                    &self.ctx.paths,
                    role,
                    self.client.provider(),
                    model,
                    &self.config.sampling,
                    &messages,
                    &completion.raw,
                )?;
                Ok(Some(completion.content))
            }
            Err(BriefError::Llm(reason)) => {
                tracing::warn!(role, reason = %reason, "generative call failed");
                let failure = serde_json::json!({ "error": reason });
                self.audit.save_llm_call(
                    &self.ctx.paths,
                    role,
                    self.client.provider(),
                    model,
                    &self.config.sampling,
                    &messages,
                    &failure,
                )?;
                Ok(None)
            }
            Err(other) => Err(other),
        }
    }

    /// Macro-analyst phase: summarise the policy stance from the live
    /// source block.
    async fn analyst_phase(&mut self, sources_block: &str) -> Result<String> {
        let messages = vec![
            ChatMessage::system(
                "You are a macro analyst. Use ONLY the sources provided under the 'Context' \
                 section. Do NOT mention training data or knowledge cutoff. If the context is \
                 insufficient to answer, respond with EXACTLY: INSUFFICIENT_SOURCES.",
            ),
            ChatMessage::user(format!(
                "Task: Summarize the Federal Reserve's current policy stance as of {}.\n\n\
                 Output:\n\
                 1) One-paragraph bottom line.\n\
                 2) 3-5 bullet drivers (inflation, labor, growth, financial conditions).\n\
                 3) Cite sources inline with [#] indices that match the Context list.\n\n\
                 Context:\n{sources_block}",
                self.today
            )),
        ];

        let model = self.config.llm.analyst_model.clone();
        let max_tokens = self.config.llm.analyst_max_tokens;
        let notes = match self.generate("MacroAnalyst", &model, max_tokens, messages).await? {
            Some(text) => text,
            None => {
                self.flags.push("analyst_failed".to_string());
                "(analyst notes unavailable: generative call failed)".to_string()
            }
        };

        std::fs::write(self.ctx.paths.macro_notes(), &notes)?;
        tracing::info!(path = %self.ctx.paths.macro_notes().display(), "analyst notes written");
        Ok(notes)
    }

    /// Fact-check phase: validate the notes against the collected
    /// sources, with the sufficiency assessment contributing advisory
    /// flags.
    async fn factcheck_phase(
        &mut self,
        notes: &str,
        sources_block: &str,
        records: &[crate::provenance::SourceRecord],
    ) -> Result<String> {
        let messages = vec![
            ChatMessage::system(
                "You are a meticulous fact checker. Validate the claims in the provided notes \
                 against the collected sources. For each claim, state whether it is supported, \
                 contradicted, or not found in the sources, and reference the source(s).",
            ),
            ChatMessage::user(format!(
                "Check these notes (as of {}):\n\n{notes}\n\nCollected sources:\n{sources_block}",
                self.today
            )),
        ];

        let model = self.config.llm.factcheck_model.clone();
        let max_tokens = self.config.llm.factcheck_max_tokens;
        let mut phase_flags = assess_source_sufficiency(notes, records);
        let text = match self.generate("FactChecker", &model, max_tokens, messages).await? {
            Some(text) => text,
            None => {
                phase_flags.push("factcheck_failed".to_string());
                "(fact check unavailable: generative call failed)".to_string()
            }
        };

        let artifact = serde_json::json!({ "text": text, "flags": phase_flags });
        std::fs::write(
            self.ctx.paths.factcheck(),
            serde_json::to_string_pretty(&artifact)?,
        )?;
        tracing::info!(path = %self.ctx.paths.factcheck().display(), "fact check written");

        self.flags.extend(phase_flags);
        Ok(text)
    }

    /// Executive-writer phase: produce the brief, disclosing limitations
    /// whenever any earlier phase raised flags.
    async fn writer_phase(&mut self, notes: &str, fact_text: &str) -> Result<()> {
        let payload = serde_json::json!({
            "date": self.today,
            "analyst": notes,
            "fact_check": fact_text,
            "flags": self.flags,
        });
        let messages = vec![
            ChatMessage::system(
                "You write concise executive briefs with a methodology box. When the input \
                 carries failure flags, include a 'Methodology & Limitations' section that \
                 discloses them plainly.",
            ),
            ChatMessage::user(payload.to_string()),
        ];

        let model = self.config.llm.writer_model.clone();
        let max_tokens = self.config.llm.writer_max_tokens;
        let brief = match self.generate("ExecutiveWriter", &model, max_tokens, messages).await? {
            Some(text) => text,
            None => {
                self.flags.push("writer_failed".to_string());
                format!(
                    "# Federal Reserve Policy Brief — {}\n\n\
                     (brief unavailable: generative call failed)\n\n\
                     ## Methodology & Limitations\n\
                     - The executive-writer call failed; see the debug summary for flags.\n",
                    self.today
                )
            }
        };

        std::fs::write(self.ctx.paths.brief(), &brief)?;
        tracing::info!(path = %self.ctx.paths.brief().display(), "brief written");
        Ok(())
    }
}
