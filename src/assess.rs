//! Source-sufficiency heuristics.
//!
//! Advisory only: the flags raised here tell the writer to disclose
//! limitations, they never stop the pipeline.

use crate::provenance::SourceRecord;

/// Assess whether the collected sources can plausibly back the analyst's
/// claims.
///
/// Heuristic, not a citation checker: no sources at all is
/// `sources_missing`; sources with empty analyst notes (or the reverse)
/// is `sources_incomplete`; otherwise no flags.
pub fn assess_source_sufficiency(analyst_notes: &str, sources: &[SourceRecord]) -> Vec<String> {
    if sources.is_empty() {
        return vec!["sources_missing".to_string()];
    }
    if analyst_notes.trim().is_empty() {
        return vec!["sources_incomplete".to_string()];
    }
    Vec::new()
}
