//! Rendering collected sources into prompt context blocks.
//!
//! Pure and deterministic: the same record slice always renders the same
//! text, and rendering has no side effects.

use std::collections::HashMap;

use crate::provenance::SourceRecord;

/// Maximum snippet length in the rendered block, in characters.
const SNIPPET_CHARS: usize = 200;

/// Render records as one text block per originating query.
///
/// Queries appear in order of their first record; within a group the
/// records keep discovery order and are enumerated from 1. An empty
/// record set renders a fixed marker so prompts can state that no
/// sources were collected.
pub fn format_source_blocks(records: &[SourceRecord]) -> String {
    if records.is_empty() {
        return "(no sources collected)".to_string();
    }

    let mut query_order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&SourceRecord>> = HashMap::new();
    for record in records {
        let entry = groups.entry(record.query.as_str()).or_default();
        if entry.is_empty() {
            query_order.push(record.query.as_str());
        }
        entry.push(record);
    }

    let mut lines: Vec<String> = Vec::new();
    for query in query_order {
        lines.push(format!("Search Query: {query}"));
        for (i, record) in groups[query].iter().enumerate() {
            let title = if record.title.is_empty() {
                "(no title)"
            } else {
                record.title.as_str()
            };
            lines.push(format!("  [{}] {title}", i + 1));
            lines.push(format!("      URL: {}", record.url));
            lines.push(format!(
                "      Snippet: {}",
                truncate_chars(&record.snippet, SNIPPET_CHARS)
            ));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Truncate to at most `max` characters on a char boundary, marking the
/// cut with an ellipsis.
fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max).collect();
    format!("{truncated}...")
}
