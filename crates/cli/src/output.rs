//! Plain-text rendering of search outcomes and source listings.

use std::fmt::Write;

use turok_core::searcher::SourceStatus;
use turok_core::{SearchDiagnostics, SearchOutcome, SourceInfo, TorrentRecord};

const TITLE_WIDTH: usize = 60;

/// Ranked results as a numbered table, followed by the source summary.
pub fn render_outcome(outcome: &SearchOutcome) -> String {
    let mut out = String::new();

    if outcome.records.is_empty() {
        let _ = writeln!(out, "No results for \"{}\".", outcome.query.query);
    } else {
        let _ = writeln!(
            out,
            "{:>3}  {:<width$}  {:>10}  {:>6}  {:>6}  {:<9}  {}",
            "#",
            "Title",
            "Size",
            "Seed",
            "Leech",
            "Health",
            "Source",
            width = TITLE_WIDTH
        );
        for (i, record) in outcome.records.iter().enumerate() {
            let _ = writeln!(out, "{}", render_row(i + 1, record));
        }
    }

    let _ = writeln!(out);
    out.push_str(&render_diagnostics(&outcome.diagnostics));
    let _ = writeln!(out, "({} ms)", outcome.duration_ms);
    out
}

fn render_row(index: usize, record: &TorrentRecord) -> String {
    format!(
        "{:>3}  {:<width$}  {:>10}  {:>6}  {:>6}  {:<9}  {}",
        index,
        truncate(&record.title, TITLE_WIDTH),
        record.size_formatted(),
        record.seeders,
        record.leechers,
        record.health().to_string(),
        record.source,
        width = TITLE_WIDTH
    )
}

/// The outcome as pretty JSON. A resolved magnet goes in a top-level
/// `magnet` field so stdout stays one JSON document.
pub fn render_json(outcome: &SearchOutcome, magnet: Option<&str>) -> serde_json::Result<String> {
    let mut value = serde_json::to_value(outcome)?;
    if let (Some(magnet), Some(fields)) = (magnet, value.as_object_mut()) {
        fields.insert("magnet".to_string(), magnet.into());
    }
    serde_json::to_string_pretty(&value)
}

/// One line per source: how many records it returned or why it failed.
pub fn render_diagnostics(diagnostics: &SearchDiagnostics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Sources: {}", diagnostics);
    for source in &diagnostics.sources {
        let _ = match &source.status {
            SourceStatus::Ok { records } => writeln!(
                out,
                "  {:<14} ok       {:>3} results  {:>6} ms",
                source.source.as_str(),
                records,
                source.elapsed_ms
            ),
            SourceStatus::Failed { kind, message } => writeln!(
                out,
                "  {:<14} {:<8} {}",
                source.source.as_str(),
                kind.to_string(),
                message
            ),
        };
    }
    out
}

/// Source listing for `turok sites`.
pub fn render_sources(sources: &[SourceInfo]) -> String {
    let mut out = String::new();
    for source in sources {
        let _ = writeln!(
            out,
            "{:<14} {:<8} {}",
            source.tag.as_str(),
            if source.enabled { "enabled" } else { "disabled" },
            source.base_url
        );
    }
    out
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}
