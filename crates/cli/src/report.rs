//! Text and JSON rendering of a search outcome.

use serde::Serialize;

use custsearch_dedup::{ConsolidatedRecord, Consolidation};
use custsearch_query::ReportConfig;

use crate::session::SearchOutcome;
use crate::util::{display_width, pad_right};

/// Plain-text report: title, criteria, statistics, then one numbered block
/// per consolidated record.
pub fn render_text(outcome: &SearchOutcome, report: &ReportConfig) -> String {
    let mut out = String::new();
    let summary = &outcome.consolidation.summary;

    out.push_str(&format!("Records found in {}\n", outcome.title));
    if !outcome.descriptions.is_empty() {
        out.push_str(&format!("for \"{}\"\n", outcome.descriptions.join(", ")));
    }
    out.push_str(&format!(
        "{} row(s) found, {} record(s) after removing duplicates and merging records\n",
        summary.raw_rows, summary.consolidated_records
    ));

    for (n, record) in outcome.consolidation.records.iter().enumerate() {
        out.push('\n');
        out.push_str(&format!("{}.\n", n + 1));
        let lines = record_lines(record, report);
        let width = lines.iter().map(|(l, _)| display_width(l)).max().unwrap_or(0);
        for (label, value) in lines {
            out.push_str(&format!("  {}: {}\n", pad_right(&label, width), value));
        }
    }

    out
}

/// `(label, value)` for every present field of `record`, in report order.
/// Indexed variants read `Label 2`, `Label 3`, ...
fn record_lines(record: &ConsolidatedRecord, report: &ReportConfig) -> Vec<(String, String)> {
    let order: Vec<String> = if report.fields.is_empty() {
        let mut names: Vec<String> = Vec::new();
        for f in &record.fields {
            if !names.contains(&f.field) {
                names.push(f.field.clone());
            }
        }
        names
    } else {
        report.fields.clone()
    };

    let mut lines = Vec::new();
    for field in &order {
        let label = report.label_for(field);
        for entry in record.variants(field) {
            let Some(text) = entry.value.as_text() else {
                continue;
            };
            let label = if entry.is_variant() {
                format!("{label} {}", entry.ordinal)
            } else {
                label.to_string()
            };
            lines.push((label, text.into_owned()));
        }
    }
    lines
}

#[derive(Serialize)]
struct JsonReport<'a> {
    source: &'a str,
    title: &'a str,
    criteria: &'a [String],
    elapsed_ms: u128,
    #[serde(flatten)]
    consolidation: &'a Consolidation,
}

/// JSON report: the consolidation (meta, summary, records) plus the source
/// and criteria it came from.
pub fn render_json(outcome: &SearchOutcome) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonReport {
        source: &outcome.source,
        title: &outcome.title,
        criteria: &outcome.descriptions,
        elapsed_ms: outcome.elapsed.as_millis(),
        consolidation: &outcome.consolidation,
    })
}
