use crate::config::ProfileConfig;
use crate::error::DedupError;
use crate::merge::merge_with_policy;
use crate::model::{Consolidation, ConsolidationMeta, RowSet, Value};
use crate::resolve::resolve_detailed;
use crate::summary::compute_summary;

/// Resolve then merge a row batch per profile. Returns the consolidated
/// records plus reduction statistics.
pub fn consolidate(profile: &ProfileConfig, batch: &RowSet) -> Consolidation {
    let identity_field = profile.identity_field.as_str();

    let resolution = resolve_detailed(batch, identity_field, profile.absent_keys);
    let records = merge_with_policy(&resolution.rows, identity_field, profile.absent_keys);
    let summary = compute_summary(batch.len(), &resolution, &records);

    log::info!("profile '{}': {}", profile.name, summary);

    Consolidation {
        meta: ConsolidationMeta {
            profile_name: profile.name.clone(),
            identity_field: profile.identity_field.clone(),
            absent_keys: profile.absent_keys,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        records,
    }
}

/// Load CSV text into a [`RowSet`]. The header row names the columns; each
/// cell equal to one of `absent_markers` becomes `Absent`. Ragged records
/// are padded or truncated to the header width.
pub fn load_csv_rows(csv_data: &str, absent_markers: &[String]) -> Result<RowSet, DedupError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let mut batch = RowSet::new(headers);

    for record in reader.records() {
        let record = record?;
        let values = record
            .iter()
            .map(|cell| Value::from_text(cell, absent_markers))
            .collect();
        batch.push(values);
    }

    Ok(batch)
}
