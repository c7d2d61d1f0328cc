//! `csearch dedup`: run the resolver and merger directly on a CSV batch.

use std::path::PathBuf;
use std::time::Instant;

use custsearch_dedup::{consolidate, load_csv_rows, AbsentKeyPolicy, ProfileConfig};
use custsearch_query::ReportConfig;

use crate::report::{render_json, render_text};
use crate::search::report_json_error;
use crate::session::SearchOutcome;
use crate::CliError;

pub fn cmd_dedup(
    input: PathBuf,
    identity: Option<String>,
    profile_path: Option<PathBuf>,
    absent_keys: Option<AbsentKeyPolicy>,
    json_output: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let result = run_dedup(input, identity, profile_path, absent_keys, json_output, output_file);
    report_json_error(json_output, result)
}

fn run_dedup(
    input: PathBuf,
    identity: Option<String>,
    profile_path: Option<PathBuf>,
    absent_keys: Option<AbsentKeyPolicy>,
    json_output: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let mut profile = match (identity, profile_path) {
        (_, Some(path)) => {
            let text = std::fs::read_to_string(&path).map_err(|e| {
                CliError::io(format!("cannot read profile {}: {e}", path.display()))
            })?;
            ProfileConfig::from_toml(&text).map_err(|e| CliError::config(e.to_string()))?
        }
        (Some(field), None) => ProfileConfig::new(field),
        (None, None) => {
            return Err(CliError::args("either --identity or --profile is required")
                .with_hint("e.g. csearch dedup rows.csv --identity NATIONAL_ID"));
        }
    };
    if let Some(policy) = absent_keys {
        profile.absent_keys = policy;
    }
    profile
        .validate()
        .map_err(|e| CliError::config(e.to_string()))?;

    let csv_data = std::fs::read_to_string(&input)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", input.display())))?;

    let started = Instant::now();
    let rows = load_csv_rows(&csv_data, &profile.absent_markers)
        .map_err(|e| CliError::data(e.to_string()))?;
    if rows.column_index(&profile.identity_field).is_none() {
        eprintln!(
            "warning: identity field '{}' is not a column of {}",
            profile.identity_field,
            input.display()
        );
    }
    let consolidation = consolidate(&profile, &rows);

    let name = input.display().to_string();
    let outcome = SearchOutcome {
        source: name.clone(),
        title: name,
        descriptions: Vec::new(),
        consolidation,
        elapsed: started.elapsed(),
    };

    let json_str = render_json(&outcome)
        .map_err(|e| CliError::internal(format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::io(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    } else {
        print!("{}", render_text(&outcome, &ReportConfig::default()));
    }

    eprintln!("{}", outcome.consolidation.summary);
    Ok(())
}
