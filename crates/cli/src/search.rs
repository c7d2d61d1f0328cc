//! `csearch search` and `csearch validate`: catalog-driven lookups.

use std::path::{Path, PathBuf};

use custsearch_query::{Catalog, Criteria, StorageConfig};

use crate::exit_codes::{ErrorOutput, EXIT_NO_RESULTS};
use crate::report::{render_json, render_text};
use crate::session::{SearchSession, SessionError};
use crate::CliError;

/// Read and validate a catalog. Returns it with the directory its storage
/// paths are relative to.
pub(crate) fn load_catalog(path: &Path) -> Result<(Catalog, PathBuf), CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read catalog {}: {e}", path.display())))?;
    let catalog = Catalog::from_toml(&text).map_err(|e| CliError::config(e.to_string()))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
    Ok((catalog, base_dir))
}

/// With `--json`, echo a failure to stderr as one JSON object. A search
/// with no matches already printed its (empty) result to stdout.
pub(crate) fn report_json_error(json_output: bool, result: Result<(), CliError>) -> Result<(), CliError> {
    if let Err(err) = &result {
        if json_output && err.code != EXIT_NO_RESULTS {
            ErrorOutput::from_cli_error(err).print();
        }
    }
    result
}

pub fn cmd_search(
    catalog_path: PathBuf,
    source: String,
    filters: Vec<String>,
    json_output: bool,
    output_file: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let result = run_search(catalog_path, source, filters, json_output, output_file, quiet);
    report_json_error(json_output, result)
}

fn run_search(
    catalog_path: PathBuf,
    source: String,
    filters: Vec<String>,
    json_output: bool,
    output_file: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let criteria = filters
        .iter()
        .map(|raw| Criteria::parse_pair(raw))
        .collect::<Result<Criteria, _>>()
        .map_err(|e| CliError::session(SessionError::Query(e)))?;

    let (catalog, base_dir) = load_catalog(&catalog_path)?;
    let report_config = catalog.source(&source).map(|s| s.report.clone()).unwrap_or_default();

    let mut session = SearchSession::new(catalog, &base_dir);
    session.select(&source).map_err(CliError::session)?;
    let outcome = session.search(&criteria).map_err(CliError::session)?;

    let json_str = render_json(outcome)
        .map_err(|e| CliError::internal(format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::io(format!("cannot write output: {e}")))?;
        if !quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if json_output {
        println!("{json_str}");
    } else {
        print!("{}", render_text(outcome, &report_config));
    }

    // Human summary to stderr
    let s = &outcome.consolidation.summary;
    if !quiet {
        eprintln!(
            "{} row(s) found in {:.2}s; {} after removing duplicates; {} record(s)",
            s.raw_rows,
            outcome.elapsed.as_secs_f64(),
            s.resolved_rows,
            s.consolidated_records,
        );
    }

    if s.raw_rows == 0 {
        return Err(CliError::no_results());
    }
    Ok(())
}

pub fn cmd_validate(catalog_path: PathBuf) -> Result<(), CliError> {
    let (catalog, base_dir) = load_catalog(&catalog_path)?;

    for (name, source) in &catalog.sources {
        let filters: Vec<&str> = source.filters.iter().map(|f| f.name.as_str()).collect();
        println!(
            "{name}: {} [{}] identity={} filters={}",
            source.display_title(name),
            source.storage,
            source.profile.identity_field,
            filters.join(","),
        );
        let path = base_dir.join(source.storage.path());
        if !path.exists() {
            let kind = match source.storage {
                StorageConfig::Sqlite { .. } => "database",
                StorageConfig::Csv { .. } => "CSV file",
            };
            eprintln!("warning: {name}: {kind} {} does not exist", path.display());
        }
    }

    eprintln!("catalog OK: {} source(s)", catalog.sources.len());
    Ok(())
}
