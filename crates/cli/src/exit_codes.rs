//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                              |
//! |---------|-----------|------------------------------------------|
//! | 0       | Universal | Success                                  |
//! | 1       | Universal | General error (unspecified)              |
//! | 2       | Universal | CLI usage error (bad args)               |
//! | 3-9     | config    | Catalog / profile / file access          |
//! | 10-19   | search    | Criteria, storage and result codes       |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use custsearch_query::QueryError;

use crate::session::SessionError;
use crate::CliError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, malformed `name=value` criteria.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Config (3-9)
// =============================================================================

/// Catalog or profile failed to parse or validate.
pub const EXIT_CONFIG_INVALID: u8 = 3;

/// A file could not be read or written (catalog, CSV, output, database).
pub const EXIT_IO: u8 = 4;

// =============================================================================
// Search (10-19)
// =============================================================================

/// Search ran cleanly but matched no rows.
pub const EXIT_NO_RESULTS: u8 = 10;

/// Criteria rejected: nothing filled, unknown filter, unknown source.
pub const EXIT_SEARCH_CRITERIA: u8 = 11;

/// Storage failure (SQLite error, filter column missing from the data).
pub const EXIT_SEARCH_STORAGE: u8 = 12;

/// Stored data is malformed (bad CSV quoting, invalid UTF-8).
pub const EXIT_SEARCH_DATA: u8 = 13;

// =============================================================================
// Error mapping
// =============================================================================

/// Map a QueryError to its exit code.
pub fn query_exit_code(err: &QueryError) -> u8 {
    match err {
        QueryError::CatalogParse(_) | QueryError::CatalogValidation(_) => EXIT_CONFIG_INVALID,
        QueryError::UnknownSource { .. }
        | QueryError::UnknownFilter { .. }
        | QueryError::EmptyCriteria => EXIT_SEARCH_CRITERIA,
        QueryError::BadCriterion(_) => EXIT_USAGE,
        QueryError::MissingColumn { .. } | QueryError::Storage(_) => EXIT_SEARCH_STORAGE,
        QueryError::Data(_) => EXIT_SEARCH_DATA,
        QueryError::Io(_) => EXIT_IO,
    }
}

/// Map a SessionError to its exit code.
pub fn session_exit_code(err: &SessionError) -> u8 {
    match err {
        SessionError::NoSource => EXIT_USAGE,
        SessionError::Query(inner) => query_exit_code(inner),
    }
}

/// Machine-readable name of a QueryError, used in `--json` error output.
pub fn query_error_kind(err: &QueryError) -> &'static str {
    match err {
        QueryError::CatalogParse(_) => "catalog_parse",
        QueryError::CatalogValidation(_) => "catalog_invalid",
        QueryError::UnknownSource { .. } => "unknown_source",
        QueryError::UnknownFilter { .. } => "unknown_filter",
        QueryError::EmptyCriteria => "empty_criteria",
        QueryError::BadCriterion(_) => "bad_criterion",
        QueryError::MissingColumn { .. } => "missing_column",
        QueryError::Storage(_) => "storage",
        QueryError::Data(_) => "data",
        QueryError::Io(_) => "io",
    }
}

/// Name of an exit code, for errors that carry no more specific kind.
pub fn exit_code_name(code: u8) -> &'static str {
    match code {
        EXIT_SUCCESS => "success",
        EXIT_USAGE => "usage",
        EXIT_CONFIG_INVALID => "config_invalid",
        EXIT_IO => "io",
        EXIT_NO_RESULTS => "no_results",
        EXIT_SEARCH_CRITERIA => "search_criteria",
        EXIT_SEARCH_STORAGE => "storage",
        EXIT_SEARCH_DATA => "data",
        _ => "error",
    }
}

/// Structured error output for `--json` runs, printed to stderr so stdout
/// stays a single JSON value (or empty).
#[derive(Debug, serde::Serialize)]
pub struct ErrorOutput {
    pub error: String,
    pub message: String,
    pub exit_code: u8,
}

impl ErrorOutput {
    pub fn from_cli_error(err: &CliError) -> Self {
        Self {
            error: err.kind.unwrap_or_else(|| exit_code_name(err.code)).to_string(),
            message: err.message.clone(),
            exit_code: err.code,
        }
    }

    pub fn print(&self) {
        if let Ok(output) = serde_json::to_string(self) {
            eprintln!("{output}");
        }
    }
}
