// csearch - customer record search with duplicate removal and merging

mod dedup;
mod exit_codes;
mod report;
mod search;
mod session;
mod shell;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use custsearch_dedup::AbsentKeyPolicy;

use exit_codes::{
    query_error_kind, session_exit_code, EXIT_CONFIG_INVALID, EXIT_ERROR, EXIT_IO,
    EXIT_NO_RESULTS, EXIT_SEARCH_DATA, EXIT_SUCCESS, EXIT_USAGE,
};
use session::SessionError;

#[derive(Parser)]
#[command(name = "csearch")]
#[command(about = "Search customer records across sources, removing duplicates and merging partial records")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search one catalog source and print the consolidated records
    #[command(after_help = "\
Examples:
  csearch search catalog.toml --source bank_a --filter name=Karimi
  csearch search catalog.toml -s bank_a -f name=Ali -f birth=1365 --json
  csearch search catalog.toml -s bank_a -f city=Tehran --output result.json")]
    Search {
        /// Path to the catalog TOML
        #[arg(env = "CSEARCH_CATALOG")]
        catalog: PathBuf,

        /// Source name as listed in the catalog
        #[arg(long, short = 's')]
        source: String,

        /// Filter value as name=value (repeatable; blank values are ignored)
        #[arg(long = "filter", short = 'f', value_name = "NAME=VALUE")]
        filters: Vec<String>,

        /// Output JSON to stdout instead of the text report
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Suppress the summary on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Remove duplicates and merge records of a CSV file
    #[command(after_help = "\
Examples:
  csearch dedup rows.csv --identity NATIONAL_ID
  csearch dedup rows.csv --profile bank_a.profile.toml --json
  csearch dedup rows.csv --identity FULL_NAME --absent-keys group")]
    Dedup {
        /// CSV file with a header row
        input: PathBuf,

        /// Column that identifies a person
        #[arg(long, conflicts_with = "profile", required_unless_present = "profile")]
        identity: Option<String>,

        /// Profile TOML (identity_field, absent_keys, absent_markers)
        #[arg(long)]
        profile: Option<PathBuf>,

        /// How rows without an identity value are grouped
        #[arg(long, value_enum)]
        absent_keys: Option<AbsentKeys>,

        /// Output JSON to stdout instead of the text report
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a catalog without searching
    Validate {
        /// Path to the catalog TOML
        #[arg(env = "CSEARCH_CATALOG")]
        catalog: PathBuf,
    },

    /// Interactive search over a catalog (reads commands from stdin)
    Shell {
        /// Path to the catalog TOML
        #[arg(env = "CSEARCH_CATALOG")]
        catalog: PathBuf,

        /// Source to select on start
        #[arg(long, short = 's')]
        source: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum AbsentKeys {
    /// Every row without an identity value stands alone
    Isolate,
    /// Rows without an identity value are compared and merged together
    Group,
}

impl From<AbsentKeys> for AbsentKeyPolicy {
    fn from(value: AbsentKeys) -> Self {
        match value {
            AbsentKeys::Isolate => AbsentKeyPolicy::Isolate,
            AbsentKeys::Group => AbsentKeyPolicy::Group,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Search { catalog, source, filters, json, output, quiet } => {
            search::cmd_search(catalog, source, filters, json, output, quiet)
        }
        Commands::Dedup { input, identity, profile, absent_keys, json, output } => {
            dedup::cmd_dedup(input, identity, profile, absent_keys.map(Into::into), json, output)
        }
        Commands::Validate { catalog } => search::cmd_validate(catalog),
        Commands::Shell { catalog, source } => shell::cmd_shell(catalog, source),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint, .. }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
    /// Machine-readable name for `--json` error output. Falls back to the
    /// exit code's name when unset.
    pub kind: Option<&'static str>,
}

impl CliError {
    fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None, kind: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_IO, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG_INVALID, msg)
    }

    pub fn data(msg: impl Into<String>) -> Self {
        Self::new(EXIT_SEARCH_DATA, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    pub fn no_results() -> Self {
        Self::new(EXIT_NO_RESULTS, "no records found")
    }

    /// Create error from session error with proper exit code.
    pub fn session(err: SessionError) -> Self {
        let hint = match &err {
            SessionError::NoSource => Some("select a source first".to_string()),
            SessionError::Query(custsearch_query::QueryError::EmptyCriteria) => {
                Some("pass at least one --filter name=value".to_string())
            }
            SessionError::Query(custsearch_query::QueryError::UnknownFilter { .. }) => {
                Some("run `csearch validate <catalog>` to list filters".to_string())
            }
            _ => None,
        };
        let kind = match &err {
            SessionError::NoSource => "no_source",
            SessionError::Query(inner) => query_error_kind(inner),
        };
        Self {
            code: session_exit_code(&err),
            message: err.to_string(),
            hint,
            kind: Some(kind),
        }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
