//! Search session: the application state behind `csearch search` and
//! `csearch shell`.
//!
//! A session owns the catalog, the handle of the currently selected source
//! and the outcome of the last search on it. Selecting a source opens a new
//! handle and discards the previous one together with its last outcome.
//! Nothing here is global; the session lives as long as the command does.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use custsearch_dedup::{consolidate, Consolidation};
use custsearch_query::{open_source, plan, Catalog, Criteria, QueryError, RowSource, SourceConfig};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum SessionError {
    /// `search` called before any source was selected.
    NoSource,
    Query(QueryError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSource => write!(f, "no source selected"),
            Self::Query(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<QueryError> for SessionError {
    fn from(err: QueryError) -> Self {
        Self::Query(err)
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Everything one search produced, ready for rendering.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub source: String,
    pub title: String,
    /// One human-readable line per filled criterion.
    pub descriptions: Vec<String>,
    pub consolidation: Consolidation,
    pub elapsed: Duration,
}

// ============================================================================
// Session
// ============================================================================

struct ActiveSource {
    name: String,
    handle: Box<dyn RowSource>,
}

pub struct SearchSession {
    catalog: Catalog,
    base_dir: PathBuf,
    active: Option<ActiveSource>,
    last: Option<SearchOutcome>,
}

impl SearchSession {
    /// `base_dir` is the directory storage paths in the catalog are
    /// relative to.
    pub fn new(catalog: Catalog, base_dir: &Path) -> Self {
        Self {
            catalog,
            base_dir: base_dir.to_path_buf(),
            active: None,
            last: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Open `name` and make it the active source. On failure the previous
    /// selection stays in place.
    pub fn select(&mut self, name: &str) -> Result<(), SessionError> {
        let config = self.catalog.source(name)?;
        let handle = open_source(config, &self.base_dir)?;
        log::debug!("session: selected '{name}' ({})", handle.describe());

        self.active = Some(ActiveSource { name: name.to_string(), handle });
        self.last = None;
        Ok(())
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.name.as_str())
    }

    pub fn active_config(&self) -> Option<&SourceConfig> {
        let name = self.active_name()?;
        self.catalog.sources.get(name)
    }

    pub fn last_outcome(&self) -> Option<&SearchOutcome> {
        self.last.as_ref()
    }

    /// Plan, query and consolidate against the active source. The outcome
    /// replaces the previous one.
    pub fn search(&mut self, criteria: &Criteria) -> Result<&SearchOutcome, SessionError> {
        let active = self.active.as_ref().ok_or(SessionError::NoSource)?;
        let config = self.catalog.source(&active.name)?;

        let plan = plan(&active.name, &config.filters, criteria)?;
        let started = Instant::now();
        let rows = active.handle.search(&plan)?;
        let elapsed = started.elapsed();

        let consolidation = consolidate(&config.profile, &rows);

        let outcome = SearchOutcome {
            source: active.name.clone(),
            title: config.display_title(&active.name).to_string(),
            descriptions: plan.descriptions(),
            consolidation,
            elapsed,
        };
        Ok(self.last.insert(outcome))
    }
}
