use std::path::Path;

use custsearch_dedup::RowSet;

use crate::catalog::{SourceConfig, StorageConfig};
use crate::criteria::SearchPlan;
use crate::csv_source::CsvSource;
use crate::error::QueryError;
use crate::sqlite::SqliteSource;

/// A searchable store of raw rows.
pub trait RowSource {
    /// Short human description (backend + location), used in logs.
    fn describe(&self) -> String;

    /// Every stored row matching all conditions of `plan`, in storage order.
    /// Rows are returned as-is; deduplication is the caller's job.
    fn search(&self, plan: &SearchPlan) -> Result<RowSet, QueryError>;
}

/// Open the backend a source's storage config names. Relative paths are
/// resolved against `base_dir` (the catalog file's directory).
pub fn open_source(config: &SourceConfig, base_dir: &Path) -> Result<Box<dyn RowSource>, QueryError> {
    let path = base_dir.join(config.storage.path());
    let markers = config.profile.absent_markers.clone();

    let source: Box<dyn RowSource> = match &config.storage {
        StorageConfig::Sqlite { table, .. } => Box::new(SqliteSource::open(&path, table, markers)?),
        StorageConfig::Csv { .. } => Box::new(CsvSource::open(&path, &markers)?),
    };

    log::debug!("opened {}", source.describe());
    Ok(source)
}
