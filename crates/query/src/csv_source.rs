use std::path::{Path, PathBuf};
use std::time::Instant;

use custsearch_dedup::{load_csv_rows, RowSet};

use crate::criteria::SearchPlan;
use crate::error::QueryError;
use crate::source::RowSource;

/// A CSV export loaded once and searched in memory with the same
/// contains/prefix semantics as the SQLite backend.
pub struct CsvSource {
    path: PathBuf,
    rows: RowSet,
}

impl CsvSource {
    pub fn open(path: &Path, absent_markers: &[String]) -> Result<Self, QueryError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| QueryError::Io(format!("{}: {e}", path.display())))?;
        let rows = load_csv_rows(&data, absent_markers)?;
        log::debug!("loaded {} row(s) from {}", rows.len(), path.display());
        Ok(Self::from_rows(path, rows))
    }

    pub fn from_rows(path: &Path, rows: RowSet) -> Self {
        Self {
            path: path.to_path_buf(),
            rows,
        }
    }
}

impl RowSource for CsvSource {
    fn describe(&self) -> String {
        format!("csv {}", self.path.display())
    }

    fn search(&self, plan: &SearchPlan) -> Result<RowSet, QueryError> {
        let started = Instant::now();

        // Resolve every condition's columns up front so a typo fails the
        // search instead of silently matching nothing.
        let mut resolved = Vec::with_capacity(plan.conditions.len());
        for cond in &plan.conditions {
            let mut indices = Vec::with_capacity(cond.columns.len());
            for column in &cond.columns {
                let idx = self.rows.column_index(column).ok_or_else(|| QueryError::MissingColumn {
                    source: self.describe(),
                    column: column.clone(),
                })?;
                indices.push(idx);
            }
            resolved.push((cond, indices));
        }

        let mut batch = RowSet::new(self.rows.columns().to_vec());
        for row in self.rows.iter() {
            let hit = resolved
                .iter()
                .all(|(cond, indices)| indices.iter().any(|&i| cond.matches(row.get(i))));
            if hit {
                batch.push(row.values().to_vec());
            }
        }

        log::info!(
            "{}: {} row(s) in {:.3}s",
            self.describe(),
            batch.len(),
            started.elapsed().as_secs_f64()
        );
        Ok(batch)
    }
}
