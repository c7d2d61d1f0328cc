use std::path::{Path, PathBuf};
use std::time::Instant;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};

use custsearch_dedup::{RowSet, Value};

use crate::criteria::SearchPlan;
use crate::error::QueryError;
use crate::source::RowSource;

/// Read-only lookup in one SQLite table. User input only ever reaches the
/// database as bound parameters.
pub struct SqliteSource {
    conn: Connection,
    path: PathBuf,
    table: String,
    absent_markers: Vec<String>,
}

impl SqliteSource {
    pub fn open(path: &Path, table: &str, absent_markers: Vec<String>) -> Result<Self, QueryError> {
        if !path.is_file() {
            return Err(QueryError::Io(format!("database not found: {}", path.display())));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self {
            conn,
            path: path.to_path_buf(),
            table: table.to_string(),
            absent_markers,
        })
    }

    /// SQL text plus its positional parameters, one per condition column.
    pub(crate) fn build_query(&self, plan: &SearchPlan) -> (String, Vec<String>) {
        let mut sql = format!("SELECT * FROM {}", quote_ident(&self.table));
        let mut params = Vec::new();

        let clauses: Vec<String> = plan
            .conditions
            .iter()
            .map(|cond| {
                let pattern = cond.like_pattern();
                let ors: Vec<String> = cond
                    .columns
                    .iter()
                    .map(|col| {
                        params.push(pattern.clone());
                        format!("{} LIKE ? ESCAPE '\\'", quote_ident(col))
                    })
                    .collect();
                format!("({})", ors.join(" OR "))
            })
            .collect();

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        (sql, params)
    }

    fn to_value(&self, cell: ValueRef<'_>) -> Value {
        match cell {
            ValueRef::Null => Value::Absent,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::from(f),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                Value::from_text(&String::from_utf8_lossy(bytes), &self.absent_markers)
            }
        }
    }
}

impl RowSource for SqliteSource {
    fn describe(&self) -> String {
        format!("sqlite {} ({})", self.path.display(), self.table)
    }

    fn search(&self, plan: &SearchPlan) -> Result<RowSet, QueryError> {
        let started = Instant::now();
        let (sql, params) = self.build_query(plan);
        log::debug!("{sql}");

        let mut stmt = self.conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();
        let mut batch = RowSet::new(columns);

        let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                values.push(self.to_value(row.get_ref(idx)?));
            }
            batch.push(values);
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

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
