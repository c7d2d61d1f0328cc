//! `custsearch-query`: the lookup side of a customer search.
//!
//! A TOML catalog describes each data source (storage, identity profile,
//! filters, report labels). User criteria are planned into conditions and
//! run against SQLite or CSV storage with bound parameters only. The
//! resulting row batch is handed to `custsearch-dedup` unchanged.

pub mod catalog;
pub mod criteria;
pub mod csv_source;
pub mod error;
pub mod source;
pub mod sqlite;

pub use catalog::{Catalog, FilterConfig, ReportConfig, SourceConfig, StorageConfig};
pub use criteria::{plan, Condition, Criteria, MatchMode, SearchPlan};
pub use csv_source::CsvSource;
pub use error::QueryError;
pub use source::{open_source, RowSource};
pub use sqlite::SqliteSource;
