//! `custsearch-dedup`: record deduplication and merge engine.
//!
//! Pure engine crate: receives an already-materialized row batch, returns
//! consolidated records. No CLI or storage dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod group;
pub mod merge;
pub mod model;
pub mod resolve;
pub mod summary;

pub use config::{AbsentKeyPolicy, ProfileConfig};
pub use engine::{consolidate, load_csv_rows};
pub use error::DedupError;
pub use merge::{merge, merge_with_policy};
pub use model::{Consolidation, ConsolidatedRecord, RecordField, Row, RowSet, Value};
pub use resolve::{dominates, resolve, resolve_detailed, Resolution};
