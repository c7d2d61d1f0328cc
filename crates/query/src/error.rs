use std::fmt;

use custsearch_dedup::DedupError;

#[derive(Debug)]
pub enum QueryError {
    /// TOML parse / deserialization error.
    CatalogParse(String),
    /// Catalog validation error (no filters, bad identifier, etc.).
    CatalogValidation(String),
    /// Requested source is not in the catalog.
    UnknownSource { name: String, available: Vec<String> },
    /// Criteria name a filter the source does not define.
    UnknownFilter { source: String, filter: String },
    /// No criterion carries a value.
    EmptyCriteria,
    /// A criterion is not of the form `name=value`.
    BadCriterion(String),
    /// A filter refers to a column the stored data does not have.
    MissingColumn { source: String, column: String },
    /// SQLite failure (open, prepare, step).
    Storage(String),
    /// Malformed stored data (bad CSV, etc.).
    Data(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CatalogParse(msg) => write!(f, "catalog parse error: {msg}"),
            Self::CatalogValidation(msg) => write!(f, "catalog validation error: {msg}"),
            Self::UnknownSource { name, available } => {
                write!(f, "unknown source '{name}' (available: {})", available.join(", "))
            }
            Self::UnknownFilter { source, filter } => {
                write!(f, "source '{source}': unknown filter '{filter}'")
            }
            Self::EmptyCriteria => write!(f, "fill at least one field"),
            Self::BadCriterion(raw) => write!(f, "expected name=value, got '{raw}'"),
            Self::MissingColumn { source, column } => {
                write!(f, "{source}: no such column '{column}'")
            }
            Self::Storage(msg) => write!(f, "storage error: {msg}"),
            Self::Data(msg) => write!(f, "data error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for QueryError {}

impl From<rusqlite::Error> for QueryError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<DedupError> for QueryError {
    fn from(err: DedupError) -> Self {
        match err {
            DedupError::Io(msg) => Self::Io(msg),
            DedupError::ConfigParse(msg) => Self::CatalogParse(msg),
            DedupError::ConfigValidation(msg) => Self::CatalogValidation(msg),
            DedupError::Csv(msg) => Self::Data(msg),
        }
    }
}
