use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Deserialize;

use custsearch_dedup::ProfileConfig;

use crate::error::QueryError;

// ---------------------------------------------------------------------------
// Top-level catalog
// ---------------------------------------------------------------------------

/// Every searchable data source, keyed by the name users select it with.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub sources: BTreeMap<String, SourceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub title: Option<String>,
    pub storage: StorageConfig,
    pub profile: ProfileConfig,
    pub filters: Vec<FilterConfig>,
    #[serde(default)]
    pub report: ReportConfig,
}

impl SourceConfig {
    /// Display title, falling back to the source name.
    pub fn display_title<'a>(&'a self, name: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(name)
    }

    pub fn filter(&self, name: &str) -> Option<&FilterConfig> {
        self.filters.iter().find(|f| f.name == name)
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Where a source's rows live. Paths are relative to the catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageConfig {
    Sqlite { path: String, table: String },
    Csv { path: String },
}

impl StorageConfig {
    pub fn path(&self) -> &str {
        match self {
            Self::Sqlite { path, .. } | Self::Csv { path } => path,
        }
    }
}

impl std::fmt::Display for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite { path, table } => write!(f, "sqlite {path} ({table})"),
            Self::Csv { path } => write!(f, "csv {path}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Filters + Report
// ---------------------------------------------------------------------------

/// One user-facing search field.
///
/// A filter may cover several columns (e.g. city and province); a row
/// matches when any of them matches. With `prefix_digits = n`, a value of
/// exactly `n` digits is matched as a prefix instead of a substring, but
/// only when some other filter is filled too.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    pub columns: Vec<String>,
    #[serde(default)]
    pub prefix_digits: Option<usize>,
}

impl FilterConfig {
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    /// Display order. Empty means every column in storage order.
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl ReportConfig {
    pub fn label_for<'a>(&'a self, field: &'a str) -> &'a str {
        self.labels.get(field).map(String::as_str).unwrap_or(field)
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl Catalog {
    pub fn from_toml(input: &str) -> Result<Self, QueryError> {
        let mut catalog: Catalog =
            toml::from_str(input).map_err(|e| QueryError::CatalogParse(e.to_string()))?;
        // Unnamed profiles take their source's name.
        for (name, source) in catalog.sources.iter_mut() {
            if source.profile.name == "default" {
                source.profile.name = name.clone();
            }
        }
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        if self.sources.is_empty() {
            return Err(QueryError::CatalogValidation(
                "at least one source is required".into(),
            ));
        }

        for (name, source) in &self.sources {
            validate_source(name, source)?;
        }

        Ok(())
    }

    pub fn source(&self, name: &str) -> Result<&SourceConfig, QueryError> {
        self.sources.get(name).ok_or_else(|| QueryError::UnknownSource {
            name: name.to_string(),
            available: self.source_names(),
        })
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }
}

fn validate_source(name: &str, source: &SourceConfig) -> Result<(), QueryError> {
    let invalid = |msg: String| QueryError::CatalogValidation(format!("source '{name}': {msg}"));

    source.profile.validate()?;
    check_identifier(&source.profile.identity_field).map_err(invalid)?;

    if source.storage.path().trim().is_empty() {
        return Err(invalid("storage path must not be empty".into()));
    }
    if let StorageConfig::Sqlite { table, .. } = &source.storage {
        check_identifier(table).map_err(invalid)?;
    }

    if source.filters.is_empty() {
        return Err(invalid("at least one filter is required".into()));
    }

    let mut seen = HashSet::new();
    for filter in &source.filters {
        if filter.name.trim().is_empty() {
            return Err(invalid("filter name must not be empty".into()));
        }
        if !seen.insert(filter.name.as_str()) {
            return Err(invalid(format!("duplicate filter '{}'", filter.name)));
        }
        if filter.columns.is_empty() {
            return Err(invalid(format!("filter '{}' has no columns", filter.name)));
        }
        for column in &filter.columns {
            check_identifier(column).map_err(invalid)?;
        }
        if filter.prefix_digits == Some(0) {
            return Err(invalid(format!(
                "filter '{}': prefix_digits must be at least 1",
                filter.name
            )));
        }
    }

    for field in &source.report.fields {
        check_identifier(field).map_err(invalid)?;
    }

    Ok(())
}

/// Table and column names end up quoted inside SQL, so only plain
/// identifiers are accepted.
fn check_identifier(ident: &str) -> Result<(), String> {
    let mut chars = ident.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(format!("'{ident}' is not a valid identifier"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
