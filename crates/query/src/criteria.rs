use custsearch_dedup::Value;

use crate::catalog::FilterConfig;
use crate::error::QueryError;

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

/// User-entered `(filter, value)` pairs in entry order. Entering the same
/// filter twice keeps the later value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    entries: Vec<(String, String)>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(filter, value);
        self
    }

    pub fn set(&mut self, filter: impl Into<String>, value: impl Into<String>) {
        let filter = filter.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(f, _)| *f == filter) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((filter, value)),
        }
    }

    /// Parse one `name=value` argument. The value may itself contain `=`.
    pub fn parse_pair(raw: &str) -> Result<(String, String), QueryError> {
        match raw.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.to_string()))
            }
            _ => Err(QueryError::BadCriterion(raw.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(f, v)| (f.as_str(), v.as_str()))
    }

    /// Entries whose value is not blank, values trimmed.
    pub fn filled(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .map(|(f, v)| (f, v.trim()))
            .filter(|(_, v)| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.filled().next().is_none()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut criteria = Criteria::new();
        for (k, v) in iter {
            criteria.set(k, v);
        }
        criteria
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Contains,
    Prefix,
}

/// One filled filter: matches a row when any of `columns` matches `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub filter: String,
    pub columns: Vec<String>,
    pub value: String,
    pub mode: MatchMode,
    pub description: String,
}

impl Condition {
    /// LIKE pattern for this condition, with `\` as the escape character.
    pub fn like_pattern(&self) -> String {
        let escaped = escape_like(&self.value);
        match self.mode {
            MatchMode::Contains => format!("%{escaped}%"),
            MatchMode::Prefix => format!("{escaped}%"),
        }
    }

    /// In-memory equivalent of the LIKE pattern: ASCII case-insensitive,
    /// absent values never match.
    pub fn matches(&self, value: &Value) -> bool {
        let Some(text) = value.as_text() else {
            return false;
        };
        let haystack = text.to_ascii_lowercase();
        let needle = self.value.to_ascii_lowercase();
        match self.mode {
            MatchMode::Contains => haystack.contains(&needle),
            MatchMode::Prefix => haystack.starts_with(&needle),
        }
    }
}

/// Conditions AND-ed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPlan {
    pub conditions: Vec<Condition>,
}

impl SearchPlan {
    pub fn descriptions(&self) -> Vec<String> {
        self.conditions.iter().map(|c| c.description.clone()).collect()
    }
}

/// Turn criteria into a plan against a source's filters.
pub fn plan(source: &str, filters: &[FilterConfig], criteria: &Criteria) -> Result<SearchPlan, QueryError> {
    let filled: Vec<(&str, &str)> = criteria.filled().collect();
    if filled.is_empty() {
        return Err(QueryError::EmptyCriteria);
    }

    let mut conditions = Vec::with_capacity(filled.len());
    for &(name, value) in &filled {
        let filter = filters
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| QueryError::UnknownFilter {
                source: source.to_string(),
                filter: name.to_string(),
            })?;

        let prefix = filled.len() > 1
            && filter
                .prefix_digits
                .is_some_and(|n| value.len() == n && value.bytes().all(|b| b.is_ascii_digit()));

        let (mode, description) = if prefix {
            (MatchMode::Prefix, format!("{} starts with: {}", filter.label(), value))
        } else {
            (MatchMode::Contains, format!("{}: {}", filter.label(), value))
        };

        conditions.push(Condition {
            filter: filter.name.clone(),
            columns: filter.columns.clone(),
            value: value.to_string(),
            mode,
            description,
        });
    }

    log::debug!("planned {} condition(s) for '{}'", conditions.len(), source);
    Ok(SearchPlan { conditions })
}

/// Escape LIKE wildcards so user input is matched literally.
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
