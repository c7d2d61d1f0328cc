use std::borrow::Cow;
use std::fmt;

use ordered_float::OrderedFloat;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::config::AbsentKeyPolicy;

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A single cell. `Absent` is the "no value" sentinel: it is distinct from
/// `Text("")` and from zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Value {
    Absent,
    Integer(i64),
    Float(OrderedFloat<f64>),
    Text(String),
}

static ABSENT: Value = Value::Absent;

impl Value {
    /// Classify a raw text cell. A cell equal to one of `absent_markers`
    /// becomes `Absent`; anything else is kept verbatim as text.
    pub fn from_text(raw: &str, absent_markers: &[String]) -> Self {
        if absent_markers.iter().any(|m| m == raw) {
            Value::Absent
        } else {
            Value::Text(raw.to_string())
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn is_present(&self) -> bool {
        !self.is_absent()
    }

    /// Both values present and unequal.
    pub fn conflicts_with(&self, other: &Value) -> bool {
        self.is_present() && other.is_present() && self != other
    }

    /// Text form of a present value, `None` for `Absent`.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Absent => None,
            Value::Integer(i) => Some(Cow::Owned(i.to_string())),
            Value::Float(f) => Some(Cow::Owned(f.to_string())),
            Value::Text(s) => Some(Cow::Borrowed(s.as_str())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => f.write_str("(absent)"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(OrderedFloat(f))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Absent)
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// One raw row, positionally aligned with its batch's columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Value at `idx`. Positions past the end of the row read as `Absent`.
    pub fn get(&self, idx: usize) -> &Value {
        self.values.get(idx).unwrap_or(&ABSENT)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn present_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_present()).count()
    }
}

/// A materialized result set: every row shares `columns`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl RowSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a positional row. Short rows are padded with `Absent`,
    /// surplus cells are dropped.
    pub fn push(&mut self, mut values: Vec<Value>) {
        let width = self.columns.len();
        if values.len() > width {
            log::debug!(
                "row {}: dropping {} cell(s) beyond {} column(s)",
                self.rows.len(),
                values.len() - width,
                width
            );
            values.truncate(width);
        }
        values.resize(width, Value::Absent);
        self.rows.push(Row { values });
    }

    /// Append a row given as `(field, value)` pairs. Fields not named are
    /// `Absent`; names that are not columns are ignored.
    pub fn push_named<I, S>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        let mut values = vec![Value::Absent; self.columns.len()];
        for (name, value) in pairs {
            match self.column_index(name.as_ref()) {
                Some(idx) => values[idx] = value,
                None => log::debug!("ignoring unknown field '{}'", name.as_ref()),
            }
        }
        self.rows.push(Row { values });
    }

    /// Value of `field` in `row`, `Absent` when the column does not exist.
    pub fn value<'a>(&self, row: &'a Row, field: &str) -> &'a Value {
        match self.column_index(field) {
            Some(idx) => row.get(idx),
            None => &ABSENT,
        }
    }
}

// ---------------------------------------------------------------------------
// Consolidated output
// ---------------------------------------------------------------------------

/// One entry of a consolidated record. `ordinal` 1 is the base field;
/// later ordinals hold further distinct values in first-seen order.
///
/// The rendered name is `<field>_<suffix>`. `suffix` equals `ordinal`
/// unless that name is already taken by a real column or an earlier entry,
/// in which case the merger moves on to the next free number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordField {
    pub field: String,
    pub ordinal: u32,
    pub suffix: u32,
    pub value: Value,
}

impl RecordField {
    pub fn new(field: impl Into<String>, ordinal: u32, value: Value) -> Self {
        Self {
            field: field.into(),
            ordinal,
            suffix: ordinal,
            value,
        }
    }

    pub fn name(&self) -> Cow<'_, str> {
        if self.ordinal <= 1 {
            Cow::Borrowed(self.field.as_str())
        } else {
            Cow::Owned(format!("{}_{}", self.field, self.suffix))
        }
    }

    pub fn is_variant(&self) -> bool {
        self.ordinal > 1
    }
}

/// The single output record for one identity group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsolidatedRecord {
    pub identity: Value,
    pub source_rows: usize,
    #[serde(serialize_with = "serialize_fields")]
    pub fields: Vec<RecordField>,
}

impl ConsolidatedRecord {
    /// Look up a value by rendered name (`city`, `city_2`, ...).
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|f| f.name() == name)
            .map(|f| &f.value)
    }

    /// The base entry of `field` followed by its indexed variants.
    pub fn variants<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a RecordField> + 'a {
        self.fields.iter().filter(move |f| f.field == field)
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name().into_owned()).collect()
    }

    /// Number of base fields that needed at least one indexed variant.
    pub fn conflicted_fields(&self) -> usize {
        self.fields.iter().filter(|f| f.ordinal == 2).count()
    }
}

fn serialize_fields<S: Serializer>(fields: &[RecordField], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for f in fields {
        let name = f.name();
        map.serialize_entry(&*name, &f.value)?;
    }
    map.end()
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsolidationSummary {
    pub raw_rows: usize,
    pub exact_duplicates: usize,
    pub dominated_rows: usize,
    pub resolved_rows: usize,
    pub absent_key_rows: usize,
    pub consolidated_records: usize,
    pub conflicted_fields: usize,
}

impl fmt::Display for ConsolidationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} raw row(s): {} exact duplicate(s), {} less complete, {} kept; {} record(s)",
            self.raw_rows,
            self.exact_duplicates,
            self.dominated_rows,
            self.resolved_rows,
            self.consolidated_records,
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsolidationMeta {
    pub profile_name: String,
    pub identity_field: String,
    pub absent_keys: AbsentKeyPolicy,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Consolidation {
    pub meta: ConsolidationMeta,
    pub summary: ConsolidationSummary,
    pub records: Vec<ConsolidatedRecord>,
}
