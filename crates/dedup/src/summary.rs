use crate::model::{ConsolidatedRecord, ConsolidationSummary};
use crate::resolve::Resolution;

/// Compute reduction statistics from a resolution and its merged records.
pub fn compute_summary(
    raw_rows: usize,
    resolution: &Resolution,
    records: &[ConsolidatedRecord],
) -> ConsolidationSummary {
    ConsolidationSummary {
        raw_rows,
        exact_duplicates: resolution.exact_duplicates,
        dominated_rows: resolution.dominated,
        resolved_rows: resolution.rows.len(),
        absent_key_rows: resolution.absent_key_rows,
        consolidated_records: records.len(),
        conflicted_fields: records.iter().map(|r| r.conflicted_fields()).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RecordField, RowSet, Value};

    fn record(fields: Vec<(&str, u32)>) -> ConsolidatedRecord {
        ConsolidatedRecord {
            identity: Value::from("k"),
            source_rows: 2,
            fields: fields
                .into_iter()
                .map(|(f, n)| RecordField::new(f, n, Value::from("x")))
                .collect(),
        }
    }

    #[test]
    fn summary_counts() {
        let mut rows = RowSet::new(vec!["id".into()]);
        rows.push(vec![Value::from("k")]);
        rows.push(vec![Value::from("j")]);
        let resolution = Resolution {
            rows,
            exact_duplicates: 3,
            dominated: 1,
            absent_key_rows: 0,
        };
        let records = vec![
            record(vec![("id", 1), ("city", 1), ("city", 2), ("card", 1), ("card", 2), ("card", 3)]),
            record(vec![("id", 1), ("city", 1)]),
        ];
        let summary = compute_summary(6, &resolution, &records);
        assert_eq!(summary.raw_rows, 6);
        assert_eq!(summary.resolved_rows, 2);
        assert_eq!(summary.consolidated_records, 2);
        assert_eq!(summary.conflicted_fields, 2);
        assert_eq!(
            summary.raw_rows,
            summary.exact_duplicates + summary.dominated_rows + summary.resolved_rows
        );
    }
}
