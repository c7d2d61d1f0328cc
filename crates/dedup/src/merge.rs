use std::collections::HashSet;

use crate::config::AbsentKeyPolicy;
use crate::group::partition;
use crate::model::{ConsolidatedRecord, RecordField, Row, RowSet, Value};

/// Fold each identity group of an already-resolved batch into one record,
/// using the default [`AbsentKeyPolicy`].
pub fn merge(batch: &RowSet, identity_field: &str) -> Vec<ConsolidatedRecord> {
    merge_with_policy(batch, identity_field, AbsentKeyPolicy::default())
}

/// Fold each identity group into one [`ConsolidatedRecord`].
///
/// Records come out in group first-appearance order. For every column the
/// first present value is the base entry; each further distinct value is
/// appended as `<field>_2`, `<field>_3`, ... Absent values never overwrite
/// and never create a variant. The identity column is never expanded.
///
/// A variant never reuses the name of a real column or of an earlier
/// entry: with both `city` and `city_2` in the batch, the second `city`
/// value becomes `city_3`.
pub fn merge_with_policy(
    batch: &RowSet,
    identity_field: &str,
    policy: AbsentKeyPolicy,
) -> Vec<ConsolidatedRecord> {
    let identity_idx = batch.column_index(identity_field);
    let rows = batch.rows();

    partition(rows, identity_idx, policy)
        .into_iter()
        .map(|members| {
            let group: Vec<&Row> = members.iter().map(|&i| &rows[i]).collect();
            fold_group(batch.columns(), &group, identity_idx)
        })
        .collect()
}

fn fold_group(columns: &[String], group: &[&Row], identity_idx: Option<usize>) -> ConsolidatedRecord {
    let mut fields = Vec::with_capacity(columns.len());
    let mut taken: HashSet<String> = columns.iter().cloned().collect();

    for (idx, column) in columns.iter().enumerate() {
        let mut distinct: Vec<&Value> = Vec::new();
        for row in group {
            let value = row.get(idx);
            if value.is_absent() || distinct.contains(&value) {
                continue;
            }
            distinct.push(value);
            if Some(idx) == identity_idx {
                break;
            }
        }

        if distinct.is_empty() {
            fields.push(RecordField::new(column.as_str(), 1, Value::Absent));
            continue;
        }

        let mut suffix = 1;
        for (n, value) in distinct.into_iter().enumerate() {
            let ordinal = n as u32 + 1;
            if ordinal == 1 {
                fields.push(RecordField::new(column.as_str(), 1, value.clone()));
                continue;
            }
            suffix = suffix.max(ordinal);
            while !taken.insert(format!("{column}_{suffix}")) {
                suffix += 1;
            }
            fields.push(RecordField {
                field: column.clone(),
                ordinal,
                suffix,
                value: value.clone(),
            });
            suffix += 1;
        }
    }

    let identity = identity_idx
        .and_then(|idx| group.iter().map(|r| r.get(idx)).find(|v| v.is_present()))
        .cloned()
        .unwrap_or(Value::Absent);

    ConsolidatedRecord {
        identity,
        source_rows: group.len(),
        fields,
    }
}
