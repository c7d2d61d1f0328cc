use std::collections::HashSet;

use crate::config::AbsentKeyPolicy;
use crate::group::partition;
use crate::model::{Row, RowSet, Value};

/// Resolver output: the surviving rows plus what was dropped and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub rows: RowSet,
    pub exact_duplicates: usize,
    pub dominated: usize,
    pub absent_key_rows: usize,
}

/// Drop exact duplicates and strictly dominated rows within each identity
/// group, using the default [`AbsentKeyPolicy`].
pub fn resolve(batch: &RowSet, identity_field: &str) -> RowSet {
    resolve_detailed(batch, identity_field, AbsentKeyPolicy::default()).rows
}

/// Like [`resolve`], with an explicit absent-key policy and drop counters.
///
/// Retained rows keep their relative input order.
pub fn resolve_detailed(batch: &RowSet, identity_field: &str, policy: AbsentKeyPolicy) -> Resolution {
    let identity_idx = batch.column_index(identity_field);
    if identity_idx.is_none() && !batch.is_empty() {
        log::warn!("identity field '{identity_field}' is not a column; every row is its own group");
    }

    let rows = batch.rows();
    let mut keep = vec![false; rows.len()];
    let mut exact_duplicates = 0;
    let mut dominated = 0;

    for members in partition(rows, identity_idx, policy) {
        if members.len() == 1 {
            keep[members[0]] = true;
            continue;
        }

        let unique = first_occurrences(rows, &members);
        exact_duplicates += members.len() - unique.len();

        if unique.len() == 1 {
            keep[unique[0]] = true;
            continue;
        }

        for &i in &unique {
            let beaten = unique
                .iter()
                .any(|&j| j != i && dominates(&rows[j], &rows[i], identity_idx));
            if beaten {
                dominated += 1;
            } else {
                keep[i] = true;
            }
        }

        log::trace!(
            "group of {}: {} unique, {} kept",
            members.len(),
            unique.len(),
            unique.iter().filter(|&&i| keep[i]).count()
        );
    }

    let absent_key_rows = match identity_idx {
        Some(idx) => rows.iter().filter(|r| r.get(idx).is_absent()).count(),
        None => rows.len(),
    };

    let kept: Vec<Row> = rows
        .iter()
        .zip(&keep)
        .filter(|(_, &k)| k)
        .map(|(r, _)| r.clone())
        .collect();

    log::debug!(
        "resolved {} row(s) to {} ({} exact duplicate(s), {} dominated)",
        rows.len(),
        kept.len(),
        exact_duplicates,
        dominated
    );

    Resolution {
        rows: RowSet::from_parts(batch.columns().to_vec(), kept),
        exact_duplicates,
        dominated,
        absent_key_rows,
    }
}

/// Indices of `members` with exact duplicates (identity included) removed,
/// keeping each row's first occurrence.
fn first_occurrences(rows: &[Row], members: &[usize]) -> Vec<usize> {
    let mut seen: HashSet<&Row> = HashSet::with_capacity(members.len());
    members
        .iter()
        .copied()
        .filter(|&i| seen.insert(&rows[i]))
        .collect()
}

/// `a` dominates `b`: no field conflicts, `a` is never absent where `b` is
/// present, and `a` is present somewhere `b` is absent. The identity column
/// is skipped.
pub fn dominates(a: &Row, b: &Row, identity_idx: Option<usize>) -> bool {
    let width = a.len().max(b.len());
    let mut more_complete = false;

    for idx in 0..width {
        if Some(idx) == identity_idx {
            continue;
        }
        match (a.get(idx), b.get(idx)) {
            (x, y) if x.conflicts_with(y) => return false,
            (Value::Absent, y) if y.is_present() => return false,
            (x, Value::Absent) if x.is_present() => more_complete = true,
            _ => {}
        }
    }

    more_complete
}
