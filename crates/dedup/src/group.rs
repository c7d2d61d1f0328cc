use std::collections::HashMap;

use crate::config::AbsentKeyPolicy;
use crate::model::{Row, Value};

/// Grouping key. Absent identities are either isolated per row or share
/// a single bucket, depending on [`AbsentKeyPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum GroupKey<'a> {
    Known(&'a Value),
    Isolated(usize),
    Unknown,
}

/// Partition rows into identity groups of row indices.
///
/// Groups are listed in order of first appearance and each group lists its
/// members in input order. With no identity column every key is absent.
pub fn partition(rows: &[Row], identity_idx: Option<usize>, policy: AbsentKeyPolicy) -> Vec<Vec<usize>> {
    let mut slots: HashMap<GroupKey<'_>, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let identity = identity_idx
            .map(|idx| row.get(idx))
            .filter(|v| v.is_present());
        let key = match (identity, policy) {
            (Some(value), _) => GroupKey::Known(value),
            (None, AbsentKeyPolicy::Isolate) => GroupKey::Isolated(i),
            (None, AbsentKeyPolicy::Group) => GroupKey::Unknown,
        };
        let slot = *slots.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(i);
    }

    groups
}
