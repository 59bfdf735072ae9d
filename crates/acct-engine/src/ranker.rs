//! Orders the aggregate mapping into the final report table.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use acct_core::models::{AggregateRow, GroupKey, Grouping, ReportTable, SortMode};

/// Produce an ordered [`ReportTable`] from the aggregate totals.
///
/// `ByKeys` keeps the `BTreeMap` iteration order, which is lexicographic
/// ascending on (faculty, department, user, month) with the "unknown"
/// sentinel sorting wherever its string value falls. `ByUsage` re-sorts
/// descending by value with a stable sort, so rows with equal values keep
/// their by-keys relative order.
pub fn rank(
    totals: BTreeMap<GroupKey, f64>,
    grouping: Grouping,
    monthly: bool,
    mode: SortMode,
) -> ReportTable {
    let mut rows: Vec<AggregateRow> = totals
        .into_iter()
        .map(|(key, value)| AggregateRow { key, value })
        .collect();

    if mode == SortMode::ByUsage {
        rows.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    }

    ReportTable {
        rows,
        grouping,
        monthly,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn key(user: &str) -> GroupKey {
        GroupKey {
            user: Some(user.to_string()),
            ..Default::default()
        }
    }

    fn totals(pairs: &[(&str, f64)]) -> BTreeMap<GroupKey, f64> {
        pairs.iter().map(|(u, v)| (key(u), *v)).collect()
    }

    #[test]
    fn test_by_keys_sorts_lexicographically() {
        let table = rank(
            totals(&[("carol", 1.0), ("alice", 2.0), ("bob", 3.0)]),
            Grouping::USER,
            false,
            SortMode::ByKeys,
        );
        let users: Vec<&str> = table
            .rows
            .iter()
            .filter_map(|r| r.key.user.as_deref())
            .collect();
        assert_eq!(users, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_by_usage_sorts_descending() {
        let table = rank(
            totals(&[("alice", 2.0), ("bob", 9.0), ("carol", 5.0)]),
            Grouping::USER,
            false,
            SortMode::ByUsage,
        );
        let values: Vec<f64> = table.rows.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![9.0, 5.0, 2.0]);
    }

    #[test]
    fn test_by_usage_ties_keep_by_keys_order() {
        let table = rank(
            totals(&[("carol", 5.0), ("alice", 5.0), ("zoe", 9.0), ("bob", 5.0)]),
            Grouping::USER,
            false,
            SortMode::ByUsage,
        );
        let users: Vec<&str> = table
            .rows
            .iter()
            .filter_map(|r| r.key.user.as_deref())
            .collect();
        // zoe leads; the three-way tie stays alphabetical.
        assert_eq!(users, vec!["zoe", "alice", "bob", "carol"]);
    }

    #[test]
    fn test_unknown_sentinel_sorts_naturally() {
        let table = rank(
            totals(&[("unknown", 1.0), ("alice", 1.0), ("zoe", 1.0)]),
            Grouping::USER,
            false,
            SortMode::ByKeys,
        );
        let users: Vec<&str> = table
            .rows
            .iter()
            .filter_map(|r| r.key.user.as_deref())
            .collect();
        // No special-casing: "unknown" sorts between "alice" and "zoe".
        assert_eq!(users, vec!["alice", "unknown", "zoe"]);
    }

    #[test]
    fn test_empty_totals_empty_table() {
        let table = rank(BTreeMap::new(), Grouping::USER, false, SortMode::ByUsage);
        assert!(table.is_empty());
    }
}
