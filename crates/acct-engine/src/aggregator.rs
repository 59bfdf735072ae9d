//! The split-and-aggregate core.
//!
//! Each usage record's value is distributed equally across the user's
//! affiliations and the shares are accumulated under the requested grouping
//! key. A user belonging to N organizational units credits each unit 1/N
//! of that user's usage, not the full amount, so the shares always sum
//! back to the record's original value. This also applies to the
//! job-count metric, where fractional job counts in the output are
//! expected and acceptable.

use std::collections::BTreeMap;

use acct_core::models::{GroupKey, Grouping, UsageRecord};

use crate::resolver::AffiliationResolver;

/// Distribute and accumulate `records` into a mapping keyed by the selected
/// grouping dimensions (plus the month bucket in monthly mode).
///
/// When faculty grouping is requested without department, departments
/// sharing a faculty code collapse into one summed row: the key simply
/// omits the department dimension. Empty input yields an empty map.
pub fn accumulate(
    records: &[UsageRecord],
    resolver: &AffiliationResolver,
    grouping: Grouping,
    monthly: bool,
) -> BTreeMap<GroupKey, f64> {
    let mut totals: BTreeMap<GroupKey, f64> = BTreeMap::new();

    for record in records {
        let affiliations = resolver.resolve(&record.user_id);
        let share = record.value / affiliations.len() as f64;

        for affiliation in affiliations {
            let key = GroupKey {
                account: grouping.account.then(|| record.account_id.clone()),
                faculty: grouping.faculty.then(|| affiliation.faculty.clone()),
                department: grouping.department.then(|| affiliation.department.clone()),
                user: grouping.user.then(|| record.user_id.clone()),
                month: if monthly { record.month.clone() } else { None },
            };
            *totals.entry(key).or_insert(0.0) += share;
        }
    }

    totals
}

// ── Tests ─────────────────────────────────────────────────────────────────────
