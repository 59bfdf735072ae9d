//! Top-level report generation driver.
//!
//! Wires the normalizer, resolver, aggregator and ranker together for one
//! report generation. All intermediate structures live and die inside one
//! call; nothing is cached across invocations.

use acct_core::models::{RawUsageEntry, ReportTable, SortMode};
use tracing::debug;

use crate::aggregator::accumulate;
use crate::normalizer::normalize;
use crate::ranker::rank;
use crate::resolver::AffiliationResolver;

/// What one report generation was asked to produce.
#[derive(Debug, Clone, Copy)]
pub struct ReportRequest {
    pub grouping: acct_core::models::Grouping,
    pub monthly: bool,
    pub sort: SortMode,
    /// Express each row as a percentage of the grand total (CPU time with
    /// the `p` unit).
    pub percent: bool,
}

/// Run the full engine over one batch of raw entries.
///
/// Zero matching records produce a valid empty table, not an error.
pub fn generate_report(
    entries: &[RawUsageEntry],
    resolver: &AffiliationResolver,
    request: &ReportRequest,
) -> ReportTable {
    let batch = normalize(entries);
    debug!(
        "Normalized {} records ({} skipped); mapping covers {} users",
        batch.records.len(),
        batch.skipped,
        resolver.len()
    );

    let totals = accumulate(&batch.records, resolver, request.grouping, request.monthly);
    let mut table = rank(totals, request.grouping, request.monthly, request.sort);

    if request.percent {
        into_percentages(&mut table);
    }

    table
}

/// Second pass for the percentage unit: compute the grand total across all
/// rows first, then express each row as `100 × row / grand-total`. A table
/// with a zero total is left untouched.
pub fn into_percentages(table: &mut ReportTable) {
    let grand_total = table.grand_total();
    if grand_total == 0.0 {
        return;
    }
    for row in &mut table.rows {
        row.value = 100.0 * row.value / grand_total;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
