//! Turns raw sreport rows into typed [`UsageRecord`]s.
//!
//! A row whose usage column cannot be parsed as a number is a per-record
//! data error: it is skipped and counted, never fatal. The caller gets the
//! skip count back and a single warning summary is logged.

use acct_core::models::{RawUsageEntry, UsageRecord};
use tracing::{debug, warn};

/// Result of one normalization pass.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBatch {
    pub records: Vec<UsageRecord>,
    /// Number of raw entries dropped because the quantity was unparseable.
    pub skipped: usize,
}

/// Normalize a batch of raw usage entries.
///
/// The quantity arrives in the accounting tool's native unit, which is
/// already the canonical internal unit (CPU-seconds for the time metric,
/// raw count for jobs) because sreport is always invoked with `-tSeconds`.
pub fn normalize(entries: &[RawUsageEntry]) -> NormalizedBatch {
    let mut records = Vec::with_capacity(entries.len());
    let mut skipped = 0usize;

    for entry in entries {
        match entry.used.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => records.push(UsageRecord {
                account_id: entry.account.clone(),
                user_id: entry.login.clone(),
                value,
                month: entry.month.clone(),
            }),
            Ok(_) | Err(_) => {
                debug!(
                    "Skipping entry for user '{}' on account '{}': \
                     unparseable usage value '{}'",
                    entry.login, entry.account, entry.used
                );
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(
            "Skipped {} of {} usage entries with unparseable quantities",
            skipped,
            entries.len()
        );
    }

    NormalizedBatch { records, skipped }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
