//! sreport invocation and output parsing.
//!
//! The accounting tool is always asked for CPU-seconds (`-tSeconds`) so the
//! engine works in one canonical unit; output-unit conversion happens at
//! render time. Output is pipe-delimited with a few banner lines before the
//! header row, which we locate by its column names instead of counting
//! lines.

use std::process::Command;

use acct_core::error::{AcctError, Result};
use acct_core::models::{Metric, RawUsageEntry};
use chrono::{Datelike, NaiveDate};
use tracing::debug;

// ── Command construction ──────────────────────────────────────────────────────

/// Build the sreport argument list for one query window.
pub fn build_args(
    metric: Metric,
    start: NaiveDate,
    end: NaiveDate,
    accounts: &[String],
) -> Vec<String> {
    let mut args: Vec<String> = vec!["-P".to_string()];

    match metric {
        Metric::CpuTime => args.extend(
            [
                "cluster",
                "AccountUtilizationByUser",
                "-tSeconds",
                "format=Login,Account,Used",
            ]
            .map(String::from),
        ),
        Metric::Jobs => args.extend(
            [
                "job",
                "SizesByAccount",
                "PrintJobCount",
                "FlatView",
                "format=Account",
            ]
            .map(String::from),
        ),
    }

    args.push(format!("start={}", start.format("%Y-%m-%d")));
    args.push(format!("end={}", end.format("%Y-%m-%d")));

    if !accounts.is_empty() {
        args.push(format!("Accounts={}", accounts.join(",")));
    }

    args
}

/// Run sreport for one window and parse its output.
///
/// `month` tags every parsed entry with a `"%Y-%m"` bucket label (monthly
/// mode). Spawn failures and non-zero exits are fatal; an empty data
/// section is not (it yields an empty entry list and, downstream, an empty
/// report table).
pub fn fetch_usage(
    metric: Metric,
    start: NaiveDate,
    end: NaiveDate,
    accounts: &[String],
    month: Option<&str>,
) -> Result<Vec<RawUsageEntry>> {
    let args = build_args(metric, start, end, accounts);
    let command_line = format!("sreport {}", args.join(" "));
    debug!("Starting subprocess: {}", command_line);

    let output = Command::new("sreport")
        .args(&args)
        .output()
        .map_err(|source| AcctError::SreportFailed {
            command: command_line.clone(),
            source: Some(source),
        })?;

    if !output.status.success() {
        return Err(AcctError::SreportFailed {
            command: command_line,
            source: None,
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_output(&stdout, metric, month)
}

/// Run one sreport query per full calendar month in the requested range and
/// concatenate the tagged entries.
pub fn fetch_usage_monthly(
    metric: Metric,
    start: NaiveDate,
    end: NaiveDate,
    accounts: &[String],
) -> Result<Vec<RawUsageEntry>> {
    let mut entries = Vec::new();
    for window in month_windows(start, end) {
        debug!("Gathering usage for month {}", window.label);
        let month_entries = fetch_usage(
            metric,
            window.start,
            window.end,
            accounts,
            Some(&window.label),
        )?;
        entries.extend(month_entries);
    }
    Ok(entries)
}

// ── Month windows ─────────────────────────────────────────────────────────────

/// One full calendar month of the monthly breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthWindow {
    /// First day of the month (inclusive).
    pub start: NaiveDate,
    /// First day of the next month (exclusive).
    pub end: NaiveDate,
    /// `"%Y-%m"` bucket label.
    pub label: String,
}

/// Every full month starting with the start date's month, up to and NOT
/// including the end date's month.
pub fn month_windows(start: NaiveDate, end: NaiveDate) -> Vec<MonthWindow> {
    let end_month = first_of_month(end);
    let mut windows = Vec::new();
    let mut current = first_of_month(start);

    loop {
        let next = next_month(current);
        if next > end_month {
            break;
        }
        windows.push(MonthWindow {
            start: current,
            end: next,
            label: current.format("%Y-%m").to_string(),
        });
        current = next;
    }

    windows
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    // Day 1 always exists for a valid (year, month).
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn next_month(first_day: NaiveDate) -> NaiveDate {
    let (year, month) = if first_day.month() == 12 {
        (first_day.year() + 1, 1)
    } else {
        (first_day.year(), first_day.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(first_day)
}

// ── Output parsing ────────────────────────────────────────────────────────────

/// Parse pipe-delimited sreport output into raw usage entries.
///
/// Banner lines before the header are skipped; the header is recognized by
/// the column names the query asked for. For the CPU metric, rows with an
/// empty Login are account-total lines and are dropped. Output with data
/// but no recognizable header is malformed and fatal; output with no data
/// at all is an empty result set.
pub fn parse_output(
    output: &str,
    metric: Metric,
    month: Option<&str>,
) -> Result<Vec<RawUsageEntry>> {
    let mut lines = output.lines();

    let header = loop {
        match lines.next() {
            Some(line) if is_header(line, metric) => break line,
            Some(_) => continue,
            None => {
                if output.trim().is_empty() {
                    return Ok(Vec::new());
                }
                return Err(AcctError::SreportOutput(format!(
                    "no {} header line found",
                    match metric {
                        Metric::CpuTime => "Login|Account|Used",
                        Metric::Jobs => "job count",
                    }
                )));
            }
        }
    };

    let columns: Vec<&str> = header.split('|').collect();
    let login_idx = find_column(&columns, &["Login"]);
    let account_idx = find_column(&columns, &["Account"]);
    let used_idx = match metric {
        Metric::CpuTime => find_column(&columns, &["Used"]),
        Metric::Jobs => find_column(&columns, &["JobCount", "Job Count", "Count"]),
    };

    let (Some(account_idx), Some(used_idx)) = (account_idx, used_idx) else {
        return Err(AcctError::SreportOutput(
            "header is missing the Account or usage column".to_string(),
        ));
    };

    let mut entries = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() != columns.len() {
            continue;
        }

        let login = login_idx
            .and_then(|i| fields.get(i))
            .map(|s| s.trim())
            .unwrap_or("");

        // Account-total rows have no login for the CPU metric.
        if metric == Metric::CpuTime && login.is_empty() {
            continue;
        }

        entries.push(RawUsageEntry {
            login: login.to_string(),
            account: fields[account_idx].trim().to_string(),
            used: fields[used_idx].trim().to_string(),
            month: month.map(String::from),
        });
    }

    Ok(entries)
}

fn is_header(line: &str, metric: Metric) -> bool {
    if !line.contains('|') {
        return false;
    }
    let columns: Vec<&str> = line.split('|').collect();
    match metric {
        Metric::CpuTime => {
            find_column(&columns, &["Login"]).is_some()
                && find_column(&columns, &["Account"]).is_some()
                && find_column(&columns, &["Used"]).is_some()
        }
        Metric::Jobs => {
            find_column(&columns, &["Account"]).is_some()
                && find_column(&columns, &["JobCount", "Job Count", "Count"]).is_some()
        }
    }
}

fn find_column(columns: &[&str], names: &[&str]) -> Option<usize> {
    columns
        .iter()
        .position(|c| names.iter().any(|n| c.trim() == *n))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
