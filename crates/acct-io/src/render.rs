//! Screen and CSV rendering of the finished report table.
//!
//! Both renderers consume the ordered [`ReportTable`] produced by the
//! engine; neither mutates it. An empty table renders a "no data" notice
//! (screen) or a header-only file (CSV) instead of erroring.

use std::io::Write;
use std::path::Path;

use acct_core::error::Result;
use acct_core::formatting::{convert_cpu_seconds, format_value, value_column_label};
use acct_core::models::{Metric, ReportTable, TimeUnit};
use chrono::NaiveDate;
use tracing::debug;
use unicode_width::UnicodeWidthStr;

/// Message shown when the requested period and accounts matched nothing.
const NO_DATA: &str = "No accounting data for the requested period.";

// ── Screen ────────────────────────────────────────────────────────────────────

/// Print the table in human-readable aligned columns.
pub fn render_screen<W: Write>(
    table: &ReportTable,
    metric: Metric,
    unit: TimeUnit,
    out: &mut W,
) -> std::io::Result<()> {
    if table.is_empty() {
        return writeln!(out, "{}", NO_DATA);
    }

    let mut header: Vec<String> = table
        .key_labels()
        .into_iter()
        .map(String::from)
        .collect();
    header.push(value_column_label(metric, unit));

    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            let mut cells: Vec<String> =
                row.key.fields().into_iter().map(String::from).collect();
            cells.push(format_value(row.value, metric, unit));
            cells
        })
        .collect();

    // Column widths over header and body, in terminal display columns so
    // accented names do not shift the columns after them.
    let mut widths: Vec<usize> = header.iter().map(|cell| cell.width()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    write_aligned(out, &header, &widths)?;
    for row in &rows {
        write_aligned(out, row, &widths)?;
    }

    Ok(())
}

/// One line: key cells left-aligned, the trailing value cell right-aligned.
///
/// Padding is written by hand because the `format!` width counts chars,
/// not display columns.
fn write_aligned<W: Write>(out: &mut W, cells: &[String], widths: &[usize]) -> std::io::Result<()> {
    let last = cells.len() - 1;
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            write!(out, "  ")?;
        }
        let pad = " ".repeat(widths[i].saturating_sub(cell.width()));
        if i == last {
            write!(out, "{}{}", pad, cell)?;
        } else {
            write!(out, "{}{}", cell, pad)?;
        }
    }
    writeln!(out)
}

// ── CSV ───────────────────────────────────────────────────────────────────────

/// Report file name,
/// `usage_<metric>[_monthly]_<start>_<end>.csv`, where the CPU metric also
/// carries its time-unit letter (`usage_cpu_m_…`).
pub fn csv_file_name(
    metric: Metric,
    unit: TimeUnit,
    monthly: bool,
    start: NaiveDate,
    end: NaiveDate,
) -> String {
    let mut name = String::from("usage");

    match metric {
        Metric::CpuTime => {
            name.push_str("_cpu_");
            name.push_str(unit.flag());
        }
        Metric::Jobs => name.push_str("_jobs"),
    }

    if monthly {
        name.push_str("_monthly");
    }

    format!(
        "{}_{}_{}.csv",
        name,
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    )
}

/// Write the table as CSV. Values are written plain (no thousands
/// separators) so the file stays machine-readable.
pub fn write_csv(table: &ReportTable, metric: Metric, unit: TimeUnit, path: &Path) -> Result<()> {
    debug!("Writing report to {}", path.display());

    let mut writer = csv::Writer::from_path(path).map_err(anyhow::Error::from)?;

    let mut header: Vec<String> = table
        .key_labels()
        .into_iter()
        .map(String::from)
        .collect();
    header.push(value_column_label(metric, unit));
    writer.write_record(&header).map_err(anyhow::Error::from)?;

    for row in &table.rows {
        let mut cells: Vec<String> = row.key.fields().into_iter().map(String::from).collect();
        cells.push(csv_value(row.value, metric, unit));
        writer.write_record(&cells).map_err(anyhow::Error::from)?;
    }

    writer.flush().map_err(anyhow::Error::from)?;
    Ok(())
}

fn csv_value(value: f64, metric: Metric, unit: TimeUnit) -> String {
    match metric {
        Metric::CpuTime => format!("{:.2}", convert_cpu_seconds(value, unit)),
        Metric::Jobs => format!("{:.2}", value),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use acct_core::models::{AggregateRow, GroupKey, Grouping};
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_table() -> ReportTable {
        ReportTable {
            rows: vec![
                AggregateRow {
                    key: GroupKey {
                        faculty: Some("AI".into()),
                        department: Some("XYZ".into()),
                        ..Default::default()
                    },
                    value: 7200.0,
                },
                AggregateRow {
                    key: GroupKey {
                        faculty: Some("BME".into()),
                        department: Some("WXY".into()),
                        ..Default::default()
                    },
                    value: 3600.0,
                },
            ],
            grouping: Grouping {
                account: false,
                faculty: true,
                department: true,
                user: false,
            },
            monthly: false,
        }
    }

    fn empty_table() -> ReportTable {
        ReportTable {
            rows: vec![],
            grouping: Grouping::USER,
            monthly: false,
        }
    }

    // ── screen ────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_screen_header_and_rows() {
        let mut out = Vec::new();
        render_screen(
            &sample_table(),
            Metric::CpuTime,
            TimeUnit::Hours,
            &mut out,
        )
        .expect("render");
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Faculty"));
        assert!(lines[0].contains("Department"));
        assert!(lines[0].contains("CPU time (h)"));
        assert!(lines[1].contains("AI"));
        assert!(lines[1].contains("2.00"));
        assert!(lines[2].contains("1.00"));
    }

    #[test]
    fn test_render_screen_jobs_one_row_per_account() {
        let table = ReportTable {
            rows: vec![
                AggregateRow {
                    key: GroupKey {
                        account: Some("chem".into()),
                        ..Default::default()
                    },
                    value: 7.0,
                },
                AggregateRow {
                    key: GroupKey {
                        account: Some("physics".into()),
                        ..Default::default()
                    },
                    value: 120.0,
                },
            ],
            grouping: Grouping::ACCOUNT,
            monthly: false,
        };
        let mut out = Vec::new();
        render_screen(&table, Metric::Jobs, TimeUnit::Minutes, &mut out).expect("render");
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("Account"));
        assert!(lines[0].contains("Jobs"));
        assert!(lines[1].starts_with("chem"));
        assert!(lines[2].starts_with("physics"));
    }

    #[test]
    fn test_render_screen_aligns_on_display_width() {
        // "Zoe\u{308}" is four chars but three display columns; the value
        // column must still line up with the ASCII row below it.
        let table = ReportTable {
            rows: vec![
                AggregateRow {
                    key: GroupKey {
                        user: Some("Zoe\u{308}".into()),
                        ..Default::default()
                    },
                    value: 3600.0,
                },
                AggregateRow {
                    key: GroupKey {
                        user: Some("Abel".into()),
                        ..Default::default()
                    },
                    value: 3600.0,
                },
            ],
            grouping: Grouping::USER,
            monthly: false,
        };
        let mut out = Vec::new();
        render_screen(&table, Metric::CpuTime, TimeUnit::Hours, &mut out).expect("render");
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[1].width(), lines[2].width());
        assert!(lines[1].ends_with("1.00"));
        assert!(lines[2].ends_with("1.00"));
    }

    #[test]
    fn test_render_screen_empty_table_prints_no_data() {
        let mut out = Vec::new();
        render_screen(&empty_table(), Metric::CpuTime, TimeUnit::Minutes, &mut out)
            .expect("render");
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.trim(), NO_DATA);
    }

    // ── csv ───────────────────────────────────────────────────────────────────

    #[test]
    fn test_csv_file_name_cpu_with_unit() {
        let name = csv_file_name(
            Metric::CpuTime,
            TimeUnit::Minutes,
            false,
            date(2024, 1, 1),
            date(2024, 6, 1),
        );
        assert_eq!(name, "usage_cpu_m_2024-01-01_2024-06-01.csv");
    }

    #[test]
    fn test_csv_file_name_jobs_no_unit() {
        let name = csv_file_name(
            Metric::Jobs,
            TimeUnit::Minutes,
            false,
            date(2024, 1, 1),
            date(2024, 6, 1),
        );
        assert_eq!(name, "usage_jobs_2024-01-01_2024-06-01.csv");
    }

    #[test]
    fn test_csv_file_name_monthly_marker() {
        let name = csv_file_name(
            Metric::CpuTime,
            TimeUnit::Hours,
            true,
            date(2024, 1, 1),
            date(2024, 6, 1),
        );
        assert_eq!(name, "usage_cpu_h_monthly_2024-01-01_2024-06-01.csv");
    }

    #[test]
    fn test_write_csv_round_trip() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("report.csv");

        write_csv(&sample_table(), Metric::CpuTime, TimeUnit::Hours, &path).expect("write");

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Faculty,Department,CPU time (h)");
        assert_eq!(lines[1], "AI,XYZ,2.00");
        assert_eq!(lines[2], "BME,WXY,1.00");
    }

    #[test]
    fn test_write_csv_empty_table_header_only() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("empty.csv");

        write_csv(&empty_table(), Metric::Jobs, TimeUnit::Minutes, &path).expect("write");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), "User,Jobs");
    }
}
