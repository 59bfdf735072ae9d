use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use std::path::PathBuf;

use crate::error::{AcctError, Result};
use crate::models::{Grouping, Metric, TimeUnit};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Cluster usage reports broken down by faculty, department and user.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "slurmacc",
    about = "Reconciles Slurm accounting records with organizational metadata",
    version
)]
pub struct Settings {
    /// Show extra information about the progression of the program
    #[arg(short = 'b', long)]
    pub debug: bool,

    /// Path to the config file
    #[arg(short = 'g', long = "config", default_value = "config.json")]
    pub config_file: PathBuf,

    /// Only include accounting records from this date on (yyyy-mm-dd).
    /// Defaults to one year ago
    #[arg(short = 's', long, default_value_t = default_start_date())]
    pub start_date: NaiveDate,

    /// Only include accounting records up to, and not including, this date
    /// (yyyy-mm-dd). Defaults to today
    #[arg(short = 'e', long, default_value_t = default_end_date())]
    pub end_date: NaiveDate,

    /// Query data only for the selected accounts, separated by commas.
    /// Defaults to querying all accounts
    #[arg(short = 'a', long, value_delimiter = ',')]
    pub accounts: Vec<String>,

    /// Report on used CPU time (units via --time-unit). Mutually exclusive
    /// with --jobs. Default metric if none is selected
    #[arg(short = 'c', long)]
    pub cpu_time: bool,

    /// Report on number of jobs run. Mutually exclusive with --cpu-time
    /// and --monthly
    #[arg(short = 'j', long)]
    pub jobs: bool,

    /// Output time unit for --cpu-time, where p is percent of the total
    #[arg(short = 't', long = "time-unit", default_value = "m", value_parser = ["h", "m", "s", "p"])]
    pub time_unit: String,

    /// Break the report down per full calendar month, starting with the
    /// start date's month, up to and not including the end date's month.
    /// Mutually exclusive with --jobs
    #[arg(short = 'm', long)]
    pub monthly: bool,

    /// Present accounting information for individual users
    #[arg(short = 'u', long)]
    pub user: bool,

    /// Present accounting information for departments
    #[arg(short = 'd', long)]
    pub department: bool,

    /// Present accounting information for faculties
    #[arg(short = 'f', long)]
    pub faculty: bool,

    /// Sort the table on usage instead of on faculty, department or user
    #[arg(short = 'o', long = "sort-by-usage")]
    pub sort_by_usage: bool,

    /// Print the results to the screen. Default output if none is selected
    #[arg(short = 'v', long)]
    pub view: bool,

    /// Write the results to a file named usage_<metric>_<start>_<end>.csv
    #[arg(short = 'x', long)]
    pub csv: bool,
}

/// Today in the local timezone; the default (exclusive) end of the period.
fn default_end_date() -> NaiveDate {
    Local::now().date_naive()
}

/// One calendar year before today; the default start of the period.
fn default_start_date() -> NaiveDate {
    one_year_before(default_end_date())
}

/// Same day one year earlier, falling back to 365 days for Feb 29.
fn one_year_before(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year() - 1, date.month(), date.day())
        .unwrap_or_else(|| date - chrono::Days::new(365))
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Check argument consistency and fill in the defaults that depend on
    /// other flags:
    ///
    /// * the start date must not be after the end date;
    /// * `--cpu-time` and `--jobs` are mutually exclusive, CPU time is the
    ///   default metric;
    /// * `--jobs` and `--monthly` are mutually exclusive;
    /// * screen output is the default when no output flag is given.
    pub fn validate(mut self) -> Result<Self> {
        if self.start_date > self.end_date {
            return Err(AcctError::InvalidArguments(
                "start date cannot be after end date".to_string(),
            ));
        }

        if self.cpu_time && self.jobs {
            return Err(AcctError::InvalidArguments(
                "--cpu-time and --jobs are mutually exclusive".to_string(),
            ));
        }

        if !self.cpu_time && !self.jobs {
            tracing::debug!("No metric argument provided. Using CPU time");
            self.cpu_time = true;
        }

        if self.jobs && self.monthly {
            return Err(AcctError::InvalidArguments(
                "--jobs and --monthly are mutually exclusive".to_string(),
            ));
        }

        if !self.view && !self.csv {
            tracing::debug!("No output argument provided. Printing to screen");
            self.view = true;
        }

        Ok(self)
    }

    /// The selected metric. Call after [`validate`](Self::validate).
    pub fn metric(&self) -> Metric {
        if self.jobs {
            Metric::Jobs
        } else {
            Metric::CpuTime
        }
    }

    /// The selected output time unit. The flag set is validated by clap,
    /// so an unrecognized letter can only mean the default.
    pub fn unit(&self) -> TimeUnit {
        TimeUnit::from_flag(&self.time_unit).unwrap_or(TimeUnit::Minutes)
    }

    /// The selected grouping dimensions, defaulting to a per-user listing
    /// when no grouping flag is given. The job-count metric carries no
    /// per-user information, so it is always listed per Slurm account and
    /// the faculty/department/user flags do not apply.
    pub fn grouping(&self) -> Grouping {
        if self.jobs {
            return Grouping::ACCOUNT;
        }
        let grouping = Grouping {
            account: false,
            faculty: self.faculty,
            department: self.department,
            user: self.user,
        };
        if grouping.is_empty() {
            Grouping::USER
        } else {
            grouping
        }
    }

    /// The selected sort mode.
    pub fn sort_mode(&self) -> crate::models::SortMode {
        if self.sort_by_usage {
            crate::models::SortMode::ByUsage
        } else {
            crate::models::SortMode::ByKeys
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
