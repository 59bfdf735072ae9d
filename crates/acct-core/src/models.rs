use serde::{Deserialize, Serialize};

/// Sentinel used when a user's faculty or department is not known.
///
/// It is an ordinary string value on purpose: sorting and grouping treat it
/// like any other faculty code or department id, so "unknown" rows appear
/// wherever the string sorts.
pub const UNKNOWN: &str = "unknown";

// ── Metric & units ────────────────────────────────────────────────────────────

/// The quantity being reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Consumed CPU time. Canonical internal unit: CPU-seconds.
    CpuTime,
    /// Number of jobs run. Canonical internal unit: raw count.
    Jobs,
}

impl Metric {
    /// Short label used in CSV file names (`usage_cpu_…` / `usage_jobs_…`).
    pub fn file_label(&self) -> &'static str {
        match self {
            Metric::CpuTime => "cpu",
            Metric::Jobs => "jobs",
        }
    }
}

/// Output unit for the CPU-time metric. Applied only when rendering; the
/// engine always works in CPU-seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Hours,
    Minutes,
    Seconds,
    /// Percentage of the grand total across all rows of one report.
    Percent,
}

impl TimeUnit {
    /// Parse the single-letter CLI spelling (`h`, `m`, `s`, `p`).
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "h" => Some(TimeUnit::Hours),
            "m" => Some(TimeUnit::Minutes),
            "s" => Some(TimeUnit::Seconds),
            "p" => Some(TimeUnit::Percent),
            _ => None,
        }
    }

    /// The single-letter spelling, used in CSV file names.
    pub fn flag(&self) -> &'static str {
        match self {
            TimeUnit::Hours => "h",
            TimeUnit::Minutes => "m",
            TimeUnit::Seconds => "s",
            TimeUnit::Percent => "p",
        }
    }
}

// ── Usage records ─────────────────────────────────────────────────────────────

/// One row as it comes out of the sreport output parser, still untyped.
///
/// `used` is kept as raw text so that unparseable quantities can be skipped
/// and counted by the normalizer instead of failing the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawUsageEntry {
    pub login: String,
    pub account: String,
    pub used: String,
    /// `"%Y-%m"` label when the entry came from a monthly sub-query.
    pub month: Option<String>,
}

/// A normalized per-account usage record. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    pub account_id: String,
    pub user_id: String,
    /// Metric value in the canonical unit (CPU-seconds or job count).
    pub value: f64,
    /// Month bucket label, present only in monthly mode.
    pub month: Option<String>,
}

// ── Affiliations ──────────────────────────────────────────────────────────────

/// A (faculty, department) pair associated with a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Affiliation {
    pub faculty: String,
    pub department: String,
}

impl Affiliation {
    /// Build an affiliation, degrading an empty faculty and/or department
    /// independently to the [`UNKNOWN`] sentinel. A department may be known
    /// while its faculty is not, and vice versa.
    pub fn new(faculty: impl Into<String>, department: impl Into<String>) -> Self {
        let faculty = faculty.into();
        let department = department.into();
        Self {
            faculty: if faculty.trim().is_empty() {
                UNKNOWN.to_string()
            } else {
                faculty
            },
            department: if department.trim().is_empty() {
                UNKNOWN.to_string()
            } else {
                department
            },
        }
    }

    /// The synthetic affiliation credited to users absent from the mapping.
    pub fn unknown() -> Self {
        Self {
            faculty: UNKNOWN.to_string(),
            department: UNKNOWN.to_string(),
        }
    }
}

// ── Grouping & keys ───────────────────────────────────────────────────────────

/// Which dimensions a report breaks down by.
///
/// The nesting order is fixed: account, then faculty, then department,
/// then user. The account dimension is used by the job-count metric,
/// which has no per-user breakdown and is reported per Slurm account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grouping {
    pub account: bool,
    pub faculty: bool,
    pub department: bool,
    pub user: bool,
}

impl Grouping {
    /// The default when no grouping flag is given: a per-user listing.
    pub const USER: Grouping = Grouping {
        account: false,
        faculty: false,
        department: false,
        user: true,
    };

    /// The per-account listing used by the job-count metric.
    pub const ACCOUNT: Grouping = Grouping {
        account: true,
        faculty: false,
        department: false,
        user: false,
    };

    pub fn is_empty(&self) -> bool {
        !(self.account || self.faculty || self.department || self.user)
    }

    /// Column headers for the selected dimensions, in nesting order.
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        if self.account {
            labels.push("Account");
        }
        if self.faculty {
            labels.push("Faculty");
        }
        if self.department {
            labels.push("Department");
        }
        if self.user {
            labels.push("User");
        }
        labels
    }
}

/// The key one aggregate row is accumulated under.
///
/// Only the dimensions selected by the report's [`Grouping`] are `Some`;
/// `month` is `Some` only in monthly mode. The derived `Ord` walks the
/// fields in declaration order, which is exactly the by-keys sort order
/// (account, faculty, department, user, month).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GroupKey {
    pub account: Option<String>,
    pub faculty: Option<String>,
    pub department: Option<String>,
    pub user: Option<String>,
    pub month: Option<String>,
}

impl GroupKey {
    /// The key fields that are present, in nesting order, for rendering.
    pub fn fields(&self) -> Vec<&str> {
        [
            &self.account,
            &self.faculty,
            &self.department,
            &self.user,
            &self.month,
        ]
        .into_iter()
        .filter_map(|f| f.as_deref())
        .collect()
    }
}

// ── Report table ──────────────────────────────────────────────────────────────

/// One row of the final report: a group key plus the summed metric value.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub key: GroupKey,
    pub value: f64,
}

/// The ordered, read-only result of one report generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub rows: Vec<AggregateRow>,
    pub grouping: Grouping,
    pub monthly: bool,
}

impl ReportTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of the metric values over all rows.
    pub fn grand_total(&self) -> f64 {
        self.rows.iter().map(|r| r.value).sum()
    }

    /// Column headers for the key fields of this table.
    pub fn key_labels(&self) -> Vec<&'static str> {
        let mut labels = self.grouping.labels();
        if self.monthly {
            labels.push("Month");
        }
        labels
    }
}

/// How the final table is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Lexicographic ascending on the grouping key tuple (the default).
    #[default]
    ByKeys,
    /// Descending by metric value; ties keep their by-keys order.
    ByUsage,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
