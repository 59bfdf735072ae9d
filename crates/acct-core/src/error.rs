use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors produced by the accounting reporter.
///
/// Per-record parse failures are deliberately not represented here: the
/// normalizer skips and counts them (see `acct-engine`). Anything that does
/// surface as an `AcctError` aborts the whole run, since no partial report
/// is meaningful without both data sources.
#[derive(Error, Debug)]
pub enum AcctError {
    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The command-line arguments are inconsistent.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The sreport subprocess could not be started or exited non-zero.
    /// `source` carries the spawn failure (command not found, permission
    /// denied); it is `None` for a non-zero exit.
    #[error("Running sreport failed. Command used: '{command}'")]
    SreportFailed {
        command: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// sreport ran but its output did not contain the expected table.
    #[error("Failed to read sreport output: {0}")]
    SreportOutput(String),

    /// The user-administration database could not be queried.
    #[error("Database query failed: {0}")]
    Database(#[from] sqlx::Error),

    /// A JSON document (the config file) could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A file could not be opened or written.
    #[error("Failed to access {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Pass-through for raw I/O errors that do not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the slurmacc crates.
pub type Result<T> = std::result::Result<T, AcctError>;
