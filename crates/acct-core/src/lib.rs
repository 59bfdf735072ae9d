//! Core types for the slurmacc accounting reporter.
//!
//! Holds the data model shared by the engine and the I/O collaborators,
//! the CLI settings, the database config file, the error type and the
//! value formatting helpers.

pub mod config;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{AcctError, Result};
