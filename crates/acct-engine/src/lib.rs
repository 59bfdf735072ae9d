//! Reconciliation and aggregation engine for slurmacc.
//!
//! Normalizes raw sreport rows into usage records, joins them against the
//! user→organization mapping, splits each user's usage equally across that
//! user's affiliations, re-aggregates the shares at the requested
//! granularity and orders the result into a report table. Pure in-memory
//! computation; all I/O lives in `acct-io`.

pub mod aggregator;
pub mod normalizer;
pub mod pipeline;
pub mod ranker;
pub mod resolver;

pub use acct_core as core;
