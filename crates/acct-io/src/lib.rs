//! I/O collaborators for slurmacc.
//!
//! Everything that touches the outside world lives here: invoking the
//! sreport accounting tool and parsing its pipe-delimited output, loading
//! the user→organization mapping from the user-administration database,
//! and rendering the finished report table to screen or CSV. The engine in
//! `acct-engine` stays pure.

pub mod db;
pub mod render;
pub mod sreport;

pub use acct_core as core;
