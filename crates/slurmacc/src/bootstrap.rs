use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber on stderr.
///
/// The default level is `error` so normal runs stay quiet; `--debug`
/// shows the progression of the program.
pub fn setup_logging(debug: bool) -> anyhow::Result<()> {
    let directive = if debug { "debug" } else { "error" };
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("error"));

    let layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry().with(filter).with(layer).init();

    Ok(())
}
