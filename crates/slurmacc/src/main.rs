mod bootstrap;

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;
use clap::Parser;

use acct_core::config::Config;
use acct_core::models::{Metric, TimeUnit};
use acct_core::settings::Settings;
use acct_engine::pipeline::{generate_report, ReportRequest};
use acct_engine::resolver::AffiliationResolver;
use acct_io::db::{AffiliationStore, MysqlAffiliationStore};
use acct_io::{render, sreport};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::parse();
    bootstrap::setup_logging(settings.debug)?;
    let settings = settings.validate()?;

    tracing::debug!("slurmacc v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::debug!(
        "Period {} to {}, metric {:?}",
        settings.start_date,
        settings.end_date,
        settings.metric()
    );

    let config = Config::load_or_scaffold(&settings.config_file)?;

    // Gather the raw usage entries from the accounting tool.
    let metric = settings.metric();
    let entries = if settings.monthly {
        sreport::fetch_usage_monthly(
            metric,
            settings.start_date,
            settings.end_date,
            &settings.accounts,
        )?
    } else {
        sreport::fetch_usage(
            metric,
            settings.start_date,
            settings.end_date,
            &settings.accounts,
            None,
        )?
    };

    // Distinct logins present in the usage data. The job-count query has no
    // per-user breakdown, so its set is empty; the database is then skipped
    // and the report is keyed per account instead.
    let logins: Vec<String> = entries
        .iter()
        .map(|e| e.login.clone())
        .filter(|login| !login.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mapping = if logins.is_empty() {
        Default::default()
    } else {
        let store = MysqlAffiliationStore::connect(&config.database).await?;
        store
            .load(&logins, settings.start_date, settings.end_date)
            .await?
    };
    let resolver = AffiliationResolver::new(mapping);

    let request = ReportRequest {
        grouping: settings.grouping(),
        monthly: settings.monthly,
        sort: settings.sort_mode(),
        percent: metric == Metric::CpuTime && settings.unit() == TimeUnit::Percent,
    };
    let table = generate_report(&entries, &resolver, &request);

    if settings.view {
        render::render_screen(&table, metric, settings.unit(), &mut std::io::stdout())?;
    }

    if settings.csv {
        let name = render::csv_file_name(
            metric,
            settings.unit(),
            settings.monthly,
            settings.start_date,
            settings.end_date,
        );
        render::write_csv(&table, metric, settings.unit(), Path::new(&name))?;
        tracing::debug!("Wrote report to {}", name);
    }

    Ok(())
}
