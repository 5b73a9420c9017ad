mod orchestrator;
mod run;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use salesort_core::{Event, EventLog, InputFormat};
use salesort_shopify::AdminClient;
use tracing_subscriber::EnvFilter;

use crate::run::{run_reorder, RunOptions};

#[derive(Debug, Parser)]
#[command(name = "salesort")]
#[command(about = "Reorder a Shopify collection by units sold")]
struct Cli {
    /// Handle of the collection to reorder, e.g. `best-sellers`.
    #[arg(long, env = "SALESORT_COLLECTION")]
    collection: String,

    /// Sales export (CSV or JSON Lines).
    #[arg(long)]
    file: PathBuf,

    /// Input format; inferred from the file extension when omitted.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Pause between move calls, in milliseconds.
    #[arg(long, env = "SALESORT_DELAY_MS", default_value_t = 500)]
    delay_ms: u64,

    /// Directory for the per-run event log.
    #[arg(long, env = "SALESORT_LOG_DIR", default_value = "logs")]
    log_dir: PathBuf,

    /// Resolve the collection and log planned moves without changing anything.
    #[arg(long)]
    dry_run: bool,

    /// Switch the collection to manual sorting first if needed.
    #[arg(long)]
    set_manual: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Csv,
    Jsonl,
}

impl From<FormatArg> for InputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => InputFormat::Csv,
            FormatArg::Jsonl => InputFormat::JsonLines,
        }
    }
}

impl Cli {
    fn run_options(&self) -> anyhow::Result<RunOptions> {
        let format = match self.format {
            Some(format) => format.into(),
            None => InputFormat::from_path(&self.file)?,
        };
        Ok(RunOptions {
            collection: self.collection.clone(),
            file: self.file.clone(),
            format,
            delay: Duration::from_millis(self.delay_ms),
            dry_run: self.dry_run,
            set_manual: self.set_manual,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = salesort_core::load_app_config();
    let level = config
        .as_ref()
        .map_or_else(|_| "info".to_string(), |c| c.log_level.clone());
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let log = match EventLog::open(&cli.log_dir, chrono::Utc::now()) {
        Ok(log) => log,
        Err(err) => {
            tracing::warn!(
                error = %err,
                dir = %cli.log_dir.display(),
                "cannot create event log file; logging to console only"
            );
            EventLog::console_only()
        }
    };
    if let Some(path) = log.path() {
        tracing::info!(path = %path.display(), "event log opened");
    }

    let result = execute(&cli, config, &log).await;
    if let Err(err) = &result {
        log.record(&Event::error("run_failed").detail(format!("{err:#}")));
    }
    log.flush();
    result
}

async fn execute(
    cli: &Cli,
    config: Result<salesort_core::AppConfig, salesort_core::ConfigError>,
    log: &EventLog,
) -> anyhow::Result<()> {
    log.record(&Event::info("run_started").detail(format!(
        "collection={} file={} dry_run={}",
        cli.collection,
        cli.file.display(),
        cli.dry_run
    )));

    let config = config.context("invalid configuration")?;
    let options = cli.run_options()?;
    let client = AdminClient::from_config(&config).context("failed to build Shopify client")?;
    tracing::debug!(endpoint = %client.endpoint(), "admin client ready");

    match run_reorder(&client, &options, log).await? {
        Some(report) => tracing::info!(%report, "reorder finished"),
        None => tracing::info!("no sales lines to rank; nothing changed"),
    }
    Ok(())
}

#[cfg(test)]
mod tests;
