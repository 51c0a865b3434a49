use analytics::{AnalyticsEngine, Dashboard, Metrics, export};
use anyhow::Context;
use clap::{Parser, Subcommand};
use configuration::{Config, LoggingConfig};
use core_types::Month;
use database::{DbRepository, LoadProgress};
use indicatif::{ProgressBar, ProgressStyle};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod report;

/// The main entry point for the stock dashboard.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if any.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = configuration::load_config(cli.config.as_deref())?;
    let _guard = init_tracing(&config.logging)?;

    let result = match cli.command {
        Commands::Report(args) => handle_report(args, &config).await,
        Commands::Export(args) => handle_export(args, &config).await,
        Commands::Months => handle_months(&config).await,
        Commands::Serve(args) => handle_serve(args, config).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = ?e, "Command failed.");
    }
    result
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Yearly, monthly and sector performance of a universe of stocks.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (defaults to ./config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dashboard as terminal tables.
    Report(ReportArgs),
    /// Write the yearly and monthly return tables as CSV files.
    Export(ExportArgs),
    /// List the months that can be selected.
    Months,
    /// Serve the dashboard over HTTP.
    Serve(ServeArgs),
}

#[derive(Parser)]
struct ReportArgs {
    /// Month for the monthly panels (format: YYYY-MM). Defaults to the earliest.
    #[arg(long)]
    month: Option<Month>,
}

#[derive(Parser)]
struct ExportArgs {
    /// Month for the monthly CSV (format: YYYY-MM). Defaults to the earliest.
    #[arg(long)]
    month: Option<Month>,

    /// Output directory. Overrides `export.output_dir`.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Parser)]
struct ServeArgs {
    /// Listen address. Overrides `server.host` and `server.port`.
    #[arg(long)]
    addr: Option<SocketAddr>,
}

// ==============================================================================
// Logging
// ==============================================================================

/// Console logging on stderr, plus a daily rolling file when
/// `logging.directory` is set. The returned guard flushes the file writer
/// and must live until exit.
fn init_tracing(settings: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console = fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &settings.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .context("failed to install the tracing subscriber")?;

    Ok(guard)
}

// ==============================================================================
// Loading
// ==============================================================================

/// Loads every ticker table with a progress bar, then runs the pipeline.
async fn load_metrics(config: &Config) -> anyhow::Result<Metrics> {
    let pool = database::connect(&config.database).await?;
    let db_repo = DbRepository::new(pool);

    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let records = db_repo
        .load_all_prices_with_progress(|progress| match progress {
            LoadProgress::Started { tables } => progress_bar.set_length(tables as u64),
            LoadProgress::TableLoaded { table, rows } => {
                progress_bar.set_message(format!("{table}: {rows} rows"));
                progress_bar.inc(1);
            }
        })
        .await;
    match &records {
        Ok(records) => progress_bar.finish_with_message(format!("Loaded {} records.", records.len())),
        Err(_) => progress_bar.abandon_with_message("Load failed."),
    }

    Ok(AnalyticsEngine::new().run(records?)?)
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_report(args: ReportArgs, config: &Config) -> anyhow::Result<()> {
    let metrics = load_metrics(config).await?;
    let dashboard = Dashboard::build(&metrics, &config.dashboard, args.month)?;
    println!("{}", report::render(&dashboard));
    Ok(())
}

async fn handle_export(args: ExportArgs, config: &Config) -> anyhow::Result<()> {
    let metrics = load_metrics(config).await?;
    let month = metrics.select_month(args.month)?;
    let out_dir = args.out_dir.unwrap_or_else(|| config.export.output_dir.clone());

    let paths = export::export_to_dir(&out_dir, &metrics.tickers, &metrics.monthly(month)?)?;
    println!("Yearly returns:  {}", paths.yearly.display());
    println!("Monthly returns ({month}): {}", paths.monthly.display());
    Ok(())
}

async fn handle_months(config: &Config) -> anyhow::Result<()> {
    let metrics = load_metrics(config).await?;
    for month in &metrics.months {
        println!("{month}");
    }
    Ok(())
}

async fn handle_serve(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(addr) = args.addr {
        config.server.host = addr.ip().to_string();
        config.server.port = addr.port();
    }
    web_server::run_server(config).await
}
