use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use figures_core::config::Config;
use figures_core::pipeline::{load_and_prepare, PreparedTable};
use figures_core::warehouse::{DryRunWarehouse, PgWarehouse};
use figures_core::{export, report, stats, sync};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Historical figures table preparation and sync", long_about = None)]
struct Cli {
    /// Configuration file (falls back to FIGURES_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Source CSV, overriding the configured data_path
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print descriptive statistics of the prepared table
    Report,
    /// Prepare the table and print what cleaning did
    Prepare(PrepareArgs),
    /// Insert records whose ID is not yet in the remote table
    Sync(SyncArgs),
}

#[derive(Args, Debug, Default)]
struct PrepareArgs {
    /// Write the prepared records to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct SyncArgs {
    /// Print the statements instead of connecting
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let config_path = cli
        .config
        .or_else(|| env::var_os("FIGURES_CONFIG").map(PathBuf::from));
    let mut config = Config::load(config_path.as_deref())?;
    if let Some(data) = cli.data {
        config.data_path = data;
    }

    match cli.command {
        Command::Report => handle_report(&config),
        Command::Prepare(args) => handle_prepare(&config, args),
        Command::Sync(args) => handle_sync(&config, args).await,
    }
}

fn prepare(config: &Config) -> Result<PreparedTable> {
    load_and_prepare(&config.data_path, &config.clean)
        .with_context(|| format!("failed to prepare {}", config.data_path.display()))
}

fn handle_report(config: &Config) -> Result<()> {
    let prepared = prepare(config)?;
    let statistics = stats::summarize(&prepared.frame)?;
    println!("{}", report::render_statistics(&statistics));
    Ok(())
}

fn handle_prepare(config: &Config, args: PrepareArgs) -> Result<()> {
    let prepared = prepare(config)?;
    println!("{}", report::render_clean_report(&prepared.clean_report));

    if let Some(output) = args.output {
        let records = prepared.records()?;
        let file = File::create(&output)
            .with_context(|| format!("cannot create {}", output.display()))?;
        export::write_csv(&records, BufWriter::new(file))?;
        info!(path = %output.display(), records = records.len(), "Prepared records written");
    }
    Ok(())
}

async fn handle_sync(config: &Config, args: SyncArgs) -> Result<()> {
    let table = config.sync.table_name()?;
    let records = prepare(config)?.records()?;

    let summary = if args.dry_run {
        let mut warehouse = DryRunWarehouse::new();
        let summary = sync::sync_records(&mut warehouse, &table, &records).await?;
        for statement in warehouse.statements() {
            println!("{statement};");
        }
        summary
    } else {
        let mut warehouse = PgWarehouse::connect(&config.warehouse, config.sync.statement_mode)
            .await
            .context("failed to connect to the warehouse")?;
        let summary = sync::sync_records(&mut warehouse, &table, &records).await?;
        warehouse.close().await?;
        summary
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
