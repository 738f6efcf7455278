use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use rebook_core::TransactionRecord;
use rebook_finance::{Pipeline, RunOutput};
use rebook_ingest::{CsvExportSource, CsvRecordSink, RowSource};

mod auth;
mod config;
mod sheets;
mod state;

use config::Config;
use sheets::SheetsClient;

#[derive(Parser, Debug)]
#[command(
    name = "rebook",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("REBOOK_BUILD_SHA"), ")"),
    about = "Split ledger sheets into single-amount bookkeeping records"
)]
struct Cli {
    /// Config file (default: ~/.rebook/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decompose the banking ledger into income/expense/transfer records
    Banking(RunArgs),

    /// Reconcile the credit-card ledger into pay/void/transfer records
    Credit(RunArgs),

    /// Write the default config file
    InitConfig,
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Print the records instead of writing them
    #[arg(long)]
    dry_run: bool,

    /// Read `<SHEET>.formatted.csv` / `<SHEET>.formula.csv` from this directory instead of Sheets
    #[arg(long)]
    from_csv: Option<PathBuf>,

    /// Write records to this CSV file instead of Sheets
    #[arg(long)]
    to_csv: Option<PathBuf>,
}

impl RunArgs {
    fn reads_sheets(&self) -> bool {
        self.from_csv.is_none()
    }

    fn writes_sheets(&self) -> bool {
        !self.dry_run && self.to_csv.is_none()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rebook=info,rebook_finance=info,rebook_ingest=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::InitConfig => {
            config::init_config(cli.config.as_deref())?;
        }

        Command::Banking(args) => {
            let cfg = config::load_config(cli.config.as_deref())?;
            let pipeline = cfg.banking_pipeline()?;
            run_ledger(&cfg, &pipeline, &cfg.banking.source_sheet, &args).await?;
        }

        Command::Credit(args) => {
            let cfg = config::load_config(cli.config.as_deref())?;
            let pipeline = cfg.credit_pipeline()?;
            run_ledger(&cfg, &pipeline, &cfg.credit.source_sheet, &args).await?;
        }
    }

    Ok(())
}

async fn run_ledger(cfg: &Config, pipeline: &Pipeline, sheet: &str, args: &RunArgs) -> Result<()> {
    if args.dry_run && args.to_csv.is_some() {
        bail!("--dry-run and --to-csv are mutually exclusive");
    }

    let token = if args.reads_sheets() || args.writes_sheets() {
        Some(auth::access_token(&cfg.sheets).await?)
    } else {
        None
    };
    let token = token.as_deref();

    let output = match &args.from_csv {
        Some(dir) => {
            if !dir.is_dir() {
                bail!("CSV directory not found: {}", dir.display());
            }
            let source = CsvExportSource::new(dir, sheet);
            execute(cfg, pipeline, &source, args, token).await?
        }
        None => {
            let source = SheetsClient::new(sheets_token(token)?, cfg.sheets.source()?);
            execute(cfg, pipeline, &source, args, token).await?
        }
    };

    let summary = &output.summary;
    println!(
        "\nRows: {} (skipped: {}) | Records: {}",
        summary.rows_seen, summary.rows_skipped, summary.records
    );
    for (kind, count) in &summary.by_type {
        println!("  {kind}: {count}");
    }

    Ok(())
}

fn sheets_token(token: Option<&str>) -> Result<&str> {
    token.context("no Sheets access token")
}

async fn execute<S: RowSource>(
    cfg: &Config,
    pipeline: &Pipeline,
    source: &S,
    args: &RunArgs,
    token: Option<&str>,
) -> Result<RunOutput> {
    if args.dry_run {
        let output = pipeline.preview(source).await?;
        print_records(&output.records);
        return Ok(output);
    }

    match &args.to_csv {
        Some(path) => {
            let output = pipeline.run(source, &mut CsvRecordSink::new(path)).await?;
            println!("Wrote {} records to {}", output.records.len(), path.display());
            Ok(output)
        }
        None => {
            let mut sink = SheetsClient::new(sheets_token(token)?, cfg.sheets.destination()?);
            let output = pipeline.run(source, &mut sink).await?;
            println!(
                "Wrote {} records to {}",
                output.records.len(),
                pipeline.destination_range
            );
            Ok(output)
        }
    }
}

fn print_records(records: &[TransactionRecord]) {
    println!(
        "{:<12} {:>12} {:<9} {:>12} {:<16} {}",
        "Date", "Balance", "Type", "Amount", "Category", "Note"
    );
    for r in records {
        let row = r.to_row();
        println!(
            "{:<12} {:>12} {:<9} {:>12} {:<16} {}",
            row[1], row[2], row[3], row[4], row[5], row[7]
        );
    }
}
