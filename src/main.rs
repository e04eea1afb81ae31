use clap::Parser;
use ledger_recon::application::engine::ReconciliationEngine;
use ledger_recon::config::AppConfig;
use ledger_recon::domain::ports::OracleTransportBox;
use ledger_recon::error::ReconError;
use ledger_recon::infrastructure::http_oracle::HttpOracle;
use ledger_recon::interfaces::csv::ledger_reader::LedgerReader;
use ledger_recon::interfaces::json::result_writer::ResultWriter;
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Left ledger CSV file ("file A")
    left: PathBuf,

    /// Right ledger CSV file ("file B")
    right: PathBuf,

    /// TOML file with [matching] and [oracle] tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum oracle confidence for a pairing to be committed
    #[arg(long)]
    threshold: Option<f64>,

    /// Maximum calendar-day distance between candidate dates
    #[arg(long)]
    date_tolerance_days: Option<u32>,

    /// Maximum absolute amount difference between candidates
    #[arg(long)]
    amount_tolerance: Option<Decimal>,

    /// Combined row cap across both ledgers
    #[arg(long)]
    max_rows: Option<usize>,

    /// OpenAI-compatible chat-completions URL
    #[arg(long, env = "LEDGER_RECON_ENDPOINT")]
    endpoint: Option<String>,

    /// Model name sent to the endpoint
    #[arg(long)]
    model: Option<String>,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    if let Some(threshold) = cli.threshold {
        config.matching.match_threshold = threshold;
    }
    if let Some(days) = cli.date_tolerance_days {
        config.matching.date_tolerance_days = days;
    }
    if let Some(amount) = cli.amount_tolerance {
        config.matching.amount_tolerance = amount;
    }
    if let Some(max_rows) = cli.max_rows {
        config.matching.max_total_rows = max_rows;
    }
    if let Some(endpoint) = &cli.endpoint {
        config.oracle.endpoint = endpoint.clone();
    }
    if let Some(model) = &cli.model {
        config.oracle.model = model.clone();
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "ledger_recon=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let left = LedgerReader::new(File::open(&cli.left).into_diagnostic()?).read_all()?;
    let right = LedgerReader::new(File::open(&cli.right).into_diagnostic()?).read_all()?;
    info!(
        left = %cli.left.display(),
        right = %cli.right.display(),
        "loaded ledgers"
    );

    let api_key = std::env::var(&config.oracle.api_key_env).ok();
    if api_key.is_none() {
        warn!(
            variable = %config.oracle.api_key_env,
            "no API key set, calling the oracle without authorization"
        );
    }

    let transport: OracleTransportBox =
        Box::new(HttpOracle::new(&config.oracle, api_key).map_err(ReconError::from)?);
    let engine = ReconciliationEngine::new(transport, config.matching);
    let result = engine.reconcile(&left, &right).await?;

    let stdout = io::stdout();
    let mut writer = ResultWriter::new(stdout.lock(), cli.pretty);
    writer.write_result(&result)?;

    Ok(())
}
