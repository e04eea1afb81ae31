use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ReconError {
    #[error("CSV error: {0}")]
    #[diagnostic(code(ledger_recon::csv))]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(ledger_recon::io))]
    IoError(#[from] std::io::Error),

    #[error("Config error: {0}")]
    #[diagnostic(code(ledger_recon::config))]
    ConfigError(String),

    #[error("Input too large: {total} rows across both ledgers, limit is {max}")]
    #[diagnostic(
        code(ledger_recon::row_limit),
        help("split the ledgers into smaller periods or raise `max_total_rows`")
    )]
    RowLimitExceeded { total: usize, max: usize },

    #[error("Oracle error: {0}")]
    #[diagnostic(code(ledger_recon::oracle))]
    OracleError(#[from] OracleError),
}

/// Failures of the oracle transport itself.
///
/// These are not recovered by the adapter: a single failed call aborts the
/// whole reconciliation.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("unexpected response envelope: {0}")]
    InvalidEnvelope(String),
}

pub type Result<T> = std::result::Result<T, ReconError>;
