use crate::types::TxnId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // ── Generation invariants (fatal to the run) ──────────────────

    #[error("Unbalanced transaction {txn_id}: debits {debits:.2} != credits {credits:.2}")]
    UnbalancedTransaction {
        txn_id: TxnId,
        debits: f64,
        credits: f64,
    },

    #[error("Transaction '{description}' has no non-zero lines")]
    EmptyTransaction { description: String },

    #[error("Invalid amount {amount} on account {account_id}")]
    InvalidAmount { account_id: String, amount: f64 },

    #[error("Account '{account_id}' is not in the chart of accounts")]
    UnknownAccount { account_id: String },

    #[error("Duplicate account_id '{account_id}' in chart of accounts")]
    DuplicateAccount { account_id: String },

    // ── Input / schema errors (fail fast) ─────────────────────────

    #[error("Missing input file: {path}")]
    MissingFile { path: String },

    #[error("{file}: missing required column '{column}'")]
    MissingColumn { file: String, column: String },

    #[error("{file}: event_type '{event_type}' is not valid for subledger '{subledger}'")]
    InvalidEventType {
        file: String,
        subledger: String,
        event_type: String,
    },

    #[error("Invalid month '{value}', expected YYYY-MM")]
    InvalidMonth { value: String },

    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
