//! CSV persistence layer.
//!
//! RULE: Only store.rs talks to the filesystem.
//! The engine and validator work on in-memory tables; this module
//! writes them out and loads them back, validating each file's schema
//! before any row is trusted.
//!
//! Every table has an explicit, ordered header. Rows are written in
//! generation order with `\n` terminators so the same seed always
//! produces byte-identical files.

use crate::{
    coa::{Account, ChartOfAccounts},
    dataset::Dataset,
    error::{LedgerError, LedgerResult},
    journal::JournalLine,
    meta::{RunMeta, DATASET_NAME},
    statements::{Statement, StatementLine, Statements},
    subledger::{DebtScheduleRow, RollforwardRow, SubledgerEvent, SubledgerEventType, SubledgerKind},
    trial_balance::TrialBalanceRow,
    types::TxnId,
    validate::CheckReport,
};
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

pub const CHART_OF_ACCOUNTS_FILE: &str = "chart_of_accounts.csv";
pub const JOURNAL_FILE: &str = "gl_journal.csv";
pub const TRIAL_BALANCE_FILE: &str = "trial_balance_monthly.csv";
pub const DEBT_SCHEDULE_FILE: &str = "debt_schedule.csv";
pub const ROLLFORWARD_FILE: &str = "subledger_rollforward.csv";
pub const CHECKS_SUMMARY_FILE: &str = "checks_summary.json";
pub const CHECKS_MEMO_FILE: &str = "checks_memo.md";

pub fn meta_file_name() -> String {
    format!("{DATASET_NAME}_meta.json")
}

/// Amounts are written with exactly two decimals; `-0.00` is written
/// as `0.00`.
pub mod money {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        let amount = if amount.abs() < 0.005 { 0.0 } else { *amount };
        serializer.serialize_str(&format!("{amount:.2}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        f64::deserialize(deserializer)
    }
}

// ── Table schemas ──────────────────────────────────────────────────

/// A row type with a fixed CSV header. Column order matches field order.
pub trait Table: Serialize + DeserializeOwned {
    const COLUMNS: &'static [&'static str];
}

impl Table for Account {
    const COLUMNS: &'static [&'static str] =
        &["account_id", "account_name", "account_type", "normal_side"];
}

impl Table for JournalLine {
    const COLUMNS: &'static [&'static str] =
        &["txn_id", "date", "account_id", "debit", "credit", "description"];
}

impl Table for TrialBalanceRow {
    const COLUMNS: &'static [&'static str] = &[
        "month",
        "account_id",
        "account_name",
        "account_type",
        "normal_side",
        "debit",
        "credit",
        "ending_balance",
    ];
}

impl Table for StatementLine {
    const COLUMNS: &'static [&'static str] = &["month", "line", "amount"];
}

impl Table for SubledgerEvent {
    const COLUMNS: &'static [&'static str] = &[
        "txn_id",
        "date",
        "month",
        "subledger",
        "event_type",
        "delta",
        "cash_impact",
    ];
}

impl Table for DebtScheduleRow {
    const COLUMNS: &'static [&'static str] = &[
        "month",
        "loan_id",
        "beginning_balance",
        "payment",
        "interest",
        "principal",
        "ending_balance",
    ];
}

impl Table for RollforwardRow {
    const COLUMNS: &'static [&'static str] = &[
        "month",
        "subledger",
        "beginning_balance",
        "increases",
        "decreases",
        "ending_balance",
        "gl_balance",
        "abs_diff",
        "tied",
    ];
}

/// Subledger event row as read from disk, before its event type is
/// checked against the subledger's closed set.
#[derive(Debug, Deserialize)]
struct RawSubledgerEvent {
    txn_id: TxnId,
    date: NaiveDate,
    month: crate::clock::Month,
    subledger: SubledgerKind,
    event_type: String,
    #[serde(with = "money")]
    delta: f64,
    #[serde(with = "money")]
    cash_impact: f64,
}

impl RawSubledgerEvent {
    fn checked(self, file: &str) -> LedgerResult<SubledgerEvent> {
        let event_type = self
            .subledger
            .event_types()
            .iter()
            .copied()
            .find(|t: &SubledgerEventType| t.name() == self.event_type)
            .ok_or_else(|| LedgerError::InvalidEventType {
                file: file.to_string(),
                subledger: self.subledger.name().to_string(),
                event_type: self.event_type.clone(),
            })?;
        Ok(SubledgerEvent {
            txn_id: self.txn_id,
            date: self.date,
            month: self.month,
            subledger: self.subledger,
            event_type,
            delta: self.delta,
            cash_impact: self.cash_impact,
        })
    }
}

// ── Generic read / write ───────────────────────────────────────────

/// Write rows under the table's header.
pub fn write_csv<T: Table, W: io::Write>(writer: W, rows: &[T]) -> LedgerResult<()> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    csv.write_record(T::COLUMNS)?;
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Rows rendered to CSV bytes, exactly as they would be written to disk.
pub fn csv_bytes<T: Table>(rows: &[T]) -> LedgerResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(&mut buf, rows)?;
    Ok(buf)
}

/// Read rows after checking every required column is present.
/// Extra columns are ignored. Header names are trimmed before both the
/// check and deserialization; field values are not.
fn read_csv<R: DeserializeOwned, T: Table, I: io::Read>(reader: I, file: &str) -> LedgerResult<Vec<R>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers = csv.headers()?.clone();
    for column in T::COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(LedgerError::MissingColumn {
                file: file.to_string(),
                column: column.to_string(),
            });
        }
    }
    csv.deserialize().map(|row| row.map_err(LedgerError::from)).collect()
}

// ── Dataset directory ──────────────────────────────────────────────

pub struct DatasetStore {
    dir: PathBuf,
}

impl DatasetStore {
    /// Open (or create) an output directory.
    pub fn open(dir: impl AsRef<Path>) -> LedgerResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Point at an existing directory without creating it (for loading).
    pub fn at(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn write_table<T: Table>(&self, file: &str, rows: &[T]) -> LedgerResult<()> {
        let out = fs::File::create(self.path(file))?;
        write_csv(io::BufWriter::new(out), rows)?;
        log::debug!("wrote {file} ({} rows)", rows.len());
        Ok(())
    }

    fn open_file(&self, file: &str) -> LedgerResult<fs::File> {
        let path = self.path(file);
        if !path.is_file() {
            return Err(LedgerError::MissingFile {
                path: path.display().to_string(),
            });
        }
        Ok(fs::File::open(path)?)
    }

    fn read_table<T: Table>(&self, file: &str) -> LedgerResult<Vec<T>> {
        let rows = read_csv::<T, T, _>(io::BufReader::new(self.open_file(file)?), file)?;
        log::debug!("read {file} ({} rows)", rows.len());
        Ok(rows)
    }

    // ── Dataset ────────────────────────────────────────────────

    pub fn write_dataset(&self, dataset: &Dataset) -> LedgerResult<()> {
        self.write_table(CHART_OF_ACCOUNTS_FILE, dataset.coa.accounts())?;
        self.write_table(JOURNAL_FILE, &dataset.journal)?;
        self.write_table(TRIAL_BALANCE_FILE, &dataset.trial_balance)?;
        for statement in STATEMENTS {
            self.write_table(statement.file_name(), dataset.statements.lines(statement))?;
        }
        for file in subledger_files() {
            let rows: Vec<SubledgerEvent> = dataset
                .subledger_events
                .iter()
                .filter(|e| e.subledger.file_name() == file)
                .cloned()
                .collect();
            self.write_table(file, &rows)?;
        }
        self.write_table(DEBT_SCHEDULE_FILE, &dataset.debt_schedule)?;

        let meta = serde_json::to_string_pretty(&dataset.meta)?;
        fs::write(self.path(&meta_file_name()), meta + "\n")?;

        log::info!("Dataset written to {}", self.dir.display());
        Ok(())
    }

    /// Load a dataset, failing fast on missing files, missing columns,
    /// unknown accounts or invalid event types.
    pub fn load_dataset(&self) -> LedgerResult<Dataset> {
        let meta_file = meta_file_name();
        let meta: RunMeta = serde_json::from_reader(io::BufReader::new(self.open_file(&meta_file)?))?;

        let coa = ChartOfAccounts::new(self.read_table::<Account>(CHART_OF_ACCOUNTS_FILE)?)?;

        let journal: Vec<JournalLine> = self.read_table(JOURNAL_FILE)?;
        for line in &journal {
            coa.require(&line.account_id)?;
        }

        let trial_balance: Vec<TrialBalanceRow> = self.read_table(TRIAL_BALANCE_FILE)?;
        for row in &trial_balance {
            coa.require(&row.account_id)?;
        }

        let statements = Statements {
            income_statement: self.read_table(Statement::IncomeStatement.file_name())?,
            balance_sheet: self.read_table(Statement::BalanceSheet.file_name())?,
            cash_flow: self.read_table(Statement::CashFlow.file_name())?,
        };

        let mut subledger_events = Vec::new();
        for file in subledger_files() {
            let raw: Vec<RawSubledgerEvent> = read_csv::<_, SubledgerEvent, _>(
                io::BufReader::new(self.open_file(file)?),
                file,
            )?;
            for event in raw {
                subledger_events.push(event.checked(file)?);
            }
        }
        // Files are read one at a time; restore posting order.
        subledger_events.sort_by_key(|e: &SubledgerEvent| e.txn_id);

        let debt_schedule = self.read_table(DEBT_SCHEDULE_FILE)?;

        log::info!(
            "Loaded {} journal lines, {} subledger events from {}",
            journal.len(),
            subledger_events.len(),
            self.dir.display()
        );
        Ok(Dataset {
            meta,
            coa,
            journal,
            trial_balance,
            statements,
            subledger_events,
            debt_schedule,
        })
    }

    // ── Validation outputs ─────────────────────────────────────

    pub fn write_rollforward(&self, rows: &[RollforwardRow]) -> LedgerResult<()> {
        self.write_table(ROLLFORWARD_FILE, rows)
    }

    pub fn read_rollforward(&self) -> LedgerResult<Vec<RollforwardRow>> {
        self.read_table(ROLLFORWARD_FILE)
    }

    pub fn write_report(&self, report: &CheckReport) -> LedgerResult<()> {
        let summary = serde_json::to_string_pretty(&report.summary())?;
        fs::write(self.path(CHECKS_SUMMARY_FILE), summary + "\n")?;
        fs::write(
            self.path(CHECKS_MEMO_FILE),
            report.render_memo(&format!("{DATASET_NAME} integrity checks")),
        )?;
        Ok(())
    }
}

const STATEMENTS: [Statement; 3] = [
    Statement::IncomeStatement,
    Statement::BalanceSheet,
    Statement::CashFlow,
];

/// Distinct event files, in subledger order.
fn subledger_files() -> Vec<&'static str> {
    let mut files: Vec<&'static str> = Vec::new();
    for kind in SubledgerKind::ALL {
        let file = kind.file_name();
        if !files.contains(&file) {
            files.push(file);
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_writes_two_decimals_and_no_negative_zero() {
        #[derive(Serialize)]
        struct Row {
            #[serde(with = "money")]
            a: f64,
            #[serde(with = "money")]
            b: f64,
            #[serde(with = "money")]
            c: f64,
        }
        let mut buf = Vec::new();
        {
            let mut w = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut buf);
            w.serialize(Row { a: 1.5, b: -0.001, c: -12.3 }).unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "1.50,0.00,-12.30\n");
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let data = "month,line\n2025-01,Net Income\n";
        let err = read_csv::<StatementLine, StatementLine, _>(data.as_bytes(), "x.csv").unwrap_err();
        match err {
            LedgerError::MissingColumn { file, column } => {
                assert_eq!(file, "x.csv");
                assert_eq!(column, "amount");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn padded_headers_load_like_plain_ones() {
        let data = "month, line , amount\n2025-01,Net Income,12.50\n";
        let rows = read_csv::<StatementLine, StatementLine, _>(data.as_bytes(), "x.csv").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].line, "Net Income");
        assert_eq!(rows[0].amount, 12.5);
    }
}
