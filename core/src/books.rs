//! The books — everything the generator has posted so far.
//!
//! RULE: Subsystems change ledger state ONLY through Books.
//! `post` commits a balanced transaction and updates the running
//! balances in the same step, so a subsystem posting later in the
//! month always sees the effects of earlier postings.

use crate::{
    clock::Month,
    coa::ChartOfAccounts,
    error::LedgerResult,
    journal::{Journal, Posting},
    subledger::{DebtScheduleRow, SubledgerEvent, SubledgerEventType, SubledgerKind},
    trial_balance::{RunningBalances, TrialBalanceRow},
    types::TxnId,
};
use chrono::NaiveDate;

pub struct Books {
    coa: ChartOfAccounts,
    journal: Journal,
    balances: RunningBalances,
    trial_balance: Vec<TrialBalanceRow>,
    events: Vec<SubledgerEvent>,
    debt_schedule: Vec<DebtScheduleRow>,
}

impl Books {
    pub fn new(coa: ChartOfAccounts) -> Self {
        Self {
            coa,
            journal: Journal::new(),
            balances: RunningBalances::new(),
            trial_balance: Vec::new(),
            events: Vec::new(),
            debt_schedule: Vec::new(),
        }
    }

    pub fn coa(&self) -> &ChartOfAccounts {
        &self.coa
    }

    /// Commit one transaction and apply it to the running balances.
    pub fn post(
        &mut self,
        date: NaiveDate,
        description: &str,
        postings: &[Posting],
    ) -> LedgerResult<TxnId> {
        let (txn_id, committed) = self.journal.post(&self.coa, date, description, postings)?;
        for line in &committed {
            self.balances.apply(line);
        }
        Ok(txn_id)
    }

    /// Record a subledger event tied to a committed transaction.
    pub fn record(
        &mut self,
        txn_id: TxnId,
        date: NaiveDate,
        subledger: SubledgerKind,
        event_type: SubledgerEventType,
        delta: f64,
        cash_impact: f64,
    ) {
        debug_assert!(
            subledger.accepts(event_type),
            "{:?} not valid for {:?}",
            event_type,
            subledger
        );
        self.events.push(SubledgerEvent {
            txn_id,
            date,
            month: Month::of(date),
            subledger,
            event_type,
            delta,
            cash_impact,
        });
    }

    pub fn record_debt_payment(&mut self, row: DebtScheduleRow) {
        self.debt_schedule.push(row);
    }

    /// Current normal-side balance of an account; 0 for unknown ids.
    pub fn balance(&self, account_id: &str) -> f64 {
        self.coa
            .get(account_id)
            .map(|a| self.balances.balance(a))
            .unwrap_or(0.0)
    }

    /// Snapshot the running balances as this month's trial balance.
    pub fn close_month(&mut self, month: Month) {
        let rows = self.balances.snapshot(&self.coa, month);
        self.trial_balance.extend(rows);
    }

    pub fn transaction_count(&self) -> usize {
        self.journal.transaction_count()
    }

    pub fn into_parts(self) -> BooksParts {
        BooksParts {
            coa: self.coa,
            journal: self.journal.into_lines(),
            trial_balance: self.trial_balance,
            events: self.events,
            debt_schedule: self.debt_schedule,
        }
    }
}

/// Owned tables handed to the Dataset once the run is finished.
pub struct BooksParts {
    pub coa: ChartOfAccounts,
    pub journal: Vec<crate::journal::JournalLine>,
    pub trial_balance: Vec<TrialBalanceRow>,
    pub events: Vec<SubledgerEvent>,
    pub debt_schedule: Vec<DebtScheduleRow>,
}
