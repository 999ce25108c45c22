//! The full set of tables produced by one generator run.

use crate::{
    clock::{Month, MonthClock},
    coa::ChartOfAccounts,
    journal::JournalLine,
    meta::RunMeta,
    statements::Statements,
    subledger::{DebtScheduleRow, SubledgerEvent},
    trial_balance::TrialBalanceRow,
};

#[derive(Debug, Clone)]
pub struct Dataset {
    pub meta: RunMeta,
    pub coa: ChartOfAccounts,
    pub journal: Vec<JournalLine>,
    pub trial_balance: Vec<TrialBalanceRow>,
    pub statements: Statements,
    pub subledger_events: Vec<SubledgerEvent>,
    pub debt_schedule: Vec<DebtScheduleRow>,
}

impl Dataset {
    /// Months covered by the run, in order.
    pub fn months(&self) -> Vec<Month> {
        MonthClock::new(self.meta.start_month, self.meta.n_months).months()
    }

    /// Number of distinct transactions in the journal.
    pub fn transaction_count(&self) -> usize {
        let mut ids: Vec<_> = self.journal.iter().map(|l| l.txn_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }
}
