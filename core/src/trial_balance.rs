//! Trial balance — per-month, per-account ending balances.
//!
//! Two independent code paths produce trial balances:
//!   - RunningBalances: the generator's accumulator, updated on every
//!     committed posting and snapshotted at each month end.
//!   - derive_trial_balance: the validator's recomputation from raw
//!     journal lines.
//! The reconciliation contract is that both agree for every account
//! and month within BALANCE_TOLERANCE.
//!
//! RULE: Every COA account appears in every month, including accounts
//! with no activity (their balance carries forward). Downstream joins
//! rely on the table being dense.

use crate::{
    clock::Month,
    coa::{Account, AccountType, ChartOfAccounts, NormalSide},
    journal::JournalLine,
    types::AccountId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One row of `trial_balance_monthly.csv`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrialBalanceRow {
    pub month: Month,
    pub account_id: AccountId,
    pub account_name: String,
    pub account_type: AccountType,
    pub normal_side: NormalSide,
    /// Cumulative debits through month end.
    #[serde(with = "crate::store::money")]
    pub debit: f64,
    /// Cumulative credits through month end.
    #[serde(with = "crate::store::money")]
    pub credit: f64,
    #[serde(with = "crate::store::money")]
    pub ending_balance: f64,
}

impl TrialBalanceRow {
    fn from_totals(month: Month, account: &Account, debit: f64, credit: f64) -> Self {
        Self {
            month,
            account_id: account.account_id.clone(),
            account_name: account.account_name.clone(),
            account_type: account.account_type,
            normal_side: account.normal_side,
            debit,
            credit,
            ending_balance: account.signed_balance(debit, credit),
        }
    }
}

// ── Generator path ─────────────────────────────────────────────────

/// Cumulative (debit, credit) totals, updated posting by posting.
#[derive(Debug, Clone, Default)]
pub struct RunningBalances {
    totals: HashMap<AccountId, (f64, f64)>,
}

impl RunningBalances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, line: &JournalLine) {
        let entry = self
            .totals
            .entry(line.account_id.clone())
            .or_insert((0.0, 0.0));
        entry.0 += line.debit;
        entry.1 += line.credit;
    }

    /// Current balance of one account on its normal side.
    pub fn balance(&self, account: &Account) -> f64 {
        let (debit, credit) = self
            .totals
            .get(&account.account_id)
            .copied()
            .unwrap_or((0.0, 0.0));
        account.signed_balance(debit, credit)
    }

    /// Month-end snapshot: one row per COA account, in COA order.
    pub fn snapshot(&self, coa: &ChartOfAccounts, month: Month) -> Vec<TrialBalanceRow> {
        coa.iter()
            .map(|account| {
                let (debit, credit) = self
                    .totals
                    .get(&account.account_id)
                    .copied()
                    .unwrap_or((0.0, 0.0));
                TrialBalanceRow::from_totals(month, account, debit, credit)
            })
            .collect()
    }
}

// ── Validator path ─────────────────────────────────────────────────

/// Ending balance of every COA account at the end of `month`, from all
/// journal lines dated on or before that month end.
pub fn derive_balances(
    lines: &[JournalLine],
    coa: &ChartOfAccounts,
    month: Month,
) -> BTreeMap<AccountId, f64> {
    let mut totals: HashMap<&str, (f64, f64)> = HashMap::new();
    for line in lines.iter().filter(|l| Month::of(l.date) <= month) {
        let entry = totals.entry(line.account_id.as_str()).or_insert((0.0, 0.0));
        entry.0 += line.debit;
        entry.1 += line.credit;
    }
    coa.iter()
        .map(|account| {
            let (debit, credit) = totals
                .get(account.account_id.as_str())
                .copied()
                .unwrap_or((0.0, 0.0));
            (account.account_id.clone(), account.signed_balance(debit, credit))
        })
        .collect()
}

/// Recompute the full monthly trial balance from journal lines.
/// Rows are ordered by month, then COA order. Lines dated before the
/// first month roll into the first month; lines after the last month
/// are ignored.
pub fn derive_trial_balance(
    lines: &[JournalLine],
    coa: &ChartOfAccounts,
    months: &[Month],
) -> Vec<TrialBalanceRow> {
    let mut activity: BTreeMap<Month, HashMap<&str, (f64, f64)>> = BTreeMap::new();
    for line in lines {
        let bucket = activity.entry(Month::of(line.date)).or_default();
        let entry = bucket.entry(line.account_id.as_str()).or_insert((0.0, 0.0));
        entry.0 += line.debit;
        entry.1 += line.credit;
    }

    let mut cumulative: HashMap<&str, (f64, f64)> = HashMap::new();
    let mut consumed = activity.into_iter().peekable();
    let mut rows = Vec::with_capacity(months.len() * coa.len());

    for &month in months {
        while let Some((_, bucket)) = consumed.next_if(|(m, _)| *m <= month) {
            for (account_id, (debit, credit)) in bucket {
                let entry = cumulative.entry(account_id).or_insert((0.0, 0.0));
                entry.0 += debit;
                entry.1 += credit;
            }
        }
        rows.extend(coa.iter().map(|account| {
            let (debit, credit) = cumulative
                .get(account.account_id.as_str())
                .copied()
                .unwrap_or((0.0, 0.0));
            TrialBalanceRow::from_totals(month, account, debit, credit)
        }));
    }
    rows
}

/// Index a trial balance by (month, account_id) → ending balance.
pub fn balance_index(rows: &[TrialBalanceRow]) -> HashMap<(Month, &str), f64> {
    rows.iter()
        .map(|r| ((r.month, r.account_id.as_str()), r.ending_balance))
        .collect()
}

/// Distinct months present in a trial balance, ascending.
pub fn months_of(rows: &[TrialBalanceRow]) -> Vec<Month> {
    let mut months: Vec<Month> = rows.iter().map(|r| r.month).collect();
    months.sort();
    months.dedup();
    months
}
