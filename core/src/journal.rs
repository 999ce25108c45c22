//! The general journal and the double-entry posting primitive.
//!
//! RULE: Journal lines are append-only. A committed line is never
//! mutated or deleted; corrections are new offsetting transactions.
//!
//! `Journal::post` is the only way lines enter the journal, and it
//! refuses any transaction whose debits and credits differ by more
//! than BALANCE_TOLERANCE. A refusal is a generator bug and is fatal
//! to the run.

use crate::{
    coa::ChartOfAccounts,
    error::{LedgerError, LedgerResult},
    types::{AccountId, TxnId, BALANCE_TOLERANCE},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of `gl_journal.csv`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalLine {
    pub txn_id: TxnId,
    pub date: NaiveDate,
    pub account_id: AccountId,
    #[serde(with = "crate::store::money")]
    pub debit: f64,
    #[serde(with = "crate::store::money")]
    pub credit: f64,
    pub description: String,
}

/// One side of a transaction before it is committed.
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub account_id: AccountId,
    pub debit: f64,
    pub credit: f64,
}

impl Posting {
    pub fn debit(account_id: &str, amount: f64) -> Self {
        Self {
            account_id: account_id.to_string(),
            debit: amount,
            credit: 0.0,
        }
    }

    pub fn credit(account_id: &str, amount: f64) -> Self {
        Self {
            account_id: account_id.to_string(),
            debit: 0.0,
            credit: amount,
        }
    }

    fn is_zero(&self) -> bool {
        self.debit == 0.0 && self.credit == 0.0
    }
}

/// An out-of-balance transaction found in stored journal lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Imbalance {
    pub txn_id: TxnId,
    pub debits: f64,
    pub credits: f64,
    pub abs_diff: f64,
}

#[derive(Debug, Clone)]
pub struct Journal {
    lines: Vec<JournalLine>,
    next_txn_id: TxnId,
}

impl Default for Journal {
    fn default() -> Self {
        Self::new()
    }
}

impl Journal {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            next_txn_id: 1,
        }
    }

    /// Validate and commit one transaction. Returns its txn_id.
    ///
    /// Zero-amount postings are dropped before the checks, so callers
    /// may pass e.g. a zero sales-tax line without special-casing it.
    pub fn post(
        &mut self,
        coa: &ChartOfAccounts,
        date: NaiveDate,
        description: &str,
        postings: &[Posting],
    ) -> LedgerResult<(TxnId, Vec<JournalLine>)> {
        let live: Vec<&Posting> = postings.iter().filter(|p| !p.is_zero()).collect();
        if live.is_empty() {
            return Err(LedgerError::EmptyTransaction {
                description: description.to_string(),
            });
        }

        for p in &live {
            coa.require(&p.account_id)?;
            for amount in [p.debit, p.credit] {
                if !amount.is_finite() || amount < 0.0 {
                    return Err(LedgerError::InvalidAmount {
                        account_id: p.account_id.clone(),
                        amount,
                    });
                }
            }
        }

        let txn_id = self.next_txn_id;
        let debits: f64 = live.iter().map(|p| p.debit).sum();
        let credits: f64 = live.iter().map(|p| p.credit).sum();
        if (debits - credits).abs() > BALANCE_TOLERANCE {
            return Err(LedgerError::UnbalancedTransaction {
                txn_id,
                debits,
                credits,
            });
        }

        let committed: Vec<JournalLine> = live
            .into_iter()
            .map(|p| JournalLine {
                txn_id,
                date,
                account_id: p.account_id.clone(),
                debit: p.debit,
                credit: p.credit,
                description: description.to_string(),
            })
            .collect();

        self.lines.extend(committed.iter().cloned());
        self.next_txn_id += 1;
        Ok((txn_id, committed))
    }

    pub fn lines(&self) -> &[JournalLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<JournalLine> {
        self.lines
    }

    pub fn transaction_count(&self) -> usize {
        (self.next_txn_id - 1) as usize
    }
}

/// Group stored lines by txn_id and report every transaction whose
/// debits and credits differ by more than BALANCE_TOLERANCE, or whose
/// sums are not numbers. Ordered by txn_id.
pub fn find_unbalanced(lines: &[JournalLine]) -> Vec<Imbalance> {
    transaction_totals(lines)
        .into_iter()
        .filter_map(|(txn_id, (debits, credits))| {
            let abs_diff = (debits - credits).abs();
            (abs_diff > BALANCE_TOLERANCE || abs_diff.is_nan()).then_some(Imbalance {
                txn_id,
                debits,
                credits,
                abs_diff,
            })
        })
        .collect()
}

/// (Σdebit, Σcredit) per txn_id in one pass.
pub fn transaction_totals(lines: &[JournalLine]) -> BTreeMap<TxnId, (f64, f64)> {
    let mut totals: BTreeMap<TxnId, (f64, f64)> = BTreeMap::new();
    for line in lines {
        let entry = totals.entry(line.txn_id).or_insert((0.0, 0.0));
        entry.0 += line.debit;
        entry.1 += line.credit;
    }
    totals
}
