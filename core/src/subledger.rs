//! Subledgers — typed event streams behind the control accounts, and
//! their monthly rollforward reconciliation to the general ledger.
//!
//! Each subledger balance is a plain accumulator: one state (current
//! balance), one transition (apply a signed delta). The rollforward law
//! is `ending = beginning + Σ deltas`, and the ending balance must tie
//! to the GL control account(s) in the trial balance.
//!
//! Debt is special only in that each payment splits into interest
//! (income statement) and principal (balance reduction). See `amortize`.

use crate::{
    clock::Month,
    coa,
    trial_balance::{balance_index, TrialBalanceRow},
    types::{round2, within_tolerance, TxnId},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubledgerKind {
    Ar,
    Ap,
    WagesPayable,
    PayrollTaxesPayable,
    SalesTaxPayable,
    NotesPayable,
    Equity,
}

impl SubledgerKind {
    pub const ALL: [SubledgerKind; 7] = [
        Self::Ar,
        Self::Ap,
        Self::WagesPayable,
        Self::PayrollTaxesPayable,
        Self::SalesTaxPayable,
        Self::NotesPayable,
        Self::Equity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ar => "ar",
            Self::Ap => "ap",
            Self::WagesPayable => "wages_payable",
            Self::PayrollTaxesPayable => "payroll_taxes_payable",
            Self::SalesTaxPayable => "sales_tax_payable",
            Self::NotesPayable => "notes_payable",
            Self::Equity => "equity",
        }
    }

    /// GL control accounts and the sign each contributes to the tie.
    /// Equity ties to contributed capital net of draws.
    pub fn gl_accounts(&self) -> &'static [(&'static str, f64)] {
        match self {
            Self::Ar => &[(coa::ACCOUNTS_RECEIVABLE, 1.0)],
            Self::Ap => &[(coa::ACCOUNTS_PAYABLE, 1.0)],
            Self::WagesPayable => &[(coa::WAGES_PAYABLE, 1.0)],
            Self::PayrollTaxesPayable => &[(coa::PAYROLL_TAXES_PAYABLE, 1.0)],
            Self::SalesTaxPayable => &[(coa::SALES_TAX_PAYABLE, 1.0)],
            Self::NotesPayable => &[(coa::NOTES_PAYABLE, 1.0)],
            Self::Equity => &[(coa::OWNER_CAPITAL, 1.0), (coa::OWNER_DRAWS, -1.0)],
        }
    }

    /// The closed set of event types this subledger accepts.
    pub fn event_types(&self) -> &'static [SubledgerEventType] {
        use SubledgerEventType::*;
        match self {
            Self::Ar => &[Invoice, Collection],
            Self::Ap => &[Purchase, Payment],
            Self::WagesPayable => &[WageAccrual, WagePayment],
            Self::PayrollTaxesPayable => &[WithholdingAccrual, EmployerTaxAccrual, TaxRemittance],
            Self::SalesTaxPayable => &[TaxCollected, TaxRemitted],
            Self::NotesPayable => &[Origination, PrincipalPayment],
            Self::Equity => &[Contribution, Draw],
        }
    }

    pub fn accepts(&self, event_type: SubledgerEventType) -> bool {
        self.event_types().contains(&event_type)
    }

    /// CSV file this subledger's events are written to.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Ar => "ar_events.csv",
            Self::Ap => "ap_events.csv",
            Self::WagesPayable | Self::PayrollTaxesPayable => "payroll_events.csv",
            Self::SalesTaxPayable => "sales_tax_events.csv",
            Self::NotesPayable => "debt_events.csv",
            Self::Equity => "equity_events.csv",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubledgerEventType {
    // ar
    Invoice,
    Collection,
    // ap
    Purchase,
    Payment,
    // wages payable
    WageAccrual,
    WagePayment,
    // payroll taxes payable
    WithholdingAccrual,
    EmployerTaxAccrual,
    TaxRemittance,
    // sales tax payable
    TaxCollected,
    TaxRemitted,
    // notes payable
    Origination,
    PrincipalPayment,
    // equity
    Contribution,
    Draw,
}

impl SubledgerEventType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Collection => "collection",
            Self::Purchase => "purchase",
            Self::Payment => "payment",
            Self::WageAccrual => "wage_accrual",
            Self::WagePayment => "wage_payment",
            Self::WithholdingAccrual => "withholding_accrual",
            Self::EmployerTaxAccrual => "employer_tax_accrual",
            Self::TaxRemittance => "tax_remittance",
            Self::TaxCollected => "tax_collected",
            Self::TaxRemitted => "tax_remitted",
            Self::Origination => "origination",
            Self::PrincipalPayment => "principal_payment",
            Self::Contribution => "contribution",
            Self::Draw => "draw",
        }
    }
}

/// One row of a `*_events.csv` file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubledgerEvent {
    pub txn_id: TxnId,
    pub date: NaiveDate,
    pub month: Month,
    pub subledger: SubledgerKind,
    pub event_type: SubledgerEventType,
    /// Signed change to the subledger balance.
    #[serde(with = "crate::store::money")]
    pub delta: f64,
    /// Signed change to cash caused by this event (0 for accruals).
    #[serde(with = "crate::store::money")]
    pub cash_impact: f64,
}

/// One row of `debt_schedule.csv`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebtScheduleRow {
    pub month: Month,
    pub loan_id: String,
    #[serde(with = "crate::store::money")]
    pub beginning_balance: f64,
    #[serde(with = "crate::store::money")]
    pub payment: f64,
    #[serde(with = "crate::store::money")]
    pub interest: f64,
    #[serde(with = "crate::store::money")]
    pub principal: f64,
    #[serde(with = "crate::store::money")]
    pub ending_balance: f64,
}

/// Split a scheduled loan payment into interest and principal.
///
/// Interest accrues monthly on the beginning balance and is rounded to
/// cents; the remainder of the payment retires principal. The final
/// payment is reduced so the balance never goes negative.
pub fn amortize(
    month: Month,
    loan_id: &str,
    beginning_balance: f64,
    scheduled_payment: f64,
    annual_rate: f64,
) -> DebtScheduleRow {
    let interest = round2(beginning_balance * annual_rate / 12.0);
    let principal = round2((scheduled_payment - interest).min(beginning_balance).max(0.0));
    let payment = round2(interest + principal);
    DebtScheduleRow {
        month,
        loan_id: loan_id.to_string(),
        beginning_balance,
        payment,
        interest,
        principal,
        ending_balance: round2(beginning_balance - principal),
    }
}

// ── Rollforward ────────────────────────────────────────────────────

/// One row of `subledger_rollforward.csv`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RollforwardRow {
    pub month: Month,
    pub subledger: SubledgerKind,
    #[serde(with = "crate::store::money")]
    pub beginning_balance: f64,
    #[serde(with = "crate::store::money")]
    pub increases: f64,
    #[serde(with = "crate::store::money")]
    pub decreases: f64,
    #[serde(with = "crate::store::money")]
    pub ending_balance: f64,
    #[serde(with = "crate::store::money")]
    pub gl_balance: f64,
    #[serde(with = "crate::store::money")]
    pub abs_diff: f64,
    pub tied: bool,
    /// Σ delta per event type; in-memory only.
    #[serde(skip)]
    pub breakdown: BTreeMap<SubledgerEventType, f64>,
}

/// Monthly rollforward of one subledger over `months`.
/// Events before the first month roll into the first month.
/// `gl_balance`, `abs_diff` and `tied` are left for `reconcile`.
pub fn rollforward(
    events: &[SubledgerEvent],
    kind: SubledgerKind,
    months: &[Month],
) -> Vec<RollforwardRow> {
    let mut by_month: BTreeMap<Month, Vec<&SubledgerEvent>> = BTreeMap::new();
    for event in events.iter().filter(|e| e.subledger == kind) {
        by_month.entry(event.month).or_default().push(event);
    }

    let mut pending = by_month.into_iter().peekable();
    let mut balance = 0.0;
    let mut rows = Vec::with_capacity(months.len());

    for &month in months {
        let beginning = balance;
        let mut increases = 0.0;
        let mut decreases = 0.0;
        let mut breakdown: BTreeMap<SubledgerEventType, f64> = BTreeMap::new();

        while let Some((_, bucket)) = pending.next_if(|(m, _)| *m <= month) {
            for event in bucket {
                if event.delta >= 0.0 {
                    increases += event.delta;
                } else {
                    decreases -= event.delta;
                }
                *breakdown.entry(event.event_type).or_insert(0.0) += event.delta;
            }
        }

        balance = beginning + increases - decreases;
        rows.push(RollforwardRow {
            month,
            subledger: kind,
            beginning_balance: beginning,
            increases,
            decreases,
            ending_balance: balance,
            gl_balance: 0.0,
            abs_diff: 0.0,
            tied: false,
            breakdown,
        });
    }
    rows
}

/// Tie each rollforward ending balance to the GL control account(s).
pub fn reconcile(rows: &mut [RollforwardRow], trial_balance: &[TrialBalanceRow]) {
    let index = balance_index(trial_balance);
    for row in rows.iter_mut() {
        let gl: f64 = row
            .subledger
            .gl_accounts()
            .iter()
            .map(|(account_id, sign)| sign * index.get(&(row.month, *account_id)).copied().unwrap_or(0.0))
            .sum();
        row.gl_balance = gl;
        row.abs_diff = (row.ending_balance - gl).abs();
        row.tied = within_tolerance(row.ending_balance, gl);
    }
}

/// Rollforward + reconciliation for every subledger, ordered by
/// subledger then month.
pub fn reconcile_all(
    events: &[SubledgerEvent],
    trial_balance: &[TrialBalanceRow],
    months: &[Month],
) -> Vec<RollforwardRow> {
    let mut rows: Vec<RollforwardRow> = SubledgerKind::ALL
        .iter()
        .flat_map(|&kind| rollforward(events, kind, months))
        .collect();
    reconcile(&mut rows, trial_balance);
    rows
}
