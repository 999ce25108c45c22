//! Validator — recomputes summary tables from event tables and diffs
//! them against what the generator stored.
//!
//! RULE: Reconciliation mismatches are data, not errors. Every check
//! runs to completion and produces a CheckResult, so one pass reports
//! every problem at once. Only schema problems (handled at load time
//! in store.rs) abort early.

use crate::{
    clock::Month,
    coa,
    dataset::Dataset,
    journal::{find_unbalanced, transaction_totals},
    statements::{
        balance_sheet_cash, derive_statements, Statement, ENDING_CASH, TOTAL_ASSETS,
        TOTAL_LIABILITIES_AND_EQUITY,
    },
    subledger::{reconcile_all, RollforwardRow, SubledgerKind},
    trial_balance::derive_trial_balance,
    types::BALANCE_TOLERANCE,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Write as _};

/// Below this a difference is printed as effectively zero.
const EFFECTIVELY_ZERO: f64 = 1e-9;

/// Offenders listed per check in the console summary.
const OFFENDERS_SHOWN: usize = 5;

/// Outcome of one named integrity check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    /// What was counted, e.g. "transactions" or "account_months".
    pub unit: String,
    pub n_checked: usize,
    /// Expected and actual values at the worst comparison.
    pub expected: f64,
    pub actual: f64,
    pub max_abs_diff: f64,
    /// Keys of every comparison outside tolerance.
    pub offenders: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CheckReport {
    pub checks: Vec<CheckResult>,
}

/// Shape of `checks_summary.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckSummary {
    pub all_passed: bool,
    pub n_checks: usize,
    pub n_failed: usize,
    pub tolerance: f64,
    pub checks: Vec<CheckResult>,
}

impl CheckReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }

    pub fn summary(&self) -> CheckSummary {
        CheckSummary {
            all_passed: self.all_passed(),
            n_checks: self.checks.len(),
            n_failed: self.failures().count(),
            tolerance: BALANCE_TOLERANCE,
            checks: self.checks.clone(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }

    /// The human-readable "Checks:" block printed by the CLI.
    pub fn render(&self) -> String {
        let mut out = String::from("Checks:\n");
        for c in &self.checks {
            let _ = write!(
                out,
                "  [{}] {}: n_{}={}, max_abs_diff={}",
                if c.passed { "PASS" } else { "FAIL" },
                c.name,
                c.unit,
                c.n_checked,
                describe_diff(c.max_abs_diff),
            );
            if !c.passed {
                let _ = write!(out, " (expected {:.2}, actual {:.2})", c.expected, c.actual);
                let shown: Vec<&str> = c
                    .offenders
                    .iter()
                    .take(OFFENDERS_SHOWN)
                    .map(String::as_str)
                    .collect();
                let _ = write!(out, " offenders=[{}]", shown.join(", "));
                if c.offenders.len() > OFFENDERS_SHOWN {
                    let _ = write!(out, " +{} more", c.offenders.len() - OFFENDERS_SHOWN);
                }
            }
            out.push('\n');
        }
        let failed = self.failures().count();
        let _ = writeln!(
            out,
            "{} of {} checks passed",
            self.checks.len() - failed,
            self.checks.len()
        );
        out
    }

    /// Markdown memo for human review.
    pub fn render_memo(&self, title: &str) -> String {
        let mut out = format!("# {title}\n\n");
        let failed = self.failures().count();
        if failed == 0 {
            out.push_str("All integrity checks passed. Differences shown as effectively zero are floating-point noise below 1e-9.\n\n");
        } else {
            let _ = writeln!(out, "**{failed} check(s) failed.** Each failure lists the worst comparison and the offending keys.\n");
        }
        out.push_str("| check | result | n | max abs diff |\n|---|---|---|---|\n");
        for c in &self.checks {
            let _ = writeln!(
                out,
                "| `{}` | {} | {} {} | {} |",
                c.name,
                if c.passed { "pass" } else { "**FAIL**" },
                c.n_checked,
                c.unit,
                describe_diff(c.max_abs_diff)
            );
        }
        for c in self.failures() {
            let _ = writeln!(
                out,
                "\n## {}\n\nExpected {:.2}, actual {:.2}. Offenders: {}.",
                c.name,
                c.expected,
                c.actual,
                c.offenders.join(", ")
            );
        }
        out
    }
}

fn describe_diff(diff: f64) -> String {
    if diff < EFFECTIVELY_ZERO {
        "0 (effectively zero)".to_string()
    } else if diff <= BALANCE_TOLERANCE {
        format!("{diff:.3e} (float noise)")
    } else {
        format!("{diff:.6}")
    }
}

/// Accumulates expected-vs-actual comparisons for one check.
struct Tally {
    name: String,
    unit: &'static str,
    n: usize,
    worst: Option<(f64, f64, f64)>,
    offenders: Vec<String>,
}

impl Tally {
    fn new(name: impl Into<String>, unit: &'static str) -> Self {
        Self {
            name: name.into(),
            unit,
            n: 0,
            worst: None,
            offenders: Vec::new(),
        }
    }

    fn compare(&mut self, key: impl Display, expected: f64, actual: f64) {
        let diff = self.observe(expected, actual);
        if diff > BALANCE_TOLERANCE || diff.is_nan() {
            self.flag(key);
        }
    }

    /// Count one comparison and track the worst difference seen.
    fn observe(&mut self, expected: f64, actual: f64) -> f64 {
        self.n += 1;
        let diff = (expected - actual).abs();
        if self.worst.map_or(true, |(_, _, d)| diff > d) {
            self.worst = Some((expected, actual, diff));
        }
        diff
    }

    fn flag(&mut self, key: impl Display) {
        self.offenders.push(key.to_string());
    }

    /// A comparison that could not be made because a row is missing.
    fn missing(&mut self, key: impl Display, expected: f64) {
        self.n += 1;
        self.offenders.push(format!("{key} (missing)"));
        let diff = expected.abs();
        if self.worst.map_or(true, |(_, _, d)| diff > d) {
            self.worst = Some((expected, 0.0, diff));
        }
    }

    fn finish(self) -> CheckResult {
        let (expected, actual, max_abs_diff) = self.worst.unwrap_or((0.0, 0.0, 0.0));
        CheckResult {
            passed: self.offenders.is_empty(),
            name: self.name,
            unit: self.unit.to_string(),
            n_checked: self.n,
            expected,
            actual,
            max_abs_diff,
            offenders: self.offenders,
        }
    }
}

/// Everything the validator produces.
#[derive(Debug, Clone)]
pub struct Validation {
    pub report: CheckReport,
    pub rollforward: Vec<RollforwardRow>,
}

/// Run every integrity check over a dataset.
pub fn validate(dataset: &Dataset) -> Validation {
    let months = dataset.months();
    let mut checks = Vec::new();

    checks.push(check_transactions_balanced(dataset));
    checks.extend(check_trial_balance(dataset, &months));
    checks.extend(check_statements(dataset, &months));

    let rollforward = reconcile_all(&dataset.subledger_events, &dataset.trial_balance, &months);
    checks.extend(check_subledgers(&rollforward));
    checks.extend(check_debt(dataset, &months));

    let report = CheckReport { checks };
    for failure in report.failures() {
        log::warn!(
            "check {} failed: max_abs_diff={:.6}, {} offender(s)",
            failure.name,
            failure.max_abs_diff,
            failure.offenders.len()
        );
    }
    Validation {
        report,
        rollforward,
    }
}

// ── Posting ────────────────────────────────────────────────────────

pub fn check_transactions_balanced(dataset: &Dataset) -> CheckResult {
    let mut tally = Tally::new("transactions_balanced", "transactions");
    for (debits, credits) in transaction_totals(&dataset.journal).into_values() {
        tally.observe(debits, credits);
    }
    for imbalance in find_unbalanced(&dataset.journal) {
        tally.flag(imbalance.txn_id);
    }
    tally.finish()
}

// ── Trial balance ──────────────────────────────────────────────────

fn check_trial_balance(dataset: &Dataset, months: &[Month]) -> Vec<CheckResult> {
    let recomputed = derive_trial_balance(&dataset.journal, &dataset.coa, months);
    let stored: HashMap<(Month, &str), f64> = dataset
        .trial_balance
        .iter()
        .map(|r| ((r.month, r.account_id.as_str()), r.ending_balance))
        .collect();

    let mut reconciles = Tally::new("trial_balance_reconciles", "account_months");
    for row in &recomputed {
        let key = format!("{}/{}", row.month, row.account_id);
        match stored.get(&(row.month, row.account_id.as_str())) {
            Some(&balance) => reconciles.compare(key, row.ending_balance, balance),
            None => reconciles.missing(key, row.ending_balance),
        }
    }

    let mut sides = Tally::new("trial_balance_debits_equal_credits", "months");
    let mut per_month: BTreeMap<Month, (f64, f64)> = BTreeMap::new();
    for row in &dataset.trial_balance {
        let entry = per_month.entry(row.month).or_insert((0.0, 0.0));
        entry.0 += row.debit;
        entry.1 += row.credit;
    }
    for (month, (debits, credits)) in per_month {
        sides.compare(month, debits, credits);
    }

    vec![reconciles.finish(), sides.finish()]
}

// ── Statements ─────────────────────────────────────────────────────

fn check_statements(dataset: &Dataset, months: &[Month]) -> Vec<CheckResult> {
    let recomputed_tb = derive_trial_balance(&dataset.journal, &dataset.coa, months);
    let recomputed = derive_statements(&recomputed_tb, &dataset.coa);
    let stored = &dataset.statements;
    let mut out = Vec::new();

    for (statement, name) in [
        (Statement::IncomeStatement, "income_statement_reconciles"),
        (Statement::BalanceSheet, "balance_sheet_reconciles"),
        (Statement::CashFlow, "cash_flow_reconciles"),
    ] {
        let mut tally = Tally::new(name, "lines");
        for line in recomputed.lines(statement) {
            let key = format!("{}/{}", line.month, line.line);
            match stored.value(statement, line.month, &line.line) {
                Some(amount) => tally.compare(key, line.amount, amount),
                None => tally.missing(key, line.amount),
            }
        }
        out.push(tally.finish());
    }

    let mut identity = Tally::new("balance_sheet_balances", "months");
    let mut tie = Tally::new("cash_flow_ties_to_balance_sheet", "months");
    for &month in months {
        match (
            stored.value(Statement::BalanceSheet, month, TOTAL_ASSETS),
            stored.value(Statement::BalanceSheet, month, TOTAL_LIABILITIES_AND_EQUITY),
        ) {
            (Some(assets), Some(claims)) => identity.compare(month, assets, claims),
            (assets, _) => identity.missing(month, assets.unwrap_or(0.0)),
        }

        let bs_cash = balance_sheet_cash(stored, &dataset.coa, month);
        match stored.value(Statement::CashFlow, month, ENDING_CASH) {
            Some(ending) => tie.compare(month, bs_cash, ending),
            None => tie.missing(month, bs_cash),
        }
    }
    out.push(identity.finish());
    out.push(tie.finish());
    out
}

// ── Subledgers ─────────────────────────────────────────────────────

fn check_subledgers(rollforward: &[RollforwardRow]) -> Vec<CheckResult> {
    SubledgerKind::ALL
        .iter()
        .map(|kind| {
            let mut tally = Tally::new(format!("subledger_ties_to_gl:{}", kind.name()), "months");
            for row in rollforward.iter().filter(|r| r.subledger == *kind) {
                tally.compare(row.month, row.gl_balance, row.ending_balance);
            }
            tally.finish()
        })
        .collect()
}

// ── Debt ───────────────────────────────────────────────────────────

fn check_debt(dataset: &Dataset, months: &[Month]) -> Vec<CheckResult> {
    let schedule = &dataset.debt_schedule;

    let mut decomposes = Tally::new("debt_payment_decomposes", "payments");
    for row in schedule {
        let key = format!("{}/{}", row.month, row.loan_id);
        decomposes.compare(&key, row.payment, row.interest + row.principal);
        decomposes.compare(
            format!("{key} ending"),
            row.beginning_balance - row.principal,
            row.ending_balance,
        );
    }

    let mut continuity = Tally::new("debt_schedule_rollforward", "payments");
    let mut last_ending: HashMap<&str, f64> = HashMap::new();
    for row in schedule {
        if let Some(prior) = last_ending.insert(row.loan_id.as_str(), row.ending_balance) {
            continuity.compare(format!("{}/{}", row.month, row.loan_id), prior, row.beginning_balance);
        }
    }

    // Only principal moves the liability: the schedule's ending balances
    // must equal Notes Payable. Only interest hits the income statement.
    // Both run every month; a month with no schedule rows counts as zero.
    let mut ties = Tally::new("debt_schedule_ties_to_gl", "months");
    let mut interest_tie = Tally::new("interest_ties_to_income_statement", "months");
    let notes: HashMap<Month, f64> = dataset
        .trial_balance
        .iter()
        .filter(|r| r.account_id == coa::NOTES_PAYABLE)
        .map(|r| (r.month, r.ending_balance))
        .collect();
    let interest_line = dataset
        .coa
        .get(coa::INTEREST_EXPENSE)
        .map(|a| a.account_name.clone());

    let mut outstanding: HashMap<&str, f64> = HashMap::new();
    for &month in months {
        let mut interest = 0.0;
        for row in schedule.iter().filter(|r| r.month == month) {
            outstanding.insert(row.loan_id.as_str(), row.ending_balance);
            interest += row.interest;
        }
        let scheduled: f64 = outstanding.values().sum();
        match notes.get(&month) {
            Some(&gl) => ties.compare(month, gl, scheduled),
            None => ties.missing(month, scheduled),
        }
        if let Some(line) = &interest_line {
            let reported = dataset
                .statements
                .value(Statement::IncomeStatement, month, line)
                .unwrap_or(0.0);
            interest_tie.compare(month, reported, interest);
        }
    }

    vec![
        decomposes.finish(),
        continuity.finish(),
        ties.finish(),
        interest_tie.finish(),
    ]
}
