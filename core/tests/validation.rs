//! End-to-end integrity checks: a generated dataset passes every check,
//! and each kind of corruption is caught by the check that owns it
//! without stopping the others from running.

use ledgerlab_core::{
    coa,
    config::SimConfig,
    dataset::Dataset,
    engine::SimEngine,
    journal::JournalLine,
    statements::{Statement, NET_INCOME},
    validate::validate,
};

fn generate(seed: u64, n_months: u32) -> Dataset {
    SimEngine::build(SimConfig::default_test(seed, n_months))
        .expect("build engine")
        .run()
        .expect("run")
}

// ─────────────────────────────────────────────────────────────────────────────
// Clean runs
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn one_month_of_sales_is_fully_balanced() {
    let dataset = generate(123, 1);

    let mut invoices: Vec<u64> = dataset
        .journal
        .iter()
        .filter(|l| l.description.starts_with("Invoice INV-"))
        .map(|l| l.txn_id)
        .collect();
    invoices.dedup();
    assert_eq!(invoices.len(), 18);

    let report = validate(&dataset).report;
    let balanced = report.get("transactions_balanced").unwrap();
    assert!(balanced.passed);
    assert_eq!(balanced.n_checked, dataset.meta.n_transactions);
    assert_eq!(balanced.n_checked, dataset.transaction_count());
    assert!(balanced.offenders.is_empty());
}

#[test]
fn two_year_run_passes_every_check() {
    let dataset = generate(123, 24);
    let validation = validate(&dataset);
    let report = &validation.report;

    let failures: Vec<&str> = report.failures().map(|c| c.name.as_str()).collect();
    assert!(report.all_passed(), "failed checks: {failures:?}\n{}", report.render());

    let tb = report.get("trial_balance_reconciles").unwrap();
    assert_eq!(tb.n_checked, 24 * dataset.coa.len());
    assert!(tb.max_abs_diff < 1e-6);

    // One rollforward row per subledger per month, all tied.
    assert_eq!(validation.rollforward.len(), 24 * 7);
    assert!(validation.rollforward.iter().all(|r| r.tied));

    let rendered = report.render();
    assert!(rendered.starts_with("Checks:\n"));
    assert!(rendered.contains("[PASS] transactions_balanced"));
    assert!(rendered.contains("[PASS] subledger_ties_to_gl:ar"));
    assert!(!rendered.contains("[FAIL]"));
}

#[test]
fn every_subledger_is_checked() {
    let report = validate(&generate(7, 3)).report;
    for kind in ["ar", "ap", "wages_payable", "payroll_taxes_payable", "sales_tax_payable", "notes_payable", "equity"] {
        let name = format!("subledger_ties_to_gl:{kind}");
        let check = report.get(&name).unwrap_or_else(|| panic!("{name} missing"));
        assert_eq!(check.n_checked, 3);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Injected corruption
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn injected_unbalanced_transaction_is_flagged_alone() {
    let mut dataset = generate(123, 3);
    let bad_id = dataset.journal.iter().map(|l| l.txn_id).max().unwrap() + 1;
    let date = dataset.journal.last().unwrap().date;
    for (account_id, debit, credit) in [(coa::CASH, 100.0, 0.0), (coa::SALES_REVENUE, 0.0, 90.0)] {
        dataset.journal.push(JournalLine {
            txn_id: bad_id,
            date,
            account_id: account_id.to_string(),
            debit,
            credit,
            description: "Injected".to_string(),
        });
    }

    let report = validate(&dataset).report;
    let balanced = report.get("transactions_balanced").unwrap();
    assert!(!balanced.passed);
    assert_eq!(balanced.offenders, vec![bad_id.to_string()]);
    assert_eq!(balanced.max_abs_diff, 10.0);
    assert_eq!(balanced.expected, 100.0);
    assert_eq!(balanced.actual, 90.0);

    // The pipeline kept going: later checks still ran.
    assert!(report.get("debt_payment_decomposes").is_some());
    assert!(report.render().contains("[FAIL] transactions_balanced"));
}

#[test]
fn tampered_trial_balance_row_is_reported() {
    let mut dataset = generate(11, 2);
    let row = dataset
        .trial_balance
        .iter_mut()
        .find(|r| r.account_id == coa::INVENTORY)
        .unwrap();
    row.ending_balance += 5.0;
    let key = format!("{}/{}", row.month, row.account_id);

    let report = validate(&dataset).report;
    let tb = report.get("trial_balance_reconciles").unwrap();
    assert!(!tb.passed);
    assert_eq!(tb.offenders, vec![key]);
    assert!((tb.max_abs_diff - 5.0).abs() < 1e-6);
    assert!(report.get("transactions_balanced").unwrap().passed);
}

#[test]
fn tampered_income_statement_is_reported() {
    let mut dataset = generate(11, 2);
    let line = dataset
        .statements
        .income_statement
        .iter_mut()
        .find(|l| l.line == NET_INCOME)
        .unwrap();
    line.amount += 1.0;
    let month = line.month;

    let report = validate(&dataset).report;
    let is = report.get("income_statement_reconciles").unwrap();
    assert!(!is.passed);
    assert_eq!(is.offenders, vec![format!("{month}/{NET_INCOME}")]);
    assert!(report.get("balance_sheet_reconciles").unwrap().passed);
}

#[test]
fn missing_cash_flow_row_breaks_the_cash_tie() {
    let mut dataset = generate(11, 2);
    dataset
        .statements
        .cash_flow
        .retain(|l| !(l.line == "Ending Cash" && l.month == dataset.meta.start_month));

    let report = validate(&dataset).report;
    let tie = report.get("cash_flow_ties_to_balance_sheet").unwrap();
    assert!(!tie.passed);
    assert_eq!(tie.offenders.len(), 1);
    assert!(tie.offenders[0].ends_with("(missing)"));
    assert!(dataset.statements.value(Statement::CashFlow, dataset.meta.start_month, "Ending Cash").is_none());
}

#[test]
fn dropped_subledger_event_fails_only_that_subledger() {
    let mut dataset = generate(11, 2);
    let idx = dataset
        .subledger_events
        .iter()
        .position(|e| e.subledger == ledgerlab_core::subledger::SubledgerKind::Equity)
        .unwrap();
    dataset.subledger_events.remove(idx);

    let report = validate(&dataset).report;
    assert!(!report.get("subledger_ties_to_gl:equity").unwrap().passed);
    assert!(report.get("subledger_ties_to_gl:ar").unwrap().passed);
}

#[test]
fn broken_debt_schedule_is_reported() {
    let mut dataset = generate(11, 3);
    dataset.debt_schedule[1].interest += 2.0;

    let report = validate(&dataset).report;
    let decomposes = report.get("debt_payment_decomposes").unwrap();
    assert!(!decomposes.passed);
    assert_eq!(decomposes.offenders.len(), 1);
    assert!(!report.get("interest_ties_to_income_statement").unwrap().passed);
    assert!(report.get("debt_schedule_ties_to_gl").unwrap().passed);
}

#[test]
fn emptied_debt_schedule_breaks_both_ties() {
    let mut dataset = generate(123, 6);
    dataset.debt_schedule.clear();

    let report = validate(&dataset).report;
    let ties = report.get("debt_schedule_ties_to_gl").unwrap();
    assert!(!ties.passed);
    assert_eq!(ties.n_checked, 6);
    assert_eq!(ties.offenders.len(), 6);

    let interest = report.get("interest_ties_to_income_statement").unwrap();
    assert!(!interest.passed);
    assert_eq!(interest.n_checked, 6);
    assert_eq!(interest.offenders.len(), 6);

    // Unrelated checks are untouched.
    assert!(report.get("transactions_balanced").unwrap().passed);
    assert!(report.get("subledger_ties_to_gl:notes_payable").unwrap().passed);
}

#[test]
fn debt_ties_are_checked_every_month() {
    let dataset = generate(7, 3);
    let report = validate(&dataset).report;
    for name in ["debt_schedule_ties_to_gl", "interest_ties_to_income_statement"] {
        let check = report.get(name).unwrap();
        assert!(check.passed, "{}", report.render());
        assert_eq!(check.n_checked, 3);
    }
}
