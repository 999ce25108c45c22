//! Subledger rollforwards and their tie-out to GL control accounts,
//! plus the debt amortization split.

use chrono::NaiveDate;
use ledgerlab_core::{
    clock::Month,
    coa::{self, ChartOfAccounts},
    config::SimConfig,
    engine::SimEngine,
    journal::{Journal, Posting},
    subledger::{
        amortize, reconcile, reconcile_all, rollforward, SubledgerEvent, SubledgerEventType,
        SubledgerKind,
    },
    trial_balance::derive_trial_balance,
};

fn month(m: u32) -> Month {
    Month::new(2025, m).unwrap()
}

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
}

fn event(
    txn_id: u64,
    d: NaiveDate,
    subledger: SubledgerKind,
    event_type: SubledgerEventType,
    delta: f64,
) -> SubledgerEvent {
    SubledgerEvent {
        txn_id,
        date: d,
        month: Month::of(d),
        subledger,
        event_type,
        delta,
        cash_impact: 0.0,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Debt amortization
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn loan_payment_splits_into_interest_and_principal() {
    let row = amortize(month(1), "LOAN-001", 10_000.0, 500.0, 0.06);
    assert_eq!(row.interest, 50.0);
    assert_eq!(row.principal, 450.0);
    assert_eq!(row.payment, 500.0);
    assert_eq!(row.ending_balance, 9_550.0);
}

#[test]
fn final_payment_never_overshoots_the_balance() {
    let row = amortize(month(6), "LOAN-001", 300.0, 500.0, 0.06);
    assert_eq!(row.interest, 1.5);
    assert_eq!(row.principal, 300.0);
    assert_eq!(row.payment, 301.5);
    assert_eq!(row.ending_balance, 0.0);
}

#[test]
fn generated_debt_schedule_matches_notes_payable() {
    let dataset = SimEngine::build(SimConfig::default_test(123, 6))
        .unwrap()
        .run()
        .unwrap();

    let first = &dataset.debt_schedule[0];
    assert_eq!(first.beginning_balance, 10_000.0);
    assert_eq!(first.interest, 50.0);
    assert_eq!(first.principal, 450.0);
    assert_eq!(first.ending_balance, 9_550.0);

    for row in &dataset.debt_schedule {
        let notes = dataset
            .trial_balance
            .iter()
            .find(|r| r.month == row.month && r.account_id == coa::NOTES_PAYABLE)
            .unwrap();
        assert!((notes.ending_balance - row.ending_balance).abs() < 1e-6);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rollforward
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn rollforward_carries_balances_between_months() {
    use SubledgerEventType::*;
    let events = vec![
        event(1, date(1, 5), SubledgerKind::Ar, Invoice, 1_000.0),
        event(2, date(1, 20), SubledgerKind::Ar, Invoice, 500.0),
        event(3, date(3, 10), SubledgerKind::Ar, Collection, -1_200.0),
        // Another subledger's events are ignored.
        event(4, date(1, 6), SubledgerKind::Ap, Purchase, 800.0),
    ];

    let rows = rollforward(&events, SubledgerKind::Ar, &[month(1), month(2), month(3)]);
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0].beginning_balance, 0.0);
    assert_eq!(rows[0].increases, 1_500.0);
    assert_eq!(rows[0].ending_balance, 1_500.0);
    assert_eq!(rows[0].breakdown.get(&Invoice), Some(&1_500.0));

    assert_eq!(rows[1].beginning_balance, 1_500.0);
    assert_eq!(rows[1].ending_balance, 1_500.0);
    assert!(rows[1].breakdown.is_empty());

    assert_eq!(rows[2].decreases, 1_200.0);
    assert_eq!(rows[2].ending_balance, 300.0);
    for row in &rows {
        assert_eq!(
            row.ending_balance,
            row.beginning_balance + row.increases - row.decreases
        );
    }
}

fn ar_books() -> (Vec<SubledgerEvent>, Vec<ledgerlab_core::trial_balance::TrialBalanceRow>) {
    let chart = ChartOfAccounts::standard();
    let mut journal = Journal::new();
    let (invoice, _) = journal
        .post(
            &chart,
            date(1, 5),
            "Credit sale",
            &[
                Posting::debit(coa::ACCOUNTS_RECEIVABLE, 1_000.0),
                Posting::credit(coa::SALES_REVENUE, 1_000.0),
            ],
        )
        .unwrap();
    let (collection, _) = journal
        .post(
            &chart,
            date(2, 10),
            "Collection",
            &[
                Posting::debit(coa::CASH, 600.0),
                Posting::credit(coa::ACCOUNTS_RECEIVABLE, 600.0),
            ],
        )
        .unwrap();
    let events = vec![
        event(invoice, date(1, 5), SubledgerKind::Ar, SubledgerEventType::Invoice, 1_000.0),
        event(
            collection,
            date(2, 10),
            SubledgerKind::Ar,
            SubledgerEventType::Collection,
            -600.0,
        ),
    ];
    let tb = derive_trial_balance(journal.lines(), &chart, &[month(1), month(2)]);
    (events, tb)
}

#[test]
fn rollforward_ties_to_control_account() {
    let (events, tb) = ar_books();
    let mut rows = rollforward(&events, SubledgerKind::Ar, &[month(1), month(2)]);
    reconcile(&mut rows, &tb);

    assert!(rows.iter().all(|r| r.tied));
    assert_eq!(rows[1].gl_balance, 400.0);
    assert_eq!(rows[1].abs_diff, 0.0);
}

#[test]
fn missing_subledger_event_breaks_the_tie() {
    let (mut events, tb) = ar_books();
    events.pop(); // drop the collection

    let mut rows = rollforward(&events, SubledgerKind::Ar, &[month(1), month(2)]);
    reconcile(&mut rows, &tb);

    assert!(rows[0].tied);
    assert!(!rows[1].tied);
    assert_eq!(rows[1].ending_balance, 1_000.0);
    assert_eq!(rows[1].gl_balance, 400.0);
    assert!((rows[1].abs_diff - 600.0).abs() < 1e-9);
}

#[test]
fn equity_ties_to_capital_net_of_draws() {
    let chart = ChartOfAccounts::standard();
    let mut journal = Journal::new();
    let (contribution, _) = journal
        .post(
            &chart,
            date(1, 1),
            "Owner contribution",
            &[
                Posting::debit(coa::CASH, 5_000.0),
                Posting::credit(coa::OWNER_CAPITAL, 5_000.0),
            ],
        )
        .unwrap();
    let (draw, _) = journal
        .post(
            &chart,
            date(1, 28),
            "Owner draw",
            &[
                Posting::debit(coa::OWNER_DRAWS, 700.0),
                Posting::credit(coa::CASH, 700.0),
            ],
        )
        .unwrap();
    let events = vec![
        event(contribution, date(1, 1), SubledgerKind::Equity, SubledgerEventType::Contribution, 5_000.0),
        event(draw, date(1, 28), SubledgerKind::Equity, SubledgerEventType::Draw, -700.0),
    ];
    let tb = derive_trial_balance(journal.lines(), &chart, &[month(1)]);

    let rows = reconcile_all(&events, &tb, &[month(1)]);
    let equity = rows
        .iter()
        .find(|r| r.subledger == SubledgerKind::Equity)
        .unwrap();
    assert!(equity.tied);
    assert_eq!(equity.gl_balance, 4_300.0);

    // Every subledger gets a row, even with no events.
    assert_eq!(rows.len(), SubledgerKind::ALL.len());
    assert!(rows.iter().all(|r| r.tied));
}

#[test]
fn event_types_are_a_closed_set_per_subledger() {
    assert!(SubledgerKind::Ar.accepts(SubledgerEventType::Invoice));
    assert!(!SubledgerKind::Ar.accepts(SubledgerEventType::Purchase));
    assert!(SubledgerKind::NotesPayable.accepts(SubledgerEventType::PrincipalPayment));
    assert!(!SubledgerKind::Equity.accepts(SubledgerEventType::TaxRemitted));
}
