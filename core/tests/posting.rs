//! Double-entry posting: the journal accepts only balanced transactions
//! against known accounts, and the validator's scan finds any stored
//! transaction that does not balance.

use chrono::NaiveDate;
use ledgerlab_core::{
    coa::{self, ChartOfAccounts},
    error::LedgerError,
    journal::{find_unbalanced, Journal, JournalLine, Posting},
};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
}

#[test]
fn balanced_transactions_get_sequential_ids() {
    let chart = ChartOfAccounts::standard();
    let mut journal = Journal::new();

    let (first, lines) = journal
        .post(
            &chart,
            date(1),
            "Owner contribution",
            &[
                Posting::debit(coa::CASH, 50_000.0),
                Posting::credit(coa::OWNER_CAPITAL, 50_000.0),
            ],
        )
        .unwrap();
    let (second, _) = journal
        .post(
            &chart,
            date(2),
            "Rent",
            &[
                Posting::debit(coa::RENT_EXPENSE, 1_500.0),
                Posting::credit(coa::CASH, 1_500.0),
            ],
        )
        .unwrap();

    assert_eq!(first, 1);
    assert_eq!(second, 2);
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.txn_id == 1 && l.date == date(1)));
    assert_eq!(journal.lines().len(), 4);
    assert_eq!(journal.transaction_count(), 2);
}

#[test]
fn unbalanced_transaction_is_refused_and_nothing_is_appended() {
    let chart = ChartOfAccounts::standard();
    let mut journal = Journal::new();

    let err = journal
        .post(
            &chart,
            date(3),
            "Broken",
            &[
                Posting::debit(coa::CASH, 100.0),
                Posting::credit(coa::SALES_REVENUE, 90.0),
            ],
        )
        .unwrap_err();

    match err {
        LedgerError::UnbalancedTransaction {
            txn_id,
            debits,
            credits,
        } => {
            assert_eq!(txn_id, 1);
            assert_eq!(debits, 100.0);
            assert_eq!(credits, 90.0);
        }
        other => panic!("expected UnbalancedTransaction, got {other}"),
    }
    assert!(journal.lines().is_empty());
    assert_eq!(journal.transaction_count(), 0);
}

#[test]
fn sub_tolerance_difference_is_accepted() {
    let chart = ChartOfAccounts::standard();
    let mut journal = Journal::new();
    let result = journal.post(
        &chart,
        date(4),
        "Float noise",
        &[
            Posting::debit(coa::CASH, 0.1 + 0.2),
            Posting::credit(coa::SALES_REVENUE, 0.3),
        ],
    );
    assert!(result.is_ok());
}

#[test]
fn unknown_account_is_refused() {
    let chart = ChartOfAccounts::standard();
    let mut journal = Journal::new();
    let err = journal
        .post(
            &chart,
            date(5),
            "Mystery",
            &[Posting::debit("9999", 10.0), Posting::credit(coa::CASH, 10.0)],
        )
        .unwrap_err();
    assert!(matches!(err, LedgerError::UnknownAccount { ref account_id } if account_id == "9999"));
}

#[test]
fn negative_amount_is_refused() {
    let chart = ChartOfAccounts::standard();
    let mut journal = Journal::new();
    let err = journal
        .post(
            &chart,
            date(6),
            "Negative",
            &[
                Posting::debit(coa::CASH, -10.0),
                Posting::credit(coa::SALES_REVENUE, -10.0),
            ],
        )
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmount { .. }));
}

#[test]
fn empty_and_all_zero_transactions_are_refused() {
    let chart = ChartOfAccounts::standard();
    let mut journal = Journal::new();

    let err = journal.post(&chart, date(7), "Nothing", &[]).unwrap_err();
    assert!(matches!(err, LedgerError::EmptyTransaction { .. }));

    let err = journal
        .post(
            &chart,
            date(7),
            "Zeros",
            &[Posting::debit(coa::CASH, 0.0), Posting::credit(coa::SALES_REVENUE, 0.0)],
        )
        .unwrap_err();
    assert!(matches!(err, LedgerError::EmptyTransaction { .. }));
}

#[test]
fn zero_amount_lines_are_dropped() {
    let chart = ChartOfAccounts::standard();
    let mut journal = Journal::new();
    let (_, lines) = journal
        .post(
            &chart,
            date(8),
            "Cash sale, no tax",
            &[
                Posting::debit(coa::CASH, 500.0),
                Posting::credit(coa::SALES_REVENUE, 500.0),
                Posting::credit(coa::SALES_TAX_PAYABLE, 0.0),
            ],
        )
        .unwrap();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.account_id != coa::SALES_TAX_PAYABLE));
}

#[test]
fn find_unbalanced_reports_only_the_bad_transaction() {
    let line = |txn_id, account_id: &str, debit, credit| JournalLine {
        txn_id,
        date: date(9),
        account_id: account_id.to_string(),
        debit,
        credit,
        description: String::new(),
    };
    let lines = vec![
        line(1, coa::CASH, 250.0, 0.0),
        line(1, coa::SALES_REVENUE, 0.0, 250.0),
        line(2, coa::CASH, 100.0, 0.0),
        line(2, coa::SALES_REVENUE, 0.0, 90.0),
        line(3, coa::RENT_EXPENSE, 40.0, 0.0),
        line(3, coa::CASH, 0.0, 40.0),
    ];

    let bad = find_unbalanced(&lines);
    assert_eq!(bad.len(), 1);
    assert_eq!(bad[0].txn_id, 2);
    assert!((bad[0].abs_diff - 10.0).abs() < 1e-12);
}

#[test]
fn find_unbalanced_flags_non_numeric_sums() {
    let lines = vec![
        JournalLine {
            txn_id: 4,
            date: date(9),
            account_id: coa::CASH.to_string(),
            debit: f64::NAN,
            credit: 0.0,
            description: String::new(),
        },
        JournalLine {
            txn_id: 4,
            date: date(9),
            account_id: coa::SALES_REVENUE.to_string(),
            debit: 0.0,
            credit: 25.0,
            description: String::new(),
        },
    ];

    let bad = find_unbalanced(&lines);
    assert_eq!(bad.len(), 1);
    assert_eq!(bad[0].txn_id, 4);
}

#[test]
fn default_journal_starts_like_a_new_one() {
    let chart = ChartOfAccounts::standard();
    let mut journal = Journal::default();
    assert_eq!(journal.transaction_count(), 0);

    let (txn_id, _) = journal
        .post(
            &chart,
            date(3),
            "Rent",
            &[
                Posting::debit(coa::RENT_EXPENSE, 1_500.0),
                Posting::credit(coa::CASH, 1_500.0),
            ],
        )
        .unwrap();
    assert_eq!(txn_id, 1);
    assert_eq!(journal.transaction_count(), 1);
}
