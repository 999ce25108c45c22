//! Debt subsystem — a single amortizing term loan.
//!
//! Month 1: the loan is originated into cash.
//! Every month: one scheduled payment, split by `amortize` into
//! interest (Interest Expense) and principal (Notes Payable). Only the
//! principal reduces the liability.
//!
//! The subsystem tracks its own loan balance; the validator checks it
//! against the Notes Payable control account.

use crate::{
    books::Books,
    coa,
    config::BusinessConfig,
    error::LedgerResult,
    journal::Posting,
    rng::SubsystemRng,
    subledger::{amortize, SubledgerEventType, SubledgerKind},
    subsystem::{MonthContext, SimSubsystem},
};

pub const LOAN_ID: &str = "LOAN-001";

pub struct DebtSubsystem {
    config: BusinessConfig,
    /// Outstanding principal after the last payment.
    pub balance: f64,
}

impl DebtSubsystem {
    pub fn new(config: BusinessConfig) -> Self {
        Self {
            config,
            balance: 0.0,
        }
    }
}

impl SimSubsystem for DebtSubsystem {
    fn name(&self) -> &'static str {
        "debt"
    }

    fn post_month(
        &mut self,
        ctx: &MonthContext,
        books: &mut Books,
        _rng: &mut SubsystemRng,
    ) -> LedgerResult<usize> {
        let mut posted = 0;

        if ctx.is_first() && self.config.loan_principal > 0.0 {
            let principal = self.config.loan_principal;
            let date = ctx.month.first_day();
            let txn_id = books.post(
                date,
                &format!("{LOAN_ID} origination"),
                &[
                    Posting::debit(coa::CASH, principal),
                    Posting::credit(coa::NOTES_PAYABLE, principal),
                ],
            )?;
            books.record(
                txn_id,
                date,
                SubledgerKind::NotesPayable,
                SubledgerEventType::Origination,
                principal,
                principal,
            );
            self.balance = principal;
            posted += 1;
        }

        if self.balance > 0.0 {
            let row = amortize(
                ctx.month,
                LOAN_ID,
                self.balance,
                self.config.loan_monthly_payment,
                self.config.loan_annual_rate,
            );
            let date = ctx.month.day(28);
            let txn_id = books.post(
                date,
                &format!("{LOAN_ID} payment"),
                &[
                    Posting::debit(coa::INTEREST_EXPENSE, row.interest),
                    Posting::debit(coa::NOTES_PAYABLE, row.principal),
                    Posting::credit(coa::CASH, row.payment),
                ],
            )?;
            books.record(
                txn_id,
                date,
                SubledgerKind::NotesPayable,
                SubledgerEventType::PrincipalPayment,
                -row.principal,
                -row.payment,
            );
            log::debug!(
                "month={} debt: payment={:.2} interest={:.2} principal={:.2} ending={:.2}",
                ctx.month,
                row.payment,
                row.interest,
                row.principal,
                row.ending_balance
            );
            self.balance = row.ending_balance;
            books.record_debt_payment(row);
            posted += 1;
        }

        Ok(posted)
    }
}
