//! Payroll subsystem — wages payable and payroll taxes payable.
//!
//! Each month, in this order:
//!   1. Pay last month's net wages (wages payable → cash), day 5.
//!   2. Remit last month's withholding and employer taxes, day 15.
//!   3. Accrue this month's payroll on the last day:
//!        Dr Wages Expense (gross)
//!          Cr Wages Payable (net), Cr Payroll Taxes Payable (withholding)
//!        Dr Payroll Tax Expense / Cr Payroll Taxes Payable (employer share)
//!
//! So at every month end both liabilities hold exactly that month's accrual.

use crate::{
    books::Books,
    coa,
    config::BusinessConfig,
    error::LedgerResult,
    journal::Posting,
    rng::SubsystemRng,
    subledger::{SubledgerEventType, SubledgerKind},
    subsystem::{MonthContext, SimSubsystem},
    types::round2,
};

pub struct PayrollSubsystem {
    config: BusinessConfig,
}

impl PayrollSubsystem {
    pub fn new(config: BusinessConfig) -> Self {
        Self { config }
    }

    /// Pay off an accrued payroll liability in full.
    #[allow(clippy::too_many_arguments)]
    fn settle(
        &self,
        books: &mut Books,
        ctx: &MonthContext,
        day: u32,
        account_id: &str,
        kind: SubledgerKind,
        event_type: SubledgerEventType,
        description: &str,
    ) -> LedgerResult<usize> {
        let amount = round2(books.balance(account_id));
        if amount <= 0.0 {
            return Ok(0);
        }
        let date = ctx.month.day(day);
        let txn_id = books.post(
            date,
            description,
            &[
                Posting::debit(account_id, amount),
                Posting::credit(coa::CASH, amount),
            ],
        )?;
        books.record(txn_id, date, kind, event_type, -amount, -amount);
        Ok(1)
    }
}

impl SimSubsystem for PayrollSubsystem {
    fn name(&self) -> &'static str {
        "payroll"
    }

    fn post_month(
        &mut self,
        ctx: &MonthContext,
        books: &mut Books,
        rng: &mut SubsystemRng,
    ) -> LedgerResult<usize> {
        let mut posted = self.settle(
            books,
            ctx,
            5,
            coa::WAGES_PAYABLE,
            SubledgerKind::WagesPayable,
            SubledgerEventType::WagePayment,
            "Net wages paid",
        )?;
        posted += self.settle(
            books,
            ctx,
            15,
            coa::PAYROLL_TAXES_PAYABLE,
            SubledgerKind::PayrollTaxesPayable,
            SubledgerEventType::TaxRemittance,
            "Payroll taxes remitted",
        )?;

        let gross = rng.jitter(self.config.monthly_gross_wages, self.config.wage_jitter);
        let withholding = round2(gross * self.config.employee_withholding_rate);
        let net = round2(gross - withholding);
        let employer_tax = round2(gross * self.config.employer_tax_rate);
        let date = ctx.month.last_day();

        if gross > 0.0 {
            let txn_id = books.post(
                date,
                "Payroll accrual",
                &[
                    Posting::debit(coa::WAGES_EXPENSE, gross),
                    Posting::credit(coa::WAGES_PAYABLE, net),
                    Posting::credit(coa::PAYROLL_TAXES_PAYABLE, withholding),
                ],
            )?;
            books.record(
                txn_id,
                date,
                SubledgerKind::WagesPayable,
                SubledgerEventType::WageAccrual,
                net,
                0.0,
            );
            if withholding > 0.0 {
                books.record(
                    txn_id,
                    date,
                    SubledgerKind::PayrollTaxesPayable,
                    SubledgerEventType::WithholdingAccrual,
                    withholding,
                    0.0,
                );
            }
            posted += 1;
        }

        if employer_tax > 0.0 {
            let txn_id = books.post(
                date,
                "Employer payroll taxes",
                &[
                    Posting::debit(coa::PAYROLL_TAX_EXPENSE, employer_tax),
                    Posting::credit(coa::PAYROLL_TAXES_PAYABLE, employer_tax),
                ],
            )?;
            books.record(
                txn_id,
                date,
                SubledgerKind::PayrollTaxesPayable,
                SubledgerEventType::EmployerTaxAccrual,
                employer_tax,
                0.0,
            );
            posted += 1;
        }

        log::debug!(
            "month={} payroll: gross={gross:.2} net={net:.2} withholding={withholding:.2} employer={employer_tax:.2}",
            ctx.month
        );
        Ok(posted)
    }
}
