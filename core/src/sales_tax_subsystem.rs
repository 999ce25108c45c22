//! Sales tax subsystem — remits last month's collected sales tax.
//!
//! Collection happens inside each sale (see sales_subsystem.rs); this
//! subsystem runs before sales, so the balance it remits on day 20 is
//! exactly the prior month's collections.

use crate::{
    books::Books,
    coa,
    error::LedgerResult,
    journal::Posting,
    rng::SubsystemRng,
    subledger::{SubledgerEventType, SubledgerKind},
    subsystem::{MonthContext, SimSubsystem},
    types::round2,
};

#[derive(Default)]
pub struct SalesTaxSubsystem;

impl SalesTaxSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl SimSubsystem for SalesTaxSubsystem {
    fn name(&self) -> &'static str {
        "sales_tax"
    }

    fn post_month(
        &mut self,
        ctx: &MonthContext,
        books: &mut Books,
        _rng: &mut SubsystemRng,
    ) -> LedgerResult<usize> {
        let owed = round2(books.balance(coa::SALES_TAX_PAYABLE));
        if owed <= 0.0 {
            return Ok(0);
        }
        let date = ctx.month.day(20);
        let txn_id = books.post(
            date,
            "Sales tax remittance",
            &[
                Posting::debit(coa::SALES_TAX_PAYABLE, owed),
                Posting::credit(coa::CASH, owed),
            ],
        )?;
        books.record(
            txn_id,
            date,
            SubledgerKind::SalesTaxPayable,
            SubledgerEventType::TaxRemitted,
            -owed,
            -owed,
        );
        log::debug!("month={} sales_tax: remitted {owed:.2}", ctx.month);
        Ok(1)
    }
}
