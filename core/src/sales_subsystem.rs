//! Sales subsystem — customer invoices with sales tax and COGS relief.
//!
//! Every sale is one balanced transaction of up to five lines:
//!   Dr Cash or Accounts Receivable   (amount + tax)
//!     Cr Sales Revenue               (amount)
//!     Cr Sales Tax Payable           (tax)
//!   Dr Cost of Goods Sold            (cost)
//!     Cr Inventory                   (cost)

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
use chrono::Datelike;

pub struct SalesSubsystem {
    config: BusinessConfig,
    invoice_seq: u64,
}

impl SalesSubsystem {
    pub fn new(config: BusinessConfig) -> Self {
        Self {
            config,
            invoice_seq: 0,
        }
    }
}

impl SimSubsystem for SalesSubsystem {
    fn name(&self) -> &'static str {
        "sales"
    }

    fn post_month(
        &mut self,
        ctx: &MonthContext,
        books: &mut Books,
        rng: &mut SubsystemRng,
    ) -> LedgerResult<usize> {
        let c = &self.config;
        let days_in_month = u64::from(ctx.month.last_day().day());
        let mut days: Vec<u32> = (0..c.sales_per_month)
            .map(|_| 1 + rng.next_u64_below(days_in_month) as u32)
            .collect();
        days.sort_unstable();

        let mut revenue = 0.0;
        for day in days {
            let amount = rng.amount(c.sale_amount_min, c.sale_amount_max);
            let tax = round2(amount * c.sales_tax_rate);
            let cost = round2(amount * c.cogs_ratio);
            let on_credit = rng.chance(c.credit_sale_share);
            let gross = round2(amount + tax);

            self.invoice_seq += 1;
            let description = format!(
                "Invoice INV-{:05} ({})",
                self.invoice_seq,
                if on_credit { "credit" } else { "cash" }
            );
            let settle_to = if on_credit { coa::ACCOUNTS_RECEIVABLE } else { coa::CASH };
            let date = ctx.month.day(day);

            let txn_id = books.post(
                date,
                &description,
                &[
                    Posting::debit(settle_to, gross),
                    Posting::credit(coa::SALES_REVENUE, amount),
                    Posting::credit(coa::SALES_TAX_PAYABLE, tax),
                    Posting::debit(coa::COST_OF_GOODS_SOLD, cost),
                    Posting::credit(coa::INVENTORY, cost),
                ],
            )?;

            if on_credit {
                books.record(
                    txn_id,
                    date,
                    SubledgerKind::Ar,
                    SubledgerEventType::Invoice,
                    gross,
                    0.0,
                );
            }
            if tax > 0.0 {
                books.record(
                    txn_id,
                    date,
                    SubledgerKind::SalesTaxPayable,
                    SubledgerEventType::TaxCollected,
                    tax,
                    if on_credit { 0.0 } else { tax },
                );
            }
            revenue += amount;
        }

        log::debug!(
            "month={} sales: {} invoices, revenue={revenue:.2}",
            ctx.month,
            c.sales_per_month
        );
        Ok(c.sales_per_month as usize)
    }
}
