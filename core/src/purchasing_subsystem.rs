//! Purchasing subsystem — inventory bought on account, AP paid monthly.
//!
//! Month 1 also books the opening equipment purchase (cash, investing).
//!
//! Each month:
//!   1. Restock inventory toward `inventory_target` plus the month's
//!      expected cost of sales, on account (day 2).
//!   2. Pay the AP balance carried in from last month (day 12).
//! Purchases made this month stay in AP until next month.

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

pub struct PurchasingSubsystem {
    config: BusinessConfig,
}

impl PurchasingSubsystem {
    pub fn new(config: BusinessConfig) -> Self {
        Self { config }
    }

    fn expected_cost_of_sales(&self) -> f64 {
        let c = &self.config;
        let avg_sale = (c.sale_amount_min + c.sale_amount_max) / 2.0;
        c.sales_per_month as f64 * avg_sale * c.cogs_ratio
    }
}

impl SimSubsystem for PurchasingSubsystem {
    fn name(&self) -> &'static str {
        "purchasing"
    }

    fn post_month(
        &mut self,
        ctx: &MonthContext,
        books: &mut Books,
        rng: &mut SubsystemRng,
    ) -> LedgerResult<usize> {
        let mut posted = 0;

        if ctx.is_first() && self.config.equipment_cost > 0.0 {
            let cost = self.config.equipment_cost;
            books.post(
                ctx.month.first_day(),
                "Equipment purchase",
                &[
                    Posting::debit(coa::EQUIPMENT, cost),
                    Posting::credit(coa::CASH, cost),
                ],
            )?;
            posted += 1;
        }

        let carried_ap = round2(books.balance(coa::ACCOUNTS_PAYABLE));

        let on_hand = books.balance(coa::INVENTORY);
        let needed = (self.config.inventory_target + self.expected_cost_of_sales() - on_hand).max(0.0);
        let purchase = rng.jitter(needed, 0.05);
        if purchase > 0.0 {
            let date = ctx.month.day(2);
            let txn_id = books.post(
                date,
                "Inventory purchase on account",
                &[
                    Posting::debit(coa::INVENTORY, purchase),
                    Posting::credit(coa::ACCOUNTS_PAYABLE, purchase),
                ],
            )?;
            books.record(
                txn_id,
                date,
                SubledgerKind::Ap,
                SubledgerEventType::Purchase,
                purchase,
                0.0,
            );
            posted += 1;
        }

        if carried_ap > 0.0 {
            let date = ctx.month.day(12);
            let txn_id = books.post(
                date,
                "Vendor payment",
                &[
                    Posting::debit(coa::ACCOUNTS_PAYABLE, carried_ap),
                    Posting::credit(coa::CASH, carried_ap),
                ],
            )?;
            books.record(
                txn_id,
                date,
                SubledgerKind::Ap,
                SubledgerEventType::Payment,
                -carried_ap,
                -carried_ap,
            );
            posted += 1;
        }

        log::debug!(
            "month={} purchasing: bought {purchase:.2}, paid {carried_ap:.2}",
            ctx.month
        );
        Ok(posted)
    }
}
