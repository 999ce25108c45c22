//! Equity subsystem — owner contributions and draws.
//!
//! Month 1: the opening owner contribution funds the business.
//! Every month: the owner may take a draw, if cash comfortably covers it.

use crate::{
    books::Books,
    coa,
    config::BusinessConfig,
    error::LedgerResult,
    journal::Posting,
    rng::SubsystemRng,
    subledger::{SubledgerEventType, SubledgerKind},
    subsystem::{MonthContext, SimSubsystem},
};

pub struct EquitySubsystem {
    config: BusinessConfig,
}

impl EquitySubsystem {
    pub fn new(config: BusinessConfig) -> Self {
        Self { config }
    }
}

impl SimSubsystem for EquitySubsystem {
    fn name(&self) -> &'static str {
        "equity"
    }

    fn post_month(
        &mut self,
        ctx: &MonthContext,
        books: &mut Books,
        rng: &mut SubsystemRng,
    ) -> LedgerResult<usize> {
        let mut posted = 0;

        if ctx.is_first() && self.config.owner_contribution > 0.0 {
            let amount = self.config.owner_contribution;
            let date = ctx.month.first_day();
            let txn_id = books.post(
                date,
                "Owner contribution",
                &[
                    Posting::debit(coa::CASH, amount),
                    Posting::credit(coa::OWNER_CAPITAL, amount),
                ],
            )?;
            books.record(
                txn_id,
                date,
                SubledgerKind::Equity,
                SubledgerEventType::Contribution,
                amount,
                amount,
            );
            posted += 1;
        }

        // Roll every month so the stream position does not depend on cash.
        let wants_draw = rng.chance(self.config.owner_draw_probability);
        let amount = rng.jitter(self.config.owner_draw_amount, 0.25);
        if wants_draw && amount > 0.0 && books.balance(coa::CASH) >= 2.0 * amount {
            let date = ctx.month.day(28);
            let txn_id = books.post(
                date,
                "Owner draw",
                &[
                    Posting::debit(coa::OWNER_DRAWS, amount),
                    Posting::credit(coa::CASH, amount),
                ],
            )?;
            books.record(
                txn_id,
                date,
                SubledgerKind::Equity,
                SubledgerEventType::Draw,
                -amount,
                -amount,
            );
            posted += 1;
        }

        log::debug!("month={} equity: {posted} txns", ctx.month);
        Ok(posted)
    }
}
