//! Overhead subsystem — rent and utilities, paid in cash.

use crate::{
    books::Books,
    coa,
    config::BusinessConfig,
    error::LedgerResult,
    journal::Posting,
    rng::SubsystemRng,
    subsystem::{MonthContext, SimSubsystem},
    types::round2,
};

pub struct OverheadSubsystem {
    config: BusinessConfig,
}

impl OverheadSubsystem {
    pub fn new(config: BusinessConfig) -> Self {
        Self { config }
    }
}

impl SimSubsystem for OverheadSubsystem {
    fn name(&self) -> &'static str {
        "overhead"
    }

    fn post_month(
        &mut self,
        ctx: &MonthContext,
        books: &mut Books,
        rng: &mut SubsystemRng,
    ) -> LedgerResult<usize> {
        let rent = round2(self.config.monthly_rent);
        let utilities = rng.jitter(self.config.utilities_mean, self.config.utilities_jitter);

        let bills = [
            (1, coa::RENT_EXPENSE, "Rent", rent),
            (25, coa::UTILITIES_EXPENSE, "Utilities", utilities),
        ];
        let mut posted = 0;
        for (day, account_id, description, amount) in bills {
            if amount <= 0.0 {
                continue;
            }
            books.post(
                ctx.month.day(day),
                description,
                &[
                    Posting::debit(account_id, amount),
                    Posting::credit(coa::CASH, amount),
                ],
            )?;
            posted += 1;
        }

        log::debug!("month={} overhead: rent={rent:.2} utilities={utilities:.2}", ctx.month);
        Ok(posted)
    }
}
