//! Depreciation subsystem — straight-line, monthly, non-cash.
//!
//! Monthly charge = equipment cost / useful life, capped so accumulated
//! depreciation never exceeds cost.

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

pub struct DepreciationSubsystem {
    config: BusinessConfig,
}

impl DepreciationSubsystem {
    pub fn new(config: BusinessConfig) -> Self {
        Self { config }
    }
}

impl SimSubsystem for DepreciationSubsystem {
    fn name(&self) -> &'static str {
        "depreciation"
    }

    fn post_month(
        &mut self,
        ctx: &MonthContext,
        books: &mut Books,
        _rng: &mut SubsystemRng,
    ) -> LedgerResult<usize> {
        let cost = round2(books.balance(coa::EQUIPMENT));
        let accumulated = round2(books.balance(coa::ACCUMULATED_DEPRECIATION));
        let life = f64::from(self.config.equipment_useful_life_months.max(1));
        let charge = round2(cost / life).min(round2(cost - accumulated));
        if charge <= 0.0 {
            return Ok(0);
        }

        books.post(
            ctx.month.last_day(),
            "Monthly depreciation",
            &[
                Posting::debit(coa::DEPRECIATION_EXPENSE, charge),
                Posting::credit(coa::ACCUMULATED_DEPRECIATION, charge),
            ],
        )?;
        log::debug!("month={} depreciation: {charge:.2}", ctx.month);
        Ok(1)
    }
}
