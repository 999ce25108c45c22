//! Collections subsystem — customers pay down receivables.
//!
//! Each month a random share in [collection_share_min, 1.0) of the
//! beginning AR balance is collected on day 10. Credit sales made this
//! month are not yet collectible (sales run later in the month).

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

pub struct CollectionsSubsystem {
    config: BusinessConfig,
}

impl CollectionsSubsystem {
    pub fn new(config: BusinessConfig) -> Self {
        Self { config }
    }
}

impl SimSubsystem for CollectionsSubsystem {
    fn name(&self) -> &'static str {
        "collections"
    }

    fn post_month(
        &mut self,
        ctx: &MonthContext,
        books: &mut Books,
        rng: &mut SubsystemRng,
    ) -> LedgerResult<usize> {
        let share = rng.uniform(self.config.collection_share_min, 1.0);
        let receivable = round2(books.balance(coa::ACCOUNTS_RECEIVABLE));
        let amount = round2(receivable * share).min(receivable);
        if amount <= 0.0 {
            return Ok(0);
        }

        let date = ctx.month.day(10);
        let txn_id = books.post(
            date,
            "Customer collections",
            &[
                Posting::debit(coa::CASH, amount),
                Posting::credit(coa::ACCOUNTS_RECEIVABLE, amount),
            ],
        )?;
        books.record(
            txn_id,
            date,
            SubledgerKind::Ar,
            SubledgerEventType::Collection,
            -amount,
            amount,
        );
        log::debug!(
            "month={} collections: {amount:.2} of {receivable:.2} ({:.0}%)",
            ctx.month,
            share * 100.0
        );
        Ok(1)
    }
}
