//! Subsystem trait.
//!
//! RULE: Every generator subsystem implements SimSubsystem.
//! The engine calls post_month() on each registered subsystem
//! in registration order, every month.
//! Execution order is fixed and documented in engine.rs.

use crate::{books::Books, clock::Month, error::LedgerResult, rng::SubsystemRng};

/// Where a subsystem sits in the month, for its posting dates.
#[derive(Debug, Clone, Copy)]
pub struct MonthContext {
    pub month: Month,
    /// 1-based month number within the run.
    pub number: u32,
}

impl MonthContext {
    pub fn is_first(&self) -> bool {
        self.number == 1
    }
}

/// The contract every subsystem must fulfill.
pub trait SimSubsystem {
    /// Unique stable name for this subsystem.
    fn name(&self) -> &'static str;

    /// Called once per month by the engine.
    ///
    /// - `ctx`:   the month being generated
    /// - `books`: the ledger so far, including earlier subsystems' postings this month
    /// - `rng`:   this subsystem's deterministic RNG stream
    ///
    /// Returns the number of transactions posted.
    fn post_month(
        &mut self,
        ctx: &MonthContext,
        books: &mut Books,
        rng: &mut SubsystemRng,
    ) -> LedgerResult<usize>;
}
