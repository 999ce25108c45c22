//! The generator engine — runs the month loop and assembles the dataset.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Equity subsystem        (opening contribution, owner draws)
//!   2. Debt subsystem          (origination, monthly payment)
//!   3. Payroll subsystem       (pay prior accruals, accrue this month)
//!   4. Sales tax subsystem     (remit prior month's collections)
//!   5. Collections subsystem   (collect beginning AR)
//!   6. Purchasing subsystem    (equipment, inventory on account, pay AP)
//!   7. Sales subsystem         (invoices, sales tax, COGS)
//!   8. Overhead subsystem      (rent, utilities)
//!   9. Depreciation subsystem  (straight-line charge)
//!
//! RULES:
//!   - Subsystems execute in registration order, every month.
//!   - Subsystems touch the ledger only through Books.
//!   - All randomness flows through the RngBank; each subsystem keeps
//!     its own stream for the whole run.
//!   - The month-end trial balance is snapshotted from the running
//!     balances after the last subsystem posts.

use crate::{
    books::Books,
    clock::{Month, MonthClock},
    coa::ChartOfAccounts,
    collections_subsystem::CollectionsSubsystem,
    config::SimConfig,
    dataset::Dataset,
    debt_subsystem::DebtSubsystem,
    depreciation_subsystem::DepreciationSubsystem,
    equity_subsystem::EquitySubsystem,
    error::LedgerResult,
    meta::RunMeta,
    overhead_subsystem::OverheadSubsystem,
    payroll_subsystem::PayrollSubsystem,
    purchasing_subsystem::PurchasingSubsystem,
    rng::{RngBank, SubsystemRng, SubsystemSlot},
    sales_subsystem::SalesSubsystem,
    sales_tax_subsystem::SalesTaxSubsystem,
    statements::derive_statements,
    subsystem::{MonthContext, SimSubsystem},
};

pub struct SimEngine {
    pub config: SimConfig,
    pub clock: MonthClock,
    rng_bank: RngBank,
    subsystems: Vec<(SubsystemRng, Box<dyn SimSubsystem>)>,
    books: Books,
}

impl SimEngine {
    /// An engine with no subsystems registered.
    pub fn new(config: SimConfig) -> LedgerResult<Self> {
        config.validate()?;
        Ok(Self {
            clock: MonthClock::new(config.start_month, config.n_months),
            rng_bank: RngBank::new(config.seed),
            subsystems: Vec::new(),
            books: Books::new(ChartOfAccounts::standard()),
            config,
        })
    }

    /// Build a fully wired engine with all subsystems registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(config: SimConfig) -> LedgerResult<Self> {
        let business = config.business.clone();
        let mut engine = SimEngine::new(config)?;

        // EXECUTION ORDER — fixed, documented, never reordered.
        engine.register(SubsystemSlot::Equity, Box::new(EquitySubsystem::new(business.clone())));
        engine.register(SubsystemSlot::Debt, Box::new(DebtSubsystem::new(business.clone())));
        engine.register(SubsystemSlot::Payroll, Box::new(PayrollSubsystem::new(business.clone())));
        engine.register(SubsystemSlot::SalesTax, Box::new(SalesTaxSubsystem::new()));
        engine.register(
            SubsystemSlot::Collections,
            Box::new(CollectionsSubsystem::new(business.clone())),
        );
        engine.register(
            SubsystemSlot::Purchasing,
            Box::new(PurchasingSubsystem::new(business.clone())),
        );
        engine.register(SubsystemSlot::Sales, Box::new(SalesSubsystem::new(business.clone())));
        engine.register(SubsystemSlot::Overhead, Box::new(OverheadSubsystem::new(business.clone())));
        engine.register(SubsystemSlot::Depreciation, Box::new(DepreciationSubsystem::new(business)));
        Ok(engine)
    }

    /// Register a subsystem. Call in the documented execution order.
    pub fn register(&mut self, slot: SubsystemSlot, subsystem: Box<dyn SimSubsystem>) {
        let rng = self.rng_bank.for_subsystem(slot);
        self.subsystems.push((rng, subsystem));
    }

    /// Generate one month. Returns the month generated, or None when
    /// the run is complete.
    pub fn step(&mut self) -> LedgerResult<Option<Month>> {
        let Some(month) = self.clock.advance() else {
            return Ok(None);
        };
        let ctx = MonthContext {
            month,
            number: self.clock.month_number(),
        };

        let mut posted = 0;
        for (rng, subsystem) in &mut self.subsystems {
            let n = subsystem.post_month(&ctx, &mut self.books, rng)?;
            log::trace!("month={month} {}: {n} txns", subsystem.name());
            posted += n;
        }
        self.books.close_month(month);

        log::debug!("month={month} closed: {posted} txns posted");
        Ok(Some(month))
    }

    /// Run every month, then derive statements and assemble the dataset.
    pub fn run(mut self) -> LedgerResult<Dataset> {
        log::info!(
            "Generating {} months from {} (seed {})",
            self.config.n_months,
            self.config.start_month,
            self.config.seed
        );
        while self.step()?.is_some() {}

        let mut meta = RunMeta::new(&self.config);
        meta.n_transactions = self.books.transaction_count();

        let parts = self.books.into_parts();
        let statements = derive_statements(&parts.trial_balance, &parts.coa);
        meta.n_journal_lines = parts.journal.len();
        meta.n_subledger_events = parts.events.len();

        log::info!(
            "Generated {} transactions ({} journal lines, {} subledger events)",
            meta.n_transactions,
            meta.n_journal_lines,
            meta.n_subledger_events
        );

        Ok(Dataset {
            meta,
            coa: parts.coa,
            journal: parts.journal,
            trial_balance: parts.trial_balance,
            statements,
            subledger_events: parts.events,
            debt_schedule: parts.debt_schedule,
        })
    }
}
