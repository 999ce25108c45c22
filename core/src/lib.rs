//! ledgerlab-core: synthetic small-business general ledger generator
//! and the independent validator that proves its books tie out.

pub mod books;
pub mod clock;
pub mod coa;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod journal;
pub mod meta;
pub mod rng;
pub mod statements;
pub mod store;
pub mod subledger;
pub mod subsystem;
pub mod trial_balance;
pub mod types;
pub mod validate;

// Generator subsystems, in engine execution order.
pub mod equity_subsystem;
pub mod debt_subsystem;
pub mod payroll_subsystem;
pub mod sales_tax_subsystem;
pub mod collections_subsystem;
pub mod purchasing_subsystem;
pub mod sales_subsystem;
pub mod overhead_subsystem;
pub mod depreciation_subsystem;
