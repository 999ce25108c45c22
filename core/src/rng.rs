//! Seeded randomness for the generator.
//!
//! RULE: No generator code touches a platform or thread-local RNG.
//! The run config carries one master seed; every subsystem draws from
//! its own Pcg64Mcg stream derived from that seed and the subsystem's
//! stable slot number.
//!
//! Because streams are per slot, a subsystem that draws more or fewer
//! numbers in some month never shifts another subsystem's sequence.

use crate::types::round2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// Golden-ratio increment used to spread slot numbers across the seed space.
const SLOT_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// One subsystem's private random stream.
pub struct SubsystemRng {
    slot: SubsystemSlot,
    inner: Pcg64Mcg,
}

impl SubsystemRng {
    /// The stream for `slot` under `master_seed`.
    pub fn new(master_seed: u64, slot: SubsystemSlot) -> Self {
        let seed = master_seed ^ (slot as u64).wrapping_mul(SLOT_MIX);
        Self {
            slot,
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    pub fn slot(&self) -> SubsystemSlot {
        self.slot
    }

    /// Float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        self.inner.gen()
    }

    /// Integer in [0, n). Panics if n is 0.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        self.inner.gen_range(0..n)
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Float in [lo, hi); returns `lo` when the range is empty.
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// `base` scaled by a factor in [1 - pct, 1 + pct), in cents.
    pub fn jitter(&mut self, base: f64, pct: f64) -> f64 {
        round2(base * self.uniform(1.0 - pct, 1.0 + pct))
    }

    /// Money amount in [lo, hi), in cents.
    pub fn amount(&mut self, lo: f64, hi: f64) -> f64 {
        round2(self.uniform(lo, hi))
    }
}

/// Hands out one stream per subsystem for a run.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_subsystem(&self, slot: SubsystemSlot) -> SubsystemRng {
        SubsystemRng::new(self.master_seed, slot)
    }
}

/// Stable slot numbers, one per generator subsystem.
/// Append only: renumbering a slot changes its stream and therefore
/// every dataset generated from a given seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum SubsystemSlot {
    Equity = 0,
    Debt = 1,
    Payroll = 2,
    SalesTax = 3,
    Collections = 4,
    Purchasing = 5,
    Sales = 6,
    Overhead = 7,
    Depreciation = 8,
}

impl SubsystemSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Equity => "equity",
            Self::Debt => "debt",
            Self::Payroll => "payroll",
            Self::SalesTax => "sales_tax",
            Self::Collections => "collections",
            Self::Purchasing => "purchasing",
            Self::Sales => "sales",
            Self::Overhead => "overhead",
            Self::Depreciation => "depreciation",
        }
    }
}
