//! Shared primitive types used across the entire ledger.

/// Groups journal lines into one balanced transaction.
pub type TxnId = u64;

/// A chart-of-accounts key, e.g. "1000" for Cash.
pub type AccountId = String;

/// Tolerance for every balance comparison in the crate.
/// Sums of cent-rounded amounts drift by far less than this.
pub const BALANCE_TOLERANCE: f64 = 1e-6;

/// Smallest amount that survives rounding to cents.
pub const CENT: f64 = 0.01;

/// Round a money amount to cents.
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// True when two amounts agree within [`BALANCE_TOLERANCE`].
pub fn within_tolerance(a: f64, b: f64) -> bool {
    (a - b).abs() <= BALANCE_TOLERANCE
}
