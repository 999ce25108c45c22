//! Run metadata — written next to the tables as `nso_v1_meta.json`.
//!
//! The meta file records everything needed to regenerate the dataset
//! bit-for-bit (seed + full config) plus row counts for quick audits.

use crate::{clock::Month, config::SimConfig};
use serde::{Deserialize, Serialize};

pub const DATASET_NAME: &str = "nso_v1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunMeta {
    pub dataset: String,
    pub generator_version: String,
    pub seed: u64,
    pub start_month: Month,
    pub n_months: u32,
    pub config: SimConfig,
    pub n_transactions: usize,
    pub n_journal_lines: usize,
    pub n_subledger_events: usize,
}

impl RunMeta {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            dataset: DATASET_NAME.to_string(),
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            seed: config.seed,
            start_month: config.start_month,
            n_months: config.n_months,
            config: config.clone(),
            n_transactions: 0,
            n_journal_lines: 0,
            n_subledger_events: 0,
        }
    }
}
