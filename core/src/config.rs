use crate::{
    clock::Month,
    error::{LedgerError, LedgerResult},
    types::{round2, CENT},
};
use serde::{Deserialize, Serialize};

/// Top-level run configuration.
///
/// Every field has a default, so a JSON file only needs the keys it
/// wants to override.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    pub start_month: Month,
    pub n_months: u32,
    pub business: BusinessConfig,
}

/// Parameters of the simulated business (a small retail outfitter).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BusinessConfig {
    // ── Opening balance sheet ──────────────────────────────────
    pub owner_contribution: f64,
    pub loan_principal: f64,
    pub loan_annual_rate: f64,
    pub loan_monthly_payment: f64,
    pub equipment_cost: f64,
    pub equipment_useful_life_months: u32,

    // ── Sales ──────────────────────────────────────────────────
    pub sales_per_month: u32,
    pub sale_amount_min: f64,
    pub sale_amount_max: f64,
    pub credit_sale_share: f64,
    pub sales_tax_rate: f64,
    pub cogs_ratio: f64,

    // ── Working capital ────────────────────────────────────────
    /// Share of beginning AR collected each month is drawn from [min, 1.0).
    pub collection_share_min: f64,
    /// Inventory level purchasing restocks toward each month.
    pub inventory_target: f64,

    // ── Payroll ────────────────────────────────────────────────
    pub monthly_gross_wages: f64,
    pub wage_jitter: f64,
    pub employee_withholding_rate: f64,
    pub employer_tax_rate: f64,

    // ── Overhead ───────────────────────────────────────────────
    pub monthly_rent: f64,
    pub utilities_mean: f64,
    pub utilities_jitter: f64,

    // ── Owner ──────────────────────────────────────────────────
    pub owner_draw_probability: f64,
    pub owner_draw_amount: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 123,
            start_month: Month::january(2025),
            n_months: 24,
            business: BusinessConfig::default(),
        }
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            owner_contribution: 50_000.0,
            loan_principal: 10_000.0,
            loan_annual_rate: 0.06,
            loan_monthly_payment: 500.0,
            equipment_cost: 12_000.0,
            equipment_useful_life_months: 60,

            sales_per_month: 18,
            sale_amount_min: 300.0,
            sale_amount_max: 1_200.0,
            credit_sale_share: 0.40,
            sales_tax_rate: 0.07,
            cogs_ratio: 0.50,

            collection_share_min: 0.85,
            inventory_target: 8_000.0,

            monthly_gross_wages: 4_000.0,
            wage_jitter: 0.05,
            employee_withholding_rate: 0.12,
            employer_tax_rate: 0.0765,

            monthly_rent: 1_500.0,
            utilities_mean: 300.0,
            utilities_jitter: 0.20,

            owner_draw_probability: 0.50,
            owner_draw_amount: 1_000.0,
        }
    }
}

impl SimConfig {
    /// Load from a JSON file. Missing keys fall back to defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// A short run for tests: same business, fewer months.
    pub fn default_test(seed: u64, n_months: u32) -> Self {
        Self {
            seed,
            n_months,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> LedgerResult<()> {
        let b = &self.business;
        let invalid = |reason: &str| {
            Err(LedgerError::InvalidConfig {
                reason: reason.to_string(),
            })
        };

        if self.n_months == 0 {
            return invalid("n_months must be at least 1");
        }
        let shares = [
            ("credit_sale_share", b.credit_sale_share),
            ("sales_tax_rate", b.sales_tax_rate),
            ("cogs_ratio", b.cogs_ratio),
            ("collection_share_min", b.collection_share_min),
            ("employee_withholding_rate", b.employee_withholding_rate),
            ("employer_tax_rate", b.employer_tax_rate),
            ("owner_draw_probability", b.owner_draw_probability),
            ("loan_annual_rate", b.loan_annual_rate),
            ("wage_jitter", b.wage_jitter),
            ("utilities_jitter", b.utilities_jitter),
        ];
        for (name, value) in shares {
            if !(0.0..=1.0).contains(&value) {
                return invalid(&format!("{name} must be within [0, 1], got {value}"));
            }
        }
        let amounts = [
            ("owner_contribution", b.owner_contribution),
            ("loan_principal", b.loan_principal),
            ("loan_monthly_payment", b.loan_monthly_payment),
            ("equipment_cost", b.equipment_cost),
            ("sale_amount_min", b.sale_amount_min),
            ("inventory_target", b.inventory_target),
            ("monthly_gross_wages", b.monthly_gross_wages),
            ("monthly_rent", b.monthly_rent),
            ("utilities_mean", b.utilities_mean),
            ("owner_draw_amount", b.owner_draw_amount),
        ];
        for (name, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return invalid(&format!("{name} must be a non-negative amount, got {value}"));
            }
        }
        // Every invoice must post a non-zero revenue line.
        if round2(b.sale_amount_min) < CENT {
            return invalid(&format!(
                "sale_amount_min must be at least {CENT:.2}, got {}",
                b.sale_amount_min
            ));
        }
        if b.sale_amount_min > b.sale_amount_max {
            return invalid("sale_amount_min must not exceed sale_amount_max");
        }
        if b.equipment_useful_life_months == 0 {
            return invalid("equipment_useful_life_months must be at least 1");
        }
        if b.loan_principal > 0.0
            && round2(
                round2(b.loan_monthly_payment) - round2(b.loan_principal * b.loan_annual_rate / 12.0),
            ) < CENT
        {
            return invalid("loan_monthly_payment does not cover monthly interest");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{"seed": 7, "business": {"sales_per_month": 5}}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.n_months, 24);
        assert_eq!(config.start_month, Month::january(2025));
        assert_eq!(config.business.sales_per_month, 5);
        assert_eq!(config.business.loan_principal, 10_000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bad_month_is_rejected_at_parse() {
        let parsed = serde_json::from_str::<SimConfig>(r#"{"start_month": "2025-13"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn out_of_range_share_is_rejected() {
        let mut config = SimConfig::default();
        config.business.credit_sale_share = 1.5;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, LedgerError::InvalidConfig { ref reason } if reason.contains("credit_sale_share")));
    }

    #[test]
    fn sales_must_have_a_non_zero_floor() {
        let mut config = SimConfig::default();
        config.business.sale_amount_min = 0.0;
        config.business.sale_amount_max = 0.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, LedgerError::InvalidConfig { ref reason } if reason.contains("sale_amount_min")));

        config.business.sale_amount_min = 0.004;
        config.business.sale_amount_max = 10.0;
        assert!(config.validate().is_err());

        config.business.sale_amount_min = 0.01;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn payment_must_cover_interest() {
        let mut config = SimConfig::default();
        config.business.loan_monthly_payment = 40.0;
        assert!(config.validate().is_err());

        // 10,000 at 6% accrues 50.00; a payment of 50.004 retires nothing.
        config.business.loan_monthly_payment = 50.004;
        assert!(config.validate().is_err());
    }
}
