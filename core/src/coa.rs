//! Chart of accounts — the fixed schema of valid accounts.
//!
//! Created once at run start and immutable afterwards.

use crate::{
    error::{LedgerError, LedgerResult},
    types::AccountId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Account ids of the standard chart ────────────────────────────

pub const CASH: &str = "1000";
pub const ACCOUNTS_RECEIVABLE: &str = "1100";
pub const INVENTORY: &str = "1200";
pub const EQUIPMENT: &str = "1500";
pub const ACCUMULATED_DEPRECIATION: &str = "1550";
pub const ACCOUNTS_PAYABLE: &str = "2000";
pub const SALES_TAX_PAYABLE: &str = "2100";
pub const WAGES_PAYABLE: &str = "2110";
pub const PAYROLL_TAXES_PAYABLE: &str = "2120";
pub const NOTES_PAYABLE: &str = "2200";
pub const OWNER_CAPITAL: &str = "3000";
pub const OWNER_DRAWS: &str = "3100";
pub const SALES_REVENUE: &str = "4000";
pub const COST_OF_GOODS_SOLD: &str = "5000";
pub const WAGES_EXPENSE: &str = "6000";
pub const PAYROLL_TAX_EXPENSE: &str = "6010";
pub const RENT_EXPENSE: &str = "6100";
pub const UTILITIES_EXPENSE: &str = "6200";
pub const DEPRECIATION_EXPENSE: &str = "6300";
pub const INTEREST_EXPENSE: &str = "7000";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NormalSide {
    Debit,
    Credit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub account_id: AccountId,
    pub account_name: String,
    pub account_type: AccountType,
    pub normal_side: NormalSide,
}

impl Account {
    pub fn new(
        account_id: &str,
        account_name: &str,
        account_type: AccountType,
        normal_side: NormalSide,
    ) -> Self {
        Self {
            account_id: account_id.to_string(),
            account_name: account_name.to_string(),
            account_type,
            normal_side,
        }
    }

    /// Balance on the account's normal side.
    pub fn signed_balance(&self, debits: f64, credits: f64) -> f64 {
        match self.normal_side {
            NormalSide::Debit => debits - credits,
            NormalSide::Credit => credits - debits,
        }
    }

    /// Balance expressed as a debit balance (debits − credits),
    /// whatever the normal side. Used for asset totals with contra accounts.
    pub fn debit_balance(&self, normal_balance: f64) -> f64 {
        match self.normal_side {
            NormalSide::Debit => normal_balance,
            NormalSide::Credit => -normal_balance,
        }
    }
}

/// Ordered, immutable set of accounts keyed by `account_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOfAccounts {
    accounts: Vec<Account>,
    index: HashMap<AccountId, usize>,
}

impl ChartOfAccounts {
    pub fn new(accounts: Vec<Account>) -> LedgerResult<Self> {
        let mut index = HashMap::with_capacity(accounts.len());
        for (i, account) in accounts.iter().enumerate() {
            if index.insert(account.account_id.clone(), i).is_some() {
                return Err(LedgerError::DuplicateAccount {
                    account_id: account.account_id.clone(),
                });
            }
        }
        Ok(Self { accounts, index })
    }

    /// The fixed chart used by the generator.
    pub fn standard() -> Self {
        use AccountType::*;
        use NormalSide::*;
        let accounts = vec![
            Account::new(CASH, "Cash", Asset, Debit),
            Account::new(ACCOUNTS_RECEIVABLE, "Accounts Receivable", Asset, Debit),
            Account::new(INVENTORY, "Inventory", Asset, Debit),
            Account::new(EQUIPMENT, "Equipment", Asset, Debit),
            Account::new(ACCUMULATED_DEPRECIATION, "Accumulated Depreciation", Asset, Credit),
            Account::new(ACCOUNTS_PAYABLE, "Accounts Payable", Liability, Credit),
            Account::new(SALES_TAX_PAYABLE, "Sales Tax Payable", Liability, Credit),
            Account::new(WAGES_PAYABLE, "Wages Payable", Liability, Credit),
            Account::new(PAYROLL_TAXES_PAYABLE, "Payroll Taxes Payable", Liability, Credit),
            Account::new(NOTES_PAYABLE, "Notes Payable", Liability, Credit),
            Account::new(OWNER_CAPITAL, "Owner Capital", Equity, Credit),
            Account::new(OWNER_DRAWS, "Owner Draws", Equity, Debit),
            Account::new(SALES_REVENUE, "Sales Revenue", Revenue, Credit),
            Account::new(COST_OF_GOODS_SOLD, "Cost of Goods Sold", Expense, Debit),
            Account::new(WAGES_EXPENSE, "Wages Expense", Expense, Debit),
            Account::new(PAYROLL_TAX_EXPENSE, "Payroll Tax Expense", Expense, Debit),
            Account::new(RENT_EXPENSE, "Rent Expense", Expense, Debit),
            Account::new(UTILITIES_EXPENSE, "Utilities Expense", Expense, Debit),
            Account::new(DEPRECIATION_EXPENSE, "Depreciation Expense", Expense, Debit),
            Account::new(INTEREST_EXPENSE, "Interest Expense", Expense, Debit),
        ];
        Self::new(accounts).unwrap_or_else(|_| unreachable!("standard chart has unique ids"))
    }

    pub fn get(&self, account_id: &str) -> Option<&Account> {
        self.index.get(account_id).map(|&i| &self.accounts[i])
    }

    pub fn require(&self, account_id: &str) -> LedgerResult<&Account> {
        self.get(account_id).ok_or_else(|| LedgerError::UnknownAccount {
            account_id: account_id.to_string(),
        })
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
