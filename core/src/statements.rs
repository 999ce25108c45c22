//! Statement derivation — income statement, balance sheet and the
//! indirect cash-flow bridge, all from the monthly trial balance.
//!
//! Mapping from accounts to statement lines is fixed by account type
//! plus a small id-keyed classification (cost of sales, financing
//! expense, cash-flow section). Per-account lines are named after the
//! account; subtotals use the constants below.
//!
//! There are no closing entries: revenue and expense balances are
//! cumulative, so a month's income-statement activity is the change in
//! cumulative balance since the prior month end.

use crate::{
    clock::Month,
    coa::{self, Account, AccountType, ChartOfAccounts, NormalSide},
    trial_balance::{balance_index, months_of, TrialBalanceRow},
    types::round2,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Subtotal line names ────────────────────────────────────────────

pub const GROSS_PROFIT: &str = "Gross Profit";
pub const TOTAL_OPERATING_EXPENSES: &str = "Total Operating Expenses";
pub const OPERATING_INCOME: &str = "Operating Income";
pub const NET_INCOME: &str = "Net Income";

pub const TOTAL_ASSETS: &str = "Total Assets";
pub const TOTAL_LIABILITIES: &str = "Total Liabilities";
pub const RETAINED_EARNINGS: &str = "Retained Earnings";
pub const TOTAL_EQUITY: &str = "Total Equity";
pub const TOTAL_LIABILITIES_AND_EQUITY: &str = "Total Liabilities and Equity";

pub const NET_CASH_OPERATING: &str = "Net Cash from Operating Activities";
pub const NET_CASH_INVESTING: &str = "Net Cash from Investing Activities";
pub const NET_CASH_FINANCING: &str = "Net Cash from Financing Activities";
pub const NET_CHANGE_IN_CASH: &str = "Net Change in Cash";
pub const BEGINNING_CASH: &str = "Beginning Cash";
pub const ENDING_CASH: &str = "Ending Cash";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    IncomeStatement,
    BalanceSheet,
    CashFlow,
}

impl Statement {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::IncomeStatement => "statements_is_monthly.csv",
            Self::BalanceSheet => "statements_bs_monthly.csv",
            Self::CashFlow => "statements_cf_monthly.csv",
        }
    }
}

/// One row of a `statements_*_monthly.csv` file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatementLine {
    pub month: Month,
    pub line: String,
    #[serde(with = "crate::store::money")]
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statements {
    pub income_statement: Vec<StatementLine>,
    pub balance_sheet: Vec<StatementLine>,
    pub cash_flow: Vec<StatementLine>,
}

impl Statements {
    pub fn lines(&self, statement: Statement) -> &[StatementLine] {
        match statement {
            Statement::IncomeStatement => &self.income_statement,
            Statement::BalanceSheet => &self.balance_sheet,
            Statement::CashFlow => &self.cash_flow,
        }
    }

    /// Amount of a named line for one month, if present.
    pub fn value(&self, statement: Statement, month: Month, line: &str) -> Option<f64> {
        self.lines(statement)
            .iter()
            .find(|l| l.month == month && l.line == line)
            .map(|l| l.amount)
    }
}

// ── Classification ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExpenseClass {
    CostOfSales,
    Operating,
    Financing,
}

fn expense_class(account: &Account) -> ExpenseClass {
    match account.account_id.as_str() {
        coa::COST_OF_GOODS_SOLD => ExpenseClass::CostOfSales,
        coa::INTEREST_EXPENSE => ExpenseClass::Financing,
        _ => ExpenseClass::Operating,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CashFlowRole {
    Cash,
    NonCashAddBack,
    Operating,
    Investing,
    Financing,
}

fn cash_flow_role(account: &Account) -> Option<CashFlowRole> {
    let role = match account.account_id.as_str() {
        coa::CASH => CashFlowRole::Cash,
        coa::ACCUMULATED_DEPRECIATION => CashFlowRole::NonCashAddBack,
        coa::EQUIPMENT => CashFlowRole::Investing,
        coa::NOTES_PAYABLE => CashFlowRole::Financing,
        _ => match account.account_type {
            AccountType::Asset | AccountType::Liability => CashFlowRole::Operating,
            AccountType::Equity => CashFlowRole::Financing,
            AccountType::Revenue | AccountType::Expense => return None,
        },
    };
    Some(role)
}

fn cash_flow_line_name(account: &Account) -> String {
    match account.account_id.as_str() {
        coa::ACCUMULATED_DEPRECIATION => "Depreciation".into(),
        coa::EQUIPMENT => "Capital Expenditures".into(),
        coa::NOTES_PAYABLE => "Net Borrowings".into(),
        coa::OWNER_CAPITAL => "Owner Contributions".into(),
        coa::OWNER_DRAWS => "Owner Draws".into(),
        _ => format!("Change in {}", account.account_name),
    }
}

/// Balance presented with credits positive: liabilities and equity as
/// they appear on the balance sheet, contra-equity negative.
fn credit_presented(account: &Account, normal_balance: f64) -> f64 {
    match account.normal_side {
        NormalSide::Credit => normal_balance,
        NormalSide::Debit => -normal_balance,
    }
}

// ── Derivation ─────────────────────────────────────────────────────

struct MonthView<'a> {
    index: &'a HashMap<(Month, &'a str), f64>,
    month: Month,
    prior: Option<Month>,
}

impl MonthView<'_> {
    fn ending(&self, account: &Account) -> f64 {
        self.index
            .get(&(self.month, account.account_id.as_str()))
            .copied()
            .unwrap_or(0.0)
    }

    fn beginning(&self, account: &Account) -> f64 {
        self.prior
            .and_then(|p| self.index.get(&(p, account.account_id.as_str())).copied())
            .unwrap_or(0.0)
    }

    fn activity(&self, account: &Account) -> f64 {
        self.ending(account) - self.beginning(account)
    }
}

/// Derive all three statements for every month in the trial balance.
pub fn derive_statements(trial_balance: &[TrialBalanceRow], coa: &ChartOfAccounts) -> Statements {
    let index = balance_index(trial_balance);
    let months = months_of(trial_balance);
    let mut out = Statements::default();

    for (i, &month) in months.iter().enumerate() {
        let view = MonthView {
            index: &index,
            month,
            prior: i.checked_sub(1).map(|p| months[p]),
        };
        let net_income = income_statement(&view, coa, &mut out.income_statement);
        balance_sheet(&view, coa, &mut out.balance_sheet);
        cash_flow(&view, coa, net_income, &mut out.cash_flow);
    }
    out
}

fn push(out: &mut Vec<StatementLine>, month: Month, line: &str, amount: f64) {
    out.push(StatementLine {
        month,
        line: line.to_string(),
        amount: round2(amount),
    });
}

/// Appends one month's income statement; returns unrounded net income.
fn income_statement(view: &MonthView, coa: &ChartOfAccounts, out: &mut Vec<StatementLine>) -> f64 {
    let month = view.month;
    let expenses: Vec<&Account> = coa
        .iter()
        .filter(|a| a.account_type == AccountType::Expense)
        .collect();

    let mut revenue = 0.0;
    for account in coa.iter().filter(|a| a.account_type == AccountType::Revenue) {
        let amount = view.activity(account);
        revenue += amount;
        push(out, month, &account.account_name, amount);
    }

    let mut cost_of_sales = 0.0;
    for account in expenses.iter().filter(|a| expense_class(a) == ExpenseClass::CostOfSales) {
        let amount = view.activity(account);
        cost_of_sales += amount;
        push(out, month, &account.account_name, amount);
    }
    let gross_profit = revenue - cost_of_sales;
    push(out, month, GROSS_PROFIT, gross_profit);

    let mut operating = 0.0;
    for account in expenses.iter().filter(|a| expense_class(a) == ExpenseClass::Operating) {
        let amount = view.activity(account);
        operating += amount;
        push(out, month, &account.account_name, amount);
    }
    push(out, month, TOTAL_OPERATING_EXPENSES, operating);
    let operating_income = gross_profit - operating;
    push(out, month, OPERATING_INCOME, operating_income);

    let mut financing = 0.0;
    for account in expenses.iter().filter(|a| expense_class(a) == ExpenseClass::Financing) {
        let amount = view.activity(account);
        financing += amount;
        push(out, month, &account.account_name, amount);
    }
    let net_income = operating_income - financing;
    push(out, month, NET_INCOME, net_income);
    net_income
}

fn balance_sheet(view: &MonthView, coa: &ChartOfAccounts, out: &mut Vec<StatementLine>) {
    let month = view.month;

    let mut assets = 0.0;
    for account in coa.iter().filter(|a| a.account_type == AccountType::Asset) {
        let amount = account.debit_balance(view.ending(account));
        assets += amount;
        push(out, month, &account.account_name, amount);
    }
    push(out, month, TOTAL_ASSETS, assets);

    let mut liabilities = 0.0;
    for account in coa.iter().filter(|a| a.account_type == AccountType::Liability) {
        let amount = credit_presented(account, view.ending(account));
        liabilities += amount;
        push(out, month, &account.account_name, amount);
    }
    push(out, month, TOTAL_LIABILITIES, liabilities);

    let mut equity = 0.0;
    for account in coa.iter().filter(|a| a.account_type == AccountType::Equity) {
        let amount = credit_presented(account, view.ending(account));
        equity += amount;
        push(out, month, &account.account_name, amount);
    }
    let retained: f64 = coa
        .iter()
        .map(|a| match a.account_type {
            AccountType::Revenue => view.ending(a),
            AccountType::Expense => -view.ending(a),
            _ => 0.0,
        })
        .sum();
    equity += retained;
    push(out, month, RETAINED_EARNINGS, retained);
    push(out, month, TOTAL_EQUITY, equity);
    push(out, month, TOTAL_LIABILITIES_AND_EQUITY, liabilities + equity);
}

fn cash_flow(view: &MonthView, coa: &ChartOfAccounts, net_income: f64, out: &mut Vec<StatementLine>) {
    let month = view.month;
    let roles: Vec<(&Account, CashFlowRole)> = coa
        .iter()
        .filter_map(|a| cash_flow_role(a).map(|r| (a, r)))
        .collect();

    // Cash effect of a non-cash balance-sheet account: −Δ(debit balance).
    let effect = |account: &Account| -account.debit_balance(view.activity(account));

    let section = |wanted: &[CashFlowRole], out: &mut Vec<StatementLine>| -> f64 {
        let mut total = 0.0;
        for (account, _) in roles.iter().filter(|(_, r)| wanted.contains(r)) {
            let amount = effect(*account);
            total += amount;
            push(out, month, &cash_flow_line_name(account), amount);
        }
        total
    };

    push(out, month, NET_INCOME, net_income);
    let operating = net_income
        + section(&[CashFlowRole::NonCashAddBack], out)
        + section(&[CashFlowRole::Operating], out);
    push(out, month, NET_CASH_OPERATING, operating);

    let investing = section(&[CashFlowRole::Investing], out);
    push(out, month, NET_CASH_INVESTING, investing);

    let financing = section(&[CashFlowRole::Financing], out);
    push(out, month, NET_CASH_FINANCING, financing);

    let net_change = operating + investing + financing;
    let beginning_cash: f64 = roles
        .iter()
        .filter(|(_, r)| *r == CashFlowRole::Cash)
        .map(|(a, _)| a.debit_balance(view.beginning(a)))
        .sum();
    push(out, month, NET_CHANGE_IN_CASH, net_change);
    push(out, month, BEGINNING_CASH, beginning_cash);
    push(out, month, ENDING_CASH, beginning_cash + net_change);
}

/// Cash per balance sheet: the sum of all cash-role accounts.
pub fn balance_sheet_cash(statements: &Statements, coa: &ChartOfAccounts, month: Month) -> f64 {
    coa.iter()
        .filter(|a| cash_flow_role(a) == Some(CashFlowRole::Cash))
        .filter_map(|a| statements.value(Statement::BalanceSheet, month, &a.account_name))
        .sum()
}
