//! Income statement: revenue minus expense over a period

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::{account_totals, resolve, StatementLine};
use crate::traits::ChartLookup;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub range: DateRange,
    /// Revenue accounts, amount = credit - debit
    pub revenues: Vec<StatementLine>,
    /// Expense accounts, amount = debit - credit
    pub expenses: Vec<StatementLine>,
    pub total_revenue: BigDecimal,
    pub total_expense: BigDecimal,
    pub net_income: BigDecimal,
}

impl IncomeStatement {
    pub fn build(range: DateRange, entries: &[JournalEntry], chart: &dyn ChartLookup) -> Self {
        let mut revenues = Vec::new();
        let mut expenses = Vec::new();

        for (code, totals) in account_totals(entries) {
            let Some(account) = resolve(chart, &code) else {
                continue;
            };
            match account.account_type {
                AccountType::Revenue => revenues.push(StatementLine {
                    account: account.clone(),
                    amount: -totals.balance(),
                }),
                AccountType::Expense => expenses.push(StatementLine {
                    account: account.clone(),
                    amount: totals.balance(),
                }),
                _ => {}
            }
        }

        let total_revenue: BigDecimal = revenues.iter().map(|l| &l.amount).sum();
        let total_expense: BigDecimal = expenses.iter().map(|l| &l.amount).sum();
        let net_income = &total_revenue - &total_expense;

        Self {
            range,
            revenues,
            expenses,
            total_revenue,
            total_expense,
            net_income,
        }
    }
}

/// Net income of a set of entries, without the per-account breakdown
pub(crate) fn net_income(entries: &[JournalEntry], chart: &dyn ChartLookup) -> BigDecimal {
    IncomeStatement::build(DateRange::all(), entries, chart).net_income
}
