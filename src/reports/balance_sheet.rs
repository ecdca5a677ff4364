//! Balance sheet: assets against liabilities and equity

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::income_statement::net_income;
use super::{account_totals, resolve, totals_agree, StatementLine};
use crate::traits::ChartLookup;
use crate::types::*;

const PERIOD_RESULT_NAME: &str = "Résultat de l'exercice";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub range: DateRange,
    /// Asset accounts, amount = debit - credit
    pub assets: Vec<StatementLine>,
    /// Liability accounts, amount = credit - debit.
    ///
    /// Signed rather than absolute: an abnormal debit balance (an overpaid
    /// supplier) shows as a negative liability so assets still equal
    /// liabilities plus equity.
    pub liabilities: Vec<StatementLine>,
    /// Equity accounts, amount = credit - debit, plus the period result
    pub equity: Vec<StatementLine>,
    pub total_assets: BigDecimal,
    pub total_liabilities: BigDecimal,
    pub total_equity: BigDecimal,
    pub total_liabilities_and_equity: BigDecimal,
    pub is_balanced: bool,
}

impl BalanceSheet {
    /// Build the sheet; the net income of the same entries is added to the
    /// `period_result_code` equity line so the two sides agree within the
    /// per-entry `tolerance`.
    pub fn build(
        range: DateRange,
        entries: &[JournalEntry],
        chart: &dyn ChartLookup,
        period_result_code: &str,
        tolerance: &BigDecimal,
    ) -> Self {
        let mut assets = Vec::new();
        let mut liabilities = Vec::new();
        let mut equity = Vec::new();

        for (code, totals) in account_totals(entries) {
            let Some(account) = resolve(chart, &code) else {
                continue;
            };
            let line = |amount| StatementLine {
                account: account.clone(),
                amount,
            };
            match account.account_type {
                AccountType::Asset => assets.push(line(totals.balance())),
                AccountType::Liability => liabilities.push(line(-totals.balance())),
                AccountType::Equity => equity.push(line(-totals.balance())),
                AccountType::Revenue | AccountType::Expense => {}
            }
        }

        let result = net_income(entries, chart);
        if result != BigDecimal::from(0) {
            match equity.iter_mut().find(|l| l.account.code == period_result_code) {
                Some(existing) => existing.amount += result,
                None => {
                    let account = chart.find(period_result_code).cloned().unwrap_or_else(|| {
                        Account::new(period_result_code, PERIOD_RESULT_NAME, AccountType::Equity)
                    });
                    equity.push(StatementLine {
                        account,
                        amount: result,
                    });
                    equity.sort_by(|a, b| a.account.code.cmp(&b.account.code));
                }
            }
        }

        let total_assets: BigDecimal = assets.iter().map(|l| &l.amount).sum();
        let total_liabilities: BigDecimal = liabilities.iter().map(|l| &l.amount).sum();
        let total_equity: BigDecimal = equity.iter().map(|l| &l.amount).sum();
        let total_liabilities_and_equity = &total_liabilities + &total_equity;
        let is_balanced = totals_agree(
            &total_assets,
            &total_liabilities_and_equity,
            tolerance,
            entries.len(),
        );

        Self {
            range,
            assets,
            liabilities,
            equity,
            total_assets,
            total_liabilities,
            total_equity,
            total_liabilities_and_equity,
            is_balanced,
        }
    }
}
