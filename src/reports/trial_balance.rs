//! Trial balance: per-account debit and credit totals

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::{account_totals, resolve, totals_agree};
use crate::traits::ChartLookup;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    pub account: Account,
    pub total_debit: BigDecimal,
    pub total_credit: BigDecimal,
    /// `total_debit - total_credit`
    pub balance: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalance {
    pub range: DateRange,
    /// Ordered by account code
    pub rows: Vec<TrialBalanceRow>,
    pub total_debit: BigDecimal,
    pub total_credit: BigDecimal,
    pub is_balanced: bool,
}

impl TrialBalance {
    /// `tolerance` is the per-entry imbalance accepted at creation
    pub fn build(
        range: DateRange,
        entries: &[JournalEntry],
        chart: &dyn ChartLookup,
        tolerance: &BigDecimal,
    ) -> Self {
        let rows: Vec<TrialBalanceRow> = account_totals(entries)
            .into_iter()
            .filter_map(|(code, totals)| {
                let account = resolve(chart, &code)?.clone();
                Some(TrialBalanceRow {
                    account,
                    balance: totals.balance(),
                    total_debit: totals.debit,
                    total_credit: totals.credit,
                })
            })
            .collect();

        let total_debit: BigDecimal = rows.iter().map(|r| &r.total_debit).sum();
        let total_credit: BigDecimal = rows.iter().map(|r| &r.total_credit).sum();
        let is_balanced = totals_agree(&total_debit, &total_credit, tolerance, entries.len());

        Self {
            range,
            rows,
            total_debit,
            total_credit,
            is_balanced,
        }
    }

    pub fn row(&self, code: &str) -> Option<&TrialBalanceRow> {
        self.rows.iter().find(|r| r.account.code == code)
    }
}
