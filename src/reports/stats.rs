//! Accounting dashboard figures

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::income_statement::IncomeStatement;
use crate::traits::ChartLookup;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountingStats {
    pub range: DateRange,
    pub total_revenue: BigDecimal,
    pub total_expense: BigDecimal,
    pub net_income: BigDecimal,
    pub total_debit: BigDecimal,
    pub total_credit: BigDecimal,
    /// Validated entries in range
    pub total_entries: usize,
    /// Validated entries in range, per journal
    pub entries_by_journal: BTreeMap<Journal, usize>,
    /// All entries regardless of range, per status
    pub entries_by_status: BTreeMap<EntryStatus, usize>,
}

impl AccountingStats {
    pub fn build(
        range: DateRange,
        entries: &[JournalEntry],
        chart: &dyn ChartLookup,
        entries_by_status: HashMap<EntryStatus, usize>,
    ) -> Self {
        let income = IncomeStatement::build(range, entries, chart);

        let mut total_debit = BigDecimal::from(0);
        let mut total_credit = BigDecimal::from(0);
        let mut entries_by_journal = BTreeMap::new();
        for entry in entries {
            let (debit, credit) = line_totals(&entry.lines);
            total_debit += debit;
            total_credit += credit;
            *entries_by_journal.entry(entry.journal).or_insert(0) += 1;
        }

        Self {
            range,
            total_revenue: income.total_revenue,
            total_expense: income.total_expense,
            net_income: income.net_income,
            total_debit,
            total_credit,
            total_entries: entries.len(),
            entries_by_journal,
            entries_by_status: entries_by_status.into_iter().collect(),
        }
    }
}
