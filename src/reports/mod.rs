//! Financial reporting over validated journal entries
//!
//! Reports only ever see VALIDATED entries. An empty or malformed date range
//! yields an empty report, and a period without entries yields all-zero
//! aggregates; neither is an error.

pub mod balance_sheet;
pub mod general_ledger;
pub mod income_statement;
pub mod stats;
pub mod trial_balance;

pub use balance_sheet::*;
pub use general_ledger::*;
pub use income_statement::*;
pub use stats::*;
pub use trial_balance::*;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ledger::account::ChartSnapshot;
use crate::traits::*;
use crate::types::*;

/// Criteria shared by all reports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilter {
    pub range: DateRange,
    /// Account code prefix, honoured by the general ledger ("411" matches "411000", "411001", ...)
    pub account_prefix: Option<String>,
}

impl ReportFilter {
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            account_prefix: None,
        }
    }

    /// Build a filter from raw `YYYY-MM-DD` bounds; malformed bounds give an empty range
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Self {
        Self::new(DateRange::parse(start, end))
    }

    pub fn account_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.account_prefix = Some(prefix.into());
        self
    }
}

/// Account with a signed or presented amount, used by the statements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    pub account: Account,
    pub amount: BigDecimal,
}

/// Debit and credit totals of one account
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct AccountTotals {
    pub debit: BigDecimal,
    pub credit: BigDecimal,
}

impl AccountTotals {
    /// `debit - credit`
    pub fn balance(&self) -> BigDecimal {
        &self.debit - &self.credit
    }
}

/// Sum debits and credits per account code, ordered by code
pub(crate) fn account_totals(entries: &[JournalEntry]) -> BTreeMap<String, AccountTotals> {
    let mut totals: BTreeMap<String, AccountTotals> = BTreeMap::new();
    for line in entries.iter().flat_map(|e| &e.lines) {
        let slot = totals.entry(line.account_code.clone()).or_default();
        slot.debit += &line.debit;
        slot.credit += &line.credit;
    }
    totals
}

/// Whether two report totals agree.
///
/// Each accepted entry may be off by up to `tolerance`, so totals over
/// `entry_count` entries may drift by at most `tolerance × entry_count`.
pub(crate) fn totals_agree(
    left: &BigDecimal,
    right: &BigDecimal,
    tolerance: &BigDecimal,
    entry_count: usize,
) -> bool {
    (left - right).abs() <= tolerance * BigDecimal::from(entry_count as u64)
}

/// Resolve an account for reporting, logging lines whose account is unknown
pub(crate) fn resolve<'a>(chart: &'a dyn ChartLookup, code: &str) -> Option<&'a Account> {
    let account = chart.find(code);
    if account.is_none() {
        tracing::warn!(code, "skipping lines posted to an account missing from the chart");
    }
    account
}

/// Read-only report engine over a storage backend
pub struct ReportEngine<S: LedgerStorage> {
    storage: S,
    period_result_code: String,
    tolerance: BigDecimal,
}

impl<S: LedgerStorage> ReportEngine<S> {
    /// `period_result_code` is the equity account the balance sheet reports net income on,
    /// `tolerance` the per-entry imbalance the journal accepts
    pub fn new(storage: S, period_result_code: impl Into<String>, tolerance: BigDecimal) -> Self {
        Self {
            storage,
            period_result_code: period_result_code.into(),
            tolerance,
        }
    }

    /// Validated entries in range, oldest first, and the chart they post to
    async fn load(&self, range: DateRange) -> LedgerResult<(Vec<JournalEntry>, ChartSnapshot)> {
        if range.is_empty() {
            return Ok((Vec::new(), ChartSnapshot::default()));
        }

        let entries = self
            .storage
            .list_entries(&EntryFilter::validated_in(range))
            .await?;
        let chart = ChartSnapshot::from_accounts(self.storage.list_accounts().await?);
        Ok((entries, chart))
    }

    pub async fn general_ledger(&self, filter: &ReportFilter) -> LedgerResult<GeneralLedger> {
        let (entries, chart) = self.load(filter.range).await?;
        let report = GeneralLedger::build(
            filter.range,
            filter.account_prefix.as_deref(),
            &entries,
            &chart,
        );
        tracing::debug!(entries = entries.len(), accounts = report.accounts.len(), "general ledger generated");
        Ok(report)
    }

    pub async fn trial_balance(&self, filter: &ReportFilter) -> LedgerResult<TrialBalance> {
        let (entries, chart) = self.load(filter.range).await?;
        let report = TrialBalance::build(filter.range, &entries, &chart, &self.tolerance);
        tracing::debug!(entries = entries.len(), accounts = report.rows.len(), "trial balance generated");
        Ok(report)
    }

    pub async fn income_statement(&self, filter: &ReportFilter) -> LedgerResult<IncomeStatement> {
        let (entries, chart) = self.load(filter.range).await?;
        let report = IncomeStatement::build(filter.range, &entries, &chart);
        tracing::debug!(entries = entries.len(), net_income = %report.net_income, "income statement generated");
        Ok(report)
    }

    pub async fn balance_sheet(&self, filter: &ReportFilter) -> LedgerResult<BalanceSheet> {
        let (entries, chart) = self.load(filter.range).await?;
        let report = BalanceSheet::build(
            filter.range,
            &entries,
            &chart,
            &self.period_result_code,
            &self.tolerance,
        );
        tracing::debug!(entries = entries.len(), total_assets = %report.total_assets, "balance sheet generated");
        Ok(report)
    }

    pub async fn stats(&self, filter: &ReportFilter) -> LedgerResult<AccountingStats> {
        let (entries, chart) = self.load(filter.range).await?;
        let by_status = self.storage.count_entries_by_status().await?;
        Ok(AccountingStats::build(filter.range, &entries, &chart, by_status))
    }
}
