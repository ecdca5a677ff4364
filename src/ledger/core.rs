//! Main ledger orchestrator that coordinates the chart, the journal and the reports

use serde::{Deserialize, Serialize};

use crate::config::LedgerConfig;
use crate::events::*;
use crate::ledger::generators::{self, PostingContext};
use crate::ledger::journal::inherit_line_labels;
use crate::ledger::{AccountManager, JournalManager};
use crate::reports::*;
use crate::traits::*;
use crate::types::*;

/// Main ledger system that orchestrates all accounting operations
///
/// Every method takes `&self`; wrap the ledger in an `Arc` to share it
/// between concurrent tasks.
pub struct Ledger<S: LedgerStorage> {
    config: LedgerConfig,
    account_manager: AccountManager<S>,
    journal_manager: JournalManager<S>,
    report_engine: ReportEngine<S>,
}

impl<S: LedgerStorage + Clone> Ledger<S> {
    /// Create a new ledger with the default configuration
    pub fn new(storage: S) -> Self {
        Self::build(
            storage,
            LedgerConfig::default(),
            Box::new(DefaultAccountValidator),
            Box::new(DefaultEntryValidator),
        )
    }

    /// Create a new ledger with an injected configuration
    pub fn with_config(storage: S, config: LedgerConfig) -> LedgerResult<Self> {
        config.validate()?;
        Ok(Self::build(
            storage,
            config,
            Box::new(DefaultAccountValidator),
            Box::new(DefaultEntryValidator),
        ))
    }

    /// Create a new ledger with custom validators
    pub fn with_validators(
        storage: S,
        config: LedgerConfig,
        account_validator: Box<dyn AccountValidator>,
        entry_validator: Box<dyn EntryValidator>,
    ) -> LedgerResult<Self> {
        config.validate()?;
        Ok(Self::build(storage, config, account_validator, entry_validator))
    }

    fn build(
        storage: S,
        config: LedgerConfig,
        account_validator: Box<dyn AccountValidator>,
        entry_validator: Box<dyn EntryValidator>,
    ) -> Self {
        Self {
            account_manager: AccountManager::with_validator(storage.clone(), account_validator),
            journal_manager: JournalManager::with_validator(
                storage.clone(),
                config.balance_tolerance.clone(),
                entry_validator,
            ),
            report_engine: ReportEngine::new(
                storage,
                config.accounts.period_result.clone(),
                config.balance_tolerance.clone(),
            ),
            config,
        }
    }
}

impl<S: LedgerStorage> Ledger<S> {
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // Chart of accounts
    /// Seed the configured chart; fails if any account already exists
    pub async fn initialize_chart(&self) -> LedgerResult<Vec<Account>> {
        self.account_manager.initialize(&self.config.chart).await
    }

    /// Active accounts matching the filter, ordered by code
    pub async fn list_accounts(&self, filter: &AccountFilter) -> LedgerResult<Vec<Account>> {
        self.account_manager.list(filter).await
    }

    /// Get an account by code
    pub async fn find_account(&self, code: &str) -> LedgerResult<Option<Account>> {
        self.account_manager.find_by_code(code).await
    }

    /// Deactivate an account
    pub async fn deactivate_account(&self, code: &str) -> LedgerResult<Account> {
        self.account_manager.deactivate(code).await
    }

    // Journal entries
    /// Record a manually built entry as DRAFT.
    ///
    /// Lines without a label take the entry label.
    pub async fn create_manual_entry(
        &self,
        header: EntryHeader,
        mut lines: Vec<JournalLine>,
    ) -> LedgerResult<JournalEntry> {
        inherit_line_labels(&header, &mut lines);
        self.journal_manager.create_entry(header, lines).await
    }

    /// Move a DRAFT entry to VALIDATED; validating twice is an error
    pub async fn validate_entry(&self, number: &str) -> LedgerResult<JournalEntry> {
        self.journal_manager.validate_entry(number).await
    }

    /// List entries with their lines
    pub async fn list_entries(&self, filter: &EntryFilter) -> LedgerResult<Vec<JournalEntry>> {
        self.journal_manager.list_entries(filter).await
    }

    /// Get an entry by number
    pub async fn get_entry(&self, number: &str) -> LedgerResult<Option<JournalEntry>> {
        self.journal_manager.get_entry(number).await
    }

    /// Delete a DRAFT entry; validated entries are locked
    pub async fn delete_draft_entry(&self, number: &str) -> LedgerResult<()> {
        self.journal_manager.delete_draft_entry(number).await
    }

    /// Allocate the next entry number for a journal code and year.
    ///
    /// The number is consumed even if no entry is ever created with it, so
    /// the next entry of that journal and year skips it.
    pub async fn allocate_entry_number(&self, journal_code: &str, year: i32) -> LedgerResult<String> {
        self.journal_manager.allocator().allocate(journal_code, year).await
    }

    // Auto-generated entries
    /// Sale invoice: receivable / sales + VAT collected
    pub async fn generate_sale_invoice_entry(
        &self,
        event: &SaleInvoiceEvent,
    ) -> LedgerResult<JournalEntry> {
        let draft = self
            .draft_from(|ctx| generators::sale_invoice(event, ctx))
            .await?;
        self.post_generated(draft).await
    }

    /// Purchase invoice: purchases + VAT deductible / supplier payable
    pub async fn generate_purchase_invoice_entry(
        &self,
        event: &PurchaseInvoiceEvent,
    ) -> LedgerResult<JournalEntry> {
        let draft = self
            .draft_from(|ctx| generators::purchase_invoice(event, ctx))
            .await?;
        self.post_generated(draft).await
    }

    /// Customer payment: bank or cash / receivable
    pub async fn generate_payment_received_entry(
        &self,
        event: &PaymentEvent,
    ) -> LedgerResult<JournalEntry> {
        let draft = self
            .draft_from(|ctx| generators::payment_received(event, ctx))
            .await?;
        self.post_generated(draft).await
    }

    /// Supplier payment: supplier payable / bank or cash
    pub async fn generate_payment_made_entry(
        &self,
        event: &PaymentEvent,
    ) -> LedgerResult<JournalEntry> {
        let draft = self
            .draft_from(|ctx| generators::payment_made(event, ctx))
            .await?;
        self.post_generated(draft).await
    }

    /// Delivered order: cost of goods sold / inventory.
    ///
    /// `Ok(None)` when the order is undelivered or has no known cost.
    pub async fn generate_stock_movement_entry(
        &self,
        event: &StockMovementEvent,
    ) -> LedgerResult<Option<JournalEntry>> {
        let draft = self
            .draft_from(|ctx| generators::stock_movement(event, ctx))
            .await?;
        match draft {
            Some(draft) => self.post_generated(draft).await.map(Some),
            None => {
                tracing::debug!(order = %event.order_number, "no stock movement entry to generate");
                Ok(None)
            }
        }
    }

    /// Run a generator against a snapshot of the chart
    async fn draft_from<T>(
        &self,
        generate: impl FnOnce(&PostingContext<'_>) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let chart = self.account_manager.snapshot().await?;
        let ctx = PostingContext {
            accounts: &self.config.accounts,
            chart: &chart,
            tolerance: &self.config.balance_tolerance,
        };
        generate(&ctx).inspect_err(|err| {
            tracing::warn!(error = %err, "auto-entry generation rejected");
        })
    }

    /// Persist a generated draft; an account that vanished since the
    /// snapshot is still reported as a missing account
    async fn post_generated(&self, draft: EntryDraft) -> LedgerResult<JournalEntry> {
        self.journal_manager
            .create_entry(draft.header, draft.lines)
            .await
            .map_err(|err| match err {
                LedgerError::AccountNotFound(code) | LedgerError::InactiveAccount(code) => {
                    LedgerError::MissingAccount(code)
                }
                other => other,
            })
    }

    // Reports
    pub async fn get_general_ledger(&self, filter: &ReportFilter) -> LedgerResult<GeneralLedger> {
        self.report_engine.general_ledger(filter).await
    }

    pub async fn get_trial_balance(&self, filter: &ReportFilter) -> LedgerResult<TrialBalance> {
        self.report_engine.trial_balance(filter).await
    }

    pub async fn get_income_statement(&self, filter: &ReportFilter) -> LedgerResult<IncomeStatement> {
        self.report_engine.income_statement(filter).await
    }

    pub async fn get_balance_sheet(&self, filter: &ReportFilter) -> LedgerResult<BalanceSheet> {
        self.report_engine.balance_sheet(filter).await
    }

    pub async fn get_accounting_stats(&self, filter: &ReportFilter) -> LedgerResult<AccountingStats> {
        self.report_engine.stats(filter).await
    }

    /// Validate the integrity of the ledger over a period
    pub async fn validate_integrity(&self, filter: &ReportFilter) -> LedgerResult<LedgerIntegrityReport> {
        let trial_balance = self.get_trial_balance(filter).await?;
        let balance_sheet = self.get_balance_sheet(filter).await?;

        let mut issues = Vec::new();

        if !trial_balance.is_balanced {
            issues.push(format!(
                "Trial balance is not balanced: debits = {}, credits = {}",
                trial_balance.total_debit, trial_balance.total_credit
            ));
        }

        if !balance_sheet.is_balanced {
            issues.push(format!(
                "Balance sheet is not balanced: assets = {}, liabilities + equity = {}",
                balance_sheet.total_assets, balance_sheet.total_liabilities_and_equity
            ));
        }

        if !issues.is_empty() {
            tracing::warn!(issues = issues.len(), "ledger integrity check failed");
        }

        Ok(LedgerIntegrityReport {
            range: filter.range,
            is_valid: issues.is_empty(),
            issues,
            trial_balance_total_debit: trial_balance.total_debit,
            trial_balance_total_credit: trial_balance.total_credit,
            balance_sheet_total_assets: balance_sheet.total_assets,
            balance_sheet_total_liabilities_equity: balance_sheet.total_liabilities_and_equity,
        })
    }
}

/// Report on ledger integrity and validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerIntegrityReport {
    pub range: DateRange,
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub trial_balance_total_debit: bigdecimal::BigDecimal,
    pub trial_balance_total_credit: bigdecimal::BigDecimal,
    pub balance_sheet_total_assets: bigdecimal::BigDecimal,
    pub balance_sheet_total_liabilities_equity: bigdecimal::BigDecimal,
}
