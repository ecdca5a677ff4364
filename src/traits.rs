//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use std::collections::HashMap;

use crate::types::*;

/// Storage abstraction for the journal engine
///
/// This trait allows the engine to work with any storage backend
/// (PostgreSQL, SQLite, in-memory, etc.) by implementing these methods.
/// Every method takes `&self`: implementations provide their own interior
/// synchronization so a single backend can serve concurrent callers.
///
/// There is no method to update an entry's header or lines.
/// The only status change is [`LedgerStorage::mark_validated`], and
/// [`LedgerStorage::delete_draft_entry`] must refuse validated entries.
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    /// Insert the whole catalog atomically.
    ///
    /// Must fail with [`LedgerError::AlreadyInitialized`] and insert nothing
    /// when any account already exists.
    async fn seed_accounts(&self, accounts: &[Account]) -> LedgerResult<()>;

    /// Get an account by code
    async fn get_account(&self, code: &str) -> LedgerResult<Option<Account>>;

    /// List every account, active or not
    async fn list_accounts(&self) -> LedgerResult<Vec<Account>>;

    /// Number of accounts in the chart
    async fn count_accounts(&self) -> LedgerResult<usize>;

    /// Toggle the active flag of an account, returning the updated account
    async fn set_account_active(&self, code: &str, is_active: bool) -> LedgerResult<Account>;

    /// Atomically increment and return the sequence of a journal/year pair.
    ///
    /// Two calls never observe the same value for the same key.
    async fn next_sequence(&self, journal_code: &str, year: i32) -> LedgerResult<u64>;

    /// Persist an entry with all its lines in one atomic step.
    ///
    /// Must fail with [`LedgerError::DuplicateEntryNumber`] if the number is taken,
    /// and with [`LedgerError::AccountNotFound`] or [`LedgerError::InactiveAccount`]
    /// if a line's account is unknown or inactive at the moment of insertion.
    async fn insert_entry(&self, entry: &JournalEntry) -> LedgerResult<()>;

    /// Get an entry by number
    async fn get_entry(&self, number: &str) -> LedgerResult<Option<JournalEntry>>;

    /// List entries matching a filter, in the filter's order
    async fn list_entries(&self, filter: &EntryFilter) -> LedgerResult<Vec<JournalEntry>>;

    /// Compare-and-swap DRAFT to VALIDATED, returning the validated entry
    async fn mark_validated(
        &self,
        number: &str,
        validated_at: NaiveDateTime,
    ) -> LedgerResult<JournalEntry>;

    /// Delete a DRAFT entry and its lines
    async fn delete_draft_entry(&self, number: &str) -> LedgerResult<()>;

    /// Number of entries per status
    async fn count_entries_by_status(&self) -> LedgerResult<HashMap<EntryStatus, usize>>;
}

/// Read access to the chart used by the auto-entry generators
pub trait ChartLookup {
    /// Find an account by code
    fn find(&self, code: &str) -> Option<&Account>;

    /// Resolve an account that must exist and be active
    fn require(&self, code: &str) -> LedgerResult<&Account> {
        match self.find(code) {
            Some(account) if account.is_active => Ok(account),
            _ => Err(LedgerError::MissingAccount(code.to_string())),
        }
    }
}

impl ChartLookup for HashMap<String, Account> {
    fn find(&self, code: &str) -> Option<&Account> {
        self.get(code)
    }
}

/// Trait for implementing custom account validation rules
pub trait AccountValidator: Send + Sync {
    /// Validate an account before it is seeded
    fn validate_account(&self, account: &Account) -> LedgerResult<()>;
}

/// Trait for implementing custom entry validation rules
///
/// Runs after [`check_balance`], which the journal always applies; a
/// validator can only add rules on top of it.
pub trait EntryValidator: Send + Sync {
    /// Validate an entry's header and lines before it is numbered and saved
    fn validate_entry(
        &self,
        header: &EntryHeader,
        lines: &[JournalLine],
        tolerance: &BigDecimal,
    ) -> LedgerResult<()>;
}

/// Default account validator with basic rules
pub struct DefaultAccountValidator;

impl AccountValidator for DefaultAccountValidator {
    fn validate_account(&self, account: &Account) -> LedgerResult<()> {
        if account.code.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Account code cannot be empty".to_string(),
            ));
        }

        if account.name.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Account name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Default entry validator with the double-entry rules
pub struct DefaultEntryValidator;

impl EntryValidator for DefaultEntryValidator {
    fn validate_entry(
        &self,
        _header: &EntryHeader,
        lines: &[JournalLine],
        tolerance: &BigDecimal,
    ) -> LedgerResult<()> {
        check_balance(lines, tolerance)
    }
}

/// Double-entry rules shared by every validator.
///
/// At least two lines, no negative amounts, a non-zero total and
/// `|debits - credits| <= tolerance`.
pub fn check_balance(lines: &[JournalLine], tolerance: &BigDecimal) -> LedgerResult<()> {
    if lines.len() < 2 {
        return Err(LedgerError::InvalidEntry(
            "Entry must have at least two lines for double-entry bookkeeping".to_string(),
        ));
    }

    let zero = BigDecimal::from(0);
    for line in lines {
        if line.debit < zero || line.credit < zero {
            return Err(LedgerError::InvalidEntry(format!(
                "Line on account '{}' has a negative amount",
                line.account_code
            )));
        }
    }

    let (debit, credit) = line_totals(lines);
    if (&debit - &credit).abs() > *tolerance {
        return Err(LedgerError::ImbalancedEntry { debit, credit });
    }

    if debit == zero && credit == zero {
        return Err(LedgerError::InvalidEntry(
            "Entry amounts cannot all be zero".to_string(),
        ));
    }

    Ok(())
}
