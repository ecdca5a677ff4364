//! Core types and data structures for the journal engine

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account types following standard accounting principles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// Assets - what the business owns (Bank, Receivables, Inventory, etc.)
    Asset,
    /// Liabilities - what the business owes (Payables, VAT collected, Loans, etc.)
    Liability,
    /// Equity - owner's interest in the business (Capital, Reserves, Result)
    Equity,
    /// Revenue - sales and other income earned by the business
    Revenue,
    /// Expenses - purchases and costs incurred by the business
    Expense,
}

impl AccountType {
    /// Whether accounts of this type appear on the balance sheet
    pub fn is_balance_sheet(&self) -> bool {
        matches!(
            self,
            AccountType::Asset | AccountType::Liability | AccountType::Equity
        )
    }

    /// Whether accounts of this type appear on the income statement
    pub fn is_income_statement(&self) -> bool {
        matches!(self, AccountType::Revenue | AccountType::Expense)
    }
}

/// A chart of accounts entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account code, hierarchical by numeric prefix ("411000" sits under class "4")
    pub code: String,
    /// Human-readable account name
    pub name: String,
    /// Type of account (Asset, Liability, etc.)
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Inactive accounts stay in the chart but cannot receive new lines
    pub is_active: bool,
}

impl Account {
    /// Create a new, active account
    pub fn new(code: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            account_type,
            is_active: true,
        }
    }

    /// Chart class of the account, i.e. the first digit of its code
    pub fn class(&self) -> Option<u32> {
        self.code.chars().next().and_then(|c| c.to_digit(10))
    }

    /// Whether the account code starts with the given prefix
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.code.starts_with(prefix)
    }
}

/// Functional journals entries are grouped into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Journal {
    /// Sales journal
    Vente,
    /// Purchases journal
    Achat,
    /// Bank journal
    Banque,
    /// Cash journal
    Caisse,
    /// Miscellaneous operations
    Od,
}

impl Journal {
    pub const ALL: [Journal; 5] = [
        Journal::Vente,
        Journal::Achat,
        Journal::Banque,
        Journal::Caisse,
        Journal::Od,
    ];

    /// Regulatory short code used in entry numbers and audit exports
    pub fn code(&self) -> &'static str {
        match self {
            Journal::Vente => "VE",
            Journal::Achat => "AC",
            Journal::Banque => "BQ",
            Journal::Caisse => "CA",
            Journal::Od => "OD",
        }
    }

    /// Regulatory long name of the journal
    pub fn label(&self) -> &'static str {
        match self {
            Journal::Vente => "Ventes",
            Journal::Achat => "Achats",
            Journal::Banque => "Banque",
            Journal::Caisse => "Caisse",
            Journal::Od => "Opérations Diverses",
        }
    }

    /// Functional name of the journal (VENTE, ACHAT, ...)
    pub fn name(&self) -> &'static str {
        match self {
            Journal::Vente => "VENTE",
            Journal::Achat => "ACHAT",
            Journal::Banque => "BANQUE",
            Journal::Caisse => "CAISSE",
            Journal::Od => "OD",
        }
    }
}

impl fmt::Display for Journal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Journal {
    type Err = LedgerError;

    /// Accepts either the functional name ("VENTE") or the short code ("VE")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Journal::ALL
            .into_iter()
            .find(|j| j.name() == wanted || j.code() == wanted)
            .ok_or_else(|| LedgerError::Validation(format!("Unknown journal '{}'", s)))
    }
}

/// Lifecycle status of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    /// Created, awaiting review by an accountant
    Draft,
    /// Reviewed and locked; visible to financial reports
    Validated,
}

/// Single debit/credit line of a journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Account the line posts to
    pub account_code: String,
    /// Line label
    pub label: String,
    /// Debit amount (never negative)
    pub debit: BigDecimal,
    /// Credit amount (never negative)
    pub credit: BigDecimal,
}

impl JournalLine {
    /// Create a new line
    pub fn new(
        account_code: impl Into<String>,
        label: impl Into<String>,
        debit: BigDecimal,
        credit: BigDecimal,
    ) -> Self {
        Self {
            account_code: account_code.into(),
            label: label.into(),
            debit,
            credit,
        }
    }

    /// Create a debit line
    pub fn debit(account_code: impl Into<String>, label: impl Into<String>, amount: BigDecimal) -> Self {
        Self::new(account_code, label, amount, BigDecimal::from(0))
    }

    /// Create a credit line
    pub fn credit(account_code: impl Into<String>, label: impl Into<String>, amount: BigDecimal) -> Self {
        Self::new(account_code, label, BigDecimal::from(0), amount)
    }

    /// Signed movement of the line, `debit - credit`
    pub fn net(&self) -> BigDecimal {
        &self.debit - &self.credit
    }
}

/// Sum the debit and credit columns of a set of lines
pub fn line_totals(lines: &[JournalLine]) -> (BigDecimal, BigDecimal) {
    let debit: BigDecimal = lines.iter().map(|l| &l.debit).sum();
    let credit: BigDecimal = lines.iter().map(|l| &l.credit).sum();
    (debit, credit)
}

/// Header data supplied when creating an entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryHeader {
    pub date: NaiveDate,
    pub label: String,
    pub journal: Journal,
    /// Free-text source document reference (invoice number, check number, ...)
    pub reference: Option<String>,
    pub third_party_code: Option<String>,
    pub third_party_label: Option<String>,
}

impl EntryHeader {
    /// Create a header without reference or counterparty
    pub fn new(date: NaiveDate, label: impl Into<String>, journal: Journal) -> Self {
        Self {
            date,
            label: label.into(),
            journal,
            reference: None,
            third_party_code: None,
            third_party_label: None,
        }
    }

    /// Set the source document reference
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Set the counterparty identity
    pub fn third_party(mut self, code: impl Into<String>, label: impl Into<String>) -> Self {
        self.third_party_code = Some(code.into());
        self.third_party_label = Some(label.into());
        self
    }
}

/// A header plus its lines, not yet numbered or persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub header: EntryHeader,
    pub lines: Vec<JournalLine>,
}

/// Persisted journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Storage identity
    pub id: String,
    /// Unique human-readable number, `{journalCode}-{year}-{sequence:06}`
    pub number: String,
    pub date: NaiveDate,
    pub label: String,
    pub journal: Journal,
    pub journal_code: String,
    pub journal_label: String,
    pub reference: Option<String>,
    pub third_party_code: Option<String>,
    pub third_party_label: Option<String>,
    pub status: EntryStatus,
    /// Ordered lines owned by the entry
    pub lines: Vec<JournalLine>,
    pub created_at: NaiveDateTime,
    pub validated_at: Option<NaiveDateTime>,
}

impl JournalEntry {
    /// Build a DRAFT entry from a header, its lines and an allocated number
    pub fn draft(number: String, header: EntryHeader, lines: Vec<JournalLine>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            number,
            date: header.date,
            label: header.label,
            journal: header.journal,
            journal_code: header.journal.code().to_string(),
            journal_label: header.journal.label().to_string(),
            reference: header.reference,
            third_party_code: header.third_party_code,
            third_party_label: header.third_party_label,
            status: EntryStatus::Draft,
            lines,
            created_at: chrono::Utc::now().naive_utc(),
            validated_at: None,
        }
    }

    /// Calculate total debits
    pub fn total_debit(&self) -> BigDecimal {
        line_totals(&self.lines).0
    }

    /// Calculate total credits
    pub fn total_credit(&self) -> BigDecimal {
        line_totals(&self.lines).1
    }

    /// Whether any line posts to the given account
    pub fn touches_account(&self, account_code: &str) -> bool {
        self.lines.iter().any(|l| l.account_code == account_code)
    }

    /// Fiscal year of the entry
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn is_validated(&self) -> bool {
        self.status == EntryStatus::Validated
    }
}

/// Inclusive date range; either bound may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Unbounded range
    pub fn all() -> Self {
        Self::default()
    }

    /// Range between two dates, both inclusive
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Everything up to and including `end`
    pub fn until(end: NaiveDate) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    /// Range that matches nothing
    pub fn empty() -> Self {
        Self::between(NaiveDate::MAX, NaiveDate::MIN)
    }

    /// Parse optional `YYYY-MM-DD` bounds coming from an outer layer.
    ///
    /// Blank bounds are open. A bound that fails to parse yields an empty
    /// range rather than an error, so read paths degrade to empty results.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Self {
        fn bound(raw: Option<&str>) -> Result<Option<NaiveDate>, chrono::ParseError> {
            match raw.map(str::trim).filter(|s| !s.is_empty()) {
                None => Ok(None),
                Some(s) => {
                    let date_part = s.get(..10).unwrap_or(s);
                    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map(Some)
                }
            }
        }

        match (bound(start), bound(end)) {
            (Ok(start), Ok(end)) => Self { start, end },
            _ => Self::empty(),
        }
    }

    /// Whether the range can never match (start after end)
    pub fn is_empty(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if s > e)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }
}

/// Ordering of entry listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryOrder {
    /// Oldest first, used by reports
    DateAscending,
    /// Newest first, used by listings
    #[default]
    DateDescending,
}

/// Criteria for listing journal entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryFilter {
    pub journal: Option<Journal>,
    pub status: Option<EntryStatus>,
    pub range: DateRange,
    /// Only entries with at least one line on this account
    pub account_code: Option<String>,
    pub order: EntryOrder,
}

impl EntryFilter {
    /// Validated entries in a range, oldest first
    pub fn validated_in(range: DateRange) -> Self {
        Self {
            status: Some(EntryStatus::Validated),
            range,
            order: EntryOrder::DateAscending,
            ..Self::default()
        }
    }

    pub fn journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn status(mut self, status: EntryStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    pub fn account_code(mut self, account_code: impl Into<String>) -> Self {
        self.account_code = Some(account_code.into());
        self
    }

    pub fn order(mut self, order: EntryOrder) -> Self {
        self.order = order;
        self
    }

    /// Whether an entry satisfies every criterion of the filter
    pub fn matches(&self, entry: &JournalEntry) -> bool {
        self.journal.is_none_or(|j| entry.journal == j)
            && self.status.is_none_or(|s| entry.status == s)
            && self.range.contains(entry.date)
            && self
                .account_code
                .as_deref()
                .is_none_or(|code| entry.touches_account(code))
    }

    /// Sort entries in the requested order; ties are broken by number
    pub fn sort(&self, entries: &mut [JournalEntry]) {
        entries.sort_by(|a, b| (a.date, &a.number).cmp(&(b.date, &b.number)));
        if self.order == EntryOrder::DateDescending {
            entries.reverse();
        }
    }
}

/// Criteria for listing accounts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFilter {
    pub account_type: Option<AccountType>,
    /// Matches a code substring or a case-insensitive name substring
    pub search: Option<String>,
}

impl AccountFilter {
    pub fn of_type(account_type: AccountType) -> Self {
        Self {
            account_type: Some(account_type),
            search: None,
        }
    }

    pub fn search(search: impl Into<String>) -> Self {
        Self {
            account_type: None,
            search: Some(search.into()),
        }
    }

    /// Whether an active account satisfies the filter
    pub fn matches(&self, account: &Account) -> bool {
        if !account.is_active {
            return false;
        }
        if self.account_type.is_some_and(|t| account.account_type != t) {
            return false;
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => true,
            Some(term) => {
                account.code.contains(term)
                    || account.name.to_lowercase().contains(&term.to_lowercase())
            }
        }
    }
}

/// Errors that can occur in the ledger system
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Entry is not balanced: debits = {debit}, credits = {credit}")]
    ImbalancedEntry { debit: BigDecimal, credit: BigDecimal },
    #[error("Required account missing or inactive: {0}")]
    MissingAccount(String),
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Account is inactive: {0}")]
    InactiveAccount(String),
    #[error("Journal entry not found: {0}")]
    EntryNotFound(String),
    #[error("Journal entry already validated: {0}")]
    AlreadyValidated(String),
    #[error("Journal entry is validated and cannot be modified: {0}")]
    EntryLocked(String),
    #[error("Chart of accounts is already initialized ({0} accounts)")]
    AlreadyInitialized(usize),
    #[error("Entry number already in use: {0}")]
    DuplicateEntryNumber(String),
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl<T> From<std::sync::PoisonError<T>> for LedgerError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        LedgerError::Storage(format!("lock poisoned: {}", err))
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_journal_codes_and_parsing() {
        assert_eq!(Journal::Vente.code(), "VE");
        assert_eq!(Journal::Od.label(), "Opérations Diverses");
        assert_eq!("banque".parse::<Journal>().unwrap(), Journal::Banque);
        assert_eq!("CA".parse::<Journal>().unwrap(), Journal::Caisse);
        assert!("XX".parse::<Journal>().is_err());
    }

    #[test]
    fn test_date_range_parse() {
        let range = DateRange::parse(Some("2024-01-01"), Some("2024-12-31"));
        assert!(range.contains(date(2024, 6, 1)));
        assert!(!range.contains(date(2025, 1, 1)));

        let open = DateRange::parse(None, Some(""));
        assert_eq!(open, DateRange::all());

        let malformed = DateRange::parse(Some("not-a-date"), None);
        assert!(malformed.is_empty());
        assert!(!malformed.contains(date(2024, 6, 1)));

        let inverted = DateRange::between(date(2024, 2, 1), date(2024, 1, 1));
        assert!(inverted.is_empty());
    }

    #[test]
    fn test_account_filter() {
        let mut bank = Account::new("512000", "Banque", AccountType::Asset);
        assert_eq!(bank.class(), Some(5));
        assert!(AccountFilter::search("512").matches(&bank));
        assert!(AccountFilter::search("BANQ").matches(&bank));
        assert!(!AccountFilter::of_type(AccountType::Expense).matches(&bank));

        bank.is_active = false;
        assert!(!AccountFilter::default().matches(&bank));
    }

    #[test]
    fn test_account_serializes_type_field() {
        let account = Account::new("707000", "Ventes de marchandises", AccountType::Revenue);
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["type"], "REVENUE");
        assert_eq!(json["is_active"], true);
    }
}
