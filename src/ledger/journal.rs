//! Journal entry processing and management

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate};

use crate::ledger::numbering::EntryNumberAllocator;
use crate::traits::*;
use crate::types::*;

/// Journal manager: creation, validation and listing of entries
pub struct JournalManager<S: LedgerStorage> {
    storage: S,
    allocator: EntryNumberAllocator<S>,
    validator: Box<dyn EntryValidator>,
    tolerance: BigDecimal,
}

impl<S: LedgerStorage + Clone> JournalManager<S> {
    /// Create a new journal manager
    pub fn new(storage: S, tolerance: BigDecimal) -> Self {
        Self::with_validator(storage, tolerance, Box::new(DefaultEntryValidator))
    }

    /// Create a new journal manager with custom validator
    pub fn with_validator(
        storage: S,
        tolerance: BigDecimal,
        validator: Box<dyn EntryValidator>,
    ) -> Self {
        Self {
            allocator: EntryNumberAllocator::new(storage.clone()),
            storage,
            validator,
            tolerance,
        }
    }
}

impl<S: LedgerStorage> JournalManager<S> {
    pub fn allocator(&self) -> &EntryNumberAllocator<S> {
        &self.allocator
    }

    /// Create a DRAFT entry.
    ///
    /// Every check runs before a number is allocated; a rejected entry leaves
    /// no header, no lines and no consumed sequence behind. The one exception
    /// is an account deactivated between the checks and the insert: storage
    /// refuses the entry and the allocated number stays unused.
    pub async fn create_entry(
        &self,
        header: EntryHeader,
        lines: Vec<JournalLine>,
    ) -> LedgerResult<JournalEntry> {
        // The double-entry rule holds whatever validator is plugged in
        let checked = check_balance(&lines, &self.tolerance)
            .and_then(|_| self.validator.validate_entry(&header, &lines, &self.tolerance));
        if let Err(err) = checked {
            tracing::warn!(journal = %header.journal, error = %err, "entry rejected");
            return Err(err);
        }

        for line in &lines {
            match self.storage.get_account(&line.account_code).await? {
                None => return Err(LedgerError::AccountNotFound(line.account_code.clone())),
                Some(account) if !account.is_active => {
                    return Err(LedgerError::InactiveAccount(account.code))
                }
                Some(_) => {}
            }
        }

        let number = self
            .allocator
            .allocate(header.journal.code(), header.date.year())
            .await?;
        let entry = JournalEntry::draft(number, header, lines);
        self.storage.insert_entry(&entry).await?;

        tracing::info!(
            number = %entry.number,
            journal = %entry.journal,
            lines = entry.lines.len(),
            amount = %entry.total_debit(),
            "journal entry created"
        );

        Ok(entry)
    }

    /// Move a DRAFT entry to VALIDATED
    pub async fn validate_entry(&self, number: &str) -> LedgerResult<JournalEntry> {
        let entry = self
            .storage
            .mark_validated(number, chrono::Utc::now().naive_utc())
            .await?;
        tracing::info!(number, "journal entry validated");
        Ok(entry)
    }

    /// Get an entry by number
    pub async fn get_entry(&self, number: &str) -> LedgerResult<Option<JournalEntry>> {
        self.storage.get_entry(number).await
    }

    /// Get an entry by number, returning an error if not found
    pub async fn get_entry_required(&self, number: &str) -> LedgerResult<JournalEntry> {
        self.storage
            .get_entry(number)
            .await?
            .ok_or_else(|| LedgerError::EntryNotFound(number.to_string()))
    }

    /// List entries with their lines
    pub async fn list_entries(&self, filter: &EntryFilter) -> LedgerResult<Vec<JournalEntry>> {
        self.storage.list_entries(filter).await
    }

    /// Delete a DRAFT entry and its lines
    pub async fn delete_draft_entry(&self, number: &str) -> LedgerResult<()> {
        self.storage.delete_draft_entry(number).await?;
        tracing::info!(number, "draft journal entry deleted");
        Ok(())
    }
}

/// Entry builder for assembling entries line by line
#[derive(Debug)]
pub struct EntryBuilder {
    header: EntryHeader,
    lines: Vec<JournalLine>,
}

impl EntryBuilder {
    /// Create a new entry builder
    pub fn new(date: NaiveDate, label: impl Into<String>, journal: Journal) -> Self {
        Self {
            header: EntryHeader::new(date, label, journal),
            lines: Vec::new(),
        }
    }

    /// Set the source document reference
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.header.reference = Some(reference.into());
        self
    }

    /// Set the counterparty identity
    pub fn third_party(mut self, code: impl Into<String>, label: impl Into<String>) -> Self {
        self.header = self.header.third_party(code, label);
        self
    }

    /// Add a debit line; without a label the line takes the entry label
    pub fn debit(mut self, account_code: &str, amount: BigDecimal, label: Option<String>) -> Self {
        let label = label.unwrap_or_else(|| self.header.label.clone());
        self.lines.push(JournalLine::debit(account_code, label, amount));
        self
    }

    /// Add a credit line; without a label the line takes the entry label
    pub fn credit(mut self, account_code: &str, amount: BigDecimal, label: Option<String>) -> Self {
        let label = label.unwrap_or_else(|| self.header.label.clone());
        self.lines.push(JournalLine::credit(account_code, label, amount));
        self
    }

    /// Add a custom line
    pub fn line(mut self, line: JournalLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Drop lines whose debit and credit are both zero
    pub fn skip_zero_lines(mut self) -> Self {
        let zero = BigDecimal::from(0);
        self.lines.retain(|l| l.debit != zero || l.credit != zero);
        self
    }

    /// Build the draft, checking the double-entry rules
    pub fn build(self, tolerance: &BigDecimal) -> LedgerResult<EntryDraft> {
        check_balance(&self.lines, tolerance)?;
        Ok(EntryDraft {
            header: self.header,
            lines: self.lines,
        })
    }
}

/// Fill blank line labels with the entry label
pub fn inherit_line_labels(header: &EntryHeader, lines: &mut [JournalLine]) {
    for line in lines.iter_mut().filter(|l| l.label.trim().is_empty()) {
        line.label = header.label.clone();
    }
}
