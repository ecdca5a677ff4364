//! In-memory storage implementation for testing

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};

use crate::traits::*;
use crate::types::*;

#[derive(Debug, Default)]
struct State {
    accounts: BTreeMap<String, Account>,
    entries: HashMap<String, JournalEntry>,
}

/// In-memory storage implementation for testing and development
///
/// Accounts and entries live behind one `RwLock` so an entry becomes visible
/// with all its lines at once. Sequences sit behind their own `Mutex`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Arc<RwLock<State>>,
    sequences: Arc<Mutex<HashMap<(String, i32), u64>>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> LedgerResult<()> {
        let mut state = self.state.write()?;
        state.accounts.clear();
        state.entries.clear();
        self.sequences.lock()?.clear();
        Ok(())
    }
}

#[async_trait]
impl LedgerStorage for MemoryStorage {
    async fn seed_accounts(&self, accounts: &[Account]) -> LedgerResult<()> {
        let mut state = self.state.write()?;
        if !state.accounts.is_empty() {
            return Err(LedgerError::AlreadyInitialized(state.accounts.len()));
        }
        for account in accounts {
            state.accounts.insert(account.code.clone(), account.clone());
        }
        Ok(())
    }

    async fn get_account(&self, code: &str) -> LedgerResult<Option<Account>> {
        Ok(self.state.read()?.accounts.get(code).cloned())
    }

    async fn list_accounts(&self) -> LedgerResult<Vec<Account>> {
        Ok(self.state.read()?.accounts.values().cloned().collect())
    }

    async fn count_accounts(&self) -> LedgerResult<usize> {
        Ok(self.state.read()?.accounts.len())
    }

    async fn set_account_active(&self, code: &str, is_active: bool) -> LedgerResult<Account> {
        let mut state = self.state.write()?;
        let account = state
            .accounts
            .get_mut(code)
            .ok_or_else(|| LedgerError::AccountNotFound(code.to_string()))?;
        account.is_active = is_active;
        Ok(account.clone())
    }

    async fn next_sequence(&self, journal_code: &str, year: i32) -> LedgerResult<u64> {
        let mut sequences = self.sequences.lock()?;
        let counter = sequences
            .entry((journal_code.to_string(), year))
            .or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn insert_entry(&self, entry: &JournalEntry) -> LedgerResult<()> {
        let mut state = self.state.write()?;
        if state.entries.contains_key(&entry.number) {
            return Err(LedgerError::DuplicateEntryNumber(entry.number.clone()));
        }
        // Re-checked under the write lock; the journal checks accounts before allocating
        for line in &entry.lines {
            match state.accounts.get(&line.account_code) {
                None => return Err(LedgerError::AccountNotFound(line.account_code.clone())),
                Some(account) if !account.is_active => {
                    return Err(LedgerError::InactiveAccount(account.code.clone()))
                }
                Some(_) => {}
            }
        }
        state.entries.insert(entry.number.clone(), entry.clone());
        Ok(())
    }

    async fn get_entry(&self, number: &str) -> LedgerResult<Option<JournalEntry>> {
        Ok(self.state.read()?.entries.get(number).cloned())
    }

    async fn list_entries(&self, filter: &EntryFilter) -> LedgerResult<Vec<JournalEntry>> {
        if filter.range.is_empty() {
            return Ok(Vec::new());
        }

        let mut entries: Vec<JournalEntry> = self
            .state
            .read()?
            .entries
            .values()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect();
        filter.sort(&mut entries);
        Ok(entries)
    }

    async fn mark_validated(
        &self,
        number: &str,
        validated_at: NaiveDateTime,
    ) -> LedgerResult<JournalEntry> {
        let mut state = self.state.write()?;
        let entry = state
            .entries
            .get_mut(number)
            .ok_or_else(|| LedgerError::EntryNotFound(number.to_string()))?;

        if entry.status == EntryStatus::Validated {
            return Err(LedgerError::AlreadyValidated(number.to_string()));
        }

        entry.status = EntryStatus::Validated;
        entry.validated_at = Some(validated_at);
        Ok(entry.clone())
    }

    async fn delete_draft_entry(&self, number: &str) -> LedgerResult<()> {
        let mut state = self.state.write()?;
        let validated = state
            .entries
            .get(number)
            .map(JournalEntry::is_validated)
            .ok_or_else(|| LedgerError::EntryNotFound(number.to_string()))?;

        if validated {
            return Err(LedgerError::EntryLocked(number.to_string()));
        }

        state.entries.remove(number);
        Ok(())
    }

    async fn count_entries_by_status(&self) -> LedgerResult<HashMap<EntryStatus, usize>> {
        let mut counts = HashMap::new();
        for entry in self.state.read()?.entries.values() {
            *counts.entry(entry.status).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
