//! Entry number allocation

use crate::traits::*;
use crate::types::*;

/// Allocates `{journalCode}-{year}-{sequence:06}` entry numbers.
///
/// The sequence comes from the storage backend's per-journal-per-year counter,
/// which is incremented under exclusive access, so concurrent allocations for
/// the same journal and year never collide.
pub struct EntryNumberAllocator<S: LedgerStorage> {
    storage: S,
}

impl<S: LedgerStorage> EntryNumberAllocator<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Allocate the next number for a journal code and year
    pub async fn allocate(&self, journal_code: &str, year: i32) -> LedgerResult<String> {
        let journal_code = journal_code.trim();
        if journal_code.is_empty() {
            return Err(LedgerError::Validation(
                "Journal code cannot be empty".to_string(),
            ));
        }

        let sequence = self.storage.next_sequence(journal_code, year).await?;
        let number = format_entry_number(journal_code, year, sequence);
        tracing::debug!(journal_code, year, sequence, number = %number, "allocated entry number");
        Ok(number)
    }
}

/// Format an entry number, e.g. `VE-2024-000042`
pub fn format_entry_number(journal_code: &str, year: i32, sequence: u64) -> String {
    format!("{}-{}-{:06}", journal_code, year, sequence)
}
