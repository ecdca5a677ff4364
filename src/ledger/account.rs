//! Chart of accounts management

use std::collections::HashMap;

use crate::config::AccountSeed;
use crate::traits::*;
use crate::types::*;

/// Account manager for handling chart of accounts operations
pub struct AccountManager<S: LedgerStorage> {
    pub(crate) storage: S,
    validator: Box<dyn AccountValidator>,
}

impl<S: LedgerStorage> AccountManager<S> {
    /// Create a new account manager
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultAccountValidator),
        }
    }

    /// Create a new account manager with custom validator
    pub fn with_validator(storage: S, validator: Box<dyn AccountValidator>) -> Self {
        Self { storage, validator }
    }

    /// Seed the chart from the given catalog.
    ///
    /// One-time operation: fails with [`LedgerError::AlreadyInitialized`] if
    /// any account exists, and nothing is seeded when a seed is invalid.
    pub async fn initialize(&self, seeds: &[AccountSeed]) -> LedgerResult<Vec<Account>> {
        let existing = self.storage.count_accounts().await?;
        if existing > 0 {
            tracing::warn!(existing, "chart of accounts already initialized");
            return Err(LedgerError::AlreadyInitialized(existing));
        }

        let accounts: Vec<Account> = seeds.iter().map(AccountSeed::to_account).collect();
        for account in &accounts {
            self.validator.validate_account(account)?;
        }

        self.storage.seed_accounts(&accounts).await?;
        tracing::info!(count = accounts.len(), "chart of accounts initialized");

        Ok(accounts)
    }

    /// Get an account by code
    pub async fn find_by_code(&self, code: &str) -> LedgerResult<Option<Account>> {
        self.storage.get_account(code).await
    }

    /// Get an account by code, returning an error if not found
    pub async fn get_account_required(&self, code: &str) -> LedgerResult<Account> {
        self.storage
            .get_account(code)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(code.to_string()))
    }

    /// Active accounts matching the filter, ordered by code
    pub async fn list(&self, filter: &AccountFilter) -> LedgerResult<Vec<Account>> {
        let mut accounts: Vec<Account> = self
            .storage
            .list_accounts()
            .await?
            .into_iter()
            .filter(|account| filter.matches(account))
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(accounts)
    }

    /// Deactivate an account; it stays in the chart but takes no new lines
    pub async fn deactivate(&self, code: &str) -> LedgerResult<Account> {
        let account = self.storage.set_account_active(code, false).await?;
        tracing::info!(code, "account deactivated");
        Ok(account)
    }

    /// Point-in-time copy of the whole chart, inactive accounts included
    pub async fn snapshot(&self) -> LedgerResult<ChartSnapshot> {
        let accounts = self.storage.list_accounts().await?;
        Ok(ChartSnapshot::from_accounts(accounts))
    }
}

/// In-memory copy of the chart keyed by code
#[derive(Debug, Clone, Default)]
pub struct ChartSnapshot {
    accounts: HashMap<String, Account>,
}

impl ChartSnapshot {
    pub fn from_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|account| (account.code.clone(), account))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl ChartLookup for ChartSnapshot {
    fn find(&self, code: &str) -> Option<&Account> {
        self.accounts.get(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::standard_chart;
    use crate::utils::memory_storage::MemoryStorage;

    #[tokio::test]
    async fn test_initialize_is_one_time() {
        let manager = AccountManager::new(MemoryStorage::new());

        let seeded = manager.initialize(&standard_chart()).await.unwrap();
        assert_eq!(seeded.len(), 31);

        let err = manager.initialize(&standard_chart()).await.unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyInitialized(31)));
    }

    #[tokio::test]
    async fn test_invalid_seed_seeds_nothing() {
        let manager = AccountManager::new(MemoryStorage::new());
        let seeds = vec![
            AccountSeed::new("512000", "Banque", AccountType::Asset),
            AccountSeed::new("530000", " ", AccountType::Asset),
        ];

        assert!(manager.initialize(&seeds).await.is_err());
        assert_eq!(manager.storage.count_accounts().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let manager = AccountManager::new(MemoryStorage::new());
        manager.initialize(&standard_chart()).await.unwrap();

        let expenses = manager
            .list(&AccountFilter::of_type(AccountType::Expense))
            .await
            .unwrap();
        assert_eq!(expenses.len(), 9);
        assert!(expenses.windows(2).all(|w| w[0].code < w[1].code));

        let tva = manager.list(&AccountFilter::search("tva")).await.unwrap();
        let codes: Vec<&str> = tva.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["445510", "445660", "445710"]);
    }

    #[tokio::test]
    async fn test_deactivated_account_hidden_but_resolvable() {
        let manager = AccountManager::new(MemoryStorage::new());
        manager.initialize(&standard_chart()).await.unwrap();

        manager.deactivate("530000").await.unwrap();

        let listed = manager.list(&AccountFilter::search("530")).await.unwrap();
        assert!(listed.is_empty());

        let snapshot = manager.snapshot().await.unwrap();
        assert!(snapshot.find("530000").is_some());
        assert!(matches!(
            snapshot.require("530000"),
            Err(LedgerError::MissingAccount(_))
        ));

        assert!(matches!(
            manager.deactivate("999999").await,
            Err(LedgerError::AccountNotFound(_))
        ));
    }
}
