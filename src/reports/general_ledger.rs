//! General ledger: per-account chronological movements with running balance

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::resolve;
use crate::traits::ChartLookup;
use crate::types::*;

/// One line of an account's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerMovement {
    pub date: NaiveDate,
    pub label: String,
    pub entry_number: String,
    pub reference: Option<String>,
    pub debit: BigDecimal,
    pub credit: BigDecimal,
    /// Cumulative `debit - credit` up to and including this movement
    pub balance: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerAccount {
    pub account: Account,
    pub movements: Vec<LedgerMovement>,
    pub total_debit: BigDecimal,
    pub total_credit: BigDecimal,
    pub balance: BigDecimal,
}

impl LedgerAccount {
    fn open(account: Account) -> Self {
        Self {
            account,
            movements: Vec::new(),
            total_debit: BigDecimal::from(0),
            total_credit: BigDecimal::from(0),
            balance: BigDecimal::from(0),
        }
    }

    fn post(&mut self, entry: &JournalEntry, line: &JournalLine) {
        self.total_debit += &line.debit;
        self.total_credit += &line.credit;
        self.balance += line.net();

        let label = if line.label.trim().is_empty() {
            entry.label.clone()
        } else {
            line.label.clone()
        };

        self.movements.push(LedgerMovement {
            date: entry.date,
            label,
            entry_number: entry.number.clone(),
            reference: entry.reference.clone(),
            debit: line.debit.clone(),
            credit: line.credit.clone(),
            balance: self.balance.clone(),
        });
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralLedger {
    pub range: DateRange,
    pub account_prefix: Option<String>,
    /// Accounts with at least one movement, ordered by code
    pub accounts: Vec<LedgerAccount>,
}

impl GeneralLedger {
    /// Build from entries already sorted oldest first
    pub fn build(
        range: DateRange,
        account_prefix: Option<&str>,
        entries: &[JournalEntry],
        chart: &dyn ChartLookup,
    ) -> Self {
        let mut accounts: BTreeMap<String, LedgerAccount> = BTreeMap::new();

        for entry in entries {
            for line in &entry.lines {
                if account_prefix.is_some_and(|p| !line.account_code.starts_with(p)) {
                    continue;
                }

                if !accounts.contains_key(&line.account_code) {
                    let Some(account) = resolve(chart, &line.account_code) else {
                        continue;
                    };
                    accounts.insert(line.account_code.clone(), LedgerAccount::open(account.clone()));
                }

                if let Some(ledger_account) = accounts.get_mut(&line.account_code) {
                    ledger_account.post(entry, line);
                }
            }
        }

        Self {
            range,
            account_prefix: account_prefix.map(str::to_string),
            accounts: accounts.into_values().collect(),
        }
    }

    /// History of one account, if it moved in the period
    pub fn account(&self, code: &str) -> Option<&LedgerAccount> {
        self.accounts.iter().find(|a| a.account.code == code)
    }
}
