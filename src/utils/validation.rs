//! Validation utilities

use crate::traits::*;
use crate::types::*;
use bigdecimal::BigDecimal;

/// Validate that an amount is not negative
pub fn validate_non_negative_amount(amount: &BigDecimal) -> LedgerResult<()> {
    if *amount < BigDecimal::from(0) {
        Err(LedgerError::Validation(
            "Amount cannot be negative".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate that an account code is valid
pub fn validate_account_code(code: &str) -> LedgerResult<()> {
    if code.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Account code cannot be empty".to_string(),
        ));
    }

    if code.len() > 20 {
        return Err(LedgerError::Validation(
            "Account code cannot exceed 20 characters".to_string(),
        ));
    }

    // Codes are hierarchical by numeric prefix, so the class digit must lead
    if !code.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(LedgerError::Validation(format!(
            "Account code '{}' must start with its class digit",
            code
        )));
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(LedgerError::Validation(format!(
            "Account code '{}' can only contain letters and digits",
            code
        )));
    }

    Ok(())
}

/// Validate that an account name is valid
pub fn validate_account_name(name: &str) -> LedgerResult<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Account name cannot be empty".to_string(),
        ));
    }

    if name.chars().count() > 100 {
        return Err(LedgerError::Validation(
            "Account name cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate that an entry label is valid
pub fn validate_entry_label(label: &str) -> LedgerResult<()> {
    if label.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Entry label cannot be empty".to_string(),
        ));
    }

    if label.chars().count() > 500 {
        return Err(LedgerError::Validation(
            "Entry label cannot exceed 500 characters".to_string(),
        ));
    }

    Ok(())
}

/// Stricter entry validator for manual bookkeeping
pub struct EnhancedEntryValidator;

impl EntryValidator for EnhancedEntryValidator {
    fn validate_entry(
        &self,
        header: &EntryHeader,
        lines: &[JournalLine],
        tolerance: &BigDecimal,
    ) -> LedgerResult<()> {
        check_balance(lines, tolerance)?;

        validate_entry_label(&header.label)?;

        for line in lines {
            validate_account_code(&line.account_code)?;
            validate_non_negative_amount(&line.debit)?;
            validate_non_negative_amount(&line.credit)?;

            let zero = BigDecimal::from(0);
            if line.debit != zero && line.credit != zero {
                return Err(LedgerError::Validation(format!(
                    "Line on account '{}' carries both a debit and a credit",
                    line.account_code
                )));
            }
        }

        Ok(())
    }
}

/// Enhanced account validator with detailed checks
pub struct EnhancedAccountValidator;

impl AccountValidator for EnhancedAccountValidator {
    fn validate_account(&self, account: &Account) -> LedgerResult<()> {
        validate_account_code(&account.code)?;
        validate_account_name(&account.name)?;
        Ok(())
    }
}
