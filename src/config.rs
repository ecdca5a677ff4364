//! Engine configuration: baseline chart, account mapping and balance tolerance
//!
//! The chart the engine seeds and the accounts the generators post to are
//! injected through [`LedgerConfig`] at construction instead of living in a
//! process-wide singleton.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use crate::types::*;

/// Account seeded by chart initialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSeed {
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
}

impl AccountSeed {
    pub fn new(code: &str, name: &str, account_type: AccountType) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            account_type,
        }
    }

    pub fn to_account(&self) -> Account {
        Account::new(self.code.clone(), self.name.clone(), self.account_type)
    }
}

/// Account codes the auto-entry generators and reports post to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountMapping {
    pub customer_receivable: String,
    pub sales_revenue: String,
    pub vat_collected: String,
    pub purchases: String,
    pub vat_deductible: String,
    pub supplier_payable: String,
    pub bank: String,
    pub cash: String,
    pub cost_of_goods_sold: String,
    pub inventory: String,
    /// Equity account the period result is reported on in the balance sheet
    pub period_result: String,
}

impl Default for AccountMapping {
    fn default() -> Self {
        Self {
            customer_receivable: "411000".to_string(),
            sales_revenue: "707000".to_string(),
            vat_collected: "445710".to_string(),
            purchases: "607000".to_string(),
            vat_deductible: "445660".to_string(),
            supplier_payable: "401000".to_string(),
            bank: "512000".to_string(),
            cash: "530000".to_string(),
            cost_of_goods_sold: "607000".to_string(),
            inventory: "370000".to_string(),
            period_result: "120000".to_string(),
        }
    }
}

impl AccountMapping {
    fn codes(&self) -> [(&'static str, &str); 11] {
        [
            ("customer_receivable", &self.customer_receivable),
            ("sales_revenue", &self.sales_revenue),
            ("vat_collected", &self.vat_collected),
            ("purchases", &self.purchases),
            ("vat_deductible", &self.vat_deductible),
            ("supplier_payable", &self.supplier_payable),
            ("bank", &self.bank),
            ("cash", &self.cash),
            ("cost_of_goods_sold", &self.cost_of_goods_sold),
            ("inventory", &self.inventory),
            ("period_result", &self.period_result),
        ]
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Maximum accepted difference between total debits and total credits
    pub balance_tolerance: BigDecimal,
    pub accounts: AccountMapping,
    /// Catalog seeded by chart initialization
    pub chart: Vec<AccountSeed>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: default_tolerance(),
            accounts: AccountMapping::default(),
            chart: standard_chart(),
        }
    }
}

fn default_tolerance() -> BigDecimal {
    BigDecimal::from_str("0.01").unwrap_or_else(|_| BigDecimal::from(0))
}

impl LedgerConfig {
    /// Parse and validate a JSON configuration; missing sections take their defaults
    pub fn from_json_str(json: &str) -> LedgerResult<Self> {
        let config: LedgerConfig =
            serde_json::from_str(json).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> LedgerResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Serialize the configuration as pretty JSON
    pub fn to_json_string(&self) -> LedgerResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Check the configuration is usable by the engine
    pub fn validate(&self) -> LedgerResult<()> {
        if self.balance_tolerance < BigDecimal::from(0) {
            return Err(LedgerError::Config(
                "balance_tolerance cannot be negative".to_string(),
            ));
        }

        if self.chart.is_empty() {
            return Err(LedgerError::Config("chart cannot be empty".to_string()));
        }

        let mut codes = HashSet::new();
        for seed in &self.chart {
            crate::utils::validate_account_code(&seed.code)
                .map_err(|e| LedgerError::Config(e.to_string()))?;
            if !codes.insert(seed.code.as_str()) {
                return Err(LedgerError::Config(format!(
                    "account code '{}' appears more than once in chart",
                    seed.code
                )));
            }
        }

        for (role, code) in self.accounts.codes() {
            if !codes.contains(code) {
                return Err(LedgerError::Config(format!(
                    "mapped account {} = '{}' is not in chart",
                    role, code
                )));
            }
        }

        Ok(())
    }
}

/// Baseline French chart of accounts (Plan Comptable Général, simplified)
pub fn standard_chart() -> Vec<AccountSeed> {
    use AccountType::*;

    vec![
        // Class 1 - Capital
        AccountSeed::new("101000", "Capital social", Equity),
        AccountSeed::new("106000", "Réserves", Equity),
        AccountSeed::new("120000", "Résultat de l'exercice", Equity),
        AccountSeed::new("164000", "Emprunts auprès des établissements de crédit", Liability),
        // Class 2 - Fixed assets
        AccountSeed::new("213000", "Constructions", Asset),
        AccountSeed::new("218000", "Matériel de bureau et informatique", Asset),
        AccountSeed::new("281300", "Amortissements des constructions", Asset),
        // Class 3 - Inventory
        AccountSeed::new("370000", "Stock de marchandises", Asset),
        AccountSeed::new("371000", "Stock de matières premières", Asset),
        // Class 4 - Third parties
        AccountSeed::new("401000", "Fournisseurs", Liability),
        AccountSeed::new("411000", "Clients", Asset),
        AccountSeed::new("421000", "Personnel - Rémunérations dues", Liability),
        AccountSeed::new("437000", "Autres organismes sociaux", Liability),
        AccountSeed::new("445510", "TVA à décaisser", Liability),
        AccountSeed::new("445660", "TVA déductible", Asset),
        AccountSeed::new("445710", "TVA collectée", Liability),
        // Class 5 - Financial
        AccountSeed::new("512000", "Banque", Asset),
        AccountSeed::new("530000", "Caisse", Asset),
        // Class 6 - Expenses
        AccountSeed::new("601000", "Achats de matières premières", Expense),
        AccountSeed::new("607000", "Achats de marchandises", Expense),
        AccountSeed::new("611000", "Sous-traitance générale", Expense),
        AccountSeed::new("613000", "Locations", Expense),
        AccountSeed::new("621000", "Personnel extérieur", Expense),
        AccountSeed::new("626000", "Frais postaux et télécommunications", Expense),
        AccountSeed::new("641000", "Rémunérations du personnel", Expense),
        AccountSeed::new("645000", "Charges de sécurité sociale", Expense),
        AccountSeed::new("661000", "Charges d'intérêts", Expense),
        // Class 7 - Revenue
        AccountSeed::new("701000", "Ventes de produits finis", Revenue),
        AccountSeed::new("707000", "Ventes de marchandises", Revenue),
        AccountSeed::new("708000", "Produits des activités annexes", Revenue),
        AccountSeed::new("761000", "Produits financiers", Revenue),
    ]
}
