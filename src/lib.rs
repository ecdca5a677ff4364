//! # Accounting Engine
//!
//! A double-entry bookkeeping engine following the French chart of accounts
//! (PCG): journals, numbered entries, automatic postings from business events,
//! and financial reporting.
//!
//! ## Features
//!
//! - **Chart of accounts**: seeding, lookup and deactivation of PCG accounts
//! - **Journal entries**: balanced DRAFT entries, validation, per-journal yearly numbering
//! - **Auto-entries**: sale and purchase invoices, payments, stock movements
//! - **Financial reporting**: general ledger, trial balance, income statement, balance sheet
//! - **Storage abstraction**: database-agnostic design with trait-based storage
//!
//! ## Quick Start
//!
//! ```rust
//! use accounting_engine::{Ledger, MemoryStorage, SaleInvoiceEvent, ReportFilter, DateRange};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! # async fn run() -> accounting_engine::LedgerResult<()> {
//! let ledger = Ledger::new(MemoryStorage::new());
//! ledger.initialize_chart().await?;
//!
//! let invoice = SaleInvoiceEvent {
//!     id: "inv-1".into(),
//!     number: "F2024-001".into(),
//!     date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
//!     subtotal: BigDecimal::from(200),
//!     tax_amount: BigDecimal::from(17),
//!     total: BigDecimal::from(217),
//!     counterparty_id: "cust-1".into(),
//!     counterparty_name: "Acme".into(),
//! };
//! let entry = ledger.generate_sale_invoice_entry(&invoice).await?;
//! ledger.validate_entry(&entry.number).await?;
//!
//! let trial = ledger.get_trial_balance(&ReportFilter::new(DateRange::all())).await?;
//! assert!(trial.is_balanced);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod events;
pub mod ledger;
pub mod reports;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use events::*;
pub use ledger::*;
pub use reports::*;
pub use traits::*;
pub use types::*;
pub use utils::memory_storage::MemoryStorage;
