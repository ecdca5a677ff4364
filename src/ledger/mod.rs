//! Ledger module containing the chart of accounts, the journal and entry generation

pub mod account;
pub mod core;
pub mod generators;
pub mod journal;
pub mod numbering;

pub use account::*;
pub use core::*;
pub use generators::PostingContext;
pub use journal::*;
pub use numbering::*;
