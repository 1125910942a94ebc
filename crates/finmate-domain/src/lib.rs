//! finmate-domain
//!
//! Pure domain models (Ledger, Category, LedgerEntry, Budget, Goal, etc.).
//! No I/O, no HTTP, no storage. Only data types and core enums.

pub mod budget;
pub mod category;
pub mod common;
pub mod entry;
pub mod goal;
pub mod insights;
pub mod ledger;

pub use budget::*;
pub use category::*;
pub use common::*;
pub use entry::*;
pub use goal::*;
pub use insights::*;
pub use ledger::*;
