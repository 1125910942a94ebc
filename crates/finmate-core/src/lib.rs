//! finmate-core
//!
//! Business logic and services for finmate.
//! Depends on finmate-domain. No HTTP, no terminal I/O, no direct storage interactions.

pub mod anomaly_service;
pub mod budget_service;
pub mod category_service;
pub mod classifier;
pub mod entry_service;
pub mod error;
pub mod goal_service;
pub mod money;
pub mod period;
pub mod report_service;
pub mod storage;
pub mod time;

pub use anomaly_service::*;
pub use budget_service::*;
pub use category_service::*;
pub use classifier::*;
pub use entry_service::*;
pub use error::CoreError;
pub use goal_service::*;
pub use period::*;
pub use report_service::*;
pub use storage::LedgerStorage;
pub use time::{Clock, FixedClock, SystemClock};

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests;
