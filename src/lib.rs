//! finmate
//!
//! HTTP surface and process wiring for the finmate budget engine. The
//! evaluation logic lives in `finmate-core`; this crate owns the shared
//! ledger snapshot, the axum router and tracing setup.

pub mod api;
pub mod manager;
pub mod utils;

pub use api::{router, ApiError, ApiSettings, AppState};
pub use manager::LedgerManager;
pub use utils::init_tracing;
