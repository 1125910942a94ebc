//! Request handlers grouped by resource.

pub mod ai;
pub mod anomalies;
pub mod backups;
pub mod budgets;
pub mod categories;
pub mod entries;
pub mod goals;
pub mod health;
pub mod reports;
