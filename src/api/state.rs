use std::sync::Arc;

use finmate_config::Config;
use finmate_core::{Clock, SystemClock};
use rust_decimal::Decimal;

use crate::manager::LedgerManager;

/// Boundary preferences the handlers pass into the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    pub savings_window_months: u32,
    pub anomaly_threshold: Decimal,
    pub display_currency: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ApiSettings {
    fn from(config: &Config) -> Self {
        Self {
            savings_window_months: config.savings_window_months,
            anomaly_threshold: config.anomaly_threshold,
            display_currency: config.display_currency.clone(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<LedgerManager>,
    pub clock: Arc<dyn Clock>,
    pub settings: ApiSettings,
}

impl AppState {
    pub fn new(manager: LedgerManager, settings: ApiSettings) -> Self {
        Self {
            manager: Arc::new(manager),
            clock: Arc::new(SystemClock),
            settings,
        }
    }

    /// Replaces the wall clock, used to pin "now" in tests.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }
}
