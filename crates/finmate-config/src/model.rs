use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

use crate::ConfigError;

/// Environment variable that overrides the base directory.
pub const HOME_ENV: &str = "FINMATE_HOME";

/// Server settings persisted in `config/config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Directory holding `ledger.json` and its backups. Defaults to `<home>/data`.
    pub data_dir: Option<PathBuf>,

    #[serde(default = "Config::default_log_filter")]
    pub log_filter: String,

    /// Complete months averaged when projecting goal completion.
    #[serde(default = "Config::default_savings_window_months")]
    pub savings_window_months: u32,

    /// Expenses above this amount are flagged by an anomaly scan.
    #[serde(default = "Config::default_anomaly_threshold")]
    pub anomaly_threshold: Decimal,

    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,

    /// Symbol used when rendering amounts in HTML exports.
    #[serde(default = "Config::default_display_currency")]
    pub display_currency: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            data_dir: None,
            log_filter: Self::default_log_filter(),
            savings_window_months: Self::default_savings_window_months(),
            anomaly_threshold: Self::default_anomaly_threshold(),
            backup_retention: Self::default_backup_retention(),
            display_currency: Self::default_display_currency(),
        }
    }
}

impl Config {
    pub fn default_log_filter() -> String {
        "finmate=info".into()
    }

    pub fn default_savings_window_months() -> u32 {
        3
    }

    pub fn default_anomaly_threshold() -> Decimal {
        Decimal::ONE_THOUSAND
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn default_display_currency() -> String {
        "$".into()
    }

    pub fn resolve_data_dir(&self, home: &std::path::Path) -> PathBuf {
        match &self.data_dir {
            Some(path) => path.clone(),
            None => home.join("data"),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.savings_window_months == 0 {
            return Err(ConfigError::Invalid(
                "savings_window_months must be at least 1".into(),
            ));
        }
        if self.anomaly_threshold.is_sign_negative() {
            return Err(ConfigError::Invalid(
                "anomaly_threshold must be a non-negative number".into(),
            ));
        }
        if self.backup_retention == 0 {
            return Err(ConfigError::Invalid(
                "backup_retention must be at least 1".into(),
            ));
        }
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid("server.host cannot be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl ServerSettings {
    pub fn default_host() -> String {
        "127.0.0.1".into()
    }

    pub fn default_port() -> u16 {
        8000
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Base directory: `$FINMATE_HOME`, else `~/.finmate`.
pub fn resolve_home_dir() -> PathBuf {
    if let Some(path) = env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".finmate")
}
