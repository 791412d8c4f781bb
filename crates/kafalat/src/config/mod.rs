use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::sponsorship::policy::{
    ViolationPolicy, DEFAULT_ADVANCE_YEARS, DEFAULT_CRITICAL_WITHIN_DAYS, DEFAULT_HISTORY_YEARS,
    DEFAULT_OVERDUE_AFTER_MONTHS, DEFAULT_WARNING_WITHIN_DAYS,
};

const DEFAULT_DATA_FILE: &str = "kafalat-records.json";

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub storage: StorageConfig,
    pub policy: PolicyConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let data_file = env::var("KAFALAT_DATA_FILE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string());

        let policy = PolicyConfig {
            overdue_after_months: read_number(
                "KAFALAT_OVERDUE_MONTHS",
                DEFAULT_OVERDUE_AFTER_MONTHS,
            )?,
            critical_within_days: read_number("IQAMA_CRITICAL_DAYS", DEFAULT_CRITICAL_WITHIN_DAYS)?,
            warning_within_days: read_number("IQAMA_WARNING_DAYS", DEFAULT_WARNING_WITHIN_DAYS)?,
            history_years: read_number("KAFALAT_HISTORY_YEARS", DEFAULT_HISTORY_YEARS)?,
            advance_years: read_number("KAFALAT_ADVANCE_YEARS", DEFAULT_ADVANCE_YEARS)?,
        };
        policy.validate()?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            storage: StorageConfig {
                data_file: PathBuf::from(data_file),
            },
            policy,
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
        })
    }
}

/// Where the record store lives.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_file: PathBuf,
}

/// Violation thresholds as configured through the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyConfig {
    pub overdue_after_months: u32,
    pub critical_within_days: i64,
    pub warning_within_days: i64,
    /// Years of history the ledger accepts month selections for.
    pub history_years: u32,
    /// Years of advance payments the ledger accepts.
    pub advance_years: u32,
}

impl PolicyConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.overdue_after_months == 0 {
            return Err(ConfigError::InvalidNumber {
                variable: "KAFALAT_OVERDUE_MONTHS",
                value: "0".to_string(),
            });
        }
        if self.critical_within_days < 0 || self.warning_within_days < self.critical_within_days {
            return Err(ConfigError::InvertedExpiryWindow {
                critical: self.critical_within_days,
                warning: self.warning_within_days,
            });
        }
        Ok(())
    }

    pub fn to_policy(&self) -> ViolationPolicy {
        ViolationPolicy::new(
            self.overdue_after_months,
            self.critical_within_days,
            self.warning_within_days,
        )
        .with_selection_years(self.history_years, self.advance_years)
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            overdue_after_months: DEFAULT_OVERDUE_AFTER_MONTHS,
            critical_within_days: DEFAULT_CRITICAL_WITHIN_DAYS,
            warning_within_days: DEFAULT_WARNING_WITHIN_DAYS,
            history_years: DEFAULT_HISTORY_YEARS,
            advance_years: DEFAULT_ADVANCE_YEARS,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Colored output; only wanted on a developer terminal.
    pub ansi: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { variable: &'static str, value: String },
    InvertedExpiryWindow { critical: i64, warning: i64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { variable, value } => {
                write!(f, "{variable} must be a whole number in range, got '{value}'")
            }
            ConfigError::InvertedExpiryWindow { critical, warning } => write!(
                f,
                "IQAMA_CRITICAL_DAYS ({critical}) must be non-negative \
                 and not exceed IQAMA_WARNING_DAYS ({warning})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

fn read_number<T: std::str::FromStr>(
    variable: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match env::var(variable) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidNumber {
                    variable,
                    value: raw,
                })
        }
        _ => Ok(default),
    }
}
