//! Runtime configuration, read from environment variables.

use core::str::FromStr;
use std::time::Duration;

use malvader_accounts::LedgerConfig;
use malvader_core::Money;
use malvader_observability::LogFormat;

pub const BANK_NAME_VAR: &str = "MALVADER_BANK_NAME";
pub const PAUSE_MS_VAR: &str = "MALVADER_PAUSE_MS";
pub const MAX_ACCOUNTS_VAR: &str = "MALVADER_MAX_ACCOUNTS";
pub const DEFAULT_CREDIT_LIMIT_VAR: &str = "MALVADER_DEFAULT_CREDIT_LIMIT";
pub const LOG_FORMAT_VAR: &str = "MALVADER_LOG_FORMAT";

const DEFAULT_BANK_NAME: &str = "Banco Malvader";
const DEFAULT_PAUSE_MS: u64 = 1500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Title shown in the menu header.
    pub bank_name: String,
    /// Pause after each operation so the result can be read.
    pub pause: Duration,
    pub ledger: LedgerConfig,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            bank_name: DEFAULT_BANK_NAME.to_string(),
            pause: Duration::from_millis(DEFAULT_PAUSE_MS),
            ledger: LedgerConfig::default(),
        }
    }
}

impl ShellConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or invalid values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let bank_name = lookup(BANK_NAME_VAR)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or(defaults.bank_name);

        let pause_ms = parse_or(&lookup, PAUSE_MS_VAR, DEFAULT_PAUSE_MS);

        let capacity: usize = parse_or(&lookup, MAX_ACCOUNTS_VAR, 0);
        let max_accounts = match capacity {
            0 => None,
            capacity => Some(capacity),
        };

        let mut default_credit_limit = parse_or(&lookup, DEFAULT_CREDIT_LIMIT_VAR, Money::ZERO);
        if default_credit_limit.is_negative() {
            tracing::warn!(
                key = DEFAULT_CREDIT_LIMIT_VAR,
                value = %default_credit_limit,
                "credit limit cannot be negative; using 0"
            );
            default_credit_limit = Money::ZERO;
        }

        Self {
            bank_name,
            pause: Duration::from_millis(pause_ms),
            ledger: LedgerConfig {
                max_accounts,
                default_credit_limit,
            },
        }
    }
}

/// Log format from `MALVADER_LOG_FORMAT`, read before logging is initialized.
pub fn log_format_from_env() -> LogFormat {
    std::env::var(LOG_FORMAT_VAR)
        .ok()
        .and_then(|value| LogFormat::parse(&value))
        .unwrap_or_default()
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(key, value = %raw, "invalid configuration value; using default");
            default
        }
    }
}
