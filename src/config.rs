//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::{PartyId, RepaymentPolicy};

/// Error produced when a configuration variable is missing or malformed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Raw value found in the environment.
        value: String,
        /// Parser message.
        reason: String,
    },
}

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Party that administers the ledger and decides applications.
    pub ledger_owner: PartyId,

    /// Who may repay a funded mortgage.
    pub repayment_policy: RepaymentPolicy,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,

    /// Upper bound on the time spent serving one HTTP request.
    pub request_timeout: Duration,

    /// Exposes the account credit endpoint of the in-memory bank.
    pub faucet_enabled: bool,

    /// Tracing output format.
    pub log_format: LogFormat,
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults for every variable except
    /// `LEDGER_OWNER_ID`. Calls `dotenvy::dotenv().ok()` to optionally load
    /// a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if `LEDGER_OWNER_ID` is unset and
    /// [`ConfigError::Invalid`] if any variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`GatewayConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ledger_owner: PartyId = match lookup("LEDGER_OWNER_ID") {
            Some(raw) => parse_value("LEDGER_OWNER_ID", &raw)?,
            None => return Err(ConfigError::Missing("LEDGER_OWNER_ID")),
        };

        Ok(Self {
            listen_addr: parse_env(&lookup, "LISTEN_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            ledger_owner,
            repayment_policy: parse_env(&lookup, "REPAYMENT_POLICY", RepaymentPolicy::default())?,
            event_bus_capacity: parse_env(&lookup, "EVENT_BUS_CAPACITY", 10_000)?,
            request_timeout: Duration::from_secs(parse_env(&lookup, "REQUEST_TIMEOUT_SECS", 30)?),
            faucet_enabled: parse_env_bool(&lookup, "FAUCET_ENABLED", false)?,
            log_format: parse_env(&lookup, "LOG_FORMAT", LogFormat::default())?,
        })
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Parses a variable as `T`, returning `default` when it is not set.
fn parse_env<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

/// Parses a variable as a boolean. Accepts `"true"`, `"1"`, `"false"`,
/// `"0"` (case-insensitive).
fn parse_env_bool<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw,
            reason: "expected true, false, 1 or 0".to_string(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_owner_is_set() {
        let owner = PartyId::new();
        let Ok(config) = load(&[("LEDGER_OWNER_ID", &owner.to_string())]) else {
            panic!("expected valid config");
        };
        assert_eq!(config.ledger_owner, owner);
        assert_eq!(config.listen_addr.port(), 3000);
        assert_eq!(config.repayment_policy, RepaymentPolicy::BorrowerOnly);
        assert_eq!(config.event_bus_capacity, 10_000);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(!config.faucet_enabled);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn missing_owner_is_reported() {
        assert!(matches!(
            load(&[]),
            Err(ConfigError::Missing("LEDGER_OWNER_ID"))
        ));
    }

    #[test]
    fn overrides_are_parsed() {
        let owner = PartyId::new().to_string();
        let Ok(config) = load(&[
            ("LEDGER_OWNER_ID", &owner),
            ("LISTEN_ADDR", "127.0.0.1:8080"),
            ("REPAYMENT_POLICY", "any_party"),
            ("EVENT_BUS_CAPACITY", "16"),
            ("REQUEST_TIMEOUT_SECS", "5"),
            ("FAUCET_ENABLED", "TRUE"),
            ("LOG_FORMAT", "json"),
        ]) else {
            panic!("expected valid config");
        };
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.repayment_policy, RepaymentPolicy::AnyParty);
        assert_eq!(config.event_bus_capacity, 16);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(config.faucet_enabled);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let owner = PartyId::new().to_string();
        for (key, value) in [
            ("LEDGER_OWNER_ID", "not-a-uuid"),
            ("LISTEN_ADDR", "nowhere"),
            ("REPAYMENT_POLICY", "lenders"),
            ("EVENT_BUS_CAPACITY", "-1"),
            ("FAUCET_ENABLED", "maybe"),
            ("LOG_FORMAT", "xml"),
        ] {
            let result = load(&[("LEDGER_OWNER_ID", &owner), (key, value)]);
            let Err(ConfigError::Invalid { key: reported, .. }) = result else {
                panic!("{key}={value} should be rejected");
            };
            assert_eq!(reported, key);
        }
    }
}
