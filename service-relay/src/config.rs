use crate::error::{RelayError, RelayResult};
use std::{str::FromStr, time::Duration};
use valkey_client::config::ValkeyConfig;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_VALKEY_HOST: &str = "localhost";
const DEFAULT_VALKEY_PORT: u16 = 6379;
const DEFAULT_SEND_TIMEOUT_MS: u64 = 5000;
const DEFAULT_PERSIST_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub valkey: ValkeyConfig,
    /// Upper bound for one send during fan-out; exceeding it evicts the recipient.
    pub send_timeout: Duration,
    pub persist_timeout: Duration,
}

impl RelayConfig {
    pub fn from_env() -> RelayResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> RelayResult<Self> {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;

        let valkey_host = lookup("VALKEY_HOST").unwrap_or_else(|| DEFAULT_VALKEY_HOST.to_owned());
        let valkey_port = parse_or(&lookup, "VALKEY_PORT", DEFAULT_VALKEY_PORT)?;
        let valkey_db = parse_or(&lookup, "VALKEY_DB", 0)?;
        let mut valkey = ValkeyConfig::new(valkey_host, valkey_port)?.with_db(valkey_db)?;
        if let Some(password) = lookup("VALKEY_PASSWORD") {
            valkey = valkey.with_password(password);
        }

        let send_timeout = parse_or(&lookup, "RELAY_SEND_TIMEOUT_MS", DEFAULT_SEND_TIMEOUT_MS)?;
        let persist_timeout = parse_or(&lookup, "RELAY_PERSIST_TIMEOUT_MS", DEFAULT_PERSIST_TIMEOUT_MS)?;

        Ok(Self {
            host,
            port,
            valkey,
            send_timeout: Duration::from_millis(send_timeout),
            persist_timeout: Duration::from_millis(persist_timeout),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> RelayResult<T> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| RelayError::Config(format!("{key} has invalid value `{raw}`"))),
        None => Ok(default),
    }
}
