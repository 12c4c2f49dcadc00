use std::env;
use std::time::Duration;

use tera::Tera;
use tokio::sync::RwLock;

use crate::fetcher::DEFAULT_HOST;
use crate::models::{Field, StatusRecord};

/// Application configuration from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Router address, host or host:port.
    pub host: String,
    /// Pause between refresh cycles, measured from the end of a cycle.
    pub scan_interval: Duration,
    /// Address to bind the HTTP server to.
    pub bind_address: String,
}

impl Config {
    /// Creates Config from environment variables with defaults.
    pub fn from_env() -> Self {
        let scan_secs = env::var("SCAN_INTERVAL")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&secs| secs > 0)
            .unwrap_or(30);
        Self {
            host: env::var("ROUTER_HOST").unwrap_or_else(|_| DEFAULT_HOST.into()),
            scan_interval: Duration::from_secs(scan_secs),
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8220".into()),
        }
    }
}

/// Shared application state passed to all request handlers.
pub struct AppState {
    /// Template engine for rendering HTML pages.
    pub tera: Tera,
    pub config: Config,
    /// Latest poll outcome, written by the poller task only.
    pub poll: RwLock<PollState>,
}

/// Outcome of the most recent refresh cycle.
#[derive(Debug, Default)]
pub struct PollState {
    /// Normalized record from the last successful cycle; `None` until the
    /// first success. Kept across failed cycles for debugging, but
    /// `available` is false for every field while `last_success` is.
    pub record: Option<StatusRecord>,
    pub last_success: bool,
    pub last_error: Option<String>,
    pub cycles_completed: u64,
}

impl PollState {
    /// A field is available only when the last cycle succeeded AND this
    /// specific field is present in the record.
    pub fn available(&self, field: Field) -> bool {
        self.last_success
            && self
                .record
                .as_ref()
                .is_some_and(|record| record.contains(field))
    }
}

impl AppState {
    pub fn new(tera: Tera, config: Config) -> Self {
        Self {
            tera,
            config,
            poll: RwLock::new(PollState::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;

    #[test]
    fn test_nothing_available_before_first_cycle() {
        let poll = PollState::default();
        for field in Field::ALL {
            assert!(!poll.available(field));
        }
    }

    #[test]
    fn test_available_needs_success_and_presence() {
        let mut record = StatusRecord::new();
        record.set(Field::CableModemStatus, Value::text("Online"));

        let poll = PollState {
            record: Some(record.clone()),
            last_success: true,
            last_error: None,
            cycles_completed: 1,
        };
        assert!(poll.available(Field::CableModemStatus));
        assert!(!poll.available(Field::IspProvider));

        let failed = PollState {
            record: Some(record),
            last_success: false,
            last_error: Some("unreachable".into()),
            cycles_completed: 2,
        };
        assert!(!failed.available(Field::CableModemStatus));
    }
}
