//! Error types for the ModemViz poller.
//!
//! Three layers map to three failure audiences: `FetchError` is per
//! endpoint and never escapes a cycle, `PollError` is per cycle and goes
//! to the poll loop, `SetupError` is raised once at startup validation.
//! Decode problems are not errors at all — the extractor drops the
//! affected field and moves on.

use thiserror::Error;

/// Outcome classification for a single endpoint request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Timeout, connection refused, DNS failure and friends.
    /// Automatically converts from `reqwest::Error`.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The router answered, but not with a usable status.
    #[error("router returned HTTP {0}")]
    HttpStatus(u16),
}

impl FetchError {
    /// Transport-level failures are the only ones that can fail a whole
    /// cycle; HTTP error statuses just mean this endpoint had nothing.
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }
}

/// Failure of an entire refresh cycle.
#[derive(Debug, Error)]
pub enum PollError {
    /// Every configured endpoint failed at the transport level; there is
    /// nothing for the extractor to work with.
    #[error("router at {host} unreachable: all {attempts} endpoints failed")]
    AllEndpointsFailed { host: String, attempts: usize },
}

/// Startup-time validation failure, surfaced to the operator with a
/// remediation hint.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Transport-level failure or an HTTP error status from the probe.
    #[error("cannot connect to router at {host}")]
    CannotConnect { host: String },

    /// Anything unexpected, most likely a malformed host string.
    #[error("invalid router host {host:?}: {reason}")]
    InvalidHost { host: String, reason: String },
}
