//! The periodic refresh loop.
//!
//! One cycle = fetch all endpoints, extract, publish. Cycles never
//! overlap: the scan interval is slept from the end of the previous
//! cycle, so a slow router stretches the period instead of stacking
//! requests. A failed cycle marks the readings unavailable and the loop
//! simply tries again next time.

use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::error::PollError;
use crate::extract;
use crate::fetcher;
use crate::models::StatusRecord;
use crate::state::AppState;

/// Runs a single refresh cycle against the router.
///
/// # Errors
///
/// Only [`PollError::AllEndpointsFailed`]; partial data is a success.
pub async fn refresh(host: &str) -> Result<StatusRecord, PollError> {
    let payloads = fetcher::fetch_all(host).await?;
    Ok(extract::extract(&payloads))
}

/// Poll loop task. Never returns; failures are logged and retried.
pub async fn run(state: Arc<AppState>) {
    let host = state.config.host.clone();
    let interval = state.config.scan_interval;
    info!(
        "polling router at {} every {}s",
        host,
        interval.as_secs()
    );

    loop {
        match refresh(&host).await {
            Ok(record) => {
                debug!(
                    "cycle ok: {}",
                    record.iter().map(|(field, _)| field.key()).join(", ")
                );
                let mut poll = state.poll.write().await;
                poll.record = Some(record);
                poll.last_success = true;
                poll.last_error = None;
                poll.cycles_completed += 1;
            }
            Err(err) => {
                warn!("cycle failed: {}", err);
                let mut poll = state.poll.write().await;
                poll.last_success = false;
                poll.last_error = Some(err.to_string());
                poll.cycles_completed += 1;
            }
        }

        tokio::time::sleep(interval).await;
    }
}
