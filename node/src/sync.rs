//! # Core Sync Poller
//!
//! Keeps the shared [`SyncState`] current by asking the core node for its
//! `/info` on a fixed interval. The relay only accepts submissions while the
//! node reports `Synced!`; any failure to get an answer counts as not synced.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use txsub_protocol::{CoreClient, RequestContext, SyncState};

use crate::metrics::SharedMetrics;

/// Poll the core node once and update `state`. Returns the new sync value.
pub async fn poll_once(
    client: &dyn CoreClient,
    state: &SyncState,
    metrics: &SharedMetrics,
    timeout: Duration,
) -> bool {
    let ctx = RequestContext::new().with_timeout(timeout);
    let synced = match client.info(&ctx).await {
        Ok(info) => {
            debug!(state = %info.state, ledger = ?info.ledger.as_ref().map(|l| l.num), "core info");
            info.is_synced()
        }
        Err(e) => {
            metrics.core_info_failures_total.inc();
            warn!(error = %e, "core info poll failed");
            false
        }
    };

    let was_synced = state.is_synced();
    if synced != was_synced {
        if synced {
            info!("core is synced, accepting submissions");
        } else {
            warn!("core is no longer synced, rejecting submissions");
        }
    }
    state.set_synced(synced);
    metrics.core_synced.set(i64::from(synced));
    synced
}

/// Poll until `shutdown` is cancelled. The first poll happens immediately.
pub async fn run_sync_poller(
    client: Arc<dyn CoreClient>,
    state: SyncState,
    metrics: SharedMetrics,
    interval: Duration,
    timeout: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = poll_once(client.as_ref(), &state, &metrics, timeout) => {}
                }
            }
        }
    }

    debug!("sync poller stopped");
}
