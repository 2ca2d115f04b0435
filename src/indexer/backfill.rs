//! Backfill driver: walks from a start block toward the confirmed head

use super::confirmed_head;
use super::scanner::Scanner;
use crate::chain::ChainClient;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

const IDLE_RETRY: Duration = Duration::from_secs(2);

pub struct BackfillDriver {
    scanner: Arc<Scanner>,
    chain: Arc<dyn ChainClient>,
    start_block: u64,
    confirmations: u64,
    batch_size: u64,
}

impl BackfillDriver {
    pub fn new(
        scanner: Arc<Scanner>,
        chain: Arc<dyn ChainClient>,
        start_block: u64,
        confirmations: u64,
        batch_size: u64,
    ) -> Self {
        Self {
            scanner,
            chain,
            start_block,
            confirmations,
            batch_size,
        }
    }

    /// Scan forward in `batch_size` windows until cancelled.
    ///
    /// A start block of 0 means "no history requested": the driver parks and
    /// the tailer pins the cursor at the live confirmed head. Once caught up
    /// the driver keeps idling so a stalling tailer never strands the tip.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let mut next = self.start_block;
        info!(start_block = next, "backfill starting");

        loop {
            if shutdown.is_cancelled() {
                return Ok(());
            }
            let safe = confirmed_head(self.chain.as_ref(), self.confirmations).await?;
            if next == 0 || next > safe {
                tokio::select! {
                    _ = shutdown.cancelled() => return Ok(()),
                    _ = tokio::time::sleep(IDLE_RETRY) => continue,
                }
            }
            let end = (next + self.batch_size - 1).min(safe);
            self.scanner.scan_range(next, end).await?;
            next = end + 1;
        }
    }
}
