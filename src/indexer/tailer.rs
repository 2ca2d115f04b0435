//! Live tailer: keeps the cursor at the confirmed head
//!
//! Two strategies, fixed at construction: consume a new-head push stream when
//! a WebSocket endpoint is available, otherwise poll on a timer. Both
//! converge on the same claim-then-scan step against the shared cursor.

use super::confirmed_head;
use super::cursor::Cursor;
use super::scanner::Scanner;
use crate::chain::{ChainClient, HeadSubscriber};
use anyhow::Result;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub enum TailStrategy {
    Push(Arc<dyn HeadSubscriber>),
    Poll(Duration),
}

pub struct Tailer {
    scanner: Arc<Scanner>,
    chain: Arc<dyn ChainClient>,
    cursor: Arc<Cursor>,
    confirmations: u64,
    strategy: TailStrategy,
}

impl Tailer {
    pub fn new(
        scanner: Arc<Scanner>,
        chain: Arc<dyn ChainClient>,
        cursor: Arc<Cursor>,
        confirmations: u64,
        strategy: TailStrategy,
    ) -> Self {
        Self {
            scanner,
            chain,
            cursor,
            confirmations,
            strategy,
        }
    }

    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        match &self.strategy {
            TailStrategy::Push(subscriber) => self.run_push(subscriber.clone(), shutdown).await,
            TailStrategy::Poll(interval) => self.run_poll(*interval, shutdown).await,
        }
    }

    /// Push mode: every pushed header triggers a catch-up. Subscription
    /// failures are surfaced upward; head-fetch failures terminate too since
    /// the same transport serves the scans.
    async fn run_push(
        &self,
        subscriber: Arc<dyn HeadSubscriber>,
        shutdown: CancellationToken,
    ) -> Result<()> {
        let mut heads = subscriber.subscribe_heads().await?;
        info!("tailing via new-head subscription");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                head = heads.next() => {
                    if head.is_none() {
                        anyhow::bail!("head subscription closed");
                    }
                    self.catch_up().await?;
                }
            }
        }
    }

    /// Poll mode: same step on a timer; errors are logged and the next tick
    /// tries again.
    async fn run_poll(&self, interval: Duration, shutdown: CancellationToken) -> Result<()> {
        info!(interval_secs = interval.as_secs(), "tailing via head polling");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                _ = ticker.tick() => {
                    if let Err(e) = self.catch_up().await {
                        warn!(error = %e, "poll tick failed");
                    }
                }
            }
        }
    }

    /// Claim everything between the cursor and the confirmed head, then scan
    /// it. The claim happens before the scan so overlapping drivers cannot
    /// take the same window twice; a failed scan is logged and left to the
    /// backfill path.
    async fn catch_up(&self) -> Result<()> {
        let safe = confirmed_head(self.chain.as_ref(), self.confirmations).await?;
        if safe == 0 {
            return Ok(());
        }
        if let Some((from, to)) = self.cursor.claim(safe).await {
            if let Err(e) = self.scanner.scan_range(from, to).await {
                warn!(error = %e, from, to, "live scan failed");
            }
        }
        Ok(())
    }
}
