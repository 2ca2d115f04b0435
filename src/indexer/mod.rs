//! Indexing subsystem: discovery, backfill, live tail, orchestration

mod backfill;
mod cursor;
mod registry;
mod scanner;
mod tailer;

pub use backfill::BackfillDriver;
pub use cursor::Cursor;
pub use registry::Registry;
pub use scanner::Scanner;
pub use tailer::{TailStrategy, Tailer};

use crate::chain::{ChainClient, HeadSubscriber};
use crate::config::IndexerSettings;
use crate::database::Store;
use crate::error::ChainError;
use alloy::primitives::Address;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Highest block the indexer will read from: `head - confirmations`, floored
/// at zero. The confirmation margin is the sole reorg defence.
pub(crate) async fn confirmed_head(
    chain: &dyn ChainClient,
    confirmations: u64,
) -> Result<u64, ChainError> {
    let head = chain.latest_header().await?;
    Ok(head.number.saturating_sub(confirmations))
}

/// Owns the chain clients, registry, cursor, and store handle, and runs the
/// backfill driver and live tailer concurrently until cancelled.
pub struct Indexer {
    chain: Arc<dyn ChainClient>,
    heads: Option<Arc<dyn HeadSubscriber>>,
    registry: Arc<Registry>,
    cursor: Arc<Cursor>,
    scanner: Arc<Scanner>,
    settings: IndexerSettings,
}

impl Indexer {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        heads: Option<Arc<dyn HeadSubscriber>>,
        store: Arc<dyn Store>,
        factory: Address,
        settings: IndexerSettings,
    ) -> Self {
        let registry = Arc::new(Registry::new(store.clone()));
        let cursor = Arc::new(Cursor::new());
        let scanner = Arc::new(Scanner::new(
            chain.clone(),
            store,
            registry.clone(),
            cursor.clone(),
            factory,
        ));
        Self {
            chain,
            heads,
            registry,
            cursor,
            scanner,
            settings,
        }
    }

    pub fn cursor(&self) -> Arc<Cursor> {
        self.cursor.clone()
    }

    /// Warm the registry, then drive backfill and tail to completion.
    ///
    /// Either driver exiting (success or failure) cancels the other; both
    /// are then given a short grace period before being abandoned.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let warmed = self.registry.warm_start().await?;
        info!(pools = warmed, "registry warmed from store");

        let backfill = BackfillDriver::new(
            self.scanner.clone(),
            self.chain.clone(),
            self.settings.start_block,
            self.settings.confirmations,
            self.settings.batch_size,
        );
        let strategy = match &self.heads {
            Some(subscriber) => TailStrategy::Push(subscriber.clone()),
            None => TailStrategy::Poll(Duration::from_secs(self.settings.poll_interval_secs)),
        };
        let tailer = Tailer::new(
            self.scanner.clone(),
            self.chain.clone(),
            self.cursor.clone(),
            self.settings.confirmations,
            strategy,
        );

        let mut backfill_task = tokio::spawn(backfill.run(shutdown.clone()));
        let mut tail_task = tokio::spawn(tailer.run(shutdown.clone()));

        let mut backfill_done = false;
        let mut tail_done = false;
        tokio::select! {
            _ = shutdown.cancelled() => {}
            result = &mut backfill_task => {
                backfill_done = true;
                report_exit("backfill", result);
                shutdown.cancel();
            }
            result = &mut tail_task => {
                tail_done = true;
                report_exit("tailer", result);
                shutdown.cancel();
            }
        }

        let drain = async {
            if !backfill_done {
                report_exit("backfill", (&mut backfill_task).await);
            }
            if !tail_done {
                report_exit("tailer", (&mut tail_task).await);
            }
        };
        if tokio::time::timeout(SHUTDOWN_GRACE, drain).await.is_err() {
            backfill_task.abort();
            tail_task.abort();
        }
        Ok(())
    }
}

fn report_exit(task: &str, result: Result<Result<()>, tokio::task::JoinError>) {
    match result {
        Ok(Ok(())) => info!(task, "driver stopped"),
        Ok(Err(e)) => error!(task, error = %e, "driver failed"),
        Err(e) => error!(task, error = %e, "driver panicked"),
    }
}
