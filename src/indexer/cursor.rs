//! Last-processed-block cursor shared by the backfill and tail drivers

use tokio::sync::Mutex;

/// Monotonically non-decreasing cursor over processed block numbers.
///
/// Claiming and advancing are read-modify-write under one lock so the two
/// drivers can never race each other into leaving a gap.
pub struct Cursor {
    last: Mutex<u64>,
}

impl Cursor {
    pub fn new() -> Self {
        Self { last: Mutex::new(0) }
    }

    pub async fn get(&self) -> u64 {
        *self.last.lock().await
    }

    /// Advance to `block` if that moves the cursor forward.
    pub async fn advance_to(&self, block: u64) {
        let mut last = self.last.lock().await;
        if block > *last {
            *last = block;
        }
    }

    /// Claim the unprocessed window up to `safe`.
    ///
    /// Returns `None` when the confirmed head has not moved past the cursor.
    /// On the very first claim the window collapses to `safe` itself:
    /// unindexed history belongs to backfill, not the tail.
    pub async fn claim(&self, safe: u64) -> Option<(u64, u64)> {
        let mut last = self.last.lock().await;
        if safe <= *last {
            return None;
        }
        let mut from = *last + 1;
        if from == 1 {
            from = safe;
        }
        *last = safe;
        Some((from, safe))
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}
